use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use edgespot::capture::{self, FrameSource, ImageSequenceSource};
use edgespot::display::{self, DirectorySink, DisplaySink};
use edgespot::{Annotator, DetectionPipeline, DetectorConfig, RunLimits};

#[derive(Parser)]
#[command(name = "edgespot")]
#[command(about = "Detect objects in live video by edge contours and rank them by size")]
struct Cli {
    /// Camera to open: an index or a /dev/videoN path
    #[arg(long, value_name = "DEVICE", default_value = "0")]
    device: String,

    /// Read frames from the image files in this directory instead of a camera
    #[arg(long, value_name = "DIR")]
    input: Option<PathBuf>,

    /// Write the annotated and edge views to this directory instead of windows
    #[arg(long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Save every preprocessing stage to directory (must be empty)
    #[arg(long, value_name = "DIR")]
    debug_out: Option<PathBuf>,

    /// Contours with a smaller area are ignored
    #[arg(long, default_value_t = 400.0)]
    min_area: f64,

    /// Canny hysteresis low threshold
    #[arg(long, default_value_t = 50.0)]
    canny_low: f32,

    /// Canny hysteresis high threshold
    #[arg(long, default_value_t = 150.0)]
    canny_high: f32,

    /// Gaussian kernel size (odd)
    #[arg(long, default_value_t = 5)]
    blur_kernel: u32,

    /// Font file for the area labels
    #[arg(long, value_name = "FILE")]
    font: Option<PathBuf>,

    /// Stop after this many frames
    #[arg(long)]
    max_frames: Option<u64>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

fn open_source(args: &Cli) -> Result<Box<dyn FrameSource>, capture::CaptureError> {
    match &args.input {
        Some(dir) => Ok(Box::new(ImageSequenceSource::open(dir)?)),
        None => capture::open_camera(&args.device),
    }
}

fn open_sink(args: &Cli) -> Result<Box<dyn DisplaySink>, display::DisplayError> {
    match &args.output {
        Some(dir) => Ok(Box::new(DirectorySink::create(dir)?)),
        None => display::open_windows(),
    }
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();
    init_tracing(args.verbose);

    let config = DetectorConfig::new()
        .with_min_area(args.min_area)
        .with_canny_thresholds(args.canny_low, args.canny_high)
        .with_blur_kernel(args.blur_kernel);

    let mut detector = DetectionPipeline::new(config)?;
    if let Some(debug_dir) = &args.debug_out {
        detector = detector.with_debug(debug_dir.clone())?;
    }

    let annotator = match &args.font {
        Some(path) => Annotator::with_font_path(path)?,
        None => Annotator::with_system_font(),
    };

    let mut source = match open_source(&args) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("Error: could not open capture source: {err}");
            return Ok(());
        }
    };

    let mut sink = open_sink(&args).context("Failed to open display")?;

    let limits = RunLimits {
        max_frames: args.max_frames,
    };
    let summary = edgespot::run(
        source.as_mut(),
        sink.as_mut(),
        &detector,
        &annotator,
        &limits,
    );

    println!(
        "Processed {} frames, {} objects detected",
        summary.frames, summary.objects
    );

    Ok(())
}
