use crate::annotation::Annotator;
use crate::capture::FrameSource;
use crate::detection::DetectionPipeline;
use crate::display::{ANNOTATED_VIEW, DisplaySink, EDGES_VIEW};
use image::DynamicImage;
use tracing::{debug, error, info, warn};

/// Why the frame loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    SourceExhausted,
    ReadFailed,
    ProcessingFailed,
    DisplayFailed,
    QuitRequested,
    FrameLimit,
}

#[derive(Debug, Clone, Default)]
pub struct RunLimits {
    /// Stop after this many frames
    pub max_frames: Option<u64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub frames: u64,
    /// Ranked objects summed over all frames
    pub objects: u64,
    pub stop: StopReason,
}

/// Drive the per-frame loop until something ends it.
///
/// Failures inside the loop end the run instead of propagating. The sink is
/// closed and the source released on every exit path.
pub fn run(
    source: &mut dyn FrameSource,
    sink: &mut dyn DisplaySink,
    detector: &DetectionPipeline,
    annotator: &Annotator,
    limits: &RunLimits,
) -> RunSummary {
    info!(source = %source.describe(), "starting frame loop");

    let mut frames = 0u64;
    let mut objects = 0u64;

    let stop = loop {
        if limits.max_frames.is_some_and(|max| frames >= max) {
            break StopReason::FrameLimit;
        }

        let mut frame = match source.read_frame() {
            Ok(Some(frame)) => frame,
            Ok(None) => break StopReason::SourceExhausted,
            Err(err) => {
                debug!(frame = frames, %err, "frame read failed");
                break StopReason::ReadFailed;
            }
        };

        let detections = match detector.detect(&frame, frames) {
            Ok(detections) => detections,
            Err(err) => {
                error!(frame = frames, "detection failed: {err:#}");
                break StopReason::ProcessingFailed;
            }
        };

        annotator.annotate(&mut frame, &detections.objects);
        objects += detections.objects.len() as u64;

        let shown = sink
            .show(ANNOTATED_VIEW, frames, &DynamicImage::ImageRgb8(frame))
            .and_then(|_| {
                sink.show(
                    EDGES_VIEW,
                    frames,
                    &DynamicImage::ImageLuma8(detections.edges),
                )
            });
        frames += 1;

        if let Err(err) = shown {
            error!(frame = frames - 1, %err, "display failed");
            break StopReason::DisplayFailed;
        }

        match sink.poll_quit() {
            Ok(true) => break StopReason::QuitRequested,
            Ok(false) => {}
            Err(err) => {
                error!(%err, "display failed");
                break StopReason::DisplayFailed;
            }
        }
    };

    if let Err(err) = sink.close() {
        warn!(%err, "failed to close display");
    }
    source.release();

    info!(frames, objects, stop = ?stop, "frame loop finished");
    RunSummary {
        frames,
        objects,
        stop,
    }
}
