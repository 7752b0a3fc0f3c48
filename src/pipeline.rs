use anyhow::{Context, Result};
use image::DynamicImage;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Debug configuration for pipeline execution
#[derive(Clone, Debug)]
pub struct DebugConfig {
    /// Root directory for debug outputs
    pub output_dir: PathBuf,
}

/// Context available to all pipeline steps while a frame is processed
#[derive(Clone, Debug, Default)]
pub struct PipelineContext {
    pub frame_index: u64,
    pub debug: Option<DebugConfig>,
}

impl PipelineContext {
    fn debug_dir(&self) -> Option<PathBuf> {
        self.debug
            .as_ref()
            .map(|config| config.output_dir.join(format!("{:05}", self.frame_index)))
    }
}

/// Trait that all preprocessing steps must implement
pub trait PipelineStep: Send + Sync {
    /// Transform one image into the next stage's image
    fn process(&self, image: DynamicImage, context: &PipelineContext) -> Result<DynamicImage>;

    /// Human-readable name for this step (used in logs and debug file names)
    fn name(&self) -> &str;
}

/// Lowercase, underscore-separated form of a step or view name
pub fn slug(name: &str) -> String {
    name.to_lowercase().replace(' ', "_")
}

/// Make sure `dir` exists and holds nothing yet
pub(crate) fn prepare_empty_dir(dir: &Path) -> Result<()> {
    if dir.exists() {
        let entries = std::fs::read_dir(dir)
            .with_context(|| format!("Failed to read directory {}", dir.display()))?;
        if entries.count() > 0 {
            return Err(anyhow::anyhow!("Directory is not empty: {}", dir.display()));
        }
    } else {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory {}", dir.display()))?;
    }
    Ok(())
}

/// Composable image-to-image pipeline, run once per frame
#[derive(Clone)]
pub struct Pipeline {
    steps: Vec<Arc<dyn PipelineStep>>,
    debug: Option<DebugConfig>,
}

impl Pipeline {
    /// Create a new empty pipeline
    pub fn new() -> Self {
        Self {
            steps: Vec::new(),
            debug: None,
        }
    }

    /// Enable debug mode with output directory
    /// The directory must be empty or non-existent
    pub fn with_debug(mut self, output_dir: PathBuf) -> Result<Self> {
        prepare_empty_dir(&output_dir)
            .with_context(|| format!("Invalid debug directory {}", output_dir.display()))?;

        self.debug = Some(DebugConfig { output_dir });

        Ok(self)
    }

    /// Add a processing step to the pipeline
    pub fn add_step(mut self, step: Arc<dyn PipelineStep>) -> Self {
        self.steps.push(step);
        self
    }

    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|step| step.name()).collect()
    }

    /// Run every step in order on one frame
    pub fn run(&self, input: DynamicImage, frame_index: u64) -> Result<DynamicImage> {
        let context = PipelineContext {
            frame_index,
            debug: self.debug.clone(),
        };

        let debug_dir = context.debug_dir();
        if let Some(dir) = &debug_dir {
            std::fs::create_dir_all(dir)?;
            save_debug_image(&input, &dir.join("00_input.png"))?;
        }

        let mut image = input;
        for (step_idx, step) in self.steps.iter().enumerate() {
            debug!(frame = frame_index, step = step.name(), "running step");

            image = step
                .process(image, &context)
                .with_context(|| format!("Step '{}' failed", step.name()))?;

            if let Some(dir) = &debug_dir {
                let filename = format!("{:02}_{}.png", step_idx + 1, slug(step.name()));
                save_debug_image(&image, &dir.join(&filename))?;
                debug!(frame = frame_index, file = %filename, "saved debug image");
            }
        }

        Ok(image)
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

fn save_debug_image(image: &DynamicImage, path: &Path) -> Result<()> {
    image
        .save(path)
        .map_err(|e| anyhow::anyhow!("Failed to save debug image {}: {}", path.display(), e))
}
