pub mod annotation;
pub mod capture;
pub mod detection;
pub mod display;
pub mod models;
pub mod pipeline;
pub mod runner;

pub use annotation::{Annotator, Overlay};
pub use capture::{CaptureError, FrameSource, ImageSequenceSource};
pub use detection::{DetectionPipeline, DetectorConfig, FrameDetections};
pub use display::{DirectorySink, DisplayError, DisplaySink};
pub use models::DetectedObject;
pub use pipeline::{DebugConfig, Pipeline, PipelineContext, PipelineStep};
pub use runner::{RunLimits, RunSummary, StopReason, run};
