mod fixtures;
pub use fixtures::*;

// Re-export commonly used types from edgespot for tests
pub use edgespot::{
    Annotator, CaptureError, DetectedObject, DetectionPipeline, DetectorConfig, DisplayError,
    DisplaySink, FrameSource, RunLimits, StopReason,
};
