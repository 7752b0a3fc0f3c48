//! Frame sources.
//!
//! A source is acquired by its constructor, hands out frames through
//! [`FrameSource::read_frame`], and is released by [`FrameSource::release`] or
//! on drop, whichever comes first.

#[cfg(feature = "camera")]
pub mod camera;
pub mod sequence;

#[cfg(feature = "camera")]
pub use camera::CameraSource;
pub use sequence::ImageSequenceSource;

use image::RgbImage;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("failed to open capture source {target:?}")]
    Open { target: String },
    #[error("failed to read frame: {0}")]
    Read(String),
    #[error("camera capture unavailable: built without the `camera` feature")]
    Unsupported,
    #[error("failed to decode frame {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub trait FrameSource {
    /// Block until the next color frame is available.
    /// `Ok(None)` means the source is exhausted.
    fn read_frame(&mut self) -> Result<Option<RgbImage>, CaptureError>;

    /// Short name for logs
    fn describe(&self) -> String;

    /// Give the underlying device back. Safe to call more than once.
    fn release(&mut self) {}
}

/// Parse a `/dev/videoX` style name or bare index into a device index
pub fn parse_device_index(device: &str) -> Option<i32> {
    if let Ok(index) = device.parse::<i32>() {
        return Some(index);
    }
    let stripped = device.strip_prefix("/dev/video")?;
    if !stripped.is_empty() && stripped.chars().all(|c| c.is_ascii_digit()) {
        return stripped.parse::<i32>().ok();
    }
    None
}

/// Open a camera by index or `/dev/videoX` path
#[cfg(feature = "camera")]
pub fn open_camera(device: &str) -> Result<Box<dyn FrameSource>, CaptureError> {
    let index = parse_device_index(device).ok_or_else(|| CaptureError::Open {
        target: device.to_string(),
    })?;
    Ok(Box::new(CameraSource::open(index)?))
}

/// Open a camera by index or `/dev/videoX` path
#[cfg(not(feature = "camera"))]
pub fn open_camera(device: &str) -> Result<Box<dyn FrameSource>, CaptureError> {
    tracing::debug!(device, "camera requested without camera support");
    Err(CaptureError::Unsupported)
}
