//! Display sinks for annotated frames and edge maps.

pub mod directory;
#[cfg(feature = "camera")]
pub mod window;

pub use directory::DirectorySink;
#[cfg(feature = "camera")]
pub use window::HighguiSink;

use image::DynamicImage;
use std::path::PathBuf;
use thiserror::Error;

/// View showing the frame with ranked overlays
pub const ANNOTATED_VIEW: &str = "Multi-Object Detection";

/// View showing the raw edge map
pub const EDGES_VIEW: &str = "Edges";

#[derive(Debug, Error)]
pub enum DisplayError {
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("output directory is not empty: {0}")]
    NotEmpty(PathBuf),
    #[error("display backend error: {0}")]
    Backend(String),
    #[error("window display unavailable: built without the `camera` feature")]
    Unsupported,
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub trait DisplaySink {
    /// Present `image` in the named view
    fn show(&mut self, view: &str, frame_index: u64, image: &DynamicImage)
    -> Result<(), DisplayError>;

    /// Give the user a chance to interact. `true` means stop the loop.
    fn poll_quit(&mut self) -> Result<bool, DisplayError>;

    /// Tear down every view. Safe to call more than once.
    fn close(&mut self) -> Result<(), DisplayError>;
}

/// Open on-screen windows
#[cfg(feature = "camera")]
pub fn open_windows() -> Result<Box<dyn DisplaySink>, DisplayError> {
    Ok(Box::new(HighguiSink::new()))
}

/// Open on-screen windows
#[cfg(not(feature = "camera"))]
pub fn open_windows() -> Result<Box<dyn DisplaySink>, DisplayError> {
    Err(DisplayError::Unsupported)
}
