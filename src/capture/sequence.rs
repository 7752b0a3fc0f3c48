use super::{CaptureError, FrameSource};
use image::{ImageFormat, ImageReader, RgbImage};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Replays the image files of a directory as frames, in file-name order.
///
/// Files whose extension is not a known image format are ignored.
pub struct ImageSequenceSource {
    dir: PathBuf,
    pending: VecDeque<PathBuf>,
}

impl ImageSequenceSource {
    pub fn open(dir: &Path) -> Result<Self, CaptureError> {
        let mut frames: Vec<PathBuf> = std::fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file() && ImageFormat::from_path(path).is_ok())
            .collect();

        if frames.is_empty() {
            return Err(CaptureError::Open {
                target: dir.display().to_string(),
            });
        }

        frames.sort();
        info!(dir = %dir.display(), frames = frames.len(), "opened image sequence");

        Ok(Self {
            dir: dir.to_path_buf(),
            pending: frames.into(),
        })
    }

    /// Frames not read yet
    pub fn remaining(&self) -> usize {
        self.pending.len()
    }
}

impl FrameSource for ImageSequenceSource {
    fn read_frame(&mut self) -> Result<Option<RgbImage>, CaptureError> {
        let Some(path) = self.pending.pop_front() else {
            return Ok(None);
        };

        debug!(path = %path.display(), "reading frame");
        let image = ImageReader::open(&path)?
            .decode()
            .map_err(|source| CaptureError::Image {
                path: path.clone(),
                source,
            })?;

        Ok(Some(image.to_rgb8()))
    }

    fn describe(&self) -> String {
        format!("image sequence {}", self.dir.display())
    }

    fn release(&mut self) {
        self.pending.clear();
    }
}
