use super::{DisplayError, DisplaySink};
use crate::pipeline::slug;
use image::DynamicImage;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Writes every view as PNG files: `<dir>/<view>/<frame:05>.png`
pub struct DirectorySink {
    output_dir: PathBuf,
    written: u64,
    closed: bool,
}

impl DirectorySink {
    /// The directory must be empty or non-existent
    pub fn create(output_dir: &Path) -> Result<Self, DisplayError> {
        if output_dir.exists() {
            if std::fs::read_dir(output_dir)?.count() > 0 {
                return Err(DisplayError::NotEmpty(output_dir.to_path_buf()));
            }
        } else {
            std::fs::create_dir_all(output_dir)?;
        }

        Ok(Self {
            output_dir: output_dir.to_path_buf(),
            written: 0,
            closed: false,
        })
    }

    pub fn frame_path(&self, view: &str, frame_index: u64) -> PathBuf {
        self.output_dir
            .join(slug(view))
            .join(format!("{:05}.png", frame_index))
    }

    /// Number of images written so far
    pub fn written(&self) -> u64 {
        self.written
    }
}

impl DisplaySink for DirectorySink {
    fn show(
        &mut self,
        view: &str,
        frame_index: u64,
        image: &DynamicImage,
    ) -> Result<(), DisplayError> {
        let path = self.frame_path(view, frame_index);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        image.save(&path).map_err(|source| DisplayError::Write {
            path: path.clone(),
            source,
        })?;

        self.written += 1;
        debug!(path = %path.display(), "wrote view");
        Ok(())
    }

    fn poll_quit(&mut self) -> Result<bool, DisplayError> {
        Ok(false)
    }

    fn close(&mut self) -> Result<(), DisplayError> {
        if !self.closed {
            self.closed = true;
            info!(dir = %self.output_dir.display(), images = self.written, "closed output directory");
        }
        Ok(())
    }
}

impl Drop for DirectorySink {
    fn drop(&mut self) {
        let _ = self.close();
    }
}
