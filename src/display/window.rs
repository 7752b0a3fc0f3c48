//! HighGUI windows. Esc in any window stops the loop.

use super::{DisplayError, DisplaySink};
use image::DynamicImage;
use opencv::{core::Mat, highgui, imgproc, prelude::*};
use tracing::warn;

const ESC_KEY: i32 = 27;

pub struct HighguiSink {
    windows: Vec<String>,
    closed: bool,
}

impl HighguiSink {
    pub fn new() -> Self {
        Self {
            windows: Vec::new(),
            closed: false,
        }
    }
}

impl Default for HighguiSink {
    fn default() -> Self {
        Self::new()
    }
}

fn backend(err: opencv::Error) -> DisplayError {
    DisplayError::Backend(err.to_string())
}

/// Copy an image into a Mat in OpenCV's channel order
fn to_mat(image: &DynamicImage) -> opencv::Result<Mat> {
    match image {
        DynamicImage::ImageLuma8(gray) => {
            let flat = Mat::from_slice(gray.as_raw())?;
            flat.reshape(1, gray.height() as i32)?.try_clone()
        }
        other => {
            let rgb = other.to_rgb8();
            let flat = Mat::from_slice(rgb.as_raw())?;
            let shaped = flat.reshape(3, rgb.height() as i32)?.try_clone()?;
            let mut bgr = Mat::default();
            imgproc::cvt_color(&shaped, &mut bgr, imgproc::COLOR_RGB2BGR, 0)?;
            Ok(bgr)
        }
    }
}

impl DisplaySink for HighguiSink {
    fn show(
        &mut self,
        view: &str,
        _frame_index: u64,
        image: &DynamicImage,
    ) -> Result<(), DisplayError> {
        if !self.windows.iter().any(|w| w == view) {
            highgui::named_window(view, highgui::WINDOW_AUTOSIZE).map_err(backend)?;
            self.windows.push(view.to_string());
            self.closed = false;
        }

        let mat = to_mat(image).map_err(backend)?;
        highgui::imshow(view, &mat).map_err(backend)
    }

    fn poll_quit(&mut self) -> Result<bool, DisplayError> {
        let key = highgui::wait_key(1).map_err(backend)?;
        Ok(key >= 0 && (key & 0xFF) == ESC_KEY)
    }

    fn close(&mut self) -> Result<(), DisplayError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.windows.clear();
        highgui::destroy_all_windows().map_err(backend)
    }
}

impl Drop for HighguiSink {
    fn drop(&mut self) {
        if let Err(err) = self.close() {
            warn!(%err, "failed to close windows");
        }
    }
}
