//! OpenCV-backed camera capture.

use super::{CaptureError, FrameSource};
use image::RgbImage;
use opencv::{
    core::Mat,
    imgproc,
    prelude::*,
    videoio::{self, VideoCapture},
};
use tracing::{info, warn};

pub struct CameraSource {
    cap: VideoCapture,
    device: i32,
    frame: Mat,
    rgb: Mat,
    released: bool,
}

impl CameraSource {
    pub fn open(device: i32) -> Result<Self, CaptureError> {
        let open_error = || CaptureError::Open {
            target: format!("camera #{device}"),
        };

        let cap = VideoCapture::new(device, videoio::CAP_ANY).map_err(|err| {
            warn!(device, %err, "failed to create video capture");
            open_error()
        })?;
        if !cap.is_opened().unwrap_or(false) {
            return Err(open_error());
        }

        info!(device, "opened camera");
        Ok(Self {
            cap,
            device,
            frame: Mat::default(),
            rgb: Mat::default(),
            released: false,
        })
    }
}

impl FrameSource for CameraSource {
    fn read_frame(&mut self) -> Result<Option<RgbImage>, CaptureError> {
        let grabbed = self
            .cap
            .read(&mut self.frame)
            .map_err(|e| CaptureError::Read(e.to_string()))?;
        if !grabbed || self.frame.empty() {
            return Err(CaptureError::Read(format!(
                "camera #{} returned no frame",
                self.device
            )));
        }

        imgproc::cvt_color(&self.frame, &mut self.rgb, imgproc::COLOR_BGR2RGB, 0)
            .map_err(|e| CaptureError::Read(e.to_string()))?;

        let size = self
            .rgb
            .size()
            .map_err(|e| CaptureError::Read(e.to_string()))?;
        let data = self
            .rgb
            .data_bytes()
            .map_err(|e| CaptureError::Read(e.to_string()))?
            .to_vec();

        RgbImage::from_raw(size.width as u32, size.height as u32, data)
            .map(Some)
            .ok_or_else(|| CaptureError::Read("frame buffer has unexpected size".to_string()))
    }

    fn describe(&self) -> String {
        format!("camera #{}", self.device)
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        if let Err(err) = self.cap.release() {
            warn!(device = self.device, %err, "failed to release camera");
        }
    }
}

impl Drop for CameraSource {
    fn drop(&mut self) {
        self.release();
    }
}
