pub mod contours;
pub mod preprocessing;
pub mod ranking;
pub mod steps;

use crate::models::DetectedObject;
use crate::pipeline::Pipeline;
use anyhow::{Result, bail};
use image::{DynamicImage, GrayImage, RgbImage};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// Tunable detection parameters. `Default` gives the stock values.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectorConfig {
    /// Side of the square Gaussian kernel, must be odd
    pub blur_kernel: u32,
    pub canny_low: f32,
    pub canny_high: f32,
    /// Contours with a smaller polygon area are treated as noise
    pub min_area: f64,
}

impl DetectorConfig {
    pub fn new() -> Self {
        Self {
            blur_kernel: 5,
            canny_low: 50.0,
            canny_high: 150.0,
            min_area: 400.0,
        }
    }

    pub fn with_blur_kernel(mut self, kernel_size: u32) -> Self {
        self.blur_kernel = kernel_size;
        self
    }

    pub fn with_canny_thresholds(mut self, low: f32, high: f32) -> Self {
        self.canny_low = low;
        self.canny_high = high;
        self
    }

    pub fn with_min_area(mut self, min_area: f64) -> Self {
        self.min_area = min_area;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.blur_kernel == 0 || self.blur_kernel % 2 == 0 {
            bail!("Blur kernel size must be odd, got {}", self.blur_kernel);
        }
        if !(self.canny_low >= 0.0 && self.canny_low <= self.canny_high) {
            bail!(
                "Canny thresholds must satisfy 0 <= low <= high, got {} / {}",
                self.canny_low,
                self.canny_high
            );
        }
        if !(self.min_area.is_finite() && self.min_area >= 0.0) {
            bail!("Minimum area must be a non-negative number, got {}", self.min_area);
        }
        Ok(())
    }
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Everything the detector produced for one frame
#[derive(Debug, Clone)]
pub struct FrameDetections {
    pub edges: GrayImage,
    /// Number of external contours before area filtering
    pub contour_count: usize,
    /// Ranked largest first
    pub objects: Vec<DetectedObject>,
}

/// Build the grayscale -> blur -> edges preprocessing pipeline
pub fn build_preprocessing_pipeline(config: &DetectorConfig) -> Pipeline {
    use crate::detection::steps::*;

    Pipeline::new()
        .add_step(Arc::new(GrayscaleStep))
        .add_step(Arc::new(BlurStep {
            kernel_size: config.blur_kernel,
        }))
        .add_step(Arc::new(EdgeDetectionStep {
            low_threshold: config.canny_low,
            high_threshold: config.canny_high,
        }))
}

/// Per-frame detection orchestrator. Holds configuration only, no frame state.
pub struct DetectionPipeline {
    config: DetectorConfig,
    preprocess: Pipeline,
}

impl DetectionPipeline {
    pub fn new(config: DetectorConfig) -> Result<Self> {
        config.validate()?;
        let preprocess = build_preprocessing_pipeline(&config);
        Ok(Self { config, preprocess })
    }

    /// Dump every preprocessing stage of every frame under `output_dir`
    pub fn with_debug(mut self, output_dir: PathBuf) -> Result<Self> {
        self.preprocess = self.preprocess.with_debug(output_dir)?;
        Ok(self)
    }

    /// Binary edge map with the same dimensions as `frame`
    pub fn edge_map(&self, frame: &RgbImage, frame_index: u64) -> Result<GrayImage> {
        if frame.width() == 0 || frame.height() == 0 {
            bail!(
                "Frame {} is empty ({}x{})",
                frame_index,
                frame.width(),
                frame.height()
            );
        }

        let edges = self
            .preprocess
            .run(DynamicImage::ImageRgb8(frame.clone()), frame_index)?;
        Ok(edges.into_luma8())
    }

    /// Extract external contours from an edge map and rank them
    pub fn rank_edges(&self, edges: &GrayImage) -> (usize, Vec<DetectedObject>) {
        let found = contours::find_external_contours(edges);
        let objects = ranking::rank_objects(
            found.iter().map(|c| c.points.as_slice()),
            self.config.min_area,
        );
        (found.len(), objects)
    }

    /// Run the full detection on one frame
    pub fn detect(&self, frame: &RgbImage, frame_index: u64) -> Result<FrameDetections> {
        let edges = self.edge_map(frame, frame_index)?;
        let (contour_count, objects) = self.rank_edges(&edges);

        debug!(
            frame = frame_index,
            contours = contour_count,
            objects = objects.len(),
            "ranked objects"
        );
        for (rank, object) in objects.iter().take(5).enumerate() {
            debug!(
                frame = frame_index,
                rank = rank + 1,
                x = object.x,
                y = object.y,
                width = object.width,
                height = object.height,
                area = object.area,
                fill = object.fill_ratio(),
                "object"
            );
        }

        Ok(FrameDetections {
            edges,
            contour_count,
            objects,
        })
    }
}
