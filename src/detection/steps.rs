use crate::detection::preprocessing;
use crate::pipeline::{PipelineContext, PipelineStep};
use anyhow::Result;
use image::DynamicImage;
use tracing::debug;

/// Convert image to grayscale
pub struct GrayscaleStep;

impl PipelineStep for GrayscaleStep {
    fn process(&self, image: DynamicImage, _context: &PipelineContext) -> Result<DynamicImage> {
        Ok(DynamicImage::ImageLuma8(preprocessing::to_grayscale(&image)))
    }

    fn name(&self) -> &str {
        "Grayscale Conversion"
    }
}

/// Apply Gaussian blur with a square kernel
pub struct BlurStep {
    pub kernel_size: u32,
}

impl PipelineStep for BlurStep {
    fn process(&self, image: DynamicImage, _context: &PipelineContext) -> Result<DynamicImage> {
        let gray = image.into_luma8();
        let blurred = preprocessing::apply_blur(&gray, self.kernel_size);
        Ok(DynamicImage::ImageLuma8(blurred))
    }

    fn name(&self) -> &str {
        "Gaussian Blur"
    }
}

/// Detect edges using Canny
pub struct EdgeDetectionStep {
    pub low_threshold: f32,
    pub high_threshold: f32,
}

impl PipelineStep for EdgeDetectionStep {
    fn process(&self, image: DynamicImage, context: &PipelineContext) -> Result<DynamicImage> {
        let gray = image.into_luma8();
        let edges = preprocessing::detect_edges(&gray, self.low_threshold, self.high_threshold);

        let edge_pixels = edges.pixels().filter(|p| p[0] > 0).count();
        debug!(frame = context.frame_index, edge_pixels, "edge map ready");

        Ok(DynamicImage::ImageLuma8(edges))
    }

    fn name(&self) -> &str {
        "Edge Detection"
    }
}
