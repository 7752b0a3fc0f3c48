//! Grayscale, blur and edge stages plus full-frame detection.

mod common;

use edgespot::detection::preprocessing::{
    apply_blur, detect_edges, gaussian_kernel, gaussian_sigma, to_grayscale,
};
use image::{DynamicImage, GrayImage, Luma, Rgb, RgbImage};
use imageproc::gradients::horizontal_sobel;

use common::*;

#[test]
fn test_sigma_is_derived_from_kernel_size() {
    assert!((gaussian_sigma(5) - 1.1).abs() < 1e-6);
    assert!((gaussian_sigma(3) - 0.8).abs() < 1e-6);
}

#[test]
fn test_gaussian_kernel_is_normalized_and_symmetric() {
    let kernel = gaussian_kernel(5);

    assert_eq!(kernel.len(), 5);
    let sum: f32 = kernel.iter().sum();
    assert!((sum - 1.0).abs() < 1e-5);
    assert_eq!(kernel[0], kernel[4]);
    assert_eq!(kernel[1], kernel[3]);
    assert!(kernel[2] > kernel[1] && kernel[1] > kernel[0]);

    assert_eq!(gaussian_kernel(1), vec![1.0]);
}

#[test]
fn test_blur_keeps_flat_regions_flat() {
    let flat = GrayImage::from_pixel(20, 20, Luma([128u8]));
    let blurred = apply_blur(&flat, 5);

    assert_eq!(blurred.dimensions(), (20, 20));
    for pixel in blurred.pixels() {
        assert!((pixel[0] as i32 - 128).abs() <= 2);
    }
}

#[test]
fn test_edge_map_is_binary_and_same_size() -> anyhow::Result<()> {
    let frame = frame_with_squares(90, 70, &[(20, 15, 30)]);
    let detector = DetectionPipeline::new(DetectorConfig::default())?;

    let edges = detector.edge_map(&frame, 0)?;

    assert_eq!(edges.dimensions(), (90, 70));
    assert!(edges.pixels().all(|p| p[0] == 0 || p[0] == 255));
    assert!(edges.pixels().any(|p| p[0] == 255));
    Ok(())
}

/// Vertical step from `left` to `right` at column `width / 2`
fn step_frame(width: u32, height: u32, left: u8, right: u8) -> RgbImage {
    RgbImage::from_fn(width, height, |x, _| {
        let value = if x < width / 2 { left } else { right };
        Rgb([value, value, value])
    })
}

#[test]
fn test_medium_contrast_step_produces_edges() -> anyhow::Result<()> {
    let frame = step_frame(80, 80, 90, 160);

    // the smoothed step is strong enough to seed edges on its own
    let blurred = apply_blur(&to_grayscale(&DynamicImage::ImageRgb8(frame.clone())), 5);
    let peak = horizontal_sobel(&blurred)
        .pixels()
        .map(|p| p[0].unsigned_abs())
        .max()
        .unwrap_or(0);
    assert!(peak > 150, "peak = {}", peak);

    let detector = DetectionPipeline::new(DetectorConfig::default())?;
    let edges = detector.edge_map(&frame, 0)?;

    for y in 1..79 {
        let row: Vec<u32> = (0..80).filter(|&x| edges.get_pixel(x, y)[0] == 255).collect();
        assert!(!row.is_empty(), "no edge in row {}", y);
        assert!(row.iter().all(|x| (38..=41).contains(x)), "row {}: {:?}", y, row);
    }
    Ok(())
}

#[test]
fn test_weak_step_stays_below_high_threshold() {
    let gray = to_grayscale(&DynamicImage::ImageRgb8(step_frame(40, 40, 100, 110)));
    let edges = detect_edges(&apply_blur(&gray, 5), 50.0, 150.0);
    assert!(edges.pixels().all(|p| p[0] == 0));
}

#[test]
fn test_grayscale_uses_bt601_weights() {
    let frame = RgbImage::from_fn(3, 1, |x, _| match x {
        0 => Rgb([255, 0, 0]),
        1 => Rgb([0, 255, 0]),
        _ => Rgb([0, 0, 255]),
    });

    let gray = to_grayscale(&DynamicImage::ImageRgb8(frame));

    assert_eq!(gray.get_pixel(0, 0)[0], 76);
    assert_eq!(gray.get_pixel(1, 0)[0], 150);
    assert_eq!(gray.get_pixel(2, 0)[0], 29);
}

#[test]
fn test_tiny_images_have_no_edges() {
    let edges = detect_edges(&GrayImage::from_pixel(2, 5, Luma([200u8])), 50.0, 150.0);
    assert_eq!(edges.dimensions(), (2, 5));
    assert!(edges.pixels().all(|p| p[0] == 0));
}

#[test]
fn test_uniform_frame_has_no_edges_or_objects() -> anyhow::Result<()> {
    let detector = DetectionPipeline::new(DetectorConfig::default())?;

    let detections = detector.detect(&uniform_frame(64, 64, 90), 0)?;

    assert!(detections.edges.pixels().all(|p| p[0] == 0));
    assert_eq!(detections.contour_count, 0);
    assert!(detections.objects.is_empty());
    Ok(())
}

#[test]
fn test_large_square_is_detected_and_small_one_filtered() -> anyhow::Result<()> {
    let frame = frame_with_squares(160, 160, &[(40, 40, 60), (130, 130, 8)]);
    let detector = DetectionPipeline::new(DetectorConfig::default())?;

    let detections = detector.detect(&frame, 0)?;

    assert_eq!(detections.objects.len(), 1);
    let object = &detections.objects[0];
    assert!(object.area >= 400.0);
    assert!((35..=45).contains(&object.x), "x = {}", object.x);
    assert!((35..=45).contains(&object.y), "y = {}", object.y);
    assert!((55..=70).contains(&object.width), "width = {}", object.width);
    assert!((55..=70).contains(&object.height), "height = {}", object.height);
    Ok(())
}

#[test]
fn test_empty_frame_is_rejected() -> anyhow::Result<()> {
    let detector = DetectionPipeline::new(DetectorConfig::default())?;
    assert!(detector.detect(&RgbImage::new(0, 0), 0).is_err());
    Ok(())
}

#[test]
fn test_default_config_values() {
    let config = DetectorConfig::default();
    assert_eq!(config.blur_kernel, 5);
    assert_eq!(config.canny_low, 50.0);
    assert_eq!(config.canny_high, 150.0);
    assert_eq!(config.min_area, 400.0);
}

#[test]
fn test_invalid_config_is_rejected() {
    assert!(DetectionPipeline::new(DetectorConfig::new().with_blur_kernel(4)).is_err());
    assert!(DetectionPipeline::new(DetectorConfig::new().with_blur_kernel(0)).is_err());
    assert!(DetectionPipeline::new(DetectorConfig::new().with_canny_thresholds(200.0, 100.0)).is_err());
    assert!(DetectionPipeline::new(DetectorConfig::new().with_min_area(-1.0)).is_err());
    assert!(DetectionPipeline::new(DetectorConfig::new().with_min_area(f64::NAN)).is_err());
}
