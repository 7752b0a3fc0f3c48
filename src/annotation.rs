//! Overlay drawing for ranked detections.
//!
//! Drawing happens in two phases: [`plan_overlays`] resolves every rectangle,
//! centroid, label and color from the ranking alone, and [`Annotator`] renders
//! those plans onto a frame. The plan is pure data, so rank coloring and label
//! text can be checked without looking at pixels.

use crate::models::DetectedObject;

use ab_glyph::{Font, FontVec, PxScale, ScaleFont};
use anyhow::{Context, Result};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_hollow_rect_mut, draw_text_mut};
use imageproc::rect::Rect;
use std::path::Path;
use tracing::{debug, warn};

/// Box and label color of the largest object
pub const HIGHLIGHT_COLOR: Rgb<u8> = Rgb([120, 220, 80]);

/// Box and label color of every other object
pub const NEUTRAL_COLOR: Rgb<u8> = Rgb([180, 180, 180]);

pub const CENTROID_COLOR: Rgb<u8> = Rgb([255, 180, 90]);

pub const BOX_THICKNESS: i32 = 2;

pub const CENTROID_RADIUS: i32 = 4;

/// Distance between the label baseline and the top of the box
pub const LABEL_OFFSET: i32 = 8;

/// Label glyph height in pixels
const FONT_SCALE: f32 = 14.0;

const SYSTEM_FONT_PATHS: [&str; 5] = [
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// Everything needed to draw one ranked object.
#[derive(Debug, Clone, PartialEq)]
pub struct Overlay {
    /// 0-based position in the ranking
    pub rank: usize,
    pub rect: Rect,
    pub center: (i32, i32),
    pub label: String,
    /// Left end of the label baseline
    pub label_anchor: (i32, i32),
    pub color: Rgb<u8>,
}

pub fn color_for_rank(rank: usize) -> Rgb<u8> {
    if rank == 0 {
        HIGHLIGHT_COLOR
    } else {
        NEUTRAL_COLOR
    }
}

/// Label text such as `#1 area=900`. The area is truncated, not rounded.
pub fn label_for(rank: usize, object: &DetectedObject) -> String {
    format!("#{} area={}", rank + 1, object.area as i64)
}

/// Resolve the drawing plan for a ranking, in rank order
pub fn plan_overlays(objects: &[DetectedObject]) -> Vec<Overlay> {
    objects
        .iter()
        .enumerate()
        .map(|(rank, object)| Overlay {
            rank,
            rect: object.rect(),
            center: object.center(),
            label: label_for(rank, object),
            label_anchor: (object.x, object.y - LABEL_OFFSET),
            color: color_for_rank(rank),
        })
        .collect()
}

/// Renders overlay plans onto color frames.
///
/// Labels need a font. Without one, boxes and centroids are still drawn and
/// labels are skipped.
pub struct Annotator {
    font: Option<FontVec>,
}

impl Default for Annotator {
    fn default() -> Self {
        Self::new()
    }
}

impl Annotator {
    /// Annotator without a font
    pub fn new() -> Self {
        Self { font: None }
    }

    pub fn with_font(font: FontVec) -> Self {
        Self { font: Some(font) }
    }

    /// Load the label font from a TrueType/OpenType file.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or is not a font.
    pub fn with_font_path(font_path: &Path) -> Result<Self> {
        let font_data = std::fs::read(font_path)
            .with_context(|| format!("Failed to read font file {}", font_path.display()))?;
        let font = FontVec::try_from_vec(font_data)
            .map_err(|_| anyhow::anyhow!("Failed to parse font file {}", font_path.display()))?;
        Ok(Self::with_font(font))
    }

    /// Try a few well-known system font locations, falling back to no font.
    pub fn with_system_font() -> Self {
        for path in SYSTEM_FONT_PATHS {
            if let Ok(font_data) = std::fs::read(path) {
                if let Ok(font) = FontVec::try_from_vec(font_data) {
                    debug!(font = path, "loaded label font");
                    return Self::with_font(font);
                }
            }
        }

        warn!("No system font found, labels will not be drawn");
        Self::new()
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    /// Draw the ranking onto `frame` and return how many objects were drawn.
    /// An empty ranking leaves the frame untouched.
    pub fn annotate(&self, frame: &mut RgbImage, objects: &[DetectedObject]) -> usize {
        let overlays = plan_overlays(objects);
        for overlay in &overlays {
            self.draw_overlay(frame, overlay);
        }
        overlays.len()
    }

    fn draw_overlay(&self, frame: &mut RgbImage, overlay: &Overlay) {
        let rect = overlay.rect;
        // the outline runs through (x, y) and (x + w, y + h), both inclusive
        for thickness in 0..BOX_THICKNESS {
            let thick_rect = Rect::at(rect.left() - thickness, rect.top() - thickness).of_size(
                rect.width() + 1 + (2 * thickness) as u32,
                rect.height() + 1 + (2 * thickness) as u32,
            );
            draw_hollow_rect_mut(frame, thick_rect, overlay.color);
        }

        draw_filled_circle_mut(frame, overlay.center, CENTROID_RADIUS, CENTROID_COLOR);

        let Some(font) = &self.font else { return };
        let scale = PxScale::from(FONT_SCALE);
        let ascent = font.as_scaled(scale).ascent().round() as i32;
        let (x, baseline) = overlay.label_anchor;

        // draw_text_mut positions by the top of the line box
        draw_text_mut(
            frame,
            overlay.color,
            x,
            baseline - ascent,
            scale,
            font,
            &overlay.label,
        );
    }
}
