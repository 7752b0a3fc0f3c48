use imageproc::rect::Rect;

/// A candidate object found in a single frame.
///
/// `area` is the polygon area of the contour the object came from, so it is
/// usually smaller than `width * height`.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectedObject {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
    pub area: f64,
}

impl DetectedObject {
    pub fn new(x: i32, y: i32, width: u32, height: u32, area: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
            area,
        }
    }

    /// Box center, truncated toward the top-left for odd sizes
    pub fn center(&self) -> (i32, i32) {
        (
            self.x + (self.width / 2) as i32,
            self.y + (self.height / 2) as i32,
        )
    }

    pub fn box_area(&self) -> u32 {
        self.width * self.height
    }

    /// How much of the bounding box the contour covers
    pub fn fill_ratio(&self) -> f64 {
        let box_area = self.box_area();
        if box_area == 0 {
            return 0.0;
        }
        self.area / box_area as f64
    }

    /// Bounding box as a drawable rectangle. Degenerate sizes are bumped to 1px.
    pub fn rect(&self) -> Rect {
        Rect::at(self.x, self.y).of_size(self.width.max(1), self.height.max(1))
    }
}
