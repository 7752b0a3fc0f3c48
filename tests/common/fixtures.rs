use edgespot::{CaptureError, DisplayError, DisplaySink, FrameSource};
use image::{DynamicImage, GrayImage, Luma, Rgb, RgbImage};
use imageproc::point::Point;
use imageproc::rect::Rect;
use std::collections::VecDeque;

/// Axis-aligned rectangle polygon whose shoelace area is `width * height`
pub fn rect_polygon(x: i32, y: i32, width: i32, height: i32) -> Vec<Point<i32>> {
    vec![
        Point::new(x, y),
        Point::new(x + width, y),
        Point::new(x + width, y + height),
        Point::new(x, y + height),
    ]
}

/// Black edge map with one-pixel outlines drawn for every rect
pub fn edge_map_with_outlines(width: u32, height: u32, rects: &[Rect]) -> GrayImage {
    let mut edges = GrayImage::new(width, height);
    for rect in rects {
        imageproc::drawing::draw_hollow_rect_mut(&mut edges, *rect, Luma([255u8]));
    }
    edges
}

/// Flat color frame
pub fn uniform_frame(width: u32, height: u32, value: u8) -> RgbImage {
    RgbImage::from_pixel(width, height, Rgb([value, value, value]))
}

/// Black frame with filled white squares at (x, y, side)
pub fn frame_with_squares(width: u32, height: u32, squares: &[(i32, i32, u32)]) -> RgbImage {
    let mut frame = uniform_frame(width, height, 0);
    for &(x, y, side) in squares {
        imageproc::drawing::draw_filled_rect_mut(
            &mut frame,
            Rect::at(x, y).of_size(side, side),
            Rgb([255, 255, 255]),
        );
    }
    frame
}

/// In-memory frame source; can be told to fail after its frames run out
pub struct VecSource {
    pub frames: VecDeque<RgbImage>,
    pub fail_when_empty: bool,
    pub reads: usize,
    pub released: bool,
}

impl VecSource {
    pub fn new(frames: Vec<RgbImage>) -> Self {
        Self {
            frames: frames.into(),
            fail_when_empty: false,
            reads: 0,
            released: false,
        }
    }

    pub fn failing_after(frames: Vec<RgbImage>) -> Self {
        Self {
            fail_when_empty: true,
            ..Self::new(frames)
        }
    }
}

impl FrameSource for VecSource {
    fn read_frame(&mut self) -> Result<Option<RgbImage>, CaptureError> {
        self.reads += 1;
        match self.frames.pop_front() {
            Some(frame) => Ok(Some(frame)),
            None if self.fail_when_empty => Err(CaptureError::Read("device unplugged".into())),
            None => Ok(None),
        }
    }

    fn describe(&self) -> String {
        "in-memory frames".to_string()
    }

    fn release(&mut self) {
        self.released = true;
    }
}

/// Sink that remembers what it was shown
#[derive(Default)]
pub struct RecordingSink {
    pub shown: Vec<(String, u64, DynamicImage)>,
    /// Report a quit request after this many polls
    pub quit_after_polls: Option<usize>,
    pub fail_show: bool,
    pub polls: usize,
    pub closed: bool,
}

impl DisplaySink for RecordingSink {
    fn show(
        &mut self,
        view: &str,
        frame_index: u64,
        image: &DynamicImage,
    ) -> Result<(), DisplayError> {
        if self.fail_show {
            return Err(DisplayError::Backend("window vanished".into()));
        }
        self.shown.push((view.to_string(), frame_index, image.clone()));
        Ok(())
    }

    fn poll_quit(&mut self) -> Result<bool, DisplayError> {
        self.polls += 1;
        Ok(self.quit_after_polls.is_some_and(|n| self.polls >= n))
    }

    fn close(&mut self) -> Result<(), DisplayError> {
        self.closed = true;
        Ok(())
    }
}
