use image::{DynamicImage, GrayImage, ImageBuffer, Luma, Rgb};
use imageproc::filter::separable_filter_equal;
use imageproc::gradients::{horizontal_sobel, vertical_sobel};

type Magnitudes = ImageBuffer<Luma<f32>, Vec<f32>>;
type Gradient = ImageBuffer<Luma<i16>, Vec<i16>>;

/// Convert image to grayscale with BT.601 luma weights
pub fn to_grayscale(img: &DynamicImage) -> GrayImage {
    let rgb = img.to_rgb8();
    GrayImage::from_fn(rgb.width(), rgb.height(), |x, y| {
        Luma([luma(*rgb.get_pixel(x, y))])
    })
}

fn luma(Rgb([r, g, b]): Rgb<u8>) -> u8 {
    let value = 0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32;
    value.round().clamp(0.0, 255.0) as u8
}

/// Standard deviation used for a Gaussian kernel of the given size
pub fn gaussian_sigma(kernel_size: u32) -> f32 {
    0.3 * ((kernel_size as f32 - 1.0) * 0.5 - 1.0) + 0.8
}

/// Normalized 1D Gaussian weights of length `kernel_size`
pub fn gaussian_kernel(kernel_size: u32) -> Vec<f32> {
    let sigma = gaussian_sigma(kernel_size);
    let half = (kernel_size / 2) as i32;
    let weights: Vec<f32> = (-half..=half)
        .map(|i| (-((i * i) as f32) / (2.0 * sigma * sigma)).exp())
        .collect();
    let sum: f32 = weights.iter().sum();
    weights.into_iter().map(|w| w / sum).collect()
}

/// Apply a `kernel_size` x `kernel_size` Gaussian blur to reduce noise
pub fn apply_blur(img: &GrayImage, kernel_size: u32) -> GrayImage {
    let kernel = gaussian_kernel(kernel_size);
    separable_filter_equal(img, &kernel)
}

/// Canny edge detection on an image that is already smoothed.
///
/// Gradient strength is `|dx| + |dy|` of the 3x3 Sobel responses. Edge
/// pixels are 255, everything else 0. The one-pixel border is never an edge.
pub fn detect_edges(img: &GrayImage, low_threshold: f32, high_threshold: f32) -> GrayImage {
    let (width, height) = img.dimensions();
    if width < 3 || height < 3 {
        return GrayImage::new(width, height);
    }

    let gx = horizontal_sobel(img);
    let gy = vertical_sobel(img);
    let magnitude = Magnitudes::from_fn(width, height, |x, y| {
        let dx = gx.get_pixel(x, y)[0] as f32;
        let dy = gy.get_pixel(x, y)[0] as f32;
        Luma([dx.abs() + dy.abs()])
    });

    let thinned = non_maximum_suppression(&magnitude, &gx, &gy);
    hysteresis(&thinned, low_threshold, high_threshold)
}

/// Keep only pixels that are at least as strong as both neighbours along
/// the gradient direction
fn non_maximum_suppression(magnitude: &Magnitudes, gx: &Gradient, gy: &Gradient) -> Magnitudes {
    let (width, height) = magnitude.dimensions();
    let mut out = Magnitudes::new(width, height);

    for y in 1..height - 1 {
        for x in 1..width - 1 {
            let strength = magnitude.get_pixel(x, y)[0];
            if strength == 0.0 {
                continue;
            }

            let dx = gx.get_pixel(x, y)[0] as f32;
            let dy = gy.get_pixel(x, y)[0] as f32;
            let mut angle = dy.atan2(dx).to_degrees();
            if angle < 0.0 {
                angle += 180.0;
            }

            let ((x1, y1), (x2, y2)) = if !(22.5..157.5).contains(&angle) {
                ((x - 1, y), (x + 1, y))
            } else if angle < 67.5 {
                ((x - 1, y - 1), (x + 1, y + 1))
            } else if angle < 112.5 {
                ((x, y - 1), (x, y + 1))
            } else {
                ((x + 1, y - 1), (x - 1, y + 1))
            };

            if strength >= magnitude.get_pixel(x1, y1)[0]
                && strength >= magnitude.get_pixel(x2, y2)[0]
            {
                out.put_pixel(x, y, Luma([strength]));
            }
        }
    }
    out
}

/// Seed edges above `high` and grow them through 8-connected pixels above `low`
fn hysteresis(thinned: &Magnitudes, low: f32, high: f32) -> GrayImage {
    let (width, height) = thinned.dimensions();
    let mut out = GrayImage::new(width, height);
    let mut stack = Vec::new();

    for y in 1..height - 1 {
        for x in 1..width - 1 {
            if thinned.get_pixel(x, y)[0] <= high || out.get_pixel(x, y)[0] != 0 {
                continue;
            }
            out.put_pixel(x, y, Luma([255]));
            stack.push((x, y));

            while let Some((cx, cy)) = stack.pop() {
                for ny in cy - 1..=cy + 1 {
                    for nx in cx - 1..=cx + 1 {
                        if nx == 0 || ny == 0 || nx == width - 1 || ny == height - 1 {
                            continue;
                        }
                        if out.get_pixel(nx, ny)[0] == 0 && thinned.get_pixel(nx, ny)[0] > low {
                            out.put_pixel(nx, ny, Luma([255]));
                            stack.push((nx, ny));
                        }
                    }
                }
            }
        }
    }
    out
}
