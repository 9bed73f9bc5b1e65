use fracture_detector::raster::{GrayImage, FOREGROUND};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Axis-aligned rectangle `[x0, x1) × [y0, y1)`.
#[derive(Clone, Copy, Debug)]
pub struct Rect {
    pub x0: usize,
    pub y0: usize,
    pub x1: usize,
    pub y1: usize,
}

impl Rect {
    pub fn square(x0: usize, y0: usize, side: usize) -> Self {
        Self {
            x0,
            y0,
            x1: x0 + side,
            y1: y0 + side,
        }
    }
}

/// Gray buffer with `background` everywhere and `value` inside each rect.
pub fn rects_u8(width: usize, height: usize, background: u8, rects: &[Rect], value: u8) -> Vec<u8> {
    assert!(width > 0 && height > 0, "image dimensions must be positive");
    let mut img = vec![background; width * height];
    for r in rects {
        assert!(r.x1 <= width && r.y1 <= height, "rect {r:?} outside image");
        for y in r.y0..r.y1 {
            img[y * width + r.x0..y * width + r.x1].fill(value);
        }
    }
    img
}

/// Binary mask with the given filled rectangles.
pub fn rects_mask(width: usize, height: usize, rects: &[Rect]) -> GrayImage {
    let data = rects_u8(width, height, 0, rects, FOREGROUND);
    GrayImage::from_vec(width, height, data).expect("buffer matches dimensions")
}

/// Two-population image: left half around `low`, right half around `high`,
/// each jittered by up to `±spread`. Deterministic for a given `seed`.
pub fn bimodal_u8(
    width: usize,
    height: usize,
    low: u8,
    high: u8,
    spread: u8,
    seed: u64,
) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(seed);
    let spread = i32::from(spread);
    let mut img = vec![0u8; width * height];
    for y in 0..height {
        for x in 0..width {
            let base = i32::from(if x < width / 2 { low } else { high });
            let jitter = rng.gen_range(-spread..=spread);
            img[y * width + x] = (base + jitter).clamp(0, 255) as u8;
        }
    }
    img
}

/// Expand a gray buffer to opaque RGBA.
pub fn gray_to_rgba(gray: &[u8]) -> Vec<u8> {
    gray.iter().flat_map(|&v| [v, v, v, 255]).collect()
}
