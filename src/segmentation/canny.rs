//! Canny edge detection: blur, Sobel, non-maximum suppression, hysteresis.
//!
//! Hysteresis runs as one top-to-bottom sweep over the interior: a weak pixel
//! is promoted iff one of its 8 neighbours is already strong at the time it
//! is visited. Chains of weak pixels are therefore only partially recovered.
use super::grad::{sobel_gradients, Grad};
use crate::preprocess::Kernel2D;
use crate::raster::{GrayImage, ImageF32, FOREGROUND};

/// Intermediate label for pixels between the low and high thresholds.
pub const WEAK: u8 = 128;

/// Canny thresholds applied to the suppressed gradient magnitude.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CannyParams {
    pub low: f32,
    pub high: f32,
}

impl Default for CannyParams {
    fn default() -> Self {
        Self {
            low: 50.0,
            high: 150.0,
        }
    }
}

/// Full Canny chain producing a `{0, 255}` edge mask.
pub fn canny_edges(gray: &GrayImage, params: CannyParams) -> GrayImage {
    let blurred = Kernel2D::canny_5x5().convolve(gray);
    let grad = sobel_gradients(&blurred);
    let suppressed = non_max_suppression(&grad);
    let mut edges = double_threshold(&suppressed, params.low, params.high);
    hysteresis_sweep(&mut edges);
    log::debug!(
        "canny_edges low={} high={} edges={}",
        params.low,
        params.high,
        edges.foreground_count()
    );
    edges
}

/// Keep interior magnitudes that are not smaller than either neighbour along
/// the gradient direction (quantized to 0°/45°/90°/135°).
pub fn non_max_suppression(grad: &Grad) -> ImageF32 {
    let (w, h) = (grad.mag.w, grad.mag.h);
    let mut out = ImageF32::new(w, h);
    if w < 3 || h < 3 {
        return out;
    }
    for y in 1..h - 1 {
        for x in 1..w - 1 {
            let mag = grad.mag.get(x, y);
            let mut angle_deg = grad.direction_deg(x, y);
            if angle_deg < 0.0 {
                angle_deg += 180.0;
            }

            let ((qx, qy), (rx, ry)) = if !(22.5..157.5).contains(&angle_deg) {
                ((x + 1, y), (x - 1, y))
            } else if angle_deg < 67.5 {
                ((x + 1, y - 1), (x - 1, y + 1))
            } else if angle_deg < 112.5 {
                ((x, y - 1), (x, y + 1))
            } else {
                ((x - 1, y - 1), (x + 1, y + 1))
            };

            if mag >= grad.mag.get(qx, qy) && mag >= grad.mag.get(rx, ry) {
                out.set(x, y, mag);
            }
        }
    }
    out
}

/// Classify magnitudes into strong (`255`), weak ([`WEAK`]) and none (`0`).
pub fn double_threshold(suppressed: &ImageF32, low: f32, high: f32) -> GrayImage {
    suppressed.map(|&m| {
        if m >= high {
            FOREGROUND
        } else if m >= low {
            WEAK
        } else {
            0
        }
    })
}

/// Single in-place pass resolving every interior weak pixel to 0 or 255.
pub fn hysteresis_sweep(edges: &mut GrayImage) {
    let (w, h) = (edges.w, edges.h);
    if w < 3 || h < 3 {
        return;
    }
    for y in 1..h - 1 {
        for x in 1..w - 1 {
            if edges.get(x, y) != WEAK {
                continue;
            }
            let strong = (y - 1..=y + 1)
                .any(|ny| (x - 1..=x + 1).any(|nx| edges.get(nx, ny) == FOREGROUND));
            edges.set(x, y, if strong { FOREGROUND } else { 0 });
        }
    }
}
