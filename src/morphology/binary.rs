//! Binary erosion and dilation with a square structuring element, plus the
//! compositions built on top of them.
//!
//! Kernel radius is `⌊(k − 1) / 2⌋`. Samples outside the raster are skipped,
//! so the frame is not eroded just for touching the border. Any non-zero
//! sample counts as foreground and outputs are `{0, 255}`. Each iteration
//! reads the previous buffer and writes a fresh one.
use crate::raster::{GrayImage, FOREGROUND};

#[inline]
fn kernel_radius(kernel_size: usize) -> usize {
    kernel_size.saturating_sub(1) / 2
}

#[derive(Clone, Copy)]
enum WindowRule {
    /// every sample is non-zero
    All,
    /// at least one sample is non-zero
    Any,
}

/// One pass of a square-window rule over `src`.
fn window_pass(src: &GrayImage, r: usize, rule: WindowRule) -> GrayImage {
    let (w, h) = (src.w, src.h);
    let mut out = GrayImage::new(w, h);
    for y in 0..h {
        let y0 = y.saturating_sub(r);
        let y1 = (y + r).min(h - 1);
        for x in 0..w {
            let x0 = x.saturating_sub(r);
            let x1 = (x + r).min(w - 1);
            let mut window = (y0..=y1).flat_map(|yy| src.data[yy * w + x0..=yy * w + x1].iter());
            let hit = match rule {
                WindowRule::All => window.all(|&v| v != 0),
                WindowRule::Any => window.any(|&v| v != 0),
            };
            if hit {
                out.data[y * w + x] = FOREGROUND;
            }
        }
    }
    out
}

/// Foreground survives only where the whole in-raster window is foreground.
pub fn erode(mask: &GrayImage, kernel_size: usize, iterations: usize) -> GrayImage {
    let r = kernel_radius(kernel_size);
    let mut current = mask.clone();
    for _ in 0..iterations {
        current = window_pass(&current, r, WindowRule::All);
    }
    current
}

/// Foreground wherever any in-raster window pixel is non-zero.
pub fn dilate(mask: &GrayImage, kernel_size: usize, iterations: usize) -> GrayImage {
    let r = kernel_radius(kernel_size);
    let mut current = mask.clone();
    for _ in 0..iterations {
        current = window_pass(&current, r, WindowRule::Any);
    }
    current
}

/// Erosion followed by dilation; removes specks smaller than the kernel.
pub fn opening(mask: &GrayImage, kernel_size: usize, iterations: usize) -> GrayImage {
    dilate(&erode(mask, kernel_size, iterations), kernel_size, iterations)
}

/// Dilation followed by erosion; fills gaps smaller than the kernel.
pub fn closing(mask: &GrayImage, kernel_size: usize, iterations: usize) -> GrayImage {
    erode(&dilate(mask, kernel_size, iterations), kernel_size, iterations)
}

fn saturating_diff(a: &GrayImage, b: &GrayImage) -> GrayImage {
    GrayImage {
        w: a.w,
        h: a.h,
        data: a.data.iter().zip(&b.data).map(|(&x, &y)| x.saturating_sub(y)).collect(),
    }
}

/// Dilation minus erosion (single iteration): a band around each boundary.
pub fn morphological_gradient(mask: &GrayImage, kernel_size: usize) -> GrayImage {
    saturating_diff(&dilate(mask, kernel_size, 1), &erode(mask, kernel_size, 1))
}

/// `mask − opening(mask)`: bright detail narrower than the kernel.
pub fn top_hat(mask: &GrayImage, kernel_size: usize) -> GrayImage {
    saturating_diff(mask, &opening(mask, kernel_size, 1))
}

/// `closing(mask) − mask`: dark gaps narrower than the kernel.
pub fn black_hat(mask: &GrayImage, kernel_size: usize) -> GrayImage {
    saturating_diff(&closing(mask, kernel_size, 1), mask)
}
