//! Interior 3×3 Sobel gradients on an 8-bit raster.
//!
//! Only pixels with a full 3×3 neighbourhood are evaluated; the 1-pixel frame
//! keeps `gx = gy = mag = 0`.
use crate::raster::{GrayImage, ImageF32, RasterView, RasterViewMut, FOREGROUND};

type Kernel3 = [[f32; 3]; 3];

const SOBEL_KERNEL_X: Kernel3 = [[-1.0, 0.0, 1.0], [-2.0, 0.0, 2.0], [-1.0, 0.0, 1.0]];
const SOBEL_KERNEL_Y: Kernel3 = [[-1.0, -2.0, -1.0], [0.0, 0.0, 0.0], [1.0, 2.0, 1.0]];

/// Per-pixel gradient buffers.
#[derive(Clone, Debug)]
pub struct Grad {
    /// Horizontal derivative
    pub gx: ImageF32,
    /// Vertical derivative
    pub gy: ImageF32,
    /// Euclidean magnitude `sqrt(gx² + gy²)`
    pub mag: ImageF32,
}

impl Grad {
    /// Gradient direction `atan2(gy, gx)` in degrees, range (−180, 180].
    #[inline]
    pub fn direction_deg(&self, x: usize, y: usize) -> f32 {
        self.gy.get(x, y).atan2(self.gx.get(x, y)).to_degrees()
    }
}

/// Compute Sobel gradients over the interior of `gray`.
pub fn sobel_gradients(gray: &GrayImage) -> Grad {
    let (w, h) = (gray.w, gray.h);
    let mut gx = ImageF32::new(w, h);
    let mut gy = ImageF32::new(w, h);
    let mut mag = ImageF32::new(w, h);

    if w < 3 || h < 3 {
        return Grad { gx, gy, mag };
    }

    for y in 1..h - 1 {
        let rows = [gray.row(y - 1), gray.row(y), gray.row(y + 1)];
        let out_gx = gx.row_mut(y);
        for x in 1..w - 1 {
            let mut sum_x = 0.0;
            for (ky, src) in rows.iter().enumerate() {
                let k = &SOBEL_KERNEL_X[ky];
                sum_x += src[x - 1] as f32 * k[0] + src[x] as f32 * k[1] + src[x + 1] as f32 * k[2];
            }
            out_gx[x] = sum_x;
        }
        let out_gy = gy.row_mut(y);
        for x in 1..w - 1 {
            let mut sum_y = 0.0;
            for (ky, src) in rows.iter().enumerate() {
                let k = &SOBEL_KERNEL_Y[ky];
                sum_y += src[x - 1] as f32 * k[0] + src[x] as f32 * k[1] + src[x + 1] as f32 * k[2];
            }
            out_gy[x] = sum_y;
        }
        let (row_gx, row_gy) = (gx.row(y), gy.row(y));
        let out_mag = mag.row_mut(y);
        for x in 1..w - 1 {
            out_mag[x] = (row_gx[x] * row_gx[x] + row_gy[x] * row_gy[x]).sqrt();
        }
    }

    Grad { gx, gy, mag }
}

/// Plain Sobel edge map: interior magnitude `> threshold → 255`.
pub fn sobel_edges(gray: &GrayImage, threshold: f32) -> GrayImage {
    sobel_gradients(gray)
        .mag
        .map(|&m| if m > threshold { FOREGROUND } else { 0 })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertical_step_produces_horizontal_gradient() {
        let mut img = GrayImage::new(6, 5);
        for y in 0..5 {
            for x in 3..6 {
                img.set(x, y, 100);
            }
        }
        let g = sobel_gradients(&img);
        assert_eq!(g.gx.get(2, 2), 400.0);
        assert_eq!(g.gy.get(2, 2), 0.0);
        assert_eq!(g.mag.get(3, 2), 400.0);
        assert!(g.direction_deg(2, 2).abs() < 1e-6);
        // frame untouched
        assert_eq!(g.mag.get(0, 2), 0.0);
        assert_eq!(g.mag.get(5, 2), 0.0);
    }

    #[test]
    fn sobel_edges_marks_both_sides_of_step() {
        let mut img = GrayImage::new(8, 4);
        for y in 0..4 {
            for x in 4..8 {
                img.set(x, y, 60);
            }
        }
        let edges = sobel_edges(&img, 100.0);
        assert_eq!(edges.row(1), &[0, 0, 0, 255, 255, 0, 0, 0]);
        assert_eq!(edges.row(0), &[0; 8]);
    }

    #[test]
    fn tiny_rasters_have_zero_gradient() {
        let img = GrayImage::filled(2, 9, 50);
        let g = sobel_gradients(&img);
        assert!(g.mag.data.iter().all(|&m| m == 0.0));
    }
}
