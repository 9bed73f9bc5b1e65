//! Two-pass chamfer distance transform.
//!
//! Background pixels are fixed at 0 and foreground starts at [`UNREACHED`].
//! The forward pass pulls from W, N (cost 1) and NW, NE (cost √2); the
//! backward pass mirrors it with E, S, SE, SW. A foreground raster with no
//! background pixel keeps the sentinel everywhere.
use crate::raster::{GrayImage, ImageF32};
use std::f32::consts::SQRT_2;

/// Initial distance for foreground pixels.
pub const UNREACHED: f32 = 1e8;

pub fn distance_transform(mask: &GrayImage) -> ImageF32 {
    let (w, h) = (mask.w, mask.h);
    let mut dist = mask.map(|&v| if v == 0 { 0.0 } else { UNREACHED });

    for y in 0..h {
        for x in 0..w {
            let i = y * w + x;
            if dist.data[i] == 0.0 {
                continue;
            }
            let mut v = dist.data[i];
            if x > 0 {
                v = v.min(dist.data[i - 1] + 1.0);
            }
            if y > 0 {
                v = v.min(dist.data[i - w] + 1.0);
                if x > 0 {
                    v = v.min(dist.data[i - w - 1] + SQRT_2);
                }
                if x + 1 < w {
                    v = v.min(dist.data[i - w + 1] + SQRT_2);
                }
            }
            dist.data[i] = v;
        }
    }

    for y in (0..h).rev() {
        for x in (0..w).rev() {
            let i = y * w + x;
            if dist.data[i] == 0.0 {
                continue;
            }
            let mut v = dist.data[i];
            if x + 1 < w {
                v = v.min(dist.data[i + 1] + 1.0);
            }
            if y + 1 < h {
                v = v.min(dist.data[i + w] + 1.0);
                if x + 1 < w {
                    v = v.min(dist.data[i + w + 1] + SQRT_2);
                }
                if x > 0 {
                    v = v.min(dist.data[i + w - 1] + SQRT_2);
                }
            }
            dist.data[i] = v;
        }
    }
    dist
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::FOREGROUND;

    #[test]
    fn distances_grow_towards_the_centre() {
        let mut m = GrayImage::new(9, 9);
        for y in 1..8 {
            for x in 1..8 {
                m.set(x, y, FOREGROUND);
            }
        }
        let d = distance_transform(&m);
        assert_eq!(d.get(0, 0), 0.0);
        assert_eq!(d.get(1, 4), 1.0);
        assert_eq!(d.get(2, 4), 2.0);
        assert_eq!(d.get(4, 4), 4.0);
        assert_eq!(d.max_value(), 4.0);
    }

    #[test]
    fn diagonal_steps_cost_sqrt_two() {
        // A single background pixel in the corner.
        let mut m = GrayImage::filled(3, 3, FOREGROUND);
        m.set(0, 0, 0);
        let d = distance_transform(&m);
        assert!((d.get(1, 1) - SQRT_2).abs() < 1e-6);
        assert_eq!(d.get(2, 0), 2.0);
        assert!((d.get(2, 2) - 2.0 * SQRT_2).abs() < 1e-5);
    }

    #[test]
    fn all_foreground_keeps_sentinel() {
        let d = distance_transform(&GrayImage::filled(4, 2, FOREGROUND));
        assert!(d.data.iter().all(|&v| v == UNREACHED));
        assert!(distance_transform(&GrayImage::empty()).is_empty());
    }
}
