//! Smoothing filters: median, Gaussian and bilateral.
//!
//! Border handling: the median window is truncated to pixels inside the
//! raster; Gaussian and bilateral filters clamp sample coordinates to the
//! nearest valid pixel (replicate).
use crate::raster::GrayImage;

/// Normalised square convolution kernel of side `2 * radius + 1`.
#[derive(Clone, Debug, PartialEq)]
pub struct Kernel2D {
    radius: usize,
    weights: Vec<f32>,
}

impl Kernel2D {
    /// Isotropic Gaussian `exp(-(x² + y²) / 2σ²)`, normalised.
    pub fn gaussian(radius: usize, sigma: f32) -> Self {
        let size = 2 * radius + 1;
        let sigma = sigma.max(f32::EPSILON);
        let denom = 2.0 * sigma * sigma;
        let r = radius as isize;
        let mut weights = Vec::with_capacity(size * size);
        for y in -r..=r {
            for x in -r..=r {
                weights.push((-((x * x + y * y) as f32) / denom).exp());
            }
        }
        let sum: f32 = weights.iter().sum();
        for w in &mut weights {
            *w /= sum;
        }
        Self { radius, weights }
    }

    /// Integer 5×5 Gaussian approximation (weights sum to 159) used ahead of
    /// Canny gradient estimation.
    pub fn canny_5x5() -> Self {
        const WEIGHTS: [f32; 25] = [
            2.0, 4.0, 5.0, 4.0, 2.0, //
            4.0, 9.0, 12.0, 9.0, 4.0, //
            5.0, 12.0, 15.0, 12.0, 5.0, //
            4.0, 9.0, 12.0, 9.0, 4.0, //
            2.0, 4.0, 5.0, 4.0, 2.0,
        ];
        let sum: f32 = WEIGHTS.iter().sum();
        Self {
            radius: 2,
            weights: WEIGHTS.iter().map(|w| w / sum).collect(),
        }
    }

    /// Convolve with clamp-to-edge borders, truncating the result to `u8`.
    pub fn convolve(&self, gray: &GrayImage) -> GrayImage {
        let (w, h) = (gray.w, gray.h);
        let mut out = GrayImage::new(w, h);
        if gray.is_empty() {
            return out;
        }
        let r = self.radius as isize;
        let size = 2 * self.radius + 1;
        for y in 0..h {
            for x in 0..w {
                let mut acc = 0.0f32;
                for ky in -r..=r {
                    let row = &self.weights[(ky + r) as usize * size..][..size];
                    for (kx, &weight) in (-r..=r).zip(row) {
                        let sample = gray.get_clamped(x as isize + kx, y as isize + ky);
                        acc += sample as f32 * weight;
                    }
                }
                out.data[y * w + x] = acc.clamp(0.0, 255.0) as u8;
            }
        }
        out
    }
}

/// Median over a `(2r + 1)²` window truncated at the raster edge.
///
/// For even-sized truncated windows the upper median (`sorted[n / 2]`) is used.
pub fn median_blur(gray: &GrayImage, radius: usize) -> GrayImage {
    let (w, h) = (gray.w, gray.h);
    let mut out = GrayImage::new(w, h);
    let size = 2 * radius + 1;
    let mut window = Vec::with_capacity(size * size);
    for y in 0..h {
        let y0 = y.saturating_sub(radius);
        let y1 = (y + radius).min(h - 1);
        for x in 0..w {
            let x0 = x.saturating_sub(radius);
            let x1 = (x + radius).min(w - 1);
            window.clear();
            for yy in y0..=y1 {
                window.extend_from_slice(&gray.data[yy * w + x0..=yy * w + x1]);
            }
            window.sort_unstable();
            out.data[y * w + x] = window[window.len() / 2];
        }
    }
    out
}

/// Gaussian blur with a `(2r + 1)²` kernel of standard deviation `sigma`.
pub fn gaussian_blur(gray: &GrayImage, radius: usize, sigma: f32) -> GrayImage {
    Kernel2D::gaussian(radius, sigma).convolve(gray)
}

/// Edge-preserving bilateral filter.
///
/// Each neighbour is weighted by `exp(-d² / 2σs²) · exp(-Δ² / 2σc²)` where
/// `d` is the spatial offset and `Δ` the intensity difference to the centre.
pub fn bilateral_filter(
    gray: &GrayImage,
    radius: usize,
    sigma_space: f32,
    sigma_color: f32,
) -> GrayImage {
    let (w, h) = (gray.w, gray.h);
    let mut out = GrayImage::new(w, h);
    if gray.is_empty() {
        return out;
    }
    let space_denom = 2.0 * sigma_space.max(f32::EPSILON).powi(2);
    let color_denom = 2.0 * sigma_color.max(f32::EPSILON).powi(2);
    let r = radius as isize;

    let size = 2 * radius + 1;
    let mut spatial = Vec::with_capacity(size * size);
    for ky in -r..=r {
        for kx in -r..=r {
            spatial.push((-((kx * kx + ky * ky) as f32) / space_denom).exp());
        }
    }

    for y in 0..h {
        for x in 0..w {
            let center = gray.get(x, y) as f32;
            let mut sum = 0.0f32;
            let mut norm = 0.0f32;
            let mut k = 0;
            for ky in -r..=r {
                for kx in -r..=r {
                    let val = gray.get_clamped(x as isize + kx, y as isize + ky) as f32;
                    let diff = val - center;
                    let weight = spatial[k] * (-(diff * diff) / color_denom).exp();
                    sum += val * weight;
                    norm += weight;
                    k += 1;
                }
            }
            // The centre sample always contributes weight 1.
            out.data[y * w + x] = if norm > 0.0 { (sum / norm) as u8 } else { center as u8 };
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn salt_and_pepper() -> GrayImage {
        let mut img = GrayImage::filled(7, 7, 100);
        img.set(3, 3, 255);
        img.set(1, 5, 0);
        img
    }

    #[test]
    fn median_removes_isolated_outliers() {
        let out = median_blur(&salt_and_pepper(), 1);
        assert!(out.data.iter().all(|&v| v == 100), "{:?}", out.data);
    }

    #[test]
    fn median_window_is_truncated_at_corner() {
        // Corner window with radius 1 holds 4 pixels: [1, 2, 4, 5] -> sorted[2] = 4.
        let img = GrayImage::from_vec(3, 3, vec![1, 2, 3, 4, 5, 6, 7, 8, 9]).unwrap();
        let out = median_blur(&img, 1);
        assert_eq!(out.get(0, 0), 4);
        assert_eq!(out.get(1, 1), 5);
    }

    #[test]
    fn gaussian_kernel_is_normalised_and_symmetric() {
        let k = Kernel2D::gaussian(2, 1.0);
        let sum: f32 = k.weights.iter().sum();
        assert!((sum - 1.0).abs() < 1e-5, "sum={sum}");
        assert_eq!(k.weights.len(), 25);
        assert_eq!(k.weights[0], k.weights[24]);
        assert!(k.weights[12] > k.weights[11]);
    }

    #[test]
    fn gaussian_preserves_constant_image() {
        let img = GrayImage::filled(6, 4, 80);
        let out = gaussian_blur(&img, 2, 1.0);
        assert!(out.data.iter().all(|&v| (79..=80).contains(&v)));
    }

    #[test]
    fn zero_sigma_degenerates_to_identity() {
        let img = GrayImage::from_vec(3, 1, vec![10, 200, 30]).unwrap();
        assert_eq!(gaussian_blur(&img, 1, 0.0).data, img.data);
    }

    #[test]
    fn bilateral_keeps_strong_step_edge() {
        let mut img = GrayImage::new(10, 4);
        for y in 0..4 {
            for x in 5..10 {
                img.set(x, y, 200);
            }
        }
        let out = bilateral_filter(&img, 2, 2.0, 10.0);
        assert!(out.get(4, 2) < 5, "dark side bled: {}", out.get(4, 2));
        assert!(out.get(5, 2) > 195, "bright side bled: {}", out.get(5, 2));
    }

    #[test]
    fn canny_kernel_sums_to_one() {
        let k = Kernel2D::canny_5x5();
        let sum: f32 = k.weights.iter().sum();
        assert!((sum - 1.0).abs() < 1e-5, "sum={sum}");
        assert!((k.weights[12] - 15.0 / 159.0).abs() < 1e-7);
    }

    #[test]
    fn convolution_reach_matches_kernel_radius() {
        let mut img = GrayImage::new(7, 7);
        img.set(3, 3, 255);
        let out = Kernel2D::gaussian(1, 1.0).convolve(&img);
        for y in 0..7usize {
            for x in 0..7usize {
                let inside = x.abs_diff(3) <= 1 && y.abs_diff(3) <= 1;
                assert_eq!(out.get(x, y) > 0, inside, "({x},{y}) = {}", out.get(x, y));
            }
        }
    }
}
