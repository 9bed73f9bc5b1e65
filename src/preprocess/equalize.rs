//! Histogram equalization, global and tile-local.
//!
//! The tile-local variant equalizes each non-overlapping `tile × tile` block
//! independently (tiles are clipped at the right/bottom border). There is no
//! contrast clipping and no interpolation between neighbouring tiles, so the
//! output shows tile seams; downstream thresholding tolerates them.
use crate::raster::{GrayImage, RasterView};

/// Default tile side: `max(32, min(w, h) / 8)`.
pub fn default_tile_size(w: usize, h: usize) -> usize {
    (w.min(h) / 8).max(32)
}

/// Build the 256-entry lookup `floor(255 · CDF(v) / area)` from a histogram.
fn equalization_lut(hist: &[u32; 256], area: u64) -> [u8; 256] {
    let mut lut = [0u8; 256];
    if area == 0 {
        return lut;
    }
    let mut sum = 0u64;
    for (v, &count) in hist.iter().enumerate() {
        sum += count as u64;
        lut[v] = (sum * 255 / area) as u8;
    }
    lut
}

/// Global histogram equalization over the whole raster.
pub fn histogram_equalization(gray: &GrayImage) -> GrayImage {
    let mut hist = [0u32; 256];
    for &v in &gray.data {
        hist[v as usize] += 1;
    }
    let lut = equalization_lut(&hist, gray.len() as u64);
    gray.map(|&v| lut[v as usize])
}

/// Tile-local histogram equalization with `tile_size × tile_size` tiles.
pub fn tile_equalization(gray: &GrayImage, tile_size: usize) -> GrayImage {
    let (w, h) = (gray.w, gray.h);
    let mut out = GrayImage::new(w, h);
    if gray.is_empty() {
        return out;
    }
    let tile = tile_size.max(1);
    let tiles_x = w.div_ceil(tile);
    let tiles_y = h.div_ceil(tile);

    for ty in 0..tiles_y {
        for tx in 0..tiles_x {
            let x0 = tx * tile;
            let y0 = ty * tile;
            let x1 = (x0 + tile).min(w);
            let y1 = (y0 + tile).min(h);

            let mut hist = [0u32; 256];
            for y in y0..y1 {
                for &v in &gray.row(y)[x0..x1] {
                    hist[v as usize] += 1;
                }
            }
            let area = ((x1 - x0) * (y1 - y0)) as u64;
            let lut = equalization_lut(&hist, area);

            for y in y0..y1 {
                let src = &gray.data[y * w + x0..y * w + x1];
                let dst = &mut out.data[y * w + x0..y * w + x1];
                for (d, &s) in dst.iter_mut().zip(src) {
                    *d = lut[s as usize];
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_tile_size_has_floor_of_32() {
        assert_eq!(default_tile_size(100, 80), 32);
        assert_eq!(default_tile_size(1024, 800), 100);
    }

    #[test]
    fn global_equalization_stretches_two_levels() {
        let gray = GrayImage::from_vec(4, 1, vec![10, 10, 20, 20]).unwrap();
        let eq = histogram_equalization(&gray);
        // CDF(10) = 2/4, CDF(20) = 4/4
        assert_eq!(eq.data, vec![127, 127, 255, 255]);
    }

    #[test]
    fn tiles_are_equalized_independently() {
        // Two 2x1 tiles with different content map their maxima to 255.
        let gray = GrayImage::from_vec(4, 1, vec![5, 6, 100, 200]).unwrap();
        let eq = tile_equalization(&gray, 2);
        assert_eq!(eq.data, vec![127, 255, 127, 255]);
    }

    #[test]
    fn border_tiles_are_clipped() {
        let gray = GrayImage::from_vec(3, 1, vec![1, 2, 3]).unwrap();
        let eq = tile_equalization(&gray, 2);
        // Last tile holds a single pixel: CDF == area.
        assert_eq!(eq.data, vec![127, 255, 255]);
    }
}
