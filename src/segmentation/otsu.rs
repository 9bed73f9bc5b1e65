//! Otsu global thresholding.
use crate::raster::{GrayImage, FOREGROUND};

/// 256-bin intensity histogram.
pub fn histogram(gray: &GrayImage) -> [u32; 256] {
    let mut hist = [0u32; 256];
    for &v in &gray.data {
        hist[v as usize] += 1;
    }
    hist
}

/// Threshold maximizing the inter-class variance `wB·wF·(mB − mF)²`.
///
/// Candidates are scanned in ascending order and the first maximum wins, so
/// a constant image yields `0`.
pub fn otsu_level(hist: &[u32; 256]) -> u8 {
    let n: f64 = hist.iter().map(|&c| c as f64).sum();
    let sum: f64 = hist.iter().enumerate().map(|(t, &c)| t as f64 * c as f64).sum();

    let mut sum_b = 0.0f64;
    let mut w_b = 0.0f64;
    let mut var_max = 0.0f64;
    let mut threshold = 0u8;

    for (t, &count) in hist.iter().enumerate() {
        w_b += count as f64;
        if w_b == 0.0 {
            continue;
        }
        let w_f = n - w_b;
        if w_f == 0.0 {
            break;
        }
        sum_b += t as f64 * count as f64;
        let m_b = sum_b / w_b;
        let m_f = (sum - sum_b) / w_f;
        let var_between = w_b * w_f * (m_b - m_f) * (m_b - m_f);
        if var_between > var_max {
            var_max = var_between;
            threshold = t as u8;
        }
    }
    threshold
}

/// Binarize `gray` at its Otsu level: `pixel > t → 255`.
pub fn otsu_threshold(gray: &GrayImage) -> (GrayImage, u8) {
    let t = otsu_level(&histogram(gray));
    let mask = gray.map(|&v| if v > t { FOREGROUND } else { 0 });
    (mask, t)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_level_image_splits_at_lower_level() {
        let mut data = vec![20u8; 50];
        data.extend(vec![180u8; 50]);
        let gray = GrayImage::from_vec(10, 10, data).unwrap();
        let (mask, t) = otsu_threshold(&gray);
        assert_eq!(t, 20);
        assert_eq!(mask.foreground_count(), 50);
        assert!(mask.is_binary());
    }

    #[test]
    fn constant_image_has_zero_threshold() {
        let gray = GrayImage::filled(4, 4, 77);
        let (mask, t) = otsu_threshold(&gray);
        assert_eq!(t, 0);
        assert_eq!(mask.foreground_count(), 16);
    }

    #[test]
    fn empty_image_is_total() {
        let (mask, t) = otsu_threshold(&GrayImage::empty());
        assert_eq!(t, 0);
        assert!(mask.is_empty());
    }
}
