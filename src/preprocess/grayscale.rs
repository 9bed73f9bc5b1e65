use crate::raster::GrayImage;

const LUMA_R: f64 = 0.299;
const LUMA_G: f64 = 0.587;
const LUMA_B: f64 = 0.114;

/// Convert interleaved RGBA to 8-bit luma, `0.299R + 0.587G + 0.114B`
/// truncated toward zero. Alpha is ignored.
pub fn rgba_to_gray(rgba: &[u8], width: usize, height: usize) -> GrayImage {
    let n = width * height;
    let mut out = GrayImage::new(width, height);
    for (dst, px) in out.data.iter_mut().zip(rgba.chunks_exact(4).take(n)) {
        let luma = LUMA_R * px[0] as f64 + LUMA_G * px[1] as f64 + LUMA_B * px[2] as f64;
        *dst = luma as u8;
    }
    out
}
