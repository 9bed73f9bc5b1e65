//! Owned single-channel raster in row-major layout (stride == width).
//!
//! One generic buffer covers every pixel type the pipeline produces. Stages
//! never mutate their input: each returns a freshly allocated `Raster`.

use super::traits::{RasterView, RasterViewMut};

/// Value of a foreground pixel in a binary mask.
pub const FOREGROUND: u8 = 255;

#[derive(Clone, Debug, PartialEq)]
pub struct Raster<T> {
    /// Raster width in pixels
    pub w: usize,
    /// Raster height in pixels
    pub h: usize,
    /// Backing storage in row-major order, `w * h` elements
    pub data: Vec<T>,
}

/// 8-bit grayscale image or binary mask (`{0, 255}`).
pub type GrayImage = Raster<u8>;
/// Connected-component label map; `0` is background.
pub type LabelMap = Raster<u32>;
/// Float map (distance transform, gradient magnitude).
pub type ImageF32 = Raster<f32>;

impl<T: Copy + Default> Raster<T> {
    /// Construct a default-initialized buffer of size `w × h`.
    pub fn new(w: usize, h: usize) -> Self {
        Self {
            w,
            h,
            data: vec![T::default(); w * h],
        }
    }

    /// Construct a buffer filled with `value`.
    pub fn filled(w: usize, h: usize, value: T) -> Self {
        Self {
            w,
            h,
            data: vec![value; w * h],
        }
    }
}

impl<T> Raster<T> {
    /// Wrap existing row-major data. Returns `None` when `data.len() != w * h`.
    pub fn from_vec(w: usize, h: usize, data: Vec<T>) -> Option<Self> {
        (data.len() == w * h).then_some(Self { w, h, data })
    }

    /// An empty (0 × 0) raster.
    pub fn empty() -> Self {
        Self {
            w: 0,
            h: 0,
            data: Vec::new(),
        }
    }

    /// True when the raster holds no pixels.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.w == 0 || self.h == 0
    }

    /// Number of pixels (`w * h`).
    #[inline]
    pub fn len(&self) -> usize {
        self.w * self.h
    }

    #[inline]
    /// Convert (x, y) to a linear index into `data`.
    pub fn idx(&self, x: usize, y: usize) -> usize {
        y * self.w + x
    }

    /// Allocate a raster of the same shape with values produced by `f`.
    pub fn map<U, F: FnMut(&T) -> U>(&self, f: F) -> Raster<U> {
        Raster {
            w: self.w,
            h: self.h,
            data: self.data.iter().map(f).collect(),
        }
    }
}

impl<T: Copy> Raster<T> {
    #[inline]
    /// Get the pixel value at (x, y).
    pub fn get(&self, x: usize, y: usize) -> T {
        self.data[self.idx(x, y)]
    }

    #[inline]
    /// Set the pixel value at (x, y).
    pub fn set(&mut self, x: usize, y: usize, v: T) {
        let i = self.idx(x, y);
        self.data[i] = v;
    }

    /// Pixel at (x, y) with coordinates clamped to the raster extents.
    ///
    /// Must not be called on an empty raster.
    #[inline]
    pub fn get_clamped(&self, x: isize, y: isize) -> T {
        let cx = x.clamp(0, self.w as isize - 1) as usize;
        let cy = y.clamp(0, self.h as isize - 1) as usize;
        self.get(cx, cy)
    }
}

impl Raster<u8> {
    /// Count of non-zero pixels.
    pub fn foreground_count(&self) -> usize {
        self.data.iter().filter(|&&v| v != 0).count()
    }

    /// Fraction of non-zero pixels; `0.0` for an empty raster.
    pub fn foreground_fraction(&self) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        self.foreground_count() as f64 / self.len() as f64
    }

    /// True when every pixel is `0` or `255`.
    pub fn is_binary(&self) -> bool {
        self.data.iter().all(|&v| v == 0 || v == FOREGROUND)
    }

    /// Binary complement: foreground becomes background and vice versa.
    pub fn complement(&self) -> Self {
        self.map(|&v| if v == 0 { FOREGROUND } else { 0 })
    }

    /// Normalize any non-zero value to `255`.
    pub fn to_binary(&self) -> Self {
        self.map(|&v| if v == 0 { 0 } else { FOREGROUND })
    }
}

impl Raster<f32> {
    /// Largest finite value, or `0.0` when there is none.
    pub fn max_value(&self) -> f32 {
        self.data
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(0.0, f32::max)
    }
}

impl<T: Copy> RasterView for Raster<T> {
    type Pixel = T;

    fn width(&self) -> usize {
        self.w
    }

    fn height(&self) -> usize {
        self.h
    }

    #[inline]
    fn row(&self, y: usize) -> &[T] {
        &self.data[y * self.w..(y + 1) * self.w]
    }
}

impl<T: Copy> RasterViewMut for Raster<T> {
    #[inline]
    fn row_mut(&mut self, y: usize) -> &mut [T] {
        &mut self.data[y * self.w..(y + 1) * self.w]
    }
}
