//! Raster buffers shared by every pipeline stage.
//!
//! - [`Raster`] is the owned, row-major buffer used for stage outputs:
//!   8-bit grayscale and binary masks ([`GrayImage`]), integer label maps
//!   ([`LabelMap`]) and float distance/gradient maps ([`ImageF32`]).
//! - [`InputImage`] is the validated boundary type accepted by the pipeline
//!   controller (grayscale or RGBA).
//!
//! Binary masks are plain `GrayImage`s restricted to `{0, 255}`; every stage
//! treats any non-zero value as foreground when reading them.

pub mod buffer;
pub mod input;
pub mod io;
pub mod traits;

pub use self::buffer::{GrayImage, ImageF32, LabelMap, Raster, FOREGROUND};
pub use self::input::{InputImage, PixelFormat};
pub use self::traits::{RasterView, RasterViewMut, RowIter};
