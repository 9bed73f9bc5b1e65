//! Validated input boundary for the pipeline controller.
//!
//! The core never decodes file formats: callers hand over an already decoded
//! buffer, either single-channel 8-bit or interleaved RGBA.
use super::buffer::GrayImage;
use crate::error::InputError;
use crate::preprocess::grayscale::rgba_to_gray;
use serde::{Deserialize, Serialize};

/// Pixel layout of an [`InputImage`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PixelFormat {
    Gray,
    Rgba,
}

impl PixelFormat {
    #[inline]
    pub fn channels(self) -> usize {
        match self {
            PixelFormat::Gray => 1,
            PixelFormat::Rgba => 4,
        }
    }
}

/// Decoded raster handed to
/// [`PipelineController::initialize`](crate::PipelineController::initialize).
#[derive(Clone, Copy, Debug)]
pub struct InputImage<'a> {
    pub width: usize,
    pub height: usize,
    pub format: PixelFormat,
    pub data: &'a [u8],
}

impl<'a> InputImage<'a> {
    pub fn gray(width: usize, height: usize, data: &'a [u8]) -> Self {
        Self {
            width,
            height,
            format: PixelFormat::Gray,
            data,
        }
    }

    pub fn rgba(width: usize, height: usize, data: &'a [u8]) -> Self {
        Self {
            width,
            height,
            format: PixelFormat::Rgba,
            data,
        }
    }

    /// Reject zero-dimension or malformed buffers before any stage runs.
    pub fn validate(&self) -> Result<(), InputError> {
        if self.width == 0 || self.height == 0 {
            return Err(InputError::ZeroDimension {
                width: self.width,
                height: self.height,
            });
        }
        let expected = self.width * self.height * self.format.channels();
        if self.data.len() != expected {
            return Err(InputError::BufferSizeMismatch {
                expected,
                actual: self.data.len(),
            });
        }
        Ok(())
    }

    /// Validate and convert to an owned 8-bit grayscale raster.
    pub fn to_gray(&self) -> Result<GrayImage, InputError> {
        self.validate()?;
        Ok(match self.format {
            PixelFormat::Gray => GrayImage {
                w: self.width,
                h: self.height,
                data: self.data.to_vec(),
            },
            PixelFormat::Rgba => rgba_to_gray(self.data, self.width, self.height),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_dimension_is_rejected() {
        let err = InputImage::gray(0, 4, &[]).to_gray().unwrap_err();
        assert_eq!(
            err,
            InputError::ZeroDimension {
                width: 0,
                height: 4
            }
        );
    }

    #[test]
    fn rgba_length_must_match_four_channels() {
        let data = vec![0u8; 2 * 2 * 3];
        let err = InputImage::rgba(2, 2, &data).validate().unwrap_err();
        assert_eq!(
            err,
            InputError::BufferSizeMismatch {
                expected: 16,
                actual: 12
            }
        );
    }

    #[test]
    fn gray_input_is_copied_verbatim() {
        let data = [1u8, 2, 3, 4, 5, 6];
        let gray = InputImage::gray(3, 2, &data).to_gray().unwrap();
        assert_eq!((gray.w, gray.h), (3, 2));
        assert_eq!(gray.data, data.to_vec());
        assert_eq!(PixelFormat::Rgba.channels(), 4);
    }
}
