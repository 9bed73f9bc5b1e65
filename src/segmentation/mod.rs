//! Binarization and edge extraction (pipeline step 2).
//!
//! All algorithms map a grayscale raster to a `{0, 255}` mask of the same
//! shape. Gradient-based detectors leave the 1-pixel frame at 0.

pub mod canny;
pub mod grad;
pub mod otsu;
pub mod watershed;

pub use canny::{canny_edges, CannyParams};
pub use grad::{sobel_edges, sobel_gradients, Grad};
pub use otsu::{histogram, otsu_level, otsu_threshold};
pub use watershed::watershed_edges;

use crate::raster::GrayImage;
use serde::{Deserialize, Serialize};

/// Segmentation algorithms selectable for pipeline step 2.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "algorithm", rename_all = "camelCase")]
pub enum SegmentationAlgorithm {
    #[default]
    Otsu,
    Canny {
        #[serde(default = "default_canny_low")]
        low: f32,
        #[serde(default = "default_canny_high")]
        high: f32,
    },
    Sobel {
        #[serde(default = "default_sobel_threshold")]
        threshold: f32,
    },
    Watershed,
}

fn default_canny_low() -> f32 {
    CannyParams::default().low
}

fn default_canny_high() -> f32 {
    CannyParams::default().high
}

fn default_sobel_threshold() -> f32 {
    100.0
}

/// Mask produced by a segmentation run.
#[derive(Clone, Debug)]
pub struct SegmentationOutput {
    pub mask: GrayImage,
    /// Selected global threshold (Otsu only).
    pub threshold: Option<u8>,
}

impl SegmentationAlgorithm {
    pub fn canny() -> Self {
        let p = CannyParams::default();
        SegmentationAlgorithm::Canny {
            low: p.low,
            high: p.high,
        }
    }

    pub fn sobel() -> Self {
        SegmentationAlgorithm::Sobel {
            threshold: default_sobel_threshold(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SegmentationAlgorithm::Otsu => "otsu",
            SegmentationAlgorithm::Canny { .. } => "canny",
            SegmentationAlgorithm::Sobel { .. } => "sobel",
            SegmentationAlgorithm::Watershed => "watershed",
        }
    }

    pub fn apply(&self, gray: &GrayImage) -> SegmentationOutput {
        match *self {
            SegmentationAlgorithm::Otsu => {
                let (mask, t) = otsu_threshold(gray);
                SegmentationOutput {
                    mask,
                    threshold: Some(t),
                }
            }
            SegmentationAlgorithm::Canny { low, high } => SegmentationOutput {
                mask: canny_edges(gray, CannyParams { low, high }),
                threshold: None,
            },
            SegmentationAlgorithm::Sobel { threshold } => SegmentationOutput {
                mask: sobel_edges(gray, threshold),
                threshold: None,
            },
            SegmentationAlgorithm::Watershed => SegmentationOutput {
                mask: watershed_edges(gray),
                threshold: None,
            },
        }
    }
}
