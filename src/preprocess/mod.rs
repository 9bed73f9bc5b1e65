//! Contrast enhancement and denoising applied to the grayscale radiograph.
//!
//! Every function is a pure map from a borrowed raster to a freshly allocated
//! one. Zero-sized inputs produce zero-sized outputs.
//!
//! - [`grayscale`] – RGBA → luma conversion.
//! - [`equalize`] – tile-local ("CLAHE-like", no clipping) and global
//!   histogram equalization.
//! - [`filters`] – median, Gaussian and bilateral smoothing.

pub mod equalize;
pub mod filters;
pub mod grayscale;

pub use equalize::{default_tile_size, histogram_equalization, tile_equalization};
pub use filters::{bilateral_filter, gaussian_blur, median_blur, Kernel2D};
pub use grayscale::rgba_to_gray;

use crate::raster::GrayImage;
use serde::{Deserialize, Serialize};

/// Preprocessing algorithms selectable for pipeline step 1.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "algorithm", rename_all = "camelCase")]
pub enum PreprocessAlgorithm {
    /// Tile-local histogram equalization. `None` picks `max(32, min(w, h) / 8)`.
    Clahe {
        #[serde(default, rename = "tileSize")]
        tile_size: Option<usize>,
    },
    /// Global histogram equalization.
    Histogram,
    Median {
        #[serde(default = "default_radius")]
        radius: usize,
    },
    Gaussian {
        #[serde(default = "default_radius")]
        radius: usize,
        #[serde(default = "default_sigma")]
        sigma: f32,
    },
    Bilateral {
        #[serde(default = "default_radius")]
        radius: usize,
        #[serde(default = "default_sigma_space", rename = "sigmaSpace")]
        sigma_space: f32,
        #[serde(default = "default_sigma_color", rename = "sigmaColor")]
        sigma_color: f32,
    },
}

fn default_radius() -> usize {
    2
}

fn default_sigma() -> f32 {
    1.0
}

fn default_sigma_space() -> f32 {
    2.0
}

fn default_sigma_color() -> f32 {
    50.0
}

impl Default for PreprocessAlgorithm {
    fn default() -> Self {
        PreprocessAlgorithm::Clahe { tile_size: None }
    }
}

impl PreprocessAlgorithm {
    pub fn median() -> Self {
        PreprocessAlgorithm::Median {
            radius: default_radius(),
        }
    }

    pub fn gaussian() -> Self {
        PreprocessAlgorithm::Gaussian {
            radius: default_radius(),
            sigma: default_sigma(),
        }
    }

    pub fn bilateral() -> Self {
        PreprocessAlgorithm::Bilateral {
            radius: default_radius(),
            sigma_space: default_sigma_space(),
            sigma_color: default_sigma_color(),
        }
    }

    /// Short identifier recorded in the stage history.
    pub fn name(&self) -> &'static str {
        match self {
            PreprocessAlgorithm::Clahe { .. } => "clahe",
            PreprocessAlgorithm::Histogram => "histogram",
            PreprocessAlgorithm::Median { .. } => "median",
            PreprocessAlgorithm::Gaussian { .. } => "gaussian",
            PreprocessAlgorithm::Bilateral { .. } => "bilateral",
        }
    }

    /// Run the selected algorithm on `gray`.
    pub fn apply(&self, gray: &GrayImage) -> GrayImage {
        match *self {
            PreprocessAlgorithm::Clahe { tile_size } => {
                let tile = tile_size.unwrap_or_else(|| default_tile_size(gray.w, gray.h));
                tile_equalization(gray, tile)
            }
            PreprocessAlgorithm::Histogram => histogram_equalization(gray),
            PreprocessAlgorithm::Median { radius } => median_blur(gray, radius),
            PreprocessAlgorithm::Gaussian { radius, sigma } => gaussian_blur(gray, radius, sigma),
            PreprocessAlgorithm::Bilateral {
                radius,
                sigma_space,
                sigma_color,
            } => bilateral_filter(gray, radius, sigma_space, sigma_color),
        }
    }
}
