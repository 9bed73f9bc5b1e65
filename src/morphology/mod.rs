//! Binary morphology on `{0, 255}` masks (pipeline step 3).
//!
//! - [`binary`] – erosion, dilation and their compositions.
//! - [`distance`] – chamfer distance transform.
//! - [`skeleton`] – iterative thinning.

pub mod binary;
pub mod distance;
pub mod skeleton;

pub use binary::{black_hat, closing, dilate, erode, morphological_gradient, opening, top_hat};
pub use distance::distance_transform;
pub use skeleton::skeletonize;

use crate::raster::GrayImage;
use serde::{Deserialize, Serialize};

/// Foreground fraction below which the stage pre-dilates its input.
pub const SPARSE_FOREGROUND_FRACTION: f64 = 0.01;

/// Morphological operation selectable for pipeline step 3.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MorphologyOp {
    Erosion,
    Dilation,
    #[default]
    Opening,
    Closing,
    Gradient,
    TopHat,
    BlackHat,
    Skeleton,
}

impl MorphologyOp {
    pub fn name(self) -> &'static str {
        match self {
            MorphologyOp::Erosion => "erosion",
            MorphologyOp::Dilation => "dilation",
            MorphologyOp::Opening => "opening",
            MorphologyOp::Closing => "closing",
            MorphologyOp::Gradient => "gradient",
            MorphologyOp::TopHat => "topHat",
            MorphologyOp::BlackHat => "blackHat",
            MorphologyOp::Skeleton => "skeleton",
        }
    }
}

/// Parameters for the morphology stage.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MorphologyOptions {
    /// Square structuring element side
    pub kernel_size: usize,
    /// Repetitions for erosion/dilation/opening/closing
    pub iterations: usize,
    /// Upper bound on thinning passes
    pub skeleton_max_iterations: usize,
    /// Dilate (kernel 3, one pass) first when the input is almost empty
    pub pre_dilate_sparse: bool,
}

impl Default for MorphologyOptions {
    fn default() -> Self {
        Self {
            kernel_size: 5,
            iterations: 2,
            skeleton_max_iterations: 100,
            pre_dilate_sparse: true,
        }
    }
}

/// Result of [`apply_morphology`].
#[derive(Clone, Debug)]
pub struct MorphologyOutput {
    pub mask: GrayImage,
    /// True when sparse-input pre-dilation ran.
    pub pre_dilated: bool,
}

/// Run `op` on `mask`, pre-dilating sparse inputs when enabled.
pub fn apply_morphology(
    mask: &GrayImage,
    op: MorphologyOp,
    opts: &MorphologyOptions,
) -> MorphologyOutput {
    let fraction = mask.foreground_fraction();
    let pre_dilated = opts.pre_dilate_sparse && fraction < SPARSE_FOREGROUND_FRACTION;
    let dilated;
    let input = if pre_dilated {
        log::debug!("apply_morphology sparse input fraction={fraction:.4}, pre-dilating");
        dilated = dilate(mask, 3, 1);
        &dilated
    } else {
        mask
    };

    let (k, n) = (opts.kernel_size, opts.iterations);
    let out = match op {
        MorphologyOp::Erosion => erode(input, k, n),
        MorphologyOp::Dilation => dilate(input, k, n),
        MorphologyOp::Opening => opening(input, k, n),
        MorphologyOp::Closing => closing(input, k, n),
        MorphologyOp::Gradient => morphological_gradient(input, k),
        MorphologyOp::TopHat => top_hat(input, k),
        MorphologyOp::BlackHat => black_hat(input, k),
        MorphologyOp::Skeleton => skeletonize(input, opts.skeleton_max_iterations),
    };
    MorphologyOutput {
        mask: out,
        pre_dilated,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::FOREGROUND;

    #[test]
    fn sparse_masks_are_pre_dilated() {
        let mut m = GrayImage::new(50, 50);
        m.set(20, 20, FOREGROUND);
        let out = apply_morphology(&m, MorphologyOp::Dilation, &MorphologyOptions {
            iterations: 1,
            kernel_size: 1,
            ..MorphologyOptions::default()
        });
        assert!(out.pre_dilated);
        assert_eq!(out.mask.foreground_count(), 9);

        let out = apply_morphology(&m, MorphologyOp::Dilation, &MorphologyOptions {
            iterations: 1,
            kernel_size: 1,
            pre_dilate_sparse: false,
            ..MorphologyOptions::default()
        });
        assert!(!out.pre_dilated);
        assert_eq!(out.mask.foreground_count(), 1);
    }

    #[test]
    fn dense_masks_skip_pre_dilation() {
        let mut m = GrayImage::new(10, 10);
        for x in 0..10 {
            m.set(x, 5, FOREGROUND);
        }
        let out = apply_morphology(&m, MorphologyOp::Opening, &MorphologyOptions::default());
        assert!(!out.pre_dilated);
        // a 1-pixel line does not survive a 5x5 opening
        assert_eq!(out.mask.foreground_count(), 0);
    }

    #[test]
    fn options_accept_partial_json() {
        let opts: MorphologyOptions = serde_json::from_str(r#"{"kernelSize": 3}"#).unwrap();
        assert_eq!(opts.kernel_size, 3);
        assert_eq!(opts.iterations, 2);
        let op: MorphologyOp = serde_json::from_str(r#""topHat""#).unwrap();
        assert_eq!(op, MorphologyOp::TopHat);
    }
}
