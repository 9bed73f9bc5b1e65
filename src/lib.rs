#![doc = include_str!("../README.md")]

// Pipeline surface
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod pipeline;
pub mod raster;

// Stage algorithms. Every function is pure over owned rasters and can be
// used without a controller.
pub mod classifier;
pub mod features;
pub mod heuristic;
pub mod morphology;
pub mod preprocess;
pub mod segmentation;

// --- High-level re-exports -------------------------------------------------

// Controller and its configuration.
pub use crate::pipeline::{
    PipelineController, PipelineOptions, Stage, StageRequest, StageResult, StageSummary,
};

// Errors.
pub use crate::error::{InputError, PipelineError, PipelineResult};

// Input boundary and raster types.
pub use crate::raster::{GrayImage, InputImage, PixelFormat};

// Heuristic outputs.
pub use crate::heuristic::{FractureAssessment, Report, SeverityClassification};

// --- Prelude ---------------------------------------------------------------

/// Everything needed to drive a controller.
///
/// ```no_run
/// use fracture_detector::prelude::*;
///
/// # fn main() -> PipelineResult<()> {
/// let (w, h) = (128usize, 128usize);
/// let gray = vec![0u8; w * h];
/// let mut pipeline = PipelineController::new(PipelineOptions::default());
/// pipeline.initialize(InputImage::gray(w, h, &gray))?;
/// pipeline.preprocess(PreprocessAlgorithm::median())?;
/// pipeline.segment(SegmentationAlgorithm::Otsu)?;
/// pipeline.morphology(MorphologyRequest::new(MorphologyOp::Closing))?;
/// let result = pipeline.heuristic(HeuristicRequest::new(HeuristicAlgorithm::Severity))?;
/// println!("{:?}", result.severity());
/// # Ok(())
/// # }
/// ```
pub mod prelude {
    pub use crate::features::FeatureAlgorithm;
    pub use crate::heuristic::{HeuristicAlgorithm, HeuristicRequest};
    pub use crate::morphology::MorphologyOp;
    pub use crate::pipeline::{FeatureRequest, MorphologyRequest};
    pub use crate::preprocess::PreprocessAlgorithm;
    pub use crate::segmentation::SegmentationAlgorithm;
    pub use crate::{
        GrayImage, InputImage, PipelineController, PipelineError, PipelineOptions,
        PipelineResult, StageRequest, StageResult,
    };
}
