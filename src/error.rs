//! Error types for the fracture-detection pipeline.
//!
//! Only malformed input and (optionally) unresolved stage prerequisites are
//! errors. Degenerate results such as an empty mask or zero significant
//! components resolve to well-defined "no fracture" verdicts instead.

use crate::heuristic::HeuristicAlgorithm;
use crate::pipeline::Stage;
use thiserror::Error;

/// Result type alias for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Rejections raised before any stage runs.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InputError {
    /// Width or height is zero.
    #[error("input raster has zero dimension ({width}x{height})")]
    ZeroDimension { width: usize, height: usize },

    /// Pixel buffer length does not match the declared shape.
    #[error("input buffer holds {actual} bytes, expected {expected}")]
    BufferSizeMismatch { expected: usize, actual: usize },
}

/// Errors surfaced by the [`PipelineController`](crate::PipelineController).
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The supplied raster was rejected.
    #[error("invalid input: {0}")]
    Input(#[from] InputError),

    /// A stage was requested before `initialize`.
    #[error("pipeline has not been initialized with an image")]
    NotInitialized,

    /// A prerequisite is missing and auto-resolution is disabled.
    #[error("stage `{stage}` requires a `{prerequisite}` result first")]
    MissingPrerequisite { stage: Stage, prerequisite: Stage },

    /// A heuristic state was requested before the one it builds on.
    #[error("heuristic `{requested}` requires a `{prerequisite}` result first")]
    MissingHeuristicState {
        requested: HeuristicAlgorithm,
        prerequisite: HeuristicAlgorithm,
    },
}
