//! Stage orchestration.
//!
//! - [`PipelineController`]: owns one analysis (original raster + history) and
//!   runs stage requests against it, auto-running missing prerequisites.
//! - [`StageRequest`] and the per-stage request types in [`params`].
//! - [`StageResult`] / [`StageData`]: history entries and their payloads.
//! - [`batch`]: plan execution and independent multi-image analysis.

pub mod batch;
pub mod controller;
pub mod params;
pub mod stage;

pub use batch::{analyze, analyze_batch, run_plan, AnalysisOutcome};
pub use controller::PipelineController;
pub use params::{FeatureRequest, MorphologyRequest, PipelineOptions, StageDefaults, StageRequest};
pub use stage::{
    step_catalog, HeuristicState, Stage, StageData, StageResult, StageSummary, StepInfo,
};
