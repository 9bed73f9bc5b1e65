//! Controller configuration and per-stage requests.
use super::stage::Stage;
use crate::features::{FeatureAlgorithm, FeatureOptions};
use crate::heuristic::{FractureOptions, HeuristicAlgorithm, HeuristicRequest};
use crate::morphology::{MorphologyOp, MorphologyOptions};
use crate::preprocess::PreprocessAlgorithm;
use crate::segmentation::SegmentationAlgorithm;
use serde::{Deserialize, Serialize};

/// Morphology stage request.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MorphologyRequest {
    pub operation: MorphologyOp,
    #[serde(default)]
    pub options: MorphologyOptions,
}

impl MorphologyRequest {
    pub fn new(operation: MorphologyOp) -> Self {
        Self {
            operation,
            options: MorphologyOptions::default(),
        }
    }
}

/// Feature stage request.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureRequest {
    pub algorithm: FeatureAlgorithm,
    #[serde(default)]
    pub options: FeatureOptions,
}

impl FeatureRequest {
    pub fn new(algorithm: FeatureAlgorithm) -> Self {
        Self {
            algorithm,
            options: FeatureOptions::default(),
        }
    }
}

/// One `process` call: a stage together with its algorithm and parameters.
///
/// JSON form: `{"stage": "preprocess", "algorithm": "median", "radius": 2}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "stage", rename_all = "camelCase")]
pub enum StageRequest {
    Preprocess(PreprocessAlgorithm),
    Segment(SegmentationAlgorithm),
    Morphology(MorphologyRequest),
    Features(FeatureRequest),
    Heuristic(HeuristicRequest),
}

impl StageRequest {
    pub fn stage(&self) -> Stage {
        match self {
            StageRequest::Preprocess(_) => Stage::Preprocessing,
            StageRequest::Segment(_) => Stage::Segmentation,
            StageRequest::Morphology(_) => Stage::Morphology,
            StageRequest::Features(_) => Stage::FeatureAnalysis,
            StageRequest::Heuristic(_) => Stage::Heuristic,
        }
    }

    pub fn algorithm_name(&self) -> &'static str {
        match self {
            StageRequest::Preprocess(a) => a.name(),
            StageRequest::Segment(a) => a.name(),
            StageRequest::Morphology(r) => r.operation.name(),
            StageRequest::Features(r) => r.algorithm.name(),
            StageRequest::Heuristic(r) => r.algorithm.name(),
        }
    }

    /// Default analysis plan: CLAHE, median, Otsu, opening, classifier, report.
    pub fn default_plan() -> Vec<StageRequest> {
        vec![
            StageRequest::Preprocess(PreprocessAlgorithm::default()),
            StageRequest::Preprocess(PreprocessAlgorithm::median()),
            StageRequest::Segment(SegmentationAlgorithm::Otsu),
            StageRequest::Morphology(MorphologyRequest::new(MorphologyOp::Opening)),
            StageRequest::Features(FeatureRequest::new(FeatureAlgorithm::Classifier)),
            StageRequest::Heuristic(HeuristicRequest::new(HeuristicAlgorithm::Report)),
        ]
    }
}

/// Requests used when a prerequisite stage is run automatically.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StageDefaults {
    pub segmentation: SegmentationAlgorithm,
    pub morphology: MorphologyRequest,
    pub features: FeatureRequest,
}

/// Controller configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PipelineOptions {
    /// Run missing prerequisite stages instead of failing
    pub auto_resolve_prerequisites: bool,
    pub defaults: StageDefaults,
    /// Heuristic options used when a request carries none
    pub fracture: FractureOptions,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            auto_resolve_prerequisites: true,
            defaults: StageDefaults::default(),
            fracture: FractureOptions::default(),
        }
    }
}
