//! Stage identifiers, stage payloads and the per-run history record.
use crate::classifier::ClassifierSummary;
use crate::features::{Component, FeatureOutput};
use crate::heuristic::{FractureAssessment, Report, SeverityClassification};
use crate::raster::{GrayImage, LabelMap};
use serde::Serialize;
use std::fmt;

/// Pipeline steps in execution order; the discriminant is the step number.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Stage {
    Original = 0,
    Preprocessing = 1,
    Segmentation = 2,
    Morphology = 3,
    FeatureAnalysis = 4,
    Heuristic = 5,
}

impl Stage {
    pub const PROCESSING: [Stage; 5] = [
        Stage::Preprocessing,
        Stage::Segmentation,
        Stage::Morphology,
        Stage::FeatureAnalysis,
        Stage::Heuristic,
    ];

    #[inline]
    pub fn step(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            Stage::Original => "original",
            Stage::Preprocessing => "preprocessing",
            Stage::Segmentation => "segmentation",
            Stage::Morphology => "morphology",
            Stage::FeatureAnalysis => "featureAnalysis",
            Stage::Heuristic => "heuristic",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Stage::Original => "Original image",
            Stage::Preprocessing => "Step 1: Preprocessing",
            Stage::Segmentation => "Step 2: Edge detection / segmentation",
            Stage::Morphology => "Step 3: Morphology",
            Stage::FeatureAnalysis => "Step 4: Feature analysis",
            Stage::Heuristic => "Step 5: Heuristic analysis",
        }
    }

    /// Algorithm identifiers accepted by this stage.
    pub fn algorithms(self) -> &'static [&'static str] {
        match self {
            Stage::Original => &[],
            Stage::Preprocessing => &["clahe", "histogram", "median", "gaussian", "bilateral"],
            Stage::Segmentation => &["otsu", "canny", "sobel", "watershed"],
            Stage::Morphology => &[
                "erosion", "dilation", "opening", "closing", "gradient", "topHat", "blackHat",
                "skeleton",
            ],
            Stage::FeatureAnalysis => &["components", "classifier"],
            Stage::Heuristic => &["fracture", "severity", "report"],
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Catalogue entry describing one processing step.
#[derive(Clone, Debug, Serialize)]
pub struct StepInfo {
    pub stage: Stage,
    pub step: u8,
    pub title: &'static str,
    pub algorithms: &'static [&'static str],
}

/// The five processing steps with their selectable algorithms.
pub fn step_catalog() -> Vec<StepInfo> {
    Stage::PROCESSING
        .iter()
        .map(|&stage| StepInfo {
            stage,
            step: stage.step(),
            title: stage.title(),
            algorithms: stage.algorithms(),
        })
        .collect()
}

/// Accumulated heuristic state. Each heuristic run copies the previous state
/// after the same feature result and fills in its own slot.
#[derive(Clone, Debug, Default)]
pub struct HeuristicState {
    pub width: usize,
    pub height: usize,
    pub components: Vec<Component>,
    pub fracture: Option<FractureAssessment>,
    pub severity: Option<SeverityClassification>,
    pub report: Option<Report>,
}

/// Stage-specific payload of a [`StageResult`].
#[derive(Clone, Debug)]
pub enum StageData {
    /// Grayscale raster (original, preprocessing)
    Gray(GrayImage),
    /// Binary mask (segmentation, morphology)
    Binary {
        mask: GrayImage,
        threshold: Option<u8>,
        pre_dilated: bool,
    },
    /// Mask the features were extracted from, plus the features
    Features {
        mask: GrayImage,
        output: Box<FeatureOutput>,
    },
    Heuristic(Box<HeuristicState>),
}

/// One entry of the controller's append-only history.
#[derive(Clone, Debug)]
pub struct StageResult {
    pub step: u8,
    pub stage: Stage,
    pub algorithm: Option<String>,
    pub data: StageData,
    pub elapsed_ms: f64,
}

impl StageResult {
    pub fn gray(&self) -> Option<&GrayImage> {
        match &self.data {
            StageData::Gray(g) => Some(g),
            _ => None,
        }
    }

    pub fn mask(&self) -> Option<&GrayImage> {
        match &self.data {
            StageData::Binary { mask, .. } | StageData::Features { mask, .. } => Some(mask),
            _ => None,
        }
    }

    pub fn features(&self) -> Option<&FeatureOutput> {
        match &self.data {
            StageData::Features { output, .. } => Some(output),
            _ => None,
        }
    }

    pub fn heuristic(&self) -> Option<&HeuristicState> {
        match &self.data {
            StageData::Heuristic(state) => Some(state),
            _ => None,
        }
    }

    pub fn fracture(&self) -> Option<&FractureAssessment> {
        self.heuristic().and_then(|s| s.fracture.as_ref())
    }

    pub fn severity(&self) -> Option<&SeverityClassification> {
        self.heuristic().and_then(|s| s.severity.as_ref())
    }

    pub fn report(&self) -> Option<&Report> {
        self.heuristic().and_then(|s| s.report.as_ref())
    }

    /// Renderable grayscale view of this result.
    ///
    /// Feature results render the label map with labels spread over
    /// `[64, 255]`; heuristic results carry no raster and return `None`.
    pub fn preview(&self) -> Option<GrayImage> {
        match &self.data {
            StageData::Gray(g) => Some(g.clone()),
            StageData::Binary { mask, .. } => Some(mask.clone()),
            StageData::Features { output, .. } => {
                Some(label_preview(&output.analysis.labels, output.analysis.n_components))
            }
            StageData::Heuristic(_) => None,
        }
    }

    /// Serializable metadata record without raster payloads.
    pub fn summary(&self) -> StageSummary {
        let mut summary = StageSummary {
            step: self.step,
            stage: self.stage,
            algorithm: self.algorithm.clone(),
            elapsed_ms: self.elapsed_ms,
            width: 0,
            height: 0,
            threshold: None,
            foreground_fraction: None,
            n_components: None,
            kept_components: None,
            classification: None,
            fracture: None,
            severity: None,
            report: None,
        };
        match &self.data {
            StageData::Gray(g) => {
                (summary.width, summary.height) = (g.w, g.h);
            }
            StageData::Binary { mask, threshold, .. } => {
                (summary.width, summary.height) = (mask.w, mask.h);
                summary.threshold = *threshold;
                summary.foreground_fraction = Some(mask.foreground_fraction());
            }
            StageData::Features { mask, output } => {
                (summary.width, summary.height) = (mask.w, mask.h);
                summary.foreground_fraction = Some(mask.foreground_fraction());
                summary.n_components = Some(output.analysis.n_components);
                summary.kept_components = Some(output.components.len());
                summary.classification = output.classification.clone();
            }
            StageData::Heuristic(state) => {
                (summary.width, summary.height) = (state.width, state.height);
                summary.kept_components = Some(state.components.len());
                summary.fracture = state.fracture.clone();
                summary.severity = state.severity.clone();
                summary.report = state.report.clone();
            }
        }
        summary
    }
}

fn label_preview(labels: &LabelMap, n: usize) -> GrayImage {
    labels.map(|&l| {
        if l == 0 || n == 0 {
            0
        } else {
            let spread = (l as usize - 1) * 191 / n.saturating_sub(1).max(1);
            (64 + spread.min(191)) as u8
        }
    })
}

/// Metadata of one [`StageResult`], suitable for JSON output.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StageSummary {
    pub step: u8,
    pub stage: Stage,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub algorithm: Option<String>,
    pub elapsed_ms: f64,
    pub width: usize,
    pub height: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threshold: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub foreground_fraction: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub n_components: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kept_components: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classification: Option<ClassifierSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fracture: Option<FractureAssessment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<SeverityClassification>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<Report>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_names_and_steps() {
        assert_eq!(Stage::FeatureAnalysis.to_string(), "featureAnalysis");
        assert_eq!(Stage::Heuristic.step(), 5);
        assert!(Stage::Segmentation < Stage::Morphology);
        let catalog = step_catalog();
        assert_eq!(catalog.len(), 5);
        assert_eq!(catalog[0].step, 1);
        assert!(catalog[1].algorithms.contains(&"watershed"));
    }

    #[test]
    fn label_preview_spreads_labels() {
        let labels = LabelMap::from_vec(4, 1, vec![0, 1, 2, 3]).unwrap();
        let preview = label_preview(&labels, 3);
        assert_eq!(preview.data[0], 0);
        assert_eq!(preview.data[1], 64);
        assert_eq!(preview.data[3], 255);
        assert!(preview.data[2] > 64 && preview.data[2] < 255);
    }
}
