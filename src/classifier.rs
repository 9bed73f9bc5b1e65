//! Fixed-weight linear scorer over per-component descriptors.
//!
//! The weights are frozen constants; there is no training or update path.
//! `score = bias + w · f`, `probability = sigmoid(score)`, and a component is
//! predicted as fracture when `probability > 0.5`.
use crate::features::{Centroid, Component};
use nalgebra::SVector;
use serde::Serialize;

/// Number of per-component features.
pub const FEATURE_DIM: usize = 12;

pub type FeatureVector = SVector<f64, FEATURE_DIM>;

/// Frozen weight vector, in feature order.
pub const WEIGHTS: [f64; FEATURE_DIM] = [
    0.000181, -0.000055, 0.000024, -0.000144, -0.000034, 0.000038, -0.000112, -0.000634,
    0.000004, 0.000732, 0.000268, -0.000655,
];

/// Frozen bias term.
pub const BIAS: f64 = 1.000256;

#[inline]
fn ratio(num: f64, den: f64) -> f64 {
    if den > 0.0 {
        num / den
    } else {
        0.0
    }
}

/// Build the 12-element feature vector of `c` in a `w × h` raster:
///
/// `[area/A, aspect, extent, circularity, cx/W, cy/H, perimeter/√area,
///   ln(area + 1), touchesBorder, bw/W, bh/H, bw·bh/A]` with `A = W·H`.
pub fn feature_vector(c: &Component, w: usize, h: usize) -> FeatureVector {
    let (wf, hf) = (w as f64, h as f64);
    let image_area = wf * hf;
    let area = c.area as f64;
    let bw = c.bounding_box.width as f64;
    let bh = c.bounding_box.height as f64;
    FeatureVector::from([
        ratio(area, image_area),
        c.aspect_ratio,
        c.extent,
        c.circularity,
        ratio(c.centroid.x, wf),
        ratio(c.centroid.y, hf),
        ratio(c.perimeter as f64, area.sqrt()),
        (area + 1.0).ln(),
        if c.touches_border { 1.0 } else { 0.0 },
        ratio(bw, wf),
        ratio(bh, hf),
        ratio(bw * bh, image_area),
    ])
}

#[inline]
fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Per-component classifier output.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ClassifierResult {
    pub score: f64,
    pub probability: f64,
    /// 1 = fracture, 0 = normal
    pub prediction: u8,
}

/// Scored component as reported in [`ClassifierSummary`].
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentScore {
    pub component_id: u32,
    pub area: u32,
    pub centroid: Centroid,
    #[serde(flatten)]
    pub result: ClassifierResult,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverallAssessment {
    /// `fracture_score > 0.5`
    pub has_fracture: bool,
    /// `round(100 · max(p, 1 − p))` of the mean probability
    pub confidence: u8,
    /// Area of predicted-fracture components over total component area
    pub fracture_area_ratio: f64,
    /// Mean probability over all components
    pub fracture_score: f64,
}

/// Aggregate of the per-component results of one raster.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifierSummary {
    pub total_components: usize,
    /// Predicted fracture, highest probability first
    pub fracture_components: Vec<ComponentScore>,
    /// Predicted normal, lowest probability first
    pub normal_components: Vec<ComponentScore>,
    pub overall: OverallAssessment,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LinearClassifier {
    pub weights: FeatureVector,
    pub bias: f64,
}

impl Default for LinearClassifier {
    fn default() -> Self {
        Self {
            weights: FeatureVector::from(WEIGHTS),
            bias: BIAS,
        }
    }
}

impl LinearClassifier {
    pub fn evaluate(&self, features: &FeatureVector) -> ClassifierResult {
        let score = self.bias + self.weights.dot(features);
        let probability = sigmoid(score);
        ClassifierResult {
            score,
            probability,
            prediction: u8::from(probability > 0.5),
        }
    }

    pub fn classify(&self, c: &Component, w: usize, h: usize) -> ClassifierResult {
        self.evaluate(&feature_vector(c, w, h))
    }

    /// Score every component and aggregate.
    pub fn summarize(&self, components: &[Component], w: usize, h: usize) -> ClassifierSummary {
        let scored: Vec<ComponentScore> = components
            .iter()
            .map(|c| ComponentScore {
                component_id: c.label,
                area: c.area,
                centroid: c.centroid,
                result: self.classify(c, w, h),
            })
            .collect();

        let total_area: f64 = scored.iter().map(|s| s.area as f64).sum();
        let fracture_area: f64 = scored
            .iter()
            .filter(|s| s.result.prediction == 1)
            .map(|s| s.area as f64)
            .sum();
        let fracture_score = if scored.is_empty() {
            0.0
        } else {
            scored.iter().map(|s| s.result.probability).sum::<f64>() / scored.len() as f64
        };

        let (mut fracture_components, mut normal_components): (Vec<_>, Vec<_>) =
            scored.into_iter().partition(|s| s.result.prediction == 1);
        fracture_components.sort_by(|a, b| b.result.probability.total_cmp(&a.result.probability));
        normal_components.sort_by(|a, b| a.result.probability.total_cmp(&b.result.probability));

        let overall = OverallAssessment {
            has_fracture: fracture_score > 0.5,
            confidence: (100.0 * fracture_score.max(1.0 - fracture_score)).round() as u8,
            fracture_area_ratio: ratio(fracture_area, total_area),
            fracture_score,
        };
        log::debug!(
            "LinearClassifier::summarize total={} fracture={} score={:.4}",
            components.len(),
            fracture_components.len(),
            fracture_score
        );
        ClassifierSummary {
            total_components: components.len(),
            fracture_components,
            normal_components,
            overall,
        }
    }
}
