//! Connected-component feature extraction (pipeline step 4).
//!
//! - [`labeling`] – two-pass union-find labeling, 4-connectivity.
//! - [`component`] – per-component descriptors.
//! - [`filter`] – inclusive predicate filter over descriptors.

pub mod component;
pub mod filter;
pub mod labeling;

pub use component::{
    analyze_components, centroid_distance_matrix, describe_components, BoundingBox, Centroid,
    Component, ComponentAnalysis,
};
pub use filter::ComponentFilter;
pub use labeling::connected_components;

use crate::classifier::{ClassifierSummary, LinearClassifier};
use crate::raster::GrayImage;
use serde::{Deserialize, Serialize};

/// Feature algorithms selectable for pipeline step 4.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FeatureAlgorithm {
    /// Descriptors only.
    #[default]
    Components,
    /// Descriptors plus per-component linear scoring.
    Classifier,
}

impl FeatureAlgorithm {
    pub fn name(self) -> &'static str {
        match self {
            FeatureAlgorithm::Components => "components",
            FeatureAlgorithm::Classifier => "classifier",
        }
    }
}

/// Filtering applied to the descriptors handed to later stages.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FeatureOptions {
    /// Minimum component area; `None` uses `max(20, round(0.005% · area))`.
    pub min_area: Option<u32>,
    pub exclude_border_touching: bool,
}

impl FeatureOptions {
    /// Resolve the minimum area for a `w × h` raster.
    pub fn min_area_for(&self, w: usize, h: usize) -> u32 {
        self.min_area
            .unwrap_or_else(|| ((w * h) as f64 * 0.00005).round().max(20.0) as u32)
    }
}

/// Output of the feature stage.
#[derive(Clone, Debug)]
pub struct FeatureOutput {
    /// Every labeled component plus the label map
    pub analysis: ComponentAnalysis,
    /// Components that passed the stage filter; input to the heuristics
    pub components: Vec<Component>,
    pub min_area: u32,
    /// Present for [`FeatureAlgorithm::Classifier`]
    pub classification: Option<ClassifierSummary>,
}

/// Label `mask`, describe components, filter them and optionally score them.
pub fn extract_features(
    mask: &GrayImage,
    algorithm: FeatureAlgorithm,
    options: &FeatureOptions,
) -> FeatureOutput {
    let analysis = analyze_components(mask);
    let min_area = options.min_area_for(mask.w, mask.h);
    let filter = ComponentFilter {
        exclude_border_touching: options.exclude_border_touching,
        ..ComponentFilter::with_min_area(min_area)
    };
    let components = filter.apply(&analysis.components);
    log::debug!(
        "extract_features algorithm={} total={} kept={} min_area={}",
        algorithm.name(),
        analysis.n_components,
        components.len(),
        min_area
    );
    let classification = match algorithm {
        FeatureAlgorithm::Components => None,
        FeatureAlgorithm::Classifier => {
            Some(LinearClassifier::default().summarize(&components, mask.w, mask.h))
        }
    };
    FeatureOutput {
        analysis,
        components,
        min_area,
        classification,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::FOREGROUND;

    #[test]
    fn default_min_area_has_floor_of_20() {
        let opts = FeatureOptions::default();
        assert_eq!(opts.min_area_for(200, 200), 20);
        assert_eq!(opts.min_area_for(1000, 1000), 50);
        let opts = FeatureOptions {
            min_area: Some(5),
            ..FeatureOptions::default()
        };
        assert_eq!(opts.min_area_for(1000, 1000), 5);
    }

    #[test]
    fn small_components_are_dropped_from_the_stage_output() {
        let mut m = GrayImage::new(100, 100);
        for y in 10..20 {
            for x in 10..20 {
                m.set(x, y, FOREGROUND);
            }
        }
        m.set(80, 80, FOREGROUND);
        let out = extract_features(&m, FeatureAlgorithm::Components, &FeatureOptions::default());
        assert_eq!(out.analysis.n_components, 2);
        assert_eq!(out.components.len(), 1);
        assert_eq!(out.components[0].area, 100);
        assert!(out.classification.is_none());

        let out = extract_features(&m, FeatureAlgorithm::Classifier, &FeatureOptions::default());
        let summary = out.classification.expect("classifier summary");
        assert_eq!(summary.total_components, 1);
    }
}
