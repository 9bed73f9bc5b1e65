//! Fracture verdict from the population of significant components.
use super::alignment::{check_alignment, AlignmentDetails};
use crate::features::{Centroid, Component};
use serde::{Deserialize, Serialize};

/// Normalised centroid distance above which a fragment counts as distant.
pub const DISTANT_FRAGMENT: f64 = 0.15;
/// Share of border-touching components that lowers confidence.
pub const BORDER_RATIO_LIMIT: f64 = 0.7;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FractureOptions {
    /// Area floor for significant components; `None` uses `max(50, round(0.03% · area))`.
    pub min_significant_area: Option<u32>,
    /// Image scale used by the alignment gap test
    pub px_per_mm: f64,
}

impl Default for FractureOptions {
    fn default() -> Self {
        Self {
            min_significant_area: None,
            px_per_mm: 3.0,
        }
    }
}

impl FractureOptions {
    pub fn min_significant_area_for(&self, w: usize, h: usize) -> u32 {
        self.min_significant_area
            .unwrap_or_else(|| ((w * h) as f64 * 0.0003).round().max(50.0) as u32)
    }
}

/// Metrics behind a [`FractureAssessment`]. Ratios are rounded to 2 decimals,
/// `mask_pct` is a percentage.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FractureDetails {
    pub n_components: usize,
    pub n_significant: usize,
    pub largest_area: u32,
    pub second_area: u32,
    pub third_area: u32,
    pub second_ratio: f64,
    pub frag_ratio: f64,
    pub mask_pct: f64,
    pub border_ratio: f64,
    pub has_distant_fragments: bool,
    pub max_distance: f64,
    pub alignment_detected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alignment_details: Option<AlignmentDetails>,
    pub min_significant_area: u32,
    pub relaxed_floor: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FractureAssessment {
    pub fracture: bool,
    /// 0..=100
    pub confidence: u8,
    pub reason: String,
    pub details: FractureDetails,
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

fn clamp_confidence(c: i32) -> u8 {
    c.clamp(0, 100) as u8
}

/// Decide whether `components` (already stage-filtered) indicate a fracture
/// in a `w × h` raster.
pub fn analyze_fracture(
    components: &[Component],
    w: usize,
    h: usize,
    options: &FractureOptions,
) -> FractureAssessment {
    let image_area = (w * h) as f64;
    let total_area: u64 = components.iter().map(|c| c.area as u64).sum();
    let mask_pct = if image_area > 0.0 {
        total_area as f64 / image_area
    } else {
        0.0
    };
    let min_area = options.min_significant_area_for(w, h);

    if components.is_empty() {
        log::debug!("analyze_fracture no components");
        return FractureAssessment {
            fracture: false,
            confidence: 95,
            reason: "No abnormal regions detected".to_string(),
            details: FractureDetails {
                min_significant_area: min_area,
                ..FractureDetails::default()
            },
        };
    }

    let mut floor = min_area;
    let mut relaxed = false;
    let mut significant: Vec<&Component> = components.iter().filter(|c| c.area >= floor).collect();
    if significant.is_empty() {
        floor = (min_area / 2).max(20);
        relaxed = true;
        significant = components.iter().filter(|c| c.area >= floor).collect();
        log::debug!(
            "analyze_fracture relaxing floor {min_area} -> {floor}, kept={}",
            significant.len()
        );
    }

    if significant.is_empty() {
        return FractureAssessment {
            fracture: false,
            confidence: 90,
            reason: "Only small noise detected, no significant abnormal region".to_string(),
            details: FractureDetails {
                n_components: components.len(),
                mask_pct: round2(mask_pct * 100.0),
                min_significant_area: floor,
                relaxed_floor: relaxed,
                ..FractureDetails::default()
            },
        };
    }

    significant.sort_by(|a, b| b.area.cmp(&a.area));
    let n = significant.len();
    let largest = significant[0].area;
    let second = significant.get(1).map_or(0, |c| c.area);
    let third = significant.get(2).map_or(0, |c| c.area);
    let sum_sig: u64 = significant.iter().map(|c| c.area as u64).sum();
    let (second_ratio, frag_ratio) = if largest > 0 {
        (
            second as f64 / largest as f64,
            (sum_sig - largest as u64) as f64 / largest as f64,
        )
    } else {
        (0.0, 0.0)
    };

    let diagonal = (w as f64).hypot(h as f64);
    let anchor = significant[0].centroid;
    let distances: Vec<f64> = significant[1..]
        .iter()
        .map(|c| {
            if diagonal > 0.0 {
                c.centroid.distance(&anchor) / diagonal
            } else {
                0.0
            }
        })
        .collect();
    let has_distant_fragments = distances.iter().any(|&d| d > DISTANT_FRAGMENT);
    let max_distance = distances.iter().copied().fold(0.0, f64::max);
    let border_ratio = significant.iter().filter(|c| c.touches_border).count() as f64 / n as f64;

    let (fracture, mut confidence, mut reason) = if n >= 2 {
        if second_ratio >= 0.15 {
            (
                true,
                (60 + (second_ratio * 100.0).round() as i32).min(95),
                format!(
                    "{n} separate fragments, second largest is {}% of the largest",
                    (second_ratio * 100.0).round()
                ),
            )
        } else if n >= 3 && frag_ratio >= 0.3 {
            (
                true,
                (50 + (frag_ratio * 80.0).round() as i32).min(90),
                format!("{n} scattered fragments"),
            )
        } else if has_distant_fragments {
            (true, 75, "Fragments spread far apart".to_string())
        } else {
            (true, 65, format!("Abnormal pattern with {n} separate regions"))
        }
    } else {
        let c = significant[0];
        let elongated = c.aspect_ratio > 5.0;
        let irregular = c.circularity < 0.3 && mask_pct > 0.05;
        if elongated || irregular {
            (true, 70, "Single region with suspicious shape".to_string())
        } else {
            (
                false,
                80,
                "Single homogeneous region, no clear fracture sign".to_string(),
            )
        }
    };

    if fracture && border_ratio > BORDER_RATIO_LIMIT {
        confidence = (confidence - 15).max(40);
        reason.push_str(" (confidence lowered: most regions touch the border)");
    }

    let alignment = if n >= 2 {
        let centroids: Vec<Centroid> = significant.iter().map(|c| c.centroid).collect();
        check_alignment(&centroids, diagonal, options.px_per_mm)
    } else {
        None
    };
    let alignment_detected = alignment.as_ref().is_some_and(|a| a.aligned);
    if alignment_detected {
        if fracture {
            confidence = (confidence - 15).max(30);
            reason.push_str(" (confidence lowered: fragments are aligned along one axis)");
        } else {
            reason.push_str(
                " (components are aligned along one axis, consistent with normal anatomy)",
            );
        }
    }

    log::debug!(
        "analyze_fracture n_significant={n} second_ratio={second_ratio:.3} \
         frag_ratio={frag_ratio:.3} fracture={fracture} confidence={confidence}"
    );
    FractureAssessment {
        fracture,
        confidence: clamp_confidence(confidence),
        reason,
        details: FractureDetails {
            n_components: components.len(),
            n_significant: n,
            largest_area: largest,
            second_area: second,
            third_area: third,
            second_ratio: round2(second_ratio),
            frag_ratio: round2(frag_ratio),
            mask_pct: round2(mask_pct * 100.0),
            border_ratio: round2(border_ratio),
            has_distant_fragments,
            max_distance: round2(max_distance),
            alignment_detected,
            alignment_details: alignment,
            min_significant_area: floor,
            relaxed_floor: relaxed,
        },
    }
}
