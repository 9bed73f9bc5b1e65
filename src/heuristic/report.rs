//! Final report: verdict, severity, metrics and rounded component list.
use super::fracture::{FractureAssessment, FractureDetails};
use super::severity::{Severity, SeverityClassification};
use crate::features::{BoundingBox, Centroid, Component};
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub has_fracture: bool,
    pub confidence: u8,
    pub severity: Severity,
    pub description: String,
}

/// Component entry with `aspect_ratio` rounded to 2 and `circularity` to 3 decimals.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportComponent {
    pub label: u32,
    pub area: u32,
    pub centroid: Centroid,
    pub bounding_box: BoundingBox,
    pub aspect_ratio: f64,
    pub circularity: f64,
    pub touches_border: bool,
}

impl From<&Component> for ReportComponent {
    fn from(c: &Component) -> Self {
        Self {
            label: c.label,
            area: c.area,
            centroid: c.centroid,
            bounding_box: c.bounding_box,
            aspect_ratio: (c.aspect_ratio * 100.0).round() / 100.0,
            circularity: (c.circularity * 1000.0).round() / 1000.0,
            touches_border: c.touches_border,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub summary: ReportSummary,
    pub metrics: FractureDetails,
    pub components: Vec<ReportComponent>,
    pub recommendation: String,
}

/// Advice text for a verdict/severity pair.
pub fn recommendation(fracture: bool, severity: Severity) -> &'static str {
    if !fracture {
        return "No clear sign of fracture. If symptoms persist, consult a physician.";
    }
    match severity {
        Severity::Simple => {
            "Simple fracture detected. See a physician for confirmation and treatment."
        }
        Severity::Moderate => {
            "Signs of fracture detected. See a physician promptly for a detailed examination."
        }
        Severity::Complex => {
            "Complex fracture with multiple fragments detected. \
             Seek medical attention immediately."
        }
        _ => "Further examination by a specialist is needed.",
    }
}

/// Aggregate without further computation.
pub fn generate_report(
    assessment: &FractureAssessment,
    components: &[Component],
    severity: &SeverityClassification,
) -> Report {
    Report {
        summary: ReportSummary {
            has_fracture: assessment.fracture,
            confidence: assessment.confidence,
            severity: severity.severity,
            description: severity.description.clone(),
        },
        metrics: assessment.details.clone(),
        components: components.iter().map(ReportComponent::from).collect(),
        recommendation: recommendation(assessment.fracture, severity.severity).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heuristic::{analyze_fracture, classify_severity, FractureOptions};

    fn comp(label: u32, area: u32, cx: f64) -> Component {
        Component {
            label,
            area,
            centroid: Centroid { x: cx, y: 50.0 },
            bounding_box: BoundingBox::default(),
            perimeter: 10,
            aspect_ratio: 1.23456,
            extent: 1.0,
            circularity: 0.785398,
            touches_border: false,
        }
    }

    #[test]
    fn report_rounds_component_fields() {
        let comps = vec![comp(1, 100, 10.0), comp(2, 64, 180.0)];
        let assessment = analyze_fracture(&comps, 200, 200, &FractureOptions::default());
        let severity = classify_severity(&assessment);
        let report = generate_report(&assessment, &comps, &severity);
        assert!(report.summary.has_fracture);
        assert_eq!(report.summary.severity, Severity::Simple);
        assert_eq!(report.components.len(), 2);
        assert_eq!(report.components[0].aspect_ratio, 1.23);
        assert_eq!(report.components[0].circularity, 0.785);
        assert_eq!(report.recommendation, recommendation(true, Severity::Simple));
        assert_eq!(report.metrics, assessment.details);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["summary"]["hasFracture"], true);
        assert_eq!(json["metrics"]["nSignificant"], 2);
    }

    #[test]
    fn negative_recommendation_ignores_severity() {
        assert_eq!(
            recommendation(false, Severity::Complex),
            recommendation(false, Severity::None)
        );
    }
}
