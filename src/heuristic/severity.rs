//! Severity grading of a fracture verdict.
use super::fracture::FractureAssessment;
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    None,
    Mild,
    Simple,
    Moderate,
    Complex,
}

impl Severity {
    /// Integer grade: none 0, mild/simple 1, moderate 2, complex 3.
    pub fn level(self) -> u8 {
        match self {
            Severity::None => 0,
            Severity::Mild | Severity::Simple => 1,
            Severity::Moderate => 2,
            Severity::Complex => 3,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Severity::None => "No fracture detected",
            Severity::Mild => "Suspected fracture, further examination needed",
            Severity::Simple => "Simple fracture with two main fragments",
            Severity::Moderate => "Moderate fracture, crack or partial break",
            Severity::Complex => "Complex fracture with multiple fragments",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SeverityClassification {
    pub severity: Severity,
    pub level: u8,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Grade from `{n_significant, second_ratio, fragment_ratio}`.
pub fn severity_from_metrics(n_significant: usize, second_ratio: f64, frag_ratio: f64) -> Severity {
    if n_significant >= 4 || (n_significant >= 3 && frag_ratio >= 0.8) {
        Severity::Complex
    } else if n_significant == 3 || (n_significant == 2 && second_ratio < 0.4) {
        Severity::Moderate
    } else if n_significant == 2 {
        Severity::Simple
    } else {
        Severity::Mild
    }
}

/// Grade `assessment`; a negative verdict is always [`Severity::None`].
pub fn classify_severity(assessment: &FractureAssessment) -> SeverityClassification {
    if !assessment.fracture {
        return SeverityClassification {
            severity: Severity::None,
            level: 0,
            description: Severity::None.description().to_string(),
            detail: None,
        };
    }
    let d = &assessment.details;
    let severity = severity_from_metrics(d.n_significant, d.second_ratio, d.frag_ratio);
    let detail = match severity {
        Severity::Complex => format!("{} separate fragments detected", d.n_significant),
        Severity::Moderate => format!("{} abnormal regions detected", d.n_significant),
        Severity::Simple => format!(
            "Second fragment is {}% of the largest",
            (d.second_ratio * 100.0).round()
        ),
        _ => "Abnormal signs present but not conclusive".to_string(),
    };
    SeverityClassification {
        severity,
        level: severity.level(),
        description: severity.description().to_string(),
        detail: Some(detail),
    }
}
