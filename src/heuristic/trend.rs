//! Confidence trend against earlier assessments of the same subject.
use super::fracture::FractureAssessment;
use serde::Serialize;

/// Confidence change (points) below which the trend is stable.
pub const STABLE_BAND: f64 = 10.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    New,
    Stable,
    Improving,
    Declining,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TrendAnalysis {
    pub trend: Trend,
    pub message: String,
}

/// Compare `current` with the mean confidence of `previous`.
pub fn analyze_trend(
    current: &FractureAssessment,
    previous: &[FractureAssessment],
) -> TrendAnalysis {
    if previous.is_empty() {
        return TrendAnalysis {
            trend: Trend::New,
            message: "First analysis for this subject".to_string(),
        };
    }
    let mean = previous.iter().map(|a| a.confidence as f64).sum::<f64>() / previous.len() as f64;
    let delta = current.confidence as f64 - mean;
    let (trend, message) = if delta.abs() < STABLE_BAND {
        (Trend::Stable, "Result is stable compared with previous analyses")
    } else if delta > 0.0 {
        (Trend::Improving, "Confidence increased compared with previous analyses")
    } else {
        (Trend::Declining, "Confidence decreased compared with previous analyses")
    };
    TrendAnalysis {
        trend,
        message: message.to_string(),
    }
}
