//! Heuristic decision layer (pipeline step 5).
//!
//! `Fracture → Severity → Report`: each state consumes the previous one's
//! result. The controller resolves missing states before running a later one.

pub mod alignment;
pub mod fracture;
pub mod report;
pub mod severity;
pub mod trend;

pub use alignment::{check_alignment, AlignmentDetails};
pub use fracture::{analyze_fracture, FractureAssessment, FractureDetails, FractureOptions};
pub use report::{generate_report, recommendation, Report, ReportComponent, ReportSummary};
pub use severity::{classify_severity, severity_from_metrics, Severity, SeverityClassification};
pub use trend::{analyze_trend, Trend, TrendAnalysis};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Heuristic states, in dependency order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HeuristicAlgorithm {
    Fracture,
    Severity,
    #[default]
    Report,
}

impl HeuristicAlgorithm {
    pub fn name(self) -> &'static str {
        match self {
            HeuristicAlgorithm::Fracture => "fracture",
            HeuristicAlgorithm::Severity => "severity",
            HeuristicAlgorithm::Report => "report",
        }
    }
}

impl fmt::Display for HeuristicAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Request for one heuristic state.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeuristicRequest {
    pub algorithm: HeuristicAlgorithm,
    /// Overrides the controller's configured [`FractureOptions`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<FractureOptions>,
}

impl HeuristicRequest {
    pub fn new(algorithm: HeuristicAlgorithm) -> Self {
        Self {
            algorithm,
            options: None,
        }
    }

    pub fn with_options(mut self, options: FractureOptions) -> Self {
        self.options = Some(options);
        self
    }
}
