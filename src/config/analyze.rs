use crate::pipeline::{PipelineOptions, StageRequest};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration of the `analyze_radiograph` tool.
#[derive(Debug, Deserialize)]
pub struct AnalyzeToolConfig {
    pub input: PathBuf,
    /// Requests run in order after initialization.
    #[serde(default = "StageRequest::default_plan")]
    pub steps: Vec<StageRequest>,
    #[serde(default)]
    pub pipeline: PipelineOptions,
    pub output: AnalyzeOutputConfig,
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeOutputConfig {
    /// Directory receiving one PNG preview per history entry.
    #[serde(default)]
    pub dir: Option<PathBuf>,
    #[serde(rename = "report_json")]
    pub report_json: PathBuf,
}

pub fn load_config(path: &Path) -> Result<AnalyzeToolConfig, String> {
    let data = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
    parse_config(&data).map_err(|e| format!("Failed to parse config {}: {e}", path.display()))
}

fn parse_config(data: &str) -> Result<AnalyzeToolConfig, serde_json::Error> {
    serde_json::from_str(data)
}
