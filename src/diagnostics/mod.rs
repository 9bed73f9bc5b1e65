//! Run diagnostics: per-stage timings collected by the controller.

pub mod timing;

pub use timing::{elapsed_ms, StageTiming, TimingBreakdown};
