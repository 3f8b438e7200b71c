//! Batch-level aggregation and the analysis run lifecycle.

pub mod runner;
pub mod stats;

pub use runner::{AnalysisRun, ProgressEvent};
pub use stats::LogMetrics;
