//! Threshold heuristics over a log batch: anomalies, recurring patterns, insights.

pub mod anomaly;
pub mod engine;
pub mod insight;
pub mod pattern;

use crate::logs::LogRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub use anomaly::detect_anomalies;
pub use engine::{AnalysisReport, LogInsightEngine};
pub use insight::{generate_insights, Impact, Insight, InsightKind};
pub use pattern::detect_patterns;

/// Severity of an anomaly finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
}

/// Reported direction of an anomaly. Fixed per rule, never measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Increasing,
    Decreasing,
    Stable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternCategory {
    Error,
    Performance,
    Security,
    Usage,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyFinding {
    #[serde(rename = "type")]
    pub kind: String,
    pub severity: Severity,
    pub description: String,
    pub count: usize,
    pub trend: Trend,
    pub services: BTreeSet<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternFinding {
    pub pattern: String,
    pub frequency: usize,
    pub services: BTreeSet<String>,
    pub time_range: String,
    pub category: PatternCategory,
}

/// Case-insensitive substring match against any of `keywords`.
pub(crate) fn mentions_any(message: &str, keywords: &[String]) -> bool {
    let message = message.to_lowercase();
    keywords
        .iter()
        .any(|k| !k.is_empty() && message.contains(&k.to_lowercase()))
}

pub(crate) fn distinct_services<'a, I>(records: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = &'a LogRecord>,
{
    records.into_iter().map(|r| r.service.clone()).collect()
}

/// `part / whole` as a percentage with one decimal, e.g. `"15.0"`.
pub(crate) fn percent(part: usize, whole: usize) -> String {
    if whole == 0 {
        return "0.0".to_string();
    }
    format!("{:.1}", part as f64 / whole as f64 * 100.0)
}
