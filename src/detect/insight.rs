use super::{percent, AnomalyFinding, PatternCategory, PatternFinding};
use crate::config::Thresholds;
use crate::logs::{LogLevel, LogRecord};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const SERVICE_HEALTH_ALERT: &str = "Service Health Alert";
pub const PERFORMANCE_OPPORTUNITY: &str = "Performance Optimization Opportunity";
pub const SECURITY_MONITORING: &str = "Security Monitoring Required";
pub const POSITIVE_TREND: &str = "Positive System Trend";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightKind {
    Optimization,
    Alert,
    Trend,
    Security,
}

/// A recommendation rendered from findings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    pub title: String,
    pub description: String,
    pub recommendation: String,
    pub impact: Impact,
    #[serde(rename = "type")]
    pub kind: InsightKind,
}

/// Evaluate the insight rule table. Rules are independent; output order is
/// service health, performance, security, success trend.
///
/// The current rules read the batch and the patterns only; anomalies are part
/// of the signature so callers hand over the full result set.
pub fn generate_insights(
    records: &[LogRecord],
    _anomalies: &[AnomalyFinding],
    patterns: &[PatternFinding],
    thresholds: &Thresholds,
) -> Vec<Insight> {
    let total = records.len();
    if total == 0 {
        return Vec::new();
    }
    let mut insights = Vec::new();

    let unhealthy = unhealthy_services(records, thresholds.service_error_rate);
    if !unhealthy.is_empty() {
        insights.push(Insight {
            title: SERVICE_HEALTH_ALERT.to_string(),
            description: format!("{} services showing high error rates", unhealthy.len()),
            recommendation: "Review service configurations and resource allocation".to_string(),
            impact: Impact::High,
            kind: InsightKind::Alert,
        });
    }

    if patterns.iter().any(|p| p.category == PatternCategory::Performance) {
        insights.push(Insight {
            title: PERFORMANCE_OPPORTUNITY.to_string(),
            description: "Recurring performance issues detected across multiple services".to_string(),
            recommendation: "Implement caching, optimize database queries, and review resource limits"
                .to_string(),
            impact: Impact::Medium,
            kind: InsightKind::Optimization,
        });
    }

    if patterns.iter().any(|p| p.category == PatternCategory::Security) {
        insights.push(Insight {
            title: SECURITY_MONITORING.to_string(),
            description: "Multiple authentication failures detected".to_string(),
            recommendation: "Review authentication mechanisms and consider implementing rate limiting"
                .to_string(),
            impact: Impact::High,
            kind: InsightKind::Security,
        });
    }

    let successes = records.iter().filter(|r| r.level == LogLevel::Success).count();
    if successes as f64 / total as f64 > thresholds.success_rate {
        insights.push(Insight {
            title: POSITIVE_TREND.to_string(),
            description: format!(
                "High success rate of {}% indicates healthy system operation",
                percent(successes, total)
            ),
            recommendation: "Maintain current monitoring and alert thresholds".to_string(),
            impact: Impact::Low,
            kind: InsightKind::Trend,
        });
    }

    insights
}

/// Services whose own error rate exceeds `limit`, sorted by name.
pub fn unhealthy_services(records: &[LogRecord], limit: f64) -> Vec<String> {
    let mut tally: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
    for record in records {
        let entry = tally.entry(record.service.as_str()).or_default();
        entry.0 += 1;
        if record.is_error() {
            entry.1 += 1;
        }
    }
    tally
        .into_iter()
        .filter(|(_, (seen, errors))| *errors as f64 / *seen as f64 > limit)
        .map(|(service, _)| service.to_string())
        .collect()
}
