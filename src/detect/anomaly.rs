use super::{distinct_services, mentions_any, percent, AnomalyFinding, Severity, Trend};
use crate::config::Thresholds;
use crate::logs::LogRecord;
use std::collections::BTreeMap;

pub const HIGH_ERROR_RATE: &str = "High Error Rate";
pub const SERVICE_ERROR_CONCENTRATION: &str = "Service Error Concentration";
pub const PERFORMANCE_DEGRADATION: &str = "Performance Degradation";

/// Flag ratio-based anomalies in a batch.
///
/// Rules, each independent:
/// 1. error share of the batch above `thresholds.error_rate` (critical)
/// 2. one service owning more than `thresholds.service_error_share` of all errors (high, per service)
/// 3. more than `thresholds.degradation_min_count` records mentioning memory/timeout (medium)
///
/// Empty batches produce no findings.
pub fn detect_anomalies(records: &[LogRecord], thresholds: &Thresholds) -> Vec<AnomalyFinding> {
    let total = records.len();
    if total == 0 {
        return Vec::new();
    }

    let errors: Vec<&LogRecord> = records.iter().filter(|r| r.is_error()).collect();
    let error_count = errors.len();
    let mut anomalies = Vec::new();

    // 1. Error rate
    let error_rate = error_count as f64 / total as f64;
    if error_rate > thresholds.error_rate {
        anomalies.push(AnomalyFinding {
            kind: HIGH_ERROR_RATE.to_string(),
            severity: Severity::Critical,
            description: format!(
                "Error rate of {}% is above normal threshold",
                percent(error_count, total)
            ),
            count: error_count,
            trend: Trend::Increasing,
            services: distinct_services(errors.iter().copied()),
        });
    }

    // 2. Service concentration
    let mut per_service: BTreeMap<&str, usize> = BTreeMap::new();
    for record in &errors {
        *per_service.entry(record.service.as_str()).or_default() += 1;
    }
    let share_floor = error_count as f64 * thresholds.service_error_share;
    for (service, count) in per_service {
        if count as f64 > share_floor {
            anomalies.push(AnomalyFinding {
                kind: SERVICE_ERROR_CONCENTRATION.to_string(),
                severity: Severity::High,
                description: format!(
                    "{} is generating {} errors ({}% of total)",
                    service,
                    count,
                    percent(count, error_count)
                ),
                count,
                trend: Trend::Increasing,
                services: [service.to_string()].into_iter().collect(),
            });
        }
    }

    // 3. Memory / timeout mentions, any level
    let degraded: Vec<&LogRecord> = records
        .iter()
        .filter(|r| mentions_any(&r.message, &thresholds.degradation_keywords))
        .collect();
    if degraded.len() > thresholds.degradation_min_count {
        anomalies.push(AnomalyFinding {
            kind: PERFORMANCE_DEGRADATION.to_string(),
            severity: Severity::Medium,
            description: format!("{} performance-related issues detected", degraded.len()),
            count: degraded.len(),
            trend: Trend::Stable,
            services: distinct_services(degraded.iter().copied()),
        });
    }

    anomalies
}
