use super::{distinct_services, mentions_any, PatternCategory, PatternFinding};
use crate::config::Thresholds;
use crate::logs::LogRecord;
use std::collections::HashMap;

pub const AUTHENTICATION_FAILURES: &str = "Authentication Failures";
pub const PERFORMANCE_BOTTLENECKS: &str = "Performance Bottlenecks";

/// Label attached to every pattern. Not derived from the record timestamps.
pub const TIME_RANGE_LABEL: &str = "Last hour";

/// Find recurring messages and keyword clusters.
///
/// Repeated error messages are matched byte-for-byte, so messages that differ
/// only in an embedded id or duration are counted separately.
pub fn detect_patterns(records: &[LogRecord], thresholds: &Thresholds) -> Vec<PatternFinding> {
    let min = thresholds.pattern_min_frequency;
    let mut patterns = Vec::new();

    let mut repeats: HashMap<&str, usize> = HashMap::new();
    for record in records.iter().filter(|r| r.is_error()) {
        *repeats.entry(record.message.as_str()).or_default() += 1;
    }
    let mut repeated: Vec<(&str, usize)> = repeats.into_iter().filter(|(_, n)| *n >= min).collect();
    repeated.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

    for (message, frequency) in repeated {
        // services of every record carrying the message, whatever its level
        let services = distinct_services(records.iter().filter(|r| r.message == message));
        patterns.push(PatternFinding {
            pattern: message.to_string(),
            frequency,
            services,
            time_range: TIME_RANGE_LABEL.to_string(),
            category: PatternCategory::Error,
        });
    }

    let keyword_rules = [
        (AUTHENTICATION_FAILURES, &thresholds.auth_keywords, PatternCategory::Security),
        (PERFORMANCE_BOTTLENECKS, &thresholds.performance_keywords, PatternCategory::Performance),
    ];
    for (label, keywords, category) in keyword_rules {
        let hits: Vec<&LogRecord> = records
            .iter()
            .filter(|r| mentions_any(&r.message, keywords))
            .collect();
        if hits.len() >= min {
            patterns.push(PatternFinding {
                pattern: label.to_string(),
                frequency: hits.len(),
                services: distinct_services(hits.iter().copied()),
                time_range: TIME_RANGE_LABEL.to_string(),
                category,
            });
        }
    }

    patterns
}
