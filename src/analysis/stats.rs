use crate::logs::{LogLevel, LogRecord};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Number of services listed in the breakdown.
pub const TOP_SERVICES: usize = 6;
/// Error rate (percent) above which the batch is flagged.
pub const ELEVATED_ERROR_PCT: f64 = 5.0;
/// Success rate (percent) above which the batch is considered healthy.
pub const HEALTHY_SUCCESS_PCT: f64 = 70.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelCount {
    pub level: LogLevel,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceCount {
    pub service: String,
    pub count: usize,
    pub error_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourBucket {
    /// `"14:00"`
    pub time: String,
    pub hour: u32,
    pub total: usize,
    pub errors: usize,
}

/// Dashboard summary of a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogMetrics {
    pub total: usize,
    pub error_count: usize,
    pub warn_count: usize,
    pub info_count: usize,
    pub debug_count: usize,
    pub success_count: usize,
    /// Percent, 0.0 for an empty batch.
    pub error_rate: f64,
    pub success_rate: f64,
    pub error_rate_elevated: bool,
    pub success_rate_healthy: bool,
    /// Non-zero levels only, ordered error, warn, success, info, debug.
    pub level_distribution: Vec<LevelCount>,
    pub top_services: Vec<ServiceCount>,
    pub hourly: Vec<HourBucket>,
    /// Records left out of `hourly` because their timestamp did not parse.
    pub skipped_timestamps: usize,
}

impl LogMetrics {
    pub fn compute(records: &[LogRecord]) -> Self {
        let total = records.len();

        let mut by_level: HashMap<LogLevel, usize> = HashMap::new();
        for record in records {
            *by_level.entry(record.level).or_default() += 1;
        }
        let count = |level: LogLevel| by_level.get(&level).copied().unwrap_or(0);

        let error_rate = pct(count(LogLevel::Error), total);
        let success_rate = pct(count(LogLevel::Success), total);

        let level_distribution = [
            LogLevel::Error,
            LogLevel::Warn,
            LogLevel::Success,
            LogLevel::Info,
            LogLevel::Debug,
        ]
        .into_iter()
        .map(|level| LevelCount {
            level,
            count: count(level),
        })
        .filter(|lc| lc.count > 0)
        .collect();

        let mut services: HashMap<&str, (usize, usize)> = HashMap::new();
        for record in records {
            let entry = services.entry(record.service.as_str()).or_default();
            entry.0 += 1;
            if record.is_error() {
                entry.1 += 1;
            }
        }
        let mut top_services: Vec<ServiceCount> = services
            .into_iter()
            .map(|(service, (count, error_count))| ServiceCount {
                service: service.to_string(),
                count,
                error_count,
            })
            .collect();
        top_services.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.service.cmp(&b.service)));
        top_services.truncate(TOP_SERVICES);

        let mut hours: BTreeMap<u32, (usize, usize)> = BTreeMap::new();
        let mut skipped_timestamps = 0;
        for record in records {
            match record.hour() {
                Some(hour) => {
                    let bucket = hours.entry(hour).or_default();
                    bucket.0 += 1;
                    if record.is_error() {
                        bucket.1 += 1;
                    }
                }
                None => skipped_timestamps += 1,
            }
        }
        let hourly = hours
            .into_iter()
            .map(|(hour, (total, errors))| HourBucket {
                time: format!("{}:00", hour),
                hour,
                total,
                errors,
            })
            .collect();

        Self {
            total,
            error_count: count(LogLevel::Error),
            warn_count: count(LogLevel::Warn),
            info_count: count(LogLevel::Info),
            debug_count: count(LogLevel::Debug),
            success_count: count(LogLevel::Success),
            error_rate,
            success_rate,
            error_rate_elevated: error_rate > ELEVATED_ERROR_PCT,
            success_rate_healthy: success_rate > HEALTHY_SUCCESS_PCT,
            level_distribution,
            top_services,
            hourly,
            skipped_timestamps,
        }
    }
}

fn pct(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    part as f64 / whole as f64 * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(ts: &str, level: LogLevel, service: &str) -> LogRecord {
        LogRecord::new("id", ts, level, service, "msg")
    }

    #[test]
    fn test_empty_batch() {
        let m = LogMetrics::compute(&[]);
        assert_eq!(m.total, 0);
        assert_eq!(m.error_rate, 0.0);
        assert!(m.level_distribution.is_empty());
        assert!(m.hourly.is_empty());
        assert!(!m.error_rate_elevated);
    }

    #[test]
    fn test_levels_and_rates() {
        let logs = vec![
            rec("2024-01-15 14:00:00", LogLevel::Error, "api"),
            rec("2024-01-15 14:10:00", LogLevel::Success, "api"),
            rec("2024-01-15 15:00:00", LogLevel::Success, "db"),
            rec("2024-01-15 09:00:00", LogLevel::Info, "db"),
        ];
        let m = LogMetrics::compute(&logs);
        assert_eq!(m.error_rate, 25.0);
        assert_eq!(m.success_rate, 50.0);
        assert!(m.error_rate_elevated);
        assert!(!m.success_rate_healthy);
        let levels: Vec<LogLevel> = m.level_distribution.iter().map(|l| l.level).collect();
        assert_eq!(levels, vec![LogLevel::Error, LogLevel::Success, LogLevel::Info]);
    }

    #[test]
    fn test_hourly_buckets_skip_bad_timestamps() {
        let logs = vec![
            rec("2024-01-15 14:00:00", LogLevel::Error, "api"),
            rec("2024-01-15 14:59:59", LogLevel::Info, "api"),
            rec("2024-01-15 09:30:00", LogLevel::Info, "api"),
            rec("garbage", LogLevel::Error, "api"),
        ];
        let m = LogMetrics::compute(&logs);
        assert_eq!(m.skipped_timestamps, 1);
        assert_eq!(m.hourly.len(), 2);
        assert_eq!(m.hourly[0].time, "9:00");
        assert_eq!(m.hourly[1].hour, 14);
        assert_eq!(m.hourly[1].total, 2);
        assert_eq!(m.hourly[1].errors, 1);
        // the malformed record still counts toward totals
        assert_eq!(m.error_count, 2);
    }

    #[test]
    fn test_top_services_truncated_and_sorted() {
        let mut logs = Vec::new();
        for (i, name) in ["a", "b", "c", "d", "e", "f", "g"].iter().enumerate() {
            for _ in 0..=i {
                logs.push(rec("2024-01-15 14:00:00", LogLevel::Info, name));
            }
        }
        logs.push(rec("2024-01-15 14:00:00", LogLevel::Error, "g"));
        let m = LogMetrics::compute(&logs);
        assert_eq!(m.top_services.len(), TOP_SERVICES);
        assert_eq!(m.top_services[0].service, "g");
        assert_eq!(m.top_services[0].error_count, 1);
        assert!(m.top_services.iter().all(|s| s.service != "a"));
    }
}
