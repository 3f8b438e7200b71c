//! Seeded mock-log generator for demos and tests.

use super::{LogLevel, LogRecord};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde_json::{json, Map, Value};

pub const DEFAULT_SAMPLE_SIZE: usize = 380;

/// Newest timestamp of a sample batch unless another base is given.
pub fn default_base() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 15)
        .and_then(|d| d.and_hms_opt(15, 0, 0))
        .unwrap_or_default()
}

const SERVICES: [&str; 6] = [
    "auth-service",
    "payment-api",
    "user-management",
    "notification-service",
    "analytics-pipeline",
    "email-service",
];

const ERROR_MESSAGES: [&str; 6] = [
    "Database connection timeout after 30s",
    "Failed to authenticate user: invalid token",
    "Payment processing failed: insufficient funds",
    "External API rate limit exceeded",
    "Memory allocation failed for user session",
    "Critical system error: disk space exceeded 95%",
];

const WARN_MESSAGES: [&str; 6] = [
    "High CPU usage detected: 85%",
    "Slow database query detected: 2.5s execution time",
    "Cache miss rate above threshold: 15%",
    "Deprecated API endpoint called",
    "Large payload detected: 10MB request size",
    "Session timeout approaching for user",
];

const INFO_MESSAGES: [&str; 6] = [
    "User successfully authenticated",
    "Payment transaction completed",
    "Email notification sent",
    "Cache refreshed successfully",
    "API request processed",
    "Health check passed",
];

const DEBUG_MESSAGES: [&str; 6] = [
    "Function execution started",
    "Variable state updated",
    "Cache lookup performed",
    "API response received",
    "Database query executed",
    "Memory usage checked",
];

const SUCCESS_MESSAGES: [&str; 6] = [
    "Backup completed successfully",
    "Data migration finished",
    "Service deployment complete",
    "Security scan passed",
    "Performance optimization applied",
    "System recovery successful",
];

/// Produces a reproducible batch of records: same seed and base time, same batch.
/// [`SampleGenerator::new`] counts back from [`default_base`].
pub struct SampleGenerator {
    rng: StdRng,
    base: NaiveDateTime,
}

impl SampleGenerator {
    pub fn new(seed: u64) -> Self {
        Self::with_base(seed, default_base())
    }

    pub fn with_base(seed: u64, base: NaiveDateTime) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            base,
        }
    }

    /// Generate `count` records, one per minute going back from the base
    /// time, sorted newest first.
    pub fn generate(&mut self, count: usize) -> Vec<LogRecord> {
        let mut records = Vec::with_capacity(count);
        let mut stamps = Vec::with_capacity(count);

        for i in 0..count {
            let jitter_ms = self.rng.gen_range(0..60_000);
            let ts = self.base - Duration::minutes(i as i64) - Duration::milliseconds(jitter_ms);
            let service = *SERVICES.choose(&mut self.rng).unwrap_or(&SERVICES[0]);

            let (level, message, metadata) = self.pick_level();

            records.push(LogRecord {
                id: format!("log-{}", i),
                timestamp: ts.format("%Y-%m-%d %H:%M:%S").to_string(),
                level,
                service: service.to_string(),
                message: message.to_string(),
                metadata,
            });
            stamps.push(ts);
        }

        let mut indexed: Vec<(NaiveDateTime, LogRecord)> = stamps.into_iter().zip(records).collect();
        indexed.sort_by(|a, b| b.0.cmp(&a.0));
        indexed.into_iter().map(|(_, r)| r).collect()
    }

    // 6% error, 12% warn, 41% info, 23% debug, 18% success
    fn pick_level(&mut self) -> (LogLevel, &'static str, Option<Map<String, Value>>) {
        let roll: f64 = self.rng.gen();
        if roll < 0.06 {
            let metadata = object(json!({
                "error_code": format!("E{}", self.rng.gen_range(1000..10000)),
                "trace_id": format!("trace-{}", self.base36(9)),
                "user_id": self.rng.gen_range(0..10000),
            }));
            (LogLevel::Error, self.pick(&ERROR_MESSAGES), metadata)
        } else if roll < 0.18 {
            let metadata = object(json!({
                "threshold": self.rng.gen_range(0..100),
                "current_value": self.rng.gen_range(0..100),
            }));
            (LogLevel::Warn, self.pick(&WARN_MESSAGES), metadata)
        } else if roll < 0.59 {
            (LogLevel::Info, self.pick(&INFO_MESSAGES), None)
        } else if roll < 0.82 {
            (LogLevel::Debug, self.pick(&DEBUG_MESSAGES), None)
        } else {
            let metadata = object(json!({
                "duration_ms": self.rng.gen_range(0..5000),
                "status": "completed",
            }));
            (LogLevel::Success, self.pick(&SUCCESS_MESSAGES), metadata)
        }
    }

    fn pick(&mut self, table: &[&'static str]) -> &'static str {
        table.choose(&mut self.rng).copied().unwrap_or_default()
    }

    fn base36(&mut self, len: usize) -> String {
        const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
        (0..len)
            .map(|_| ALPHABET[self.rng.gen_range(0..ALPHABET.len())] as char)
            .collect()
    }
}

fn object(value: Value) -> Option<Map<String, Value>> {
    match value {
        Value::Object(map) => Some(map),
        _ => None,
    }
}
