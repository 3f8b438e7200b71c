use crate::config::Thresholds;
use crate::detect::{
    detect_anomalies, detect_patterns, generate_insights, AnomalyFinding, Insight, PatternFinding,
};
use crate::logs::LogRecord;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

/// Everything one analysis run produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub record_count: usize,
    pub anomalies: Vec<AnomalyFinding>,
    pub patterns: Vec<PatternFinding>,
    pub insights: Vec<Insight>,
}

impl AnalysisReport {
    pub fn empty() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            record_count: 0,
            anomalies: Vec::new(),
            patterns: Vec::new(),
            insights: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.anomalies.is_empty() && self.patterns.is_empty() && self.insights.is_empty()
    }
}

/// Stateless runner for the anomaly, pattern and insight rules.
///
/// Holds only its thresholds; each call recomputes from the batch it is given.
#[derive(Debug, Clone, Default)]
pub struct LogInsightEngine {
    thresholds: Thresholds,
}

impl LogInsightEngine {
    pub fn new(thresholds: Thresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    pub fn detect_anomalies(&self, records: &[LogRecord]) -> Vec<AnomalyFinding> {
        detect_anomalies(records, &self.thresholds)
    }

    pub fn detect_patterns(&self, records: &[LogRecord]) -> Vec<PatternFinding> {
        detect_patterns(records, &self.thresholds)
    }

    pub fn generate_insights(
        &self,
        records: &[LogRecord],
        anomalies: &[AnomalyFinding],
        patterns: &[PatternFinding],
    ) -> Vec<Insight> {
        generate_insights(records, anomalies, patterns, &self.thresholds)
    }

    /// Run all three stages over the batch.
    pub fn analyze(&self, records: &[LogRecord]) -> AnalysisReport {
        if records.is_empty() {
            debug!("empty batch, skipping analysis");
            return AnalysisReport::empty();
        }

        let anomalies = self.detect_anomalies(records);
        let patterns = self.detect_patterns(records);
        let insights = self.generate_insights(records, &anomalies, &patterns);

        let report = AnalysisReport {
            run_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            record_count: records.len(),
            anomalies,
            patterns,
            insights,
        };
        info!(
            run_id = %report.run_id,
            records = report.record_count,
            anomalies = report.anomalies.len(),
            patterns = report.patterns.len(),
            insights = report.insights.len(),
            "log analysis complete"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logs::LogLevel;

    #[test]
    fn test_empty_batch_report() {
        let report = LogInsightEngine::default().analyze(&[]);
        assert_eq!(report.record_count, 0);
        assert!(report.is_empty());
    }

    #[test]
    fn test_custom_thresholds_are_used() {
        let logs = vec![
            LogRecord::new("1", "2024-01-15 14:00:00", LogLevel::Error, "api", "boom"),
            LogRecord::new("2", "2024-01-15 14:00:01", LogLevel::Info, "api", "ok"),
            LogRecord::new("3", "2024-01-15 14:00:02", LogLevel::Info, "api", "ok"),
        ];
        let strict = LogInsightEngine::new(Thresholds {
            error_rate: 0.5,
            ..Thresholds::default()
        });
        assert!(strict
            .detect_anomalies(&logs)
            .iter()
            .all(|a| a.kind != crate::detect::anomaly::HIGH_ERROR_RATE));

        let report = LogInsightEngine::default().analyze(&logs);
        assert_eq!(report.record_count, 3);
        assert!(report
            .anomalies
            .iter()
            .any(|a| a.kind == crate::detect::anomaly::HIGH_ERROR_RATE));
    }
}
