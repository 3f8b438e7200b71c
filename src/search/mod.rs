//! Pre-analysis filtering: free-text query plus level and service selections.
//!
//! This runs before a batch reaches the insight engine and is independent of it.

pub mod highlight;

use crate::logs::{LogLevel, LogRecord};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use highlight::{highlight, Segment};

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("invalid search pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Filter state, as toggled from a filter panel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchFilter {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub levels: Vec<LogLevel>,
    #[serde(default)]
    pub services: Vec<String>,
}

impl SearchFilter {
    pub fn with_query(query: impl Into<String>) -> Self {
        Self {
            query: Some(query.into()),
            ..Self::default()
        }
    }

    /// Add the level if absent, remove it if present.
    pub fn toggle_level(&mut self, level: LogLevel) {
        if let Some(pos) = self.levels.iter().position(|l| *l == level) {
            self.levels.remove(pos);
        } else {
            self.levels.push(level);
        }
    }

    pub fn toggle_service(&mut self, service: &str) {
        if let Some(pos) = self.services.iter().position(|s| s == service) {
            self.services.remove(pos);
        } else {
            self.services.push(service.to_string());
        }
    }

    /// Drop level and service selections. The query is kept.
    pub fn clear(&mut self) {
        self.levels.clear();
        self.services.clear();
    }

    pub fn active_filters(&self) -> usize {
        self.levels.len() + self.services.len()
    }

    pub fn matches(&self, record: &LogRecord) -> bool {
        if let Some(query) = self.normalized_query() {
            let hit = record.message.to_lowercase().contains(&query)
                || record.service.to_lowercase().contains(&query)
                || record.level.as_str().contains(&query);
            if !hit {
                return false;
            }
        }
        if !self.levels.is_empty() && !self.levels.contains(&record.level) {
            return false;
        }
        if !self.services.is_empty() && !self.services.iter().any(|s| *s == record.service) {
            return false;
        }
        true
    }

    pub fn apply(&self, records: &[LogRecord]) -> Vec<LogRecord> {
        records.iter().filter(|r| self.matches(r)).cloned().collect()
    }

    fn normalized_query(&self) -> Option<String> {
        self.query
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(str::to_lowercase)
    }
}

/// A canned query offered next to the search box.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Suggestion {
    pub title: &'static str,
    pub query: &'static str,
    pub description: &'static str,
    pub severity: &'static str,
}

pub const SUGGESTIONS: [Suggestion; 4] = [
    Suggestion {
        title: "Recent Errors",
        query: "show errors from last hour",
        description: "Find critical issues that need attention",
        severity: "high",
    },
    Suggestion {
        title: "Performance Issues",
        query: "slow queries and timeouts",
        description: "Identify performance bottlenecks",
        severity: "medium",
    },
    Suggestion {
        title: "Payment Service Logs",
        query: "payment-api logs today",
        description: "Monitor payment processing",
        severity: "low",
    },
    Suggestion {
        title: "Auth Failures",
        query: "authentication failures",
        description: "Security-related log events",
        severity: "high",
    },
];
