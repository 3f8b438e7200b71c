//! TOML configuration for logsift.
//!
//! Every section has compiled-in defaults, so an empty file (or no file at
//! all) yields the stock heuristics. The config file path can be given on the
//! command line, through `LOGSIFT_CONFIG`, or as `./logsift.toml`.

use std::ffi::OsStr;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

pub const CONFIG_ENV: &str = "LOGSIFT_CONFIG";
pub const LOCAL_CONFIG: &str = "logsift.toml";

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogsiftConfig {
    #[serde(default)]
    pub thresholds: Thresholds,
    #[serde(default)]
    pub progress: ProgressConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl LogsiftConfig {
    /// Load configuration from a TOML file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        let config = Self::from_toml(&content)
            .with_context(|| format!("failed to parse config file: {}", path.display()))?;
        info!(path = %path.display(), "loaded logsift configuration");
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.thresholds.validate()?;
        Ok(config)
    }

    /// Resolve configuration, in order:
    /// 1. `explicit` (a `--config` argument).
    /// 2. The path in `LOGSIFT_CONFIG`.
    /// 3. `./logsift.toml`.
    /// 4. Compiled-in defaults.
    ///
    /// The first file that is named or present must load.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        Self::resolve_from(explicit, std::env::var_os(CONFIG_ENV).as_deref(), Path::new(LOCAL_CONFIG))
    }

    fn resolve_from(explicit: Option<&Path>, env_path: Option<&OsStr>, local: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        if let Some(env_path) = env_path.filter(|p| !p.is_empty()) {
            let path = Path::new(env_path);
            return Self::load(path)
                .with_context(|| format!("{} points at an unusable config file", CONFIG_ENV));
        }

        if local.exists() {
            return Self::load(local);
        }

        debug!("no config file found, using compiled-in defaults");
        Ok(Self::default())
    }
}

// ---------------------------------------------------------------------------
// Heuristic thresholds
// ---------------------------------------------------------------------------

/// Ratios and counts behind every finding and insight rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// "High Error Rate" fires when errors / total exceeds this.
    pub error_rate: f64,
    /// A service is an error concentration when it owns more than this share of all errors.
    pub service_error_share: f64,
    /// "Performance Degradation" fires when more than this many records match.
    pub degradation_min_count: usize,
    pub degradation_keywords: Vec<String>,
    /// Minimum repeats for an exact error message (and the keyword patterns).
    pub pattern_min_frequency: usize,
    pub auth_keywords: Vec<String>,
    pub performance_keywords: Vec<String>,
    /// Per-service error rate above which a service counts as unhealthy.
    pub service_error_rate: f64,
    /// "Positive System Trend" fires when successes / total exceeds this.
    pub success_rate: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            error_rate: 0.10,
            service_error_share: 0.40,
            degradation_min_count: 5,
            degradation_keywords: vec!["memory".into(), "timeout".into()],
            pattern_min_frequency: 3,
            auth_keywords: vec!["auth".into(), "token".into()],
            performance_keywords: vec!["slow".into(), "timeout".into(), "cpu".into()],
            service_error_rate: 0.15,
            success_rate: 0.70,
        }
    }
}

impl Thresholds {
    pub fn validate(&self) -> Result<()> {
        let ratios = [
            ("error_rate", self.error_rate),
            ("service_error_share", self.service_error_share),
            ("service_error_rate", self.service_error_rate),
            ("success_rate", self.success_rate),
        ];
        for (name, value) in ratios {
            if !(0.0..=1.0).contains(&value) {
                anyhow::bail!("thresholds.{} must be within 0.0..=1.0, got {}", name, value);
            }
        }
        if self.pattern_min_frequency == 0 {
            anyhow::bail!("thresholds.pattern_min_frequency must be at least 1");
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Progress stepper
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressConfig {
    pub tick_ms: u64,
    pub step: u8,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            tick_ms: 200,
            step: 10,
        }
    }
}

impl ProgressConfig {
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms.max(1))
    }
}

// ---------------------------------------------------------------------------
// Server / logging
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    /// Seed for the sample batch served when no input file is given.
    pub sample_seed: u64,
    pub sample_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8080".to_string(),
            sample_seed: 42,
            sample_size: crate::logs::sample::DEFAULT_SAMPLE_SIZE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset.
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_gives_defaults() {
        let cfg = LogsiftConfig::from_toml("").unwrap();
        assert_eq!(cfg.thresholds, Thresholds::default());
        assert_eq!(cfg.progress.step, 10);
        assert_eq!(cfg.logging.format, LogFormat::Text);
    }

    #[test]
    fn test_partial_override() {
        let cfg = LogsiftConfig::from_toml(
            r#"
            [thresholds]
            error_rate = 0.25

            [logging]
            format = "json"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.thresholds.error_rate, 0.25);
        assert_eq!(cfg.thresholds.success_rate, 0.70);
        assert_eq!(cfg.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_rejects_out_of_range_ratio() {
        let err = LogsiftConfig::from_toml("[thresholds]\nsuccess_rate = 1.5\n").unwrap_err();
        assert!(err.to_string().contains("success_rate"));
    }

    #[test]
    fn test_load_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logsift.toml");
        std::fs::write(&path, "[progress]\ntick_ms = 5\n").unwrap();

        let cfg = LogsiftConfig::resolve(Some(&path)).unwrap();
        assert_eq!(cfg.progress.tick(), Duration::from_millis(5));
    }

    #[test]
    fn test_env_path_must_load() {
        let dir = tempfile::tempdir().unwrap();
        let bad = dir.path().join("bad.toml");
        std::fs::write(&bad, "[thresholds]\nerror_rate = 5.0\n").unwrap();
        let local = dir.path().join("logsift.toml");

        let err = LogsiftConfig::resolve_from(None, Some(bad.as_os_str()), &local).unwrap_err();
        assert!(format!("{:#}", err).contains(CONFIG_ENV));
        assert!(format!("{:#}", err).contains("error_rate"));

        let good = dir.path().join("good.toml");
        std::fs::write(&good, "[thresholds]\nerror_rate = 0.2\n").unwrap();
        let cfg = LogsiftConfig::resolve_from(None, Some(good.as_os_str()), &local).unwrap();
        assert_eq!(cfg.thresholds.error_rate, 0.2);
    }

    #[test]
    fn test_broken_local_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let local = dir.path().join("logsift.toml");
        assert!(LogsiftConfig::resolve_from(None, None, &local).is_ok());

        std::fs::write(&local, "[progress\n").unwrap();
        assert!(LogsiftConfig::resolve_from(None, None, &local).is_err());
    }

    #[test]
    fn test_explicit_missing_path_is_error() {
        assert!(LogsiftConfig::resolve(Some(Path::new("/nope/logsift.toml"))).is_err());
    }
}
