// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Configuration surface for attribute processing and metric log export.
//!
//! # Sources
//!
//! [`TelemetryConfig::load`] layers, lowest priority first:
//! 1. Defaults (everything disabled)
//! 2. An optional YAML file
//! 3. Environment variables prefixed with `ROUTER_TELEMETRY_`, nested keys split on `__`
//!
//! ```yaml
//! tracing:
//!   ip_anonymization:
//!     enabled: true
//!     method: hash
//!   sanitize_utf8:
//!     enabled: true
//!     log_sanitizations: true
//! metrics_log_exporter:
//!   enabled: true
//!   export_interval: 10s
//!   exclude_metrics:
//!     - "router\\.http\\.requests$"
//! ```
//!
//! Every exclusion pattern is compiled during validation, so a bad pattern stops startup instead
//! of surfacing on an export tick.

use std::fmt;
use std::path::Path;
use std::time::Duration;

use figment::providers::{Env, Format, Yaml};
use figment::Figment;
use regex::Regex;
use serde::{Deserialize, Deserializer};

use crate::error::ConfigError;
use crate::log_level::LogLevel;

pub const ENV_PREFIX: &str = "ROUTER_TELEMETRY_";
pub const DEFAULT_EXPORT_INTERVAL: Duration = Duration::from_secs(10);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IpAnonymizationMethod {
    /// Replace the address with a fixed placeholder.
    #[default]
    Redact,
    /// Replace the address with a SHA-256 hex digest.
    Hash,
}

#[derive(Clone, Debug, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct IpAnonymizationConfig {
    pub enabled: bool,
    pub method: IpAnonymizationMethod,
}

#[derive(Clone, Debug, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct SanitizeUtf8Config {
    pub enabled: bool,
    pub log_sanitizations: bool,
}

/// Span attribute processors, applied in the order listed here.
#[derive(Clone, Debug, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct TracingAttributesConfig {
    pub ip_anonymization: IpAnonymizationConfig,
    pub sanitize_utf8: SanitizeUtf8Config,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MetricsLogExporterConfig {
    pub enabled: bool,
    #[serde(deserialize_with = "deserialize_duration")]
    pub export_interval: Duration,
    /// Metric names matching any of these patterns are never logged.
    pub exclude_metrics: Vec<String>,
    /// Level of the per-metric log entries.
    pub log_level: LogLevel,
    /// Only log metrics from this instrumentation scope. All scopes when unset.
    pub scope: Option<String>,
}

impl Default for MetricsLogExporterConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            export_interval: DEFAULT_EXPORT_INTERVAL,
            exclude_metrics: Vec::new(),
            log_level: LogLevel::default(),
            scope: None,
        }
    }
}

impl MetricsLogExporterConfig {
    /// Compiles `exclude_metrics`.
    pub fn compile_exclusions(&self) -> Result<ExcludeMetrics, ConfigError> {
        ExcludeMetrics::compile(&self.exclude_metrics)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.enabled && self.export_interval.is_zero() {
            return Err(ConfigError::InvalidExportInterval(
                "export_interval must be greater than zero".to_string(),
            ));
        }
        self.compile_exclusions().map(|_| ())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    pub tracing: TracingAttributesConfig,
    pub metrics_log_exporter: MetricsLogExporterConfig,
}

impl TelemetryConfig {
    /// Loads defaults, then `path` (if any), then `ROUTER_TELEMETRY_*` environment variables.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut figment = Figment::new();
        if let Some(path) = path {
            figment = figment.merge(Yaml::file(path));
        }
        let config: TelemetryConfig = figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.metrics_log_exporter.validate()
    }
}

/// Compiled `exclude_metrics` patterns. Immutable once built.
#[derive(Clone, Default)]
pub struct ExcludeMetrics {
    patterns: Vec<Regex>,
}

impl ExcludeMetrics {
    pub fn compile<S: AsRef<str>>(patterns: &[S]) -> Result<Self, ConfigError> {
        let patterns = patterns
            .iter()
            .map(|pattern| {
                let pattern = pattern.as_ref();
                Regex::new(pattern).map_err(|source| ConfigError::InvalidPattern {
                    pattern: pattern.to_string(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    /// True if any pattern matches anywhere in `name`.
    #[must_use]
    pub fn is_match(&self, name: &str) -> bool {
        self.patterns.iter().any(|pattern| pattern.is_match(name))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

impl fmt::Debug for ExcludeMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.patterns.iter().map(Regex::as_str))
            .finish()
    }
}

/// Accepts seconds as an integer or float, or a string with a `ms`, `s` or `m` suffix.
pub fn deserialize_duration<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Duration, D::Error> {
    struct DurationVisitor;
    impl serde::de::Visitor<'_> for DurationVisitor {
        type Value = Duration;
        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            write!(f, "a duration in seconds or a string such as \"250ms\", \"10s\", \"1m\"")
        }
        fn visit_u64<E: serde::de::Error>(self, v: u64) -> Result<Self::Value, E> {
            Ok(Duration::from_secs(v))
        }
        fn visit_i64<E: serde::de::Error>(self, v: i64) -> Result<Self::Value, E> {
            u64::try_from(v)
                .map(Duration::from_secs)
                .map_err(|_| E::custom("negative durations are not allowed"))
        }
        fn visit_f64<E: serde::de::Error>(self, v: f64) -> Result<Self::Value, E> {
            Duration::try_from_secs_f64(v).map_err(E::custom)
        }
        fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<Self::Value, E> {
            parse_duration(v).map_err(E::custom)
        }
    }
    deserializer.deserialize_any(DurationVisitor)
}

fn parse_duration(input: &str) -> Result<Duration, String> {
    let input = input.trim();
    let split = input
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(input.len());
    let (number, unit) = input.split_at(split);
    let number: f64 = number
        .parse()
        .map_err(|_| format!("invalid duration '{input}'"))?;
    let secs = match unit.trim() {
        "ms" => number / 1000.0,
        "" | "s" => number,
        "m" => number * 60.0,
        other => return Err(format!("unsupported duration unit '{other}' in '{input}'")),
    };
    Duration::try_from_secs_f64(secs).map_err(|e| format!("invalid duration '{input}': {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_disabled() {
        let config = TelemetryConfig::default();
        assert!(!config.tracing.ip_anonymization.enabled);
        assert_eq!(
            config.tracing.ip_anonymization.method,
            IpAnonymizationMethod::Redact
        );
        assert!(!config.tracing.sanitize_utf8.enabled);
        assert!(!config.metrics_log_exporter.enabled);
        assert_eq!(
            config.metrics_log_exporter.export_interval,
            DEFAULT_EXPORT_INTERVAL
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_exclude_metrics_matches_unanchored() {
        let exclude = ExcludeMetrics::compile(&["process\\.", "server\\.uptime"]).unwrap();
        assert_eq!(exclude.len(), 2);
        assert!(exclude.is_match("process.cpu"));
        assert!(exclude.is_match("server.uptime"));
        assert!(!exclude.is_match("http.requests"));
    }

    #[test]
    fn test_exclude_metrics_anchored_pattern() {
        let exclude = ExcludeMetrics::compile(&["router\\.http\\.requests$"]).unwrap();
        assert!(exclude.is_match("router.http.requests"));
        assert!(!exclude.is_match("router.http.request.duration_milliseconds"));
    }

    #[test]
    fn test_invalid_pattern_is_config_error() {
        let config = MetricsLogExporterConfig {
            enabled: true,
            exclude_metrics: vec!["ok".to_string(), "(broken".to_string()],
            ..Default::default()
        };
        match config.validate() {
            Err(ConfigError::InvalidPattern { pattern, .. }) => assert_eq!(pattern, "(broken"),
            other => panic!("expected InvalidPattern, got {other:?}"),
        }
    }

    #[test]
    fn test_zero_interval_rejected_only_when_enabled() {
        let mut config = MetricsLogExporterConfig {
            export_interval: Duration::ZERO,
            ..Default::default()
        };
        assert!(config.validate().is_ok());

        config.enabled = true;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidExportInterval(_))
        ));
    }

    #[test]
    fn test_parse_duration_units() {
        assert_eq!(parse_duration("250ms").unwrap(), Duration::from_millis(250));
        assert_eq!(parse_duration("10s").unwrap(), Duration::from_secs(10));
        assert_eq!(parse_duration("2m").unwrap(), Duration::from_secs(120));
        assert_eq!(parse_duration("15").unwrap(), Duration::from_secs(15));
        assert_eq!(parse_duration("1.5s").unwrap(), Duration::from_millis(1500));
        assert!(parse_duration("10h").is_err());
        assert!(parse_duration("soon").is_err());
    }

    #[test]
    fn test_load_from_yaml_file() {
        figment::Jail::expect_with(|jail| {
            jail.clear_env();
            jail.create_file(
                "telemetry.yaml",
                r#"
tracing:
  ip_anonymization:
    enabled: true
    method: hash
  sanitize_utf8:
    enabled: true
    log_sanitizations: true
metrics_log_exporter:
  enabled: true
  export_interval: 250ms
  exclude_metrics:
    - "router\\.http\\.requests$"
  log_level: debug
"#,
            )?;

            let config = TelemetryConfig::load(Some(Path::new("telemetry.yaml"))).unwrap();
            assert!(config.tracing.ip_anonymization.enabled);
            assert_eq!(
                config.tracing.ip_anonymization.method,
                IpAnonymizationMethod::Hash
            );
            assert!(config.tracing.sanitize_utf8.log_sanitizations);
            let exporter = &config.metrics_log_exporter;
            assert!(exporter.enabled);
            assert_eq!(exporter.export_interval, Duration::from_millis(250));
            assert_eq!(exporter.exclude_metrics, vec!["router\\.http\\.requests$"]);
            assert_eq!(exporter.log_level, LogLevel::Debug);
            assert_eq!(exporter.scope, None);
            Ok(())
        });
    }

    #[test]
    fn test_env_overrides_yaml() {
        figment::Jail::expect_with(|jail| {
            jail.clear_env();
            jail.create_file(
                "telemetry.yaml",
                r"
metrics_log_exporter:
  enabled: false
  export_interval: 30
",
            )?;
            jail.set_env("ROUTER_TELEMETRY_METRICS_LOG_EXPORTER__ENABLED", "true");
            jail.set_env("ROUTER_TELEMETRY_METRICS_LOG_EXPORTER__EXPORT_INTERVAL", "5s");
            jail.set_env("ROUTER_TELEMETRY_TRACING__IP_ANONYMIZATION__ENABLED", "true");

            let config = TelemetryConfig::load(Some(Path::new("telemetry.yaml"))).unwrap();
            assert!(config.metrics_log_exporter.enabled);
            assert_eq!(
                config.metrics_log_exporter.export_interval,
                Duration::from_secs(5)
            );
            assert!(config.tracing.ip_anonymization.enabled);
            Ok(())
        });
    }

    #[test]
    fn test_load_rejects_invalid_pattern() {
        figment::Jail::expect_with(|jail| {
            jail.clear_env();
            jail.create_file(
                "telemetry.yaml",
                r#"
metrics_log_exporter:
  enabled: true
  exclude_metrics: ["[unterminated"]
"#,
            )?;

            let result = TelemetryConfig::load(Some(Path::new("telemetry.yaml")));
            assert!(matches!(result, Err(ConfigError::InvalidPattern { .. })));
            Ok(())
        });
    }

    #[test]
    fn test_load_rejects_unknown_method() {
        figment::Jail::expect_with(|jail| {
            jail.clear_env();
            jail.set_env("ROUTER_TELEMETRY_TRACING__IP_ANONYMIZATION__METHOD", "scramble");

            let result = TelemetryConfig::load(None);
            assert!(matches!(result, Err(ConfigError::Load(_))));
            Ok(())
        });
    }
}
