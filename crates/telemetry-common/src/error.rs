// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

/// Errors raised while loading or validating telemetry configuration.
///
/// All of these surface when a processor or exporter is constructed, never while it runs.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid exclude_metrics pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Invalid export interval: {0}")]
    InvalidExportInterval(String),

    #[error("Failed to load telemetry configuration: {0}")]
    Load(#[from] Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        ConfigError::Load(Box::new(err))
    }
}
