// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Debug logging around a push metric exporter.
//!
//! Wrapping an exporter logs every snapshot it is handed, using the same `"Metric"` entries as
//! [`MetricsLogExporter`](crate::MetricsLogExporter), plus start and outcome entries for each
//! export call. The wrapped exporter always receives the full, unfiltered snapshot.

use std::time::Instant;

use async_trait::async_trait;
use telemetry_common::config::{ExcludeMetrics, MetricsLogExporterConfig};
use telemetry_common::{ConfigError, LogLevel, LogSink};
use tracing::{error, info};

use crate::data::ResourceMetrics;
use crate::error::ExportError;
use crate::exporter::log_metrics;
use crate::reader::MetricExporter;

pub struct DebugLoggingExporter<E> {
    inner: E,
    enabled: bool,
    exclude: ExcludeMetrics,
    level: LogLevel,
    scope: Option<String>,
    sink: LogSink,
}

impl<E: MetricExporter> DebugLoggingExporter<E> {
    pub fn new(
        inner: E,
        config: &MetricsLogExporterConfig,
        sink: LogSink,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            inner,
            enabled: config.enabled,
            exclude: config.compile_exclusions()?,
            level: config.log_level,
            scope: config.scope.clone(),
            sink,
        })
    }

    pub fn inner(&self) -> &E {
        &self.inner
    }
}

#[async_trait]
impl<E: MetricExporter> MetricExporter for DebugLoggingExporter<E> {
    async fn export(&self, metrics: &ResourceMetrics) -> Result<(), ExportError> {
        if !self.enabled {
            return self.inner.export(metrics).await;
        }

        let start = Instant::now();
        let total_metrics = metrics.total_metrics();
        self.sink.emit(|| {
            info!(
                resource = ?metrics.resource,
                scope_metrics = metrics.scope_metrics.len(),
                total_metrics,
                "Starting OTLP metric export"
            );
        });
        log_metrics(
            &self.sink,
            self.level,
            &self.exclude,
            metrics.metrics_in_scope(self.scope.as_deref()),
        );

        let result = self.inner.export(metrics).await;
        let duration = start.elapsed();
        match &result {
            Ok(()) => self.sink.emit(|| {
                info!(total_metrics, ?duration, "OTLP metric export succeeded");
            }),
            Err(e) => self.sink.emit(|| {
                error!(error = %e, ?duration, "OTLP metric export failed");
            }),
        }
        result
    }

    async fn shutdown(&self) -> Result<(), ExportError> {
        self.inner.shutdown().await
    }
}
