// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Periodic export of metric snapshots as structured log entries.
//!
//! Each tick pulls a fresh snapshot from the [`MetricReader`], drops metrics whose names match an
//! `exclude_metrics` pattern and emits one `"Metric"` entry per remaining metric. The reader is only
//! read, so other consumers of the same reader keep seeing complete snapshots.

use std::sync::Arc;
use std::time::Duration;

use telemetry_common::config::{ExcludeMetrics, MetricsLogExporterConfig};
use telemetry_common::{ConfigError, LogLevel, LogSink};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::level_filters::LevelFilter;
use tracing::{debug, error};

use crate::data::Metric;
use crate::error::CollectError;
use crate::format::MetricRecord;
use crate::reader::MetricReader;

pub const METRIC_LOG_MESSAGE: &str = "Metric";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExporterState {
    /// Constructed and enabled, not yet running.
    Idle,
    /// Running the timer loop.
    Ticking,
    /// Shut down, or never enabled. Terminal.
    Stopped,
}

/// Outcome of one export pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExportSummary {
    pub logged: usize,
    pub excluded: usize,
}

pub struct MetricsLogExporter {
    interval: Duration,
    exclude: ExcludeMetrics,
    level: LogLevel,
    scope: Option<String>,
    reader: Arc<dyn MetricReader>,
    sink: LogSink,
    state: watch::Sender<ExporterState>,
}

impl MetricsLogExporter {
    /// Builds the exporter, compiling `exclude_metrics` once.
    ///
    /// A disabled exporter starts in [`ExporterState::Stopped`] and never touches the reader.
    pub fn new(
        config: &MetricsLogExporterConfig,
        reader: Arc<dyn MetricReader>,
        sink: LogSink,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let exclude = config.compile_exclusions()?;
        let initial = if config.enabled {
            ExporterState::Idle
        } else {
            ExporterState::Stopped
        };
        let (state, _) = watch::channel(initial);

        Ok(Self {
            interval: config.export_interval,
            exclude,
            level: config.log_level,
            scope: config.scope.clone(),
            reader,
            sink,
            state,
        })
    }

    #[must_use]
    pub fn state(&self) -> ExporterState {
        *self.state.borrow()
    }

    #[must_use]
    pub fn subscribe_state(&self) -> watch::Receiver<ExporterState> {
        self.state.subscribe()
    }

    /// Runs the export loop until `shutdown_token` is cancelled.
    ///
    /// Returns immediately unless the exporter is [`ExporterState::Idle`]. Cancellation is observed
    /// only while waiting for the next tick, so a tick in progress always completes.
    pub async fn run(&self, shutdown_token: CancellationToken) {
        let started = self.state.send_if_modified(|state| {
            if *state == ExporterState::Idle {
                *state = ExporterState::Ticking;
                true
            } else {
                false
            }
        });
        if !started {
            return;
        }

        let interval_ms = u64::try_from(self.interval.as_millis()).unwrap_or(u64::MAX);
        let metric_level = self.level.as_ref();
        self.sink
            .emit(|| debug!(interval_ms, metric_level, "Metrics log exporter started"));

        let mut ticker = interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker.tick().await; // discard first tick

        loop {
            tokio::select! {
                biased;
                () = shutdown_token.cancelled() => break,
                _ = ticker.tick() => {
                    if let Err(e) = self.export_once().await {
                        self.sink.emit(|| {
                            error!(error = %e, "Failed to collect metrics for log export");
                        });
                    }
                }
            }
        }

        self.state.send_replace(ExporterState::Stopped);
        self.sink.emit(|| debug!("Metrics log exporter stopped"));
    }

    /// Spawns [`Self::run`] on the current tokio runtime.
    pub fn spawn(self, shutdown_token: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move { self.run(shutdown_token).await })
    }

    /// Collects one snapshot and logs every non-excluded metric in the configured scope.
    ///
    /// Does nothing once the exporter is stopped.
    pub async fn export_once(&self) -> Result<ExportSummary, CollectError> {
        if self.state() == ExporterState::Stopped {
            return Ok(ExportSummary::default());
        }
        let snapshot = self.reader.collect().await?;
        Ok(log_metrics(
            &self.sink,
            self.level,
            &self.exclude,
            snapshot.metrics_in_scope(self.scope.as_deref()),
        ))
    }
}

/// Emits one `"Metric"` entry per metric not matched by `exclude`.
pub(crate) fn log_metrics<'a>(
    sink: &LogSink,
    level: LogLevel,
    exclude: &ExcludeMetrics,
    metrics: impl Iterator<Item = &'a Metric>,
) -> ExportSummary {
    // no subscriber records this level: count, but skip formatting
    let enabled = tracing::Level::from(level) <= LevelFilter::current();
    sink.emit(|| {
        let mut summary = ExportSummary::default();
        for metric in metrics {
            if exclude.is_match(&metric.name) {
                summary.excluded += 1;
                continue;
            }
            if enabled {
                emit_metric(level, &MetricRecord::from_metric(metric));
            }
            summary.logged += 1;
        }
        summary
    })
}

fn emit_metric(level: LogLevel, record: &MetricRecord<'_>) {
    let data_points = record.data_points_json();
    macro_rules! metric_event {
        ($lvl:expr) => {
            tracing::event!(
                $lvl,
                name = record.name,
                "type" = record.type_tag,
                temporality = record.temporality,
                monotonic = record.monotonic,
                data_points = %data_points,
                "Metric"
            )
        };
    }

    match level {
        LogLevel::Error => metric_event!(tracing::Level::ERROR),
        LogLevel::Warn => metric_event!(tracing::Level::WARN),
        LogLevel::Info => metric_event!(tracing::Level::INFO),
        LogLevel::Debug => metric_event!(tracing::Level::DEBUG),
        LogLevel::Trace => metric_event!(tracing::Level::TRACE),
    }
}
