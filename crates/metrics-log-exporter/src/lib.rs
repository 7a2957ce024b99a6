// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Structured-log export of collected metrics.
//!
//! [`MetricsLogExporter`] pulls snapshots from a [`MetricReader`] on a fixed interval and logs one
//! `"Metric"` entry per metric. [`DebugLoggingExporter`] logs the same entries for snapshots pushed
//! through a [`MetricExporter`].

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

pub mod data;
pub mod debug_export;
pub mod error;
pub mod exporter;
pub mod format;
pub mod reader;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use debug_export::DebugLoggingExporter;
pub use error::{CollectError, ExportError};
pub use exporter::{ExportSummary, ExporterState, MetricsLogExporter, METRIC_LOG_MESSAGE};
pub use format::MetricRecord;
pub use reader::{MetricExporter, MetricReader};
