// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! In-memory readers and exporters for tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::data::{InstrumentationScope, Metric, ResourceMetrics, ScopeMetrics};
use crate::error::{CollectError, ExportError};
use crate::reader::{MetricExporter, MetricReader};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Reader returning a clone of a shared snapshot on every collect.
///
/// Collecting never alters the snapshot, so any number of consumers observe the same data.
#[derive(Default)]
pub struct SnapshotReader {
    snapshot: Mutex<ResourceMetrics>,
    collects: AtomicUsize,
}

impl SnapshotReader {
    #[must_use]
    pub fn new(snapshot: ResourceMetrics) -> Self {
        Self {
            snapshot: Mutex::new(snapshot),
            collects: AtomicUsize::new(0),
        }
    }

    /// Snapshot with a single instrumentation scope.
    #[must_use]
    pub fn single_scope(scope: &str, metrics: Vec<Metric>) -> ResourceMetrics {
        ResourceMetrics {
            resource: Vec::new(),
            scope_metrics: vec![ScopeMetrics {
                scope: InstrumentationScope::new(scope),
                metrics,
            }],
        }
    }

    /// Current snapshot, as another consumer of the reader would see it.
    #[must_use]
    pub fn snapshot(&self) -> ResourceMetrics {
        lock(&self.snapshot).clone()
    }

    pub fn set_snapshot(&self, snapshot: ResourceMetrics) {
        *lock(&self.snapshot) = snapshot;
    }

    #[must_use]
    pub fn collect_count(&self) -> usize {
        self.collects.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MetricReader for SnapshotReader {
    async fn collect(&self) -> Result<ResourceMetrics, CollectError> {
        self.collects.fetch_add(1, Ordering::SeqCst);
        Ok(self.snapshot())
    }
}

/// Reader whose every collect fails with the same error.
pub struct FailingReader {
    error: CollectError,
    collects: AtomicUsize,
}

impl FailingReader {
    #[must_use]
    pub fn new(error: CollectError) -> Self {
        Self {
            error,
            collects: AtomicUsize::new(0),
        }
    }

    #[must_use]
    pub fn collect_count(&self) -> usize {
        self.collects.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MetricReader for FailingReader {
    async fn collect(&self) -> Result<ResourceMetrics, CollectError> {
        self.collects.fetch_add(1, Ordering::SeqCst);
        Err(self.error.clone())
    }
}

/// Push exporter that records every snapshot it receives, optionally failing each export.
#[derive(Default)]
pub struct RecordingExporter {
    exported: Mutex<Vec<ResourceMetrics>>,
    failure: Option<ExportError>,
}

impl RecordingExporter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn failing(error: ExportError) -> Self {
        Self {
            exported: Mutex::new(Vec::new()),
            failure: Some(error),
        }
    }

    #[must_use]
    pub fn exported(&self) -> Vec<ResourceMetrics> {
        lock(&self.exported).clone()
    }
}

#[async_trait]
impl MetricExporter for RecordingExporter {
    async fn export(&self, metrics: &ResourceMetrics) -> Result<(), ExportError> {
        lock(&self.exported).push(metrics.clone());
        match &self.failure {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}
