// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;

use crate::data::ResourceMetrics;
use crate::error::{CollectError, ExportError};

/// Pull-based source of metric snapshots.
///
/// Several consumers may collect from the same reader. Each call returns an independent snapshot;
/// collecting must not reset or otherwise change what other consumers observe.
#[async_trait]
pub trait MetricReader: Send + Sync {
    async fn collect(&self) -> Result<ResourceMetrics, CollectError>;
}

/// Push-based destination for metric snapshots.
#[async_trait]
pub trait MetricExporter: Send + Sync {
    async fn export(&self, metrics: &ResourceMetrics) -> Result<(), ExportError>;

    async fn shutdown(&self) -> Result<(), ExportError> {
        Ok(())
    }
}
