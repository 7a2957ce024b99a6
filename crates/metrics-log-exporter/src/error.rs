// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

/// Errors returned by a metric reader's collect operation.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CollectError {
    #[error("Metric reader is shut down")]
    Shutdown,

    #[error("Metric collection timed out")]
    Timeout,

    #[error("Metric collection failed: {0}")]
    Other(String),
}

/// Errors returned by a push metric exporter.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ExportError {
    #[error("Metric exporter is shut down")]
    Shutdown,

    #[error("Metric export failed: {0}")]
    Failed(String),
}
