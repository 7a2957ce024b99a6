// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use async_trait::async_trait;
use telemetry_common::attribute::KeyValue;
use thiserror::Error;
use tracing::debug;

use crate::pipeline::AttributePipeline;

/// A finished span as handed to an exporter.
#[derive(Clone, Debug, PartialEq)]
pub struct SpanData {
    pub name: String,
    pub attributes: Vec<KeyValue>,
}

impl SpanData {
    pub fn new(name: impl Into<String>, attributes: Vec<KeyValue>) -> Self {
        Self {
            name: name.into(),
            attributes,
        }
    }
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("exporter is shut down")]
    Shutdown,
    #[error("span export failed: {0}")]
    Failed(String),
}

#[async_trait]
pub trait SpanExporter: Send + Sync {
    /// Sends a batch of finished spans to the backend.
    async fn export(&self, batch: Vec<SpanData>) -> Result<(), ExportError>;

    async fn shutdown(&self) -> Result<(), ExportError> {
        Ok(())
    }
}

/// Runs an [`AttributePipeline`] over every span, then forwards the batch to `inner`.
pub struct ProcessingSpanExporter<E> {
    pipeline: Arc<AttributePipeline>,
    inner: E,
}

impl<E: SpanExporter> ProcessingSpanExporter<E> {
    pub fn new(pipeline: Arc<AttributePipeline>, inner: E) -> Self {
        Self { pipeline, inner }
    }

    pub fn inner(&self) -> &E {
        &self.inner
    }
}

#[async_trait]
impl<E: SpanExporter> SpanExporter for ProcessingSpanExporter<E> {
    async fn export(&self, mut batch: Vec<SpanData>) -> Result<(), ExportError> {
        if !self.pipeline.is_empty() {
            for span in &mut batch {
                self.pipeline.process(&mut span.attributes);
            }
            let spans = batch.len();
            self.pipeline
                .sink()
                .emit(|| debug!(spans, "Processed span attributes"));
        }
        self.inner.export(batch).await
    }

    async fn shutdown(&self) -> Result<(), ExportError> {
        self.inner.shutdown().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use telemetry_common::attribute::Value;
    use telemetry_common::config::{
        IpAnonymizationConfig, IpAnonymizationMethod, TracingAttributesConfig,
    };
    use telemetry_common::test_utils::{FieldValue, LogCapture};
    use telemetry_common::LogSink;

    #[derive(Default)]
    struct RecordingExporter {
        batches: Mutex<Vec<Vec<SpanData>>>,
        fail: bool,
    }

    #[async_trait]
    impl SpanExporter for RecordingExporter {
        async fn export(&self, batch: Vec<SpanData>) -> Result<(), ExportError> {
            if self.fail {
                return Err(ExportError::Failed("backend unavailable".to_string()));
            }
            self.batches.lock().unwrap().push(batch);
            Ok(())
        }
    }

    fn redacting_pipeline() -> Arc<AttributePipeline> {
        let config = TracingAttributesConfig {
            ip_anonymization: IpAnonymizationConfig {
                enabled: true,
                method: IpAnonymizationMethod::Redact,
            },
            ..Default::default()
        };
        Arc::new(AttributePipeline::from_config(&config, LogSink::ambient()))
    }

    #[tokio::test]
    async fn test_processes_before_forwarding() {
        let exporter = ProcessingSpanExporter::new(redacting_pipeline(), RecordingExporter::default());
        let batch = vec![
            SpanData::new("query", vec![KeyValue::string("http.client_ip", "198.51.100.7")]),
            SpanData::new("fetch", vec![KeyValue::string("net.sock.peer.addr", "10.0.0.9")]),
        ];

        exporter.export(batch).await.unwrap();

        let batches = exporter.inner().batches.lock().unwrap();
        assert_eq!(batches.len(), 1);
        for span in &batches[0] {
            assert_eq!(span.attributes[0].value, Value::from("[REDACTED]"));
        }
    }

    #[tokio::test]
    async fn test_processed_log_goes_to_pipeline_sink() {
        let capture = LogCapture::new();
        let config = TracingAttributesConfig {
            ip_anonymization: IpAnonymizationConfig {
                enabled: true,
                method: IpAnonymizationMethod::Redact,
            },
            ..Default::default()
        };
        let pipeline = Arc::new(AttributePipeline::from_config(&config, capture.sink()));
        let exporter = ProcessingSpanExporter::new(pipeline, RecordingExporter::default());
        capture.clear();

        let batch = vec![
            SpanData::new("query", vec![KeyValue::string("http.client_ip", "198.51.100.7")]),
            SpanData::new("fetch", Vec::new()),
        ];
        exporter.export(batch).await.unwrap();

        let processed = capture.with_message("Processed span attributes");
        assert_eq!(processed.len(), 1);
        assert_eq!(processed[0].field("spans"), Some(&FieldValue::U64(2)));
    }

    #[tokio::test]
    async fn test_empty_pipeline_logs_nothing() {
        let capture = LogCapture::new();
        let pipeline = Arc::new(AttributePipeline::builder().sink(capture.sink()).build());
        let exporter = ProcessingSpanExporter::new(pipeline, RecordingExporter::default());

        exporter
            .export(vec![SpanData::new("op", Vec::new())])
            .await
            .unwrap();

        assert!(capture.events().is_empty());
        assert_eq!(exporter.inner().batches.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_inner_error_propagates() {
        let exporter = ProcessingSpanExporter::new(
            redacting_pipeline(),
            RecordingExporter {
                fail: true,
                ..Default::default()
            },
        );

        let result = exporter.export(vec![SpanData::new("op", Vec::new())]).await;

        assert!(matches!(result, Err(ExportError::Failed(msg)) if msg == "backend unavailable"));
        assert!(exporter.shutdown().await.is_ok());
    }
}
