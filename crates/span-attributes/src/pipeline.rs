// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::fmt;

use telemetry_common::config::TracingAttributesConfig;
use telemetry_common::LogSink;
use tracing::debug;

use crate::ip_anonymizer::IpAnonymizer;
use crate::set::AttributeSet;
use crate::utf8_sanitizer::Utf8Sanitizer;

/// Transforms one span's attributes in place.
///
/// Implementations hold only configuration fixed at construction. They never fail: values a
/// processor does not understand are left untouched.
pub trait AttributeProcessor: Send + Sync {
    fn name(&self) -> &'static str;

    fn process(&self, attributes: &mut dyn AttributeSet);
}

/// Ordered list of processors run over every exported span.
#[derive(Default)]
pub struct AttributePipeline {
    processors: Vec<Box<dyn AttributeProcessor>>,
    sink: LogSink,
}

impl AttributePipeline {
    /// Registers the IP anonymizer, then the UTF-8 sanitizer, each only when enabled.
    #[must_use]
    pub fn from_config(config: &TracingAttributesConfig, sink: LogSink) -> Self {
        let mut builder = Self::builder().sink(sink.clone());
        if config.ip_anonymization.enabled {
            builder = builder.with(IpAnonymizer::new(config.ip_anonymization.clone()));
        }
        if config.sanitize_utf8.enabled {
            let sanitizer = Utf8Sanitizer::new(config.sanitize_utf8.clone(), sink.clone());
            builder = builder.with(sanitizer);
        }
        let pipeline = builder.build();
        pipeline
            .sink
            .emit(|| debug!(processors = ?pipeline, "Span attribute pipeline configured"));
        pipeline
    }

    #[must_use]
    pub fn builder() -> AttributePipelineBuilder {
        AttributePipelineBuilder::default()
    }

    pub fn process(&self, attributes: &mut dyn AttributeSet) {
        for processor in &self.processors {
            processor.process(attributes);
        }
    }

    /// Where the pipeline and the exporter wrapping it write their own logs.
    #[must_use]
    pub fn sink(&self) -> &LogSink {
        &self.sink
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.processors.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.processors.is_empty()
    }
}

impl fmt::Debug for AttributePipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.processors.iter().map(|p| p.name()))
            .finish()
    }
}

#[derive(Default)]
pub struct AttributePipelineBuilder {
    processors: Vec<Box<dyn AttributeProcessor>>,
    sink: LogSink,
}

impl AttributePipelineBuilder {
    #[must_use]
    pub fn with(mut self, processor: impl AttributeProcessor + 'static) -> Self {
        self.processors.push(Box::new(processor));
        self
    }

    /// Defaults to [`LogSink::ambient`].
    #[must_use]
    pub fn sink(mut self, sink: LogSink) -> Self {
        self.sink = sink;
        self
    }

    #[must_use]
    pub fn build(self) -> AttributePipeline {
        AttributePipeline {
            processors: self.processors,
            sink: self.sink,
        }
    }
}
