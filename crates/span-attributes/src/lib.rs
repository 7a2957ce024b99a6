// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Span attribute processing applied at export time.
//!
//! Every span's attributes pass through an [`AttributePipeline`] right before the span is handed
//! to its real exporter. The pipeline is built once from [`TracingAttributesConfig`] and holds
//! only immutable configuration, so one instance serves every span concurrently.
//!
//! [`TracingAttributesConfig`]: telemetry_common::config::TracingAttributesConfig

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

pub mod exporter;
pub mod ip_anonymizer;
pub mod pipeline;
pub mod set;
pub mod utf8_sanitizer;

pub use exporter::{ExportError, ProcessingSpanExporter, SpanData, SpanExporter};
pub use ip_anonymizer::IpAnonymizer;
pub use pipeline::{AttributePipeline, AttributeProcessor};
pub use set::AttributeSet;
pub use utf8_sanitizer::{sanitize_utf8, Utf8Sanitizer};
