// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Repairs string attributes that are not valid UTF-8.
//!
//! Valid runs are copied verbatim and each maximal run of invalid bytes collapses into a single
//! U+FFFD, so `0x80 0x81 0x82` becomes one replacement character rather than three.

use std::borrow::Cow;

use telemetry_common::attribute::{StringValue, Value};
use telemetry_common::config::SanitizeUtf8Config;
use telemetry_common::LogSink;
use tracing::warn;

use crate::pipeline::AttributeProcessor;
use crate::set::AttributeSet;

pub const SANITIZED_LOG_MESSAGE: &str = "Invalid UTF-8 in span attribute";

/// Returns `bytes` as UTF-8, replacing each maximal invalid run with one U+FFFD.
///
/// Borrows when `bytes` is already valid.
#[must_use]
pub fn sanitize_utf8(bytes: &[u8]) -> Cow<'_, str> {
    if let Ok(valid) = std::str::from_utf8(bytes) {
        return Cow::Borrowed(valid);
    }

    let mut repaired = String::with_capacity(bytes.len());
    let mut in_invalid_run = false;
    for chunk in bytes.utf8_chunks() {
        let valid = chunk.valid();
        if !valid.is_empty() {
            repaired.push_str(valid);
            in_invalid_run = false;
        }
        if !chunk.invalid().is_empty() && !in_invalid_run {
            repaired.push(char::REPLACEMENT_CHARACTER);
            in_invalid_run = true;
        }
    }
    Cow::Owned(repaired)
}

pub struct Utf8Sanitizer {
    config: SanitizeUtf8Config,
    sink: LogSink,
}

impl Utf8Sanitizer {
    #[must_use]
    pub fn new(config: SanitizeUtf8Config, sink: LogSink) -> Self {
        Self { config, sink }
    }

    fn repair(value: &StringValue) -> Option<StringValue> {
        match sanitize_utf8(value.as_bytes()) {
            Cow::Borrowed(_) => None,
            Cow::Owned(repaired) => Some(StringValue::from(repaired)),
        }
    }
}

impl AttributeProcessor for Utf8Sanitizer {
    fn name(&self) -> &'static str {
        "utf8_sanitizer"
    }

    fn process(&self, attributes: &mut dyn AttributeSet) {
        if !self.config.enabled {
            return;
        }
        attributes.for_each_value_mut(&mut |key, value| {
            let Value::String(original) = value else {
                return;
            };
            let Some(repaired) = Self::repair(original) else {
                return;
            };
            *original = repaired;
            if self.config.log_sanitizations {
                self.sink.emit(|| warn!(key = key, "{}", SANITIZED_LOG_MESSAGE));
            }
        });
    }
}
