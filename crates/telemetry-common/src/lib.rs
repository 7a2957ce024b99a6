// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Shared building blocks for the router telemetry pipeline.
//!
//! - [`attribute`]: key/value model for span and data point attributes
//! - [`config`]: configuration surface for attribute processing and metric log export
//! - [`log_level`]: level at which exported metrics are logged
//! - [`log_sink`]: explicit logger dependency handed to processors and exporters
//! - [`error`]: configuration errors surfaced at construction time

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

pub mod attribute;
pub mod config;
pub mod error;
pub mod log_level;
pub mod log_sink;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use attribute::{KeyValue, StringValue, Value};
pub use error::ConfigError;
pub use log_level::LogLevel;
pub use log_sink::LogSink;
