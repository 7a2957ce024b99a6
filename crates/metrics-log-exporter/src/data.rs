// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Metric snapshot model handed over by a metric reader.
//!
//! A [`ResourceMetrics`] is a point-in-time copy: exporters only read it and never feed anything
//! back into the reader that produced it.

use std::fmt;

use telemetry_common::attribute::KeyValue;

/// How a sum or histogram aggregates over time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Temporality {
    #[default]
    Cumulative,
    Delta,
}

impl Temporality {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Temporality::Cumulative => "CumulativeTemporality",
            Temporality::Delta => "DeltaTemporality",
        }
    }
}

impl fmt::Display for Temporality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct DataPoint<T> {
    pub attributes: Vec<KeyValue>,
    pub value: T,
}

impl<T> DataPoint<T> {
    pub fn new(value: T) -> Self {
        Self {
            attributes: Vec::new(),
            value,
        }
    }

    #[must_use]
    pub fn with_attributes(mut self, attributes: Vec<KeyValue>) -> Self {
        self.attributes = attributes;
        self
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct HistogramDataPoint<T> {
    pub attributes: Vec<KeyValue>,
    pub count: u64,
    pub sum: Option<T>,
    pub min: Option<T>,
    pub max: Option<T>,
    /// Upper bucket boundaries; `bucket_counts` has one more entry than `bounds`.
    pub bounds: Vec<f64>,
    pub bucket_counts: Vec<u64>,
}

impl<T> Default for HistogramDataPoint<T> {
    fn default() -> Self {
        Self {
            attributes: Vec::new(),
            count: 0,
            sum: None,
            min: None,
            max: None,
            bounds: Vec::new(),
            bucket_counts: Vec::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Sum<T> {
    pub temporality: Temporality,
    pub is_monotonic: bool,
    pub data_points: Vec<DataPoint<T>>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Gauge<T> {
    pub data_points: Vec<DataPoint<T>>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Histogram<T> {
    pub temporality: Temporality,
    pub data_points: Vec<HistogramDataPoint<T>>,
}

/// Aggregated data of one metric, tagged by kind and value type.
#[derive(Clone, Debug, PartialEq)]
pub enum MetricData {
    SumI64(Sum<i64>),
    SumF64(Sum<f64>),
    GaugeI64(Gauge<i64>),
    GaugeF64(Gauge<f64>),
    HistogramI64(Histogram<i64>),
    HistogramF64(Histogram<f64>),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Metric {
    pub name: String,
    pub description: String,
    pub unit: String,
    pub data: MetricData,
}

impl Metric {
    pub fn new(name: impl Into<String>, data: MetricData) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            unit: String::new(),
            data,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InstrumentationScope {
    pub name: String,
    pub version: Option<String>,
}

impl InstrumentationScope {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ScopeMetrics {
    pub scope: InstrumentationScope,
    pub metrics: Vec<Metric>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ResourceMetrics {
    pub resource: Vec<KeyValue>,
    pub scope_metrics: Vec<ScopeMetrics>,
}

impl ResourceMetrics {
    /// Number of metrics across every scope.
    #[must_use]
    pub fn total_metrics(&self) -> usize {
        self.scope_metrics.iter().map(|sm| sm.metrics.len()).sum()
    }

    /// First metric named `name`, searching scopes in order.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&Metric> {
        self.scope_metrics
            .iter()
            .flat_map(|sm| sm.metrics.iter())
            .find(|metric| metric.name == name)
    }

    /// Metrics of the scope named `scope`, or of every scope when `None`.
    pub fn metrics_in_scope<'a>(
        &'a self,
        scope: Option<&'a str>,
    ) -> impl Iterator<Item = &'a Metric> + 'a {
        self.scope_metrics
            .iter()
            .filter(move |sm| scope.map_or(true, |name| sm.scope.name == name))
            .flat_map(|sm| sm.metrics.iter())
    }
}
