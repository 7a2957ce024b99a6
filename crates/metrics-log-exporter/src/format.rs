// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Renders a [`Metric`] into the fields of one `"Metric"` log entry.

use std::fmt::{self, Write};

use telemetry_common::attribute::KeyValue;

use crate::data::{DataPoint, HistogramDataPoint, Metric, MetricData};

/// Log fields for one metric.
#[derive(Clone, Debug, PartialEq)]
pub struct MetricRecord<'a> {
    pub name: &'a str,
    /// `<kind>:<valuetype>`, e.g. `sum:int64`.
    pub type_tag: &'static str,
    /// Sums and histograms only.
    pub temporality: Option<&'static str>,
    /// Sums only.
    pub monotonic: Option<bool>,
    pub data_points: Vec<String>,
}

impl<'a> MetricRecord<'a> {
    #[must_use]
    pub fn from_metric(metric: &'a Metric) -> Self {
        let name = metric.name.as_str();
        match &metric.data {
            MetricData::SumI64(sum) => Self {
                name,
                type_tag: "sum:int64",
                temporality: Some(sum.temporality.as_str()),
                monotonic: Some(sum.is_monotonic),
                data_points: scalar_points(&sum.data_points),
            },
            MetricData::SumF64(sum) => Self {
                name,
                type_tag: "sum:float64",
                temporality: Some(sum.temporality.as_str()),
                monotonic: Some(sum.is_monotonic),
                data_points: scalar_points(&sum.data_points),
            },
            MetricData::GaugeI64(gauge) => Self {
                name,
                type_tag: "gauge:int64",
                temporality: None,
                monotonic: None,
                data_points: scalar_points(&gauge.data_points),
            },
            MetricData::GaugeF64(gauge) => Self {
                name,
                type_tag: "gauge:float64",
                temporality: None,
                monotonic: None,
                data_points: scalar_points(&gauge.data_points),
            },
            MetricData::HistogramI64(histogram) => Self {
                name,
                type_tag: "histogram:int64",
                temporality: Some(histogram.temporality.as_str()),
                monotonic: None,
                data_points: histogram_points(&histogram.data_points),
            },
            MetricData::HistogramF64(histogram) => Self {
                name,
                type_tag: "histogram:float64",
                temporality: Some(histogram.temporality.as_str()),
                monotonic: None,
                data_points: histogram_points(&histogram.data_points),
            },
        }
    }

    /// `data_points` as a JSON array of strings, so values containing `", "` stay unambiguous.
    #[must_use]
    pub fn data_points_json(&self) -> String {
        serde_json::to_string(&self.data_points).unwrap_or_default()
    }
}

fn scalar_points<T: fmt::Display>(points: &[DataPoint<T>]) -> Vec<String> {
    points
        .iter()
        .map(|point| {
            let mut out = format!("value={}", point.value);
            push_attributes(&mut out, &point.attributes);
            out
        })
        .collect()
}

fn histogram_points<T: fmt::Display>(points: &[HistogramDataPoint<T>]) -> Vec<String> {
    points
        .iter()
        .map(|point| {
            let mut out = format!("count={}", point.count);
            for (label, value) in [("sum", &point.sum), ("min", &point.min), ("max", &point.max)] {
                if let Some(value) = value {
                    let _ = write!(out, " {label}={value}");
                }
            }
            push_attributes(&mut out, &point.attributes);
            out
        })
        .collect()
}

fn push_attributes(out: &mut String, attributes: &[KeyValue]) {
    if attributes.is_empty() {
        return;
    }
    out.push_str(" attributes={");
    for (i, kv) in attributes.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        let _ = write!(out, "{kv}");
    }
    out.push('}');
}
