// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Helper functions for integration tests

use std::time::Duration;

use metrics_log_exporter::data::{
    DataPoint, Gauge, Histogram, HistogramDataPoint, Metric, MetricData, ResourceMetrics, Sum,
    Temporality,
};
use metrics_log_exporter::test_utils::SnapshotReader;
use telemetry_common::attribute::KeyValue;
use telemetry_common::config::MetricsLogExporterConfig;
use telemetry_common::test_utils::CapturedEvent;

pub const REQUESTS: &str = "router.http.requests";
pub const REQUEST_DURATION: &str = "router.http.request.duration_milliseconds";
pub const UPTIME: &str = "server.uptime";

/// Snapshot resembling what the router records after one successful query.
pub fn router_snapshot() -> ResourceMetrics {
    let attributes = vec![
        KeyValue::string("wg.operation.type", "query"),
        KeyValue::new("http.status_code", 200_i64),
    ];
    let mut snapshot = SnapshotReader::single_scope(
        "cosmo.router",
        vec![
            Metric::new(
                REQUESTS,
                MetricData::SumI64(Sum {
                    temporality: Temporality::Cumulative,
                    is_monotonic: true,
                    data_points: vec![DataPoint::new(1).with_attributes(attributes.clone())],
                }),
            ),
            Metric::new(
                REQUEST_DURATION,
                MetricData::HistogramF64(Histogram {
                    temporality: Temporality::Cumulative,
                    data_points: vec![HistogramDataPoint {
                        attributes,
                        count: 1,
                        sum: Some(3.14),
                        min: Some(3.14),
                        max: Some(3.14),
                        bounds: vec![0.0, 5.0, 10.0],
                        bucket_counts: vec![0, 1, 0, 0],
                    }],
                }),
            ),
            Metric::new(
                UPTIME,
                MetricData::GaugeF64(Gauge {
                    data_points: vec![DataPoint::new(99.5)],
                }),
            ),
        ],
    );
    snapshot.resource = vec![KeyValue::string("service.name", "cosmo-router")];
    snapshot
}

pub fn enabled_config(exclude: &[&str]) -> MetricsLogExporterConfig {
    MetricsLogExporterConfig {
        enabled: true,
        export_interval: Duration::from_millis(100),
        exclude_metrics: exclude.iter().map(|s| (*s).to_string()).collect(),
        ..Default::default()
    }
}

/// The logged `data_points` field, parsed back into one string per point.
pub fn data_points(event: &CapturedEvent) -> Vec<String> {
    let raw = event.str_field("data_points").unwrap_or("[]");
    serde_json::from_str::<Vec<String>>(raw).unwrap_or_default()
}
