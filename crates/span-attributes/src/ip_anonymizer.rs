// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Redacts or hashes attributes known to carry client IP addresses.

use sha2::{Digest, Sha256};
use telemetry_common::attribute::{StringValue, Value};
use telemetry_common::config::{IpAnonymizationConfig, IpAnonymizationMethod};

use crate::pipeline::AttributeProcessor;
use crate::set::AttributeSet;

/// Attribute keys whose string values are treated as IP addresses.
pub const IP_ATTRIBUTE_KEYS: &[&str] = &[
    "http.client_ip",
    "net.sock.peer.addr",
    "client.address",
    "network.peer.address",
];

/// Replacement written by [`IpAnonymizationMethod::Redact`].
pub const REDACTED_VALUE: &str = "[REDACTED]";

#[derive(Clone, Debug)]
pub struct IpAnonymizer {
    config: IpAnonymizationConfig,
}

impl IpAnonymizer {
    #[must_use]
    pub fn new(config: IpAnonymizationConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn is_ip_key(key: &str) -> bool {
        IP_ATTRIBUTE_KEYS.contains(&key)
    }

    fn anonymize(&self, original: &StringValue) -> StringValue {
        match self.config.method {
            IpAnonymizationMethod::Redact => StringValue::from(REDACTED_VALUE),
            IpAnonymizationMethod::Hash => StringValue::from(hash_ip(original.as_bytes())),
        }
    }
}

impl AttributeProcessor for IpAnonymizer {
    fn name(&self) -> &'static str {
        "ip_anonymizer"
    }

    fn process(&self, attributes: &mut dyn AttributeSet) {
        if !self.config.enabled {
            return;
        }
        attributes.for_each_value_mut(&mut |key, value| {
            if !Self::is_ip_key(key) {
                return;
            }
            if let Value::String(original) = value {
                *original = self.anonymize(original);
            }
        });
    }
}

/// SHA-256 of the raw value, lowercase hex. Always 64 characters.
#[must_use]
pub fn hash_ip(value: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(value);
    hex::encode(hasher.finalize())
}
