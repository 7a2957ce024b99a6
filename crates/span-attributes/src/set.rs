// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::collections::{BTreeMap, HashMap};

use telemetry_common::attribute::{KeyValue, Value};

/// A span's mutable key/value attributes.
///
/// Processors only need to visit each value once with its key, so any collection a span type
/// stores its attributes in can take part without conversion.
pub trait AttributeSet {
    fn for_each_value_mut(&mut self, f: &mut dyn FnMut(&str, &mut Value));
}

impl AttributeSet for [KeyValue] {
    fn for_each_value_mut(&mut self, f: &mut dyn FnMut(&str, &mut Value)) {
        for kv in self.iter_mut() {
            f(&kv.key, &mut kv.value);
        }
    }
}

impl AttributeSet for Vec<KeyValue> {
    fn for_each_value_mut(&mut self, f: &mut dyn FnMut(&str, &mut Value)) {
        self.as_mut_slice().for_each_value_mut(f);
    }
}

impl AttributeSet for HashMap<String, Value> {
    fn for_each_value_mut(&mut self, f: &mut dyn FnMut(&str, &mut Value)) {
        for (key, value) in self.iter_mut() {
            f(key, value);
        }
    }
}

impl AttributeSet for BTreeMap<String, Value> {
    fn for_each_value_mut(&mut self, f: &mut dyn FnMut(&str, &mut Value)) {
        for (key, value) in self.iter_mut() {
            f(key, value);
        }
    }
}
