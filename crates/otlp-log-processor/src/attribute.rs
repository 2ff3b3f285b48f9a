// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Typed attribute values and their canonical string form.
//!
//! Attribute values arrive as a dynamically-typed union. Before they can be
//! counted they are reduced to a single stable string key with
//! [`canonicalize`]. The rendering is part of the output contract: doubles
//! always carry six fractional digits, arrays and key/value lists keep their
//! original order, and nothing is ever sorted or deduplicated.

use opentelemetry_proto::tonic::common::v1::{any_value, AnyValue};
use tracing::trace;

/// A single attribute value.
///
/// `Empty` covers both an attribute whose value was never set and any wire
/// variant this crate does not understand.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum AttributeValue {
    #[default]
    Empty,
    String(String),
    Bool(bool),
    Int(i64),
    Double(f64),
    Array(Vec<AttributeValue>),
    KvList(Vec<KeyValue>),
}

/// A key/value attribute pair. Keys are not required to be unique within a list.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct KeyValue {
    pub key: String,
    pub value: AttributeValue,
}

impl KeyValue {
    pub fn new(key: impl Into<String>, value: AttributeValue) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::String(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        AttributeValue::String(value)
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        AttributeValue::Bool(value)
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        AttributeValue::Int(value)
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        AttributeValue::Double(value)
    }
}

impl From<AnyValue> for AttributeValue {
    fn from(value: AnyValue) -> Self {
        match value.value {
            Some(any_value::Value::StringValue(s)) => AttributeValue::String(s),
            Some(any_value::Value::BoolValue(b)) => AttributeValue::Bool(b),
            Some(any_value::Value::IntValue(i)) => AttributeValue::Int(i),
            Some(any_value::Value::DoubleValue(d)) => AttributeValue::Double(d),
            Some(any_value::Value::ArrayValue(array)) => AttributeValue::Array(
                array.values.into_iter().map(AttributeValue::from).collect(),
            ),
            Some(any_value::Value::KvlistValue(list)) => AttributeValue::KvList(
                list.values.into_iter().map(KeyValue::from).collect(),
            ),
            Some(any_value::Value::BytesValue(bytes)) => {
                trace!("Ignoring unsupported bytes attribute value ({} bytes)", bytes.len());
                AttributeValue::Empty
            }
            None => AttributeValue::Empty,
        }
    }
}

impl From<opentelemetry_proto::tonic::common::v1::KeyValue> for KeyValue {
    fn from(kv: opentelemetry_proto::tonic::common::v1::KeyValue) -> Self {
        Self {
            key: kv.key,
            value: kv.value.map(AttributeValue::from).unwrap_or_default(),
        }
    }
}

/// Reduces an attribute value to its canonical string form.
///
/// Total and pure: every value, however deeply nested, produces a string.
///
/// # Examples
///
/// ```
/// use otlp_log_processor::attribute::{canonicalize, AttributeValue, KeyValue};
///
/// assert_eq!(canonicalize(&AttributeValue::Double(3.14159)), "3.141590");
/// assert_eq!(
///     canonicalize(&AttributeValue::KvList(vec![
///         KeyValue::new("key1", "value1".into()),
///         KeyValue::new("key2", AttributeValue::Int(123)),
///     ])),
///     "{key1:value1,key2:123}"
/// );
/// ```
#[must_use]
pub fn canonicalize(value: &AttributeValue) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &AttributeValue, out: &mut String) {
    match value {
        AttributeValue::Empty => {}
        AttributeValue::String(s) => out.push_str(s),
        AttributeValue::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        AttributeValue::Int(i) => out.push_str(&i.to_string()),
        AttributeValue::Double(d) => write_double(*d, out),
        AttributeValue::Array(values) => {
            out.push('[');
            for (i, element) in values.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(element, out);
            }
            out.push(']');
        }
        AttributeValue::KvList(entries) => {
            out.push('{');
            for (i, entry) in entries.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&entry.key);
                out.push(':');
                write_canonical(&entry.value, out);
            }
            out.push('}');
        }
    }
}

fn write_double(d: f64, out: &mut String) {
    if d.is_nan() {
        out.push_str("NaN");
    } else if d.is_infinite() {
        out.push_str(if d > 0.0 { "+Inf" } else { "-Inf" });
    } else {
        out.push_str(&format!("{d:.6}"));
    }
}
