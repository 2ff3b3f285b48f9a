// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Finds every occurrence of the configured attribute key in a log batch.
//!
//! Traversal order is fixed so that the values handed to the aggregator are
//! reproducible:
//!
//! ```text
//! for each ResourceLogs
//!     resource attributes
//!     for each ScopeLogs
//!         attributes of every LogRecord
//!         scope attributes
//! ```

use std::fmt;

use crate::attribute::{canonicalize, AttributeValue, KeyValue};
use crate::model::LogBatch;

/// Hierarchy level an attribute was matched at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeLevel {
    Resource,
    Scope,
    Record,
}

impl fmt::Display for AttributeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Resource => write!(f, "resource"),
            Self::Scope => write!(f, "scope"),
            Self::Record => write!(f, "record"),
        }
    }
}

/// A matched attribute, already reduced to its canonical form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedValue {
    pub level: AttributeLevel,
    pub value: String,
}

#[derive(Debug, Clone)]
pub struct Extractor {
    key: String,
}

impl Extractor {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Lazily yields the canonical value of every attribute whose key equals
    /// the configured key, byte for byte.
    pub fn extract<'a>(
        &'a self,
        batch: &'a LogBatch,
    ) -> impl Iterator<Item = ExtractedValue> + 'a {
        let key = self.key.as_str();
        batch
            .resource_logs
            .iter()
            .flat_map(move |resource_logs| {
                let resource_hits = matching(&resource_logs.attributes, key)
                    .map(|value| (AttributeLevel::Resource, value));

                let scope_hits = resource_logs.scope_logs.iter().flat_map(move |scope_logs| {
                    let record_hits = scope_logs
                        .log_records
                        .iter()
                        .flat_map(move |record| matching(&record.attributes, key))
                        .map(|value| (AttributeLevel::Record, value));

                    record_hits.chain(
                        matching(&scope_logs.attributes, key)
                            .map(|value| (AttributeLevel::Scope, value)),
                    )
                });

                resource_hits.chain(scope_hits)
            })
            .map(|(level, value)| ExtractedValue {
                level,
                value: canonicalize(value),
            })
    }
}

fn matching<'a>(
    attributes: &'a [KeyValue],
    key: &'a str,
) -> impl Iterator<Item = &'a AttributeValue> + 'a {
    attributes
        .iter()
        .filter(move |attribute| attribute.key == key)
        .map(|attribute| &attribute.value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LogRecord, ResourceLogs, ScopeLogs};

    const KEY: &str = "service.name";

    fn kv(key: &str, value: &str) -> KeyValue {
        KeyValue::new(key, value.into())
    }

    fn values(extractor: &Extractor, batch: &LogBatch) -> Vec<String> {
        extractor.extract(batch).map(|hit| hit.value).collect()
    }

    #[test]
    fn test_resource_level_match() {
        let batch = LogBatch {
            resource_logs: vec![ResourceLogs {
                attributes: vec![kv(KEY, "test-service")],
                scope_logs: vec![],
            }],
        };

        let hits: Vec<ExtractedValue> = Extractor::new(KEY).extract(&batch).collect();
        assert_eq!(
            hits,
            vec![ExtractedValue {
                level: AttributeLevel::Resource,
                value: "test-service".to_string(),
            }]
        );
    }

    #[test]
    fn test_record_level_match() {
        let batch = LogBatch {
            resource_logs: vec![ResourceLogs {
                attributes: vec![],
                scope_logs: vec![ScopeLogs {
                    attributes: vec![],
                    log_records: vec![LogRecord {
                        attributes: vec![kv(KEY, "test-log-service")],
                    }],
                }],
            }],
        };

        let hits: Vec<ExtractedValue> = Extractor::new(KEY).extract(&batch).collect();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].level, AttributeLevel::Record);
        assert_eq!(hits[0].value, "test-log-service");
    }

    #[test]
    fn test_scope_level_match() {
        let batch = LogBatch {
            resource_logs: vec![ResourceLogs {
                attributes: vec![],
                scope_logs: vec![ScopeLogs {
                    attributes: vec![kv(KEY, "test-scope-service")],
                    log_records: vec![],
                }],
            }],
        };

        let hits: Vec<ExtractedValue> = Extractor::new(KEY).extract(&batch).collect();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].level, AttributeLevel::Scope);
        assert_eq!(hits[0].value, "test-scope-service");
    }

    #[test]
    fn test_traversal_order() {
        let batch = LogBatch {
            resource_logs: vec![
                ResourceLogs {
                    attributes: vec![kv(KEY, "r1"), kv("other", "x"), kv(KEY, "r1-dup")],
                    scope_logs: vec![
                        ScopeLogs {
                            attributes: vec![kv(KEY, "s1")],
                            log_records: vec![
                                LogRecord {
                                    attributes: vec![kv(KEY, "l1")],
                                },
                                LogRecord {
                                    attributes: vec![kv(KEY, "l2")],
                                },
                            ],
                        },
                        ScopeLogs {
                            attributes: vec![kv(KEY, "s2")],
                            log_records: vec![LogRecord {
                                attributes: vec![kv(KEY, "l3")],
                            }],
                        },
                    ],
                },
                ResourceLogs {
                    attributes: vec![kv(KEY, "r2")],
                    scope_logs: vec![],
                },
            ],
        };

        assert_eq!(
            values(&Extractor::new(KEY), &batch),
            vec!["r1", "r1-dup", "l1", "l2", "s1", "l3", "s2", "r2"]
        );
    }

    #[test]
    fn test_key_match_is_exact() {
        let batch = LogBatch {
            resource_logs: vec![ResourceLogs {
                attributes: vec![
                    kv("Service.Name", "upper"),
                    kv("service.name.suffix", "suffix"),
                    kv("service", "prefix"),
                    kv(" service.name", "space"),
                ],
                scope_logs: vec![],
            }],
        };

        assert!(values(&Extractor::new(KEY), &batch).is_empty());
    }

    #[test]
    fn test_no_matches_and_empty_batch() {
        let extractor = Extractor::new(KEY);
        assert_eq!(extractor.extract(&LogBatch::default()).count(), 0);

        let batch = LogBatch {
            resource_logs: vec![ResourceLogs {
                attributes: vec![kv("host.name", "box")],
                scope_logs: vec![ScopeLogs::default()],
            }],
        };
        assert_eq!(extractor.extract(&batch).count(), 0);
    }

    #[test]
    fn test_typed_and_null_values_are_canonicalized() {
        let batch = LogBatch {
            resource_logs: vec![ResourceLogs {
                attributes: vec![
                    KeyValue::new(KEY, AttributeValue::Int(7)),
                    KeyValue::new(KEY, AttributeValue::Empty),
                    KeyValue::new(
                        KEY,
                        AttributeValue::Array(vec![AttributeValue::Double(0.5)]),
                    ),
                ],
                scope_logs: vec![],
            }],
        };

        assert_eq!(
            values(&Extractor::new(KEY), &batch),
            vec!["7", "", "[0.500000]"]
        );
    }

    #[test]
    fn test_level_display() {
        assert_eq!(AttributeLevel::Resource.to_string(), "resource");
        assert_eq!(AttributeLevel::Scope.to_string(), "scope");
        assert_eq!(AttributeLevel::Record.to_string(), "record");
    }
}
