// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Ingestion counters.
//!
//! Purely observational: nothing in the aggregation path reads them.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::extractor::AttributeLevel;

/// Counters updated by the ingestion path (all values use relaxed atomics).
#[derive(Debug, Default)]
pub struct IngestTelemetry {
    batches_received: AtomicU64,
    resource_hits: AtomicU64,
    scope_hits: AtomicU64,
    record_hits: AtomicU64,
}

impl IngestTelemetry {
    pub fn record_batch(&self) {
        self.batches_received.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_hit(&self, level: AttributeLevel) {
        let counter = match level {
            AttributeLevel::Resource => &self.resource_hits,
            AttributeLevel::Scope => &self.scope_hits,
            AttributeLevel::Record => &self.record_hits,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Captures a point-in-time snapshot of the counters.
    pub fn snapshot(&self) -> TelemetrySnapshot {
        TelemetrySnapshot {
            batches_received: self.batches_received.load(Ordering::Relaxed),
            resource_hits: self.resource_hits.load(Ordering::Relaxed),
            scope_hits: self.scope_hits.load(Ordering::Relaxed),
            record_hits: self.record_hits.load(Ordering::Relaxed),
        }
    }
}

/// Plain data representation of [`IngestTelemetry`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TelemetrySnapshot {
    /// Number of export requests received.
    pub batches_received: u64,
    /// Attribute matches on resource attributes.
    pub resource_hits: u64,
    /// Attribute matches on scope attributes.
    pub scope_hits: u64,
    /// Attribute matches on log record attributes.
    pub record_hits: u64,
}

impl fmt::Display for TelemetrySnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "batches_received={}, resource_hits={}, scope_hits={}, record_hits={}",
            self.batches_received, self.resource_hits, self.scope_hits, self.record_hits
        )
    }
}
