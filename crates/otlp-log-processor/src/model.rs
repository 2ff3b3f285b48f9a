// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Attribute view of an ingested OTLP logs request.
//!
//! Only the parts of the OTLP hierarchy that carry attributes are kept. A
//! missing `resource` or `scope` message is indistinguishable from one with
//! no attributes.

use opentelemetry_proto::tonic::collector::logs::v1::ExportLogsServiceRequest;
use opentelemetry_proto::tonic::logs::v1 as otlp;

use crate::attribute::KeyValue;

/// One unit of ingestion: every `ResourceLogs` of a single export request.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LogBatch {
    pub resource_logs: Vec<ResourceLogs>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResourceLogs {
    pub attributes: Vec<KeyValue>,
    pub scope_logs: Vec<ScopeLogs>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScopeLogs {
    pub attributes: Vec<KeyValue>,
    pub log_records: Vec<LogRecord>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct LogRecord {
    pub attributes: Vec<KeyValue>,
}

fn convert_attributes(
    attributes: Vec<opentelemetry_proto::tonic::common::v1::KeyValue>,
) -> Vec<KeyValue> {
    attributes.into_iter().map(KeyValue::from).collect()
}

impl From<ExportLogsServiceRequest> for LogBatch {
    fn from(request: ExportLogsServiceRequest) -> Self {
        Self {
            resource_logs: request
                .resource_logs
                .into_iter()
                .map(ResourceLogs::from)
                .collect(),
        }
    }
}

impl From<otlp::ResourceLogs> for ResourceLogs {
    fn from(logs: otlp::ResourceLogs) -> Self {
        Self {
            attributes: logs
                .resource
                .map(|resource| convert_attributes(resource.attributes))
                .unwrap_or_default(),
            scope_logs: logs.scope_logs.into_iter().map(ScopeLogs::from).collect(),
        }
    }
}

impl From<otlp::ScopeLogs> for ScopeLogs {
    fn from(logs: otlp::ScopeLogs) -> Self {
        Self {
            attributes: logs
                .scope
                .map(|scope| convert_attributes(scope.attributes))
                .unwrap_or_default(),
            log_records: logs.log_records.into_iter().map(LogRecord::from).collect(),
        }
    }
}

impl From<otlp::LogRecord> for LogRecord {
    fn from(record: otlp::LogRecord) -> Self {
        Self {
            attributes: convert_attributes(record.attributes),
        }
    }
}
