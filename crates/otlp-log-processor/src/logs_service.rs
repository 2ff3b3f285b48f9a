// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! OTLP logs ingestion endpoint.
//!
//! Every export request is scanned for the configured attribute key and each
//! match is forwarded to the aggregator, one value per match, in traversal
//! order. Forwarding waits while the aggregator's intake channel is full, so a
//! slow aggregator slows ingestion down instead of losing values.

use std::sync::Arc;

use opentelemetry_proto::tonic::collector::logs::v1::{
    logs_service_server::LogsService, ExportLogsServiceRequest, ExportLogsServiceResponse,
};
use tonic::{Request, Response, Status};
use tracing::{debug, error, trace};

use crate::aggregator_service::AggregatorHandle;
use crate::extractor::Extractor;
use crate::model::LogBatch;
use crate::telemetry::IngestTelemetry;

#[derive(Clone)]
pub struct LogProcessorService {
    extractor: Arc<Extractor>,
    aggregator_handle: AggregatorHandle,
    telemetry: Arc<IngestTelemetry>,
}

impl LogProcessorService {
    pub fn new(
        attribute_key: impl Into<String>,
        aggregator_handle: AggregatorHandle,
        telemetry: Arc<IngestTelemetry>,
    ) -> Self {
        Self {
            extractor: Arc::new(Extractor::new(attribute_key)),
            aggregator_handle,
            telemetry,
        }
    }

    pub fn telemetry(&self) -> &Arc<IngestTelemetry> {
        &self.telemetry
    }

    /// Forwards every match of the attribute key in `batch` to the aggregator.
    ///
    /// Never fails. If the aggregator has already stopped, the remaining
    /// values of the batch are dropped and logged. Hit counters only cover
    /// values the aggregator accepted.
    pub async fn ingest(&self, batch: &LogBatch) {
        self.telemetry.record_batch();

        let mut forwarded = 0usize;
        for hit in self.extractor.extract(batch) {
            trace!("Matched {} attribute value '{}'", hit.level, hit.value);

            if let Err(e) = self.aggregator_handle.record(hit.value).await {
                error!("Failed to send attribute value to aggregator: {}", e);
                return;
            }
            self.telemetry.record_hit(hit.level);
            forwarded += 1;
        }

        if forwarded > 0 {
            debug!(
                "Forwarded {} '{}' values to aggregator",
                forwarded,
                self.extractor.key()
            );
        }
    }
}

#[tonic::async_trait]
impl LogsService for LogProcessorService {
    async fn export(
        &self,
        request: Request<ExportLogsServiceRequest>,
    ) -> Result<Response<ExportLogsServiceResponse>, Status> {
        debug!("Received ExportLogsServiceRequest");

        let batch = LogBatch::from(request.into_inner());
        self.ingest(&batch).await;

        Ok(Response::new(ExportLogsServiceResponse::default()))
    }
}
