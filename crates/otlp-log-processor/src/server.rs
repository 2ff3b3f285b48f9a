// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! gRPC server wiring: aggregator task plus the OTLP logs service.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use opentelemetry_proto::tonic::collector::logs::v1::logs_service_server::LogsServiceServer;
use tokio_util::sync::CancellationToken;
use tonic::transport::Server;
use tracing::{debug, error, info};

use crate::aggregator_service::AggregatorService;
use crate::config::ProcessorConfig;
use crate::error::ProcessorError;
use crate::logs_service::LogProcessorService;
use crate::reporter::StatsReporter;
use crate::telemetry::IngestTelemetry;

/// Serves OTLP log exports until `cancel_token` is cancelled.
///
/// Once the server has stopped accepting requests the aggregator is shut
/// down, which emits one last snapshot of the counts.
pub async fn serve(
    config: &ProcessorConfig,
    reporter: Arc<dyn StatsReporter + Send + Sync>,
    cancel_token: CancellationToken,
) -> Result<(), ProcessorError> {
    let now = Instant::now();
    config.validate()?;

    let addr = resolve_listen_addr(&config.listen_addr).await?;

    let telemetry = Arc::new(IngestTelemetry::default());
    let (aggregator, aggregator_handle) =
        AggregatorService::new(config.flush_interval, config.buffer_size, reporter)?;
    let aggregator_task = tokio::spawn(aggregator.with_telemetry(Arc::clone(&telemetry)).run());

    let logs_service = LogProcessorService::new(
        config.attribute_key.clone(),
        aggregator_handle.clone(),
        telemetry,
    );

    info!(
        "Log processor listening on {addr}, counting '{}' every {:?}",
        config.attribute_key, config.flush_interval
    );
    debug!(
        "Time taken to start the log processor: {} ms",
        now.elapsed().as_millis()
    );

    let result = Server::builder()
        .add_service(
            LogsServiceServer::new(logs_service)
                .max_decoding_message_size(config.max_receive_message_size),
        )
        .serve_with_shutdown(addr, cancel_token.cancelled())
        .await;

    debug!("gRPC server stopped, shutting down aggregator");
    if let Err(e) = aggregator_handle.shutdown().await {
        error!("Failed to send shutdown to aggregator: {}", e);
    }
    aggregator_task.await?;

    result.map_err(ProcessorError::from)
}

async fn resolve_listen_addr(listen_addr: &str) -> Result<SocketAddr, ProcessorError> {
    let mut addrs = tokio::net::lookup_host(listen_addr).await.map_err(|e| {
        error!("Failed to resolve listen address {listen_addr}: {e}");
        ProcessorError::AddrResolution(listen_addr.to_string())
    })?;
    addrs
        .next()
        .ok_or_else(|| ProcessorError::AddrResolution(listen_addr.to_string()))
}
