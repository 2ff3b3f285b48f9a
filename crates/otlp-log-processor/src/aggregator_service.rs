// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Windowed attribute aggregation service.
//!
//! A single service task owns the count table. Ingestion callers hold cloneable
//! [`AggregatorHandle`]s and push canonical values through a bounded channel;
//! when the channel is full, senders wait. The service wakes on either the next
//! command or its flush ticker, and every tick pushes the running totals to a
//! [`StatsReporter`]. Counts are cumulative for the lifetime of the service.

use std::sync::Arc;
use std::time::Duration;

use fnv::FnvBuildHasher;
use hashbrown::HashMap;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, error, trace};

use crate::error::ProcessorError;
use crate::reporter::{StatsReporter, StatsSnapshot};
use crate::telemetry::IngestTelemetry;

/// Label counted in place of a matched attribute with an empty value.
pub const UNKNOWN_VALUE: &str = "unknown";

type StatsTable = HashMap<String, u64, FnvBuildHasher>;

#[derive(Debug)]
pub enum AggregatorCommand {
    Record(String),
    Snapshot(oneshot::Sender<StatsSnapshot>),
    Shutdown,
}

#[derive(Clone, Debug)]
pub struct AggregatorHandle {
    tx: mpsc::Sender<AggregatorCommand>,
}

impl AggregatorHandle {
    /// Enqueues one canonical value, waiting while the intake channel is full.
    pub async fn record(
        &self,
        value: String,
    ) -> Result<(), mpsc::error::SendError<AggregatorCommand>> {
        self.tx.send(AggregatorCommand::Record(value)).await
    }

    /// Returns the current running totals without waiting for a flush.
    pub async fn snapshot(&self) -> Result<StatsSnapshot, String> {
        let (response_tx, response_rx) = oneshot::channel();
        self.tx
            .send(AggregatorCommand::Snapshot(response_tx))
            .await
            .map_err(|e| format!("Failed to send snapshot command: {}", e))?;

        response_rx
            .await
            .map_err(|e| format!("Failed to receive snapshot response: {}", e))
    }

    /// Asks the service to emit a final snapshot and stop. Values enqueued by
    /// this handle before the call are still counted.
    pub async fn shutdown(&self) -> Result<(), mpsc::error::SendError<AggregatorCommand>> {
        self.tx.send(AggregatorCommand::Shutdown).await
    }

    /// Remaining free slots in the intake channel.
    pub fn available_capacity(&self) -> usize {
        self.tx.capacity()
    }
}

pub struct AggregatorService {
    stats: StatsTable,
    rx: mpsc::Receiver<AggregatorCommand>,
    flush_interval: Duration,
    reporter: Arc<dyn StatsReporter + Send + Sync>,
    telemetry: Option<Arc<IngestTelemetry>>,
}

impl AggregatorService {
    pub fn new(
        flush_interval: Duration,
        capacity: usize,
        reporter: Arc<dyn StatsReporter + Send + Sync>,
    ) -> Result<(Self, AggregatorHandle), ProcessorError> {
        if capacity == 0 {
            return Err(ProcessorError::InvalidConfig(
                "intake channel capacity must be greater than 0".to_string(),
            ));
        }
        if flush_interval.is_zero() {
            return Err(ProcessorError::InvalidConfig(
                "flush interval must be greater than 0".to_string(),
            ));
        }

        let (tx, rx) = mpsc::channel(capacity);

        let service = Self {
            stats: StatsTable::default(),
            rx,
            flush_interval,
            reporter,
            telemetry: None,
        };

        let handle = AggregatorHandle { tx };

        Ok((service, handle))
    }

    /// Logs the given ingestion counters alongside every flush.
    #[must_use]
    pub fn with_telemetry(mut self, telemetry: Arc<IngestTelemetry>) -> Self {
        self.telemetry = Some(telemetry);
        self
    }

    pub async fn run(mut self) {
        debug!(
            "Aggregator service started, flushing every {:?}",
            self.flush_interval
        );

        let mut ticker = interval_at(Instant::now() + self.flush_interval, self.flush_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticker.tick() => self.flush(),

                command = self.rx.recv() => match command {
                    Some(AggregatorCommand::Record(value)) => self.record(value),

                    Some(AggregatorCommand::Snapshot(response_tx)) => {
                        if response_tx.send(self.snapshot()).is_err() {
                            error!("Failed to send snapshot response - receiver dropped");
                        }
                    }

                    Some(AggregatorCommand::Shutdown) => {
                        debug!("Aggregator service shutting down");
                        self.flush();
                        break;
                    }

                    None => {
                        debug!("All aggregator handles dropped, shutting down");
                        self.flush();
                        break;
                    }
                },
            }
        }

        debug!("Aggregator service stopped");
    }

    #[cfg(test)]
    pub(crate) fn rx_for_test(&mut self) -> &mut mpsc::Receiver<AggregatorCommand> {
        &mut self.rx
    }

    fn record(&mut self, value: String) {
        let label = if value.is_empty() {
            UNKNOWN_VALUE.to_string()
        } else {
            value
        };
        trace!("Counting attribute value {label}");
        *self.stats.entry(label).or_insert(0) += 1;
    }

    fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            entries: self
                .stats
                .iter()
                .map(|(value, count)| (value.clone(), *count))
                .collect(),
        }
    }

    fn flush(&self) {
        let snapshot = self.snapshot();
        debug!("Flushing {} distinct attribute values", snapshot.len());
        self.reporter.report(&snapshot);

        if let Some(telemetry) = &self.telemetry {
            debug!("Ingest telemetry: {}", telemetry.snapshot());
        }
    }
}
