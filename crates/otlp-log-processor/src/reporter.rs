// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Destinations for periodic attribute statistics.

use std::fmt;
use std::io::{self, Write};
use std::sync::Arc;

use tracing::{error, info};

use crate::config::ReporterKind;

/// Point-in-time copy of the running attribute counts.
///
/// Entries are in whatever order the aggregator's table iterates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub entries: Vec<(String, u64)>,
}

impl StatsSnapshot {
    pub fn get(&self, value: &str) -> Option<u64> {
        self.entries
            .iter()
            .find(|(entry, _)| entry == value)
            .map(|(_, count)| *count)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total(&self) -> u64 {
        self.entries.iter().map(|(_, count)| count).sum()
    }
}

impl fmt::Display for StatsSnapshot {
    /// Renders the `Log stats:` dump, one `<value> - <count>` line per entry.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Log stats:")?;
        for (value, count) in &self.entries {
            writeln!(f, "{value} - {count}")?;
        }
        Ok(())
    }
}

/// Receives a snapshot on every aggregator flush.
///
/// Called from inside the aggregator loop, so implementations must not block.
pub trait StatsReporter {
    fn report(&self, snapshot: &StatsSnapshot);
}

/// Prints the dump to standard output.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutReporter;

impl StdoutReporter {
    pub fn report_to<W: Write>(&self, snapshot: &StatsSnapshot, out: &mut W) -> io::Result<()> {
        write!(out, "{snapshot}")?;
        out.flush()
    }
}

impl StatsReporter for StdoutReporter {
    fn report(&self, snapshot: &StatsSnapshot) {
        let mut stdout = io::stdout().lock();
        if let Err(e) = self.report_to(snapshot, &mut stdout) {
            error!("Failed to write log stats to stdout: {e}");
        }
    }
}

/// Emits the dump as `info` events, one per line.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl StatsReporter for TracingReporter {
    fn report(&self, snapshot: &StatsSnapshot) {
        info!("Log stats:");
        for (value, count) in &snapshot.entries {
            info!("{value} - {count}");
        }
    }
}

pub fn build_reporter(kind: ReporterKind) -> Arc<dyn StatsReporter + Send + Sync> {
    match kind {
        ReporterKind::Stdout => Arc::new(StdoutReporter),
        ReporterKind::Log => Arc::new(TracingReporter),
    }
}
