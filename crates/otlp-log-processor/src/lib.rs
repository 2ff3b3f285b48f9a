// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! OTLP log processor: counts the values of one attribute across ingested logs.
//!
//! Export requests are scanned for a configured attribute key at the resource,
//! scope, and log record level. Each matched value is reduced to a canonical
//! string and handed to a single aggregation task, which keeps running totals
//! and reports them on a fixed interval.

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

pub mod aggregator_service;
pub mod attribute;
pub mod config;
pub mod error;
pub mod extractor;
pub mod logs_service;
pub mod model;
pub mod reporter;
pub mod server;
pub mod telemetry;
pub mod util;
