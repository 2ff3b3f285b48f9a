// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

use std::env;
use std::process::ExitCode;

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use otlp_log_processor::{config::ProcessorConfig, reporter::build_reporter, server};

#[tokio::main]
pub async fn main() -> ExitCode {
    let log_level = env::var("LOG_PROCESSOR_LOG_LEVEL")
        .map(|val| val.to_lowercase())
        .unwrap_or("info".to_string());

    let env_filter = format!("h2=off,hyper=off,tower=off,{}", log_level);

    #[allow(clippy::expect_used)]
    let subscriber = tracing_subscriber::fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_new(env_filter).expect("could not parse log level in configuration"),
        )
        .with_level(true)
        .with_thread_names(false)
        .with_thread_ids(false)
        .with_line_number(false)
        .with_file(false)
        .with_target(true)
        .finish();

    #[allow(clippy::expect_used)]
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    debug!("Logging subsystem enabled");

    let config = match ProcessorConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!("Error creating config on log processor startup: {e}");
            return ExitCode::FAILURE;
        }
    };

    let cancel_token = CancellationToken::new();
    let signal_token = cancel_token.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Received interrupt, shutting down log processor");
                signal_token.cancel();
            }
            Err(e) => error!("Unable to listen for shutdown signal: {e}"),
        }
    });

    info!("Starting log processor");
    let reporter = build_reporter(config.reporter);
    match server::serve(&config, reporter, cancel_token).await {
        Ok(()) => {
            info!("Log processor stopped");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Error when running log processor: {e}");
            ExitCode::FAILURE
        }
    }
}
