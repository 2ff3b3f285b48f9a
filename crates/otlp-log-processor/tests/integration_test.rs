// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use opentelemetry_proto::tonic::collector::logs::v1::{
    logs_service_client::LogsServiceClient, ExportLogsServiceRequest,
};
use opentelemetry_proto::tonic::common::v1::{any_value, AnyValue, InstrumentationScope, KeyValue};
use opentelemetry_proto::tonic::logs::v1::{LogRecord, ResourceLogs, ScopeLogs};
use opentelemetry_proto::tonic::resource::v1::Resource;
use otlp_log_processor::{
    config::ProcessorConfig,
    reporter::{StatsReporter, StatsSnapshot},
    server,
};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::{sleep, timeout, Duration};
use tokio_util::sync::CancellationToken;
use tonic::transport::Channel;

struct ChannelReporter(mpsc::UnboundedSender<StatsSnapshot>);

impl StatsReporter for ChannelReporter {
    fn report(&self, snapshot: &StatsSnapshot) {
        let _ = self.0.send(snapshot.clone());
    }
}

fn string_kv(key: &str, value: &str) -> KeyValue {
    KeyValue {
        key: key.to_string(),
        value: Some(AnyValue {
            value: Some(any_value::Value::StringValue(value.to_string())),
        }),
    }
}

fn request(resource: &str, scope: &str, records: &[&str]) -> ExportLogsServiceRequest {
    ExportLogsServiceRequest {
        resource_logs: vec![ResourceLogs {
            resource: Some(Resource {
                attributes: vec![string_kv("service.name", resource)],
                ..Default::default()
            }),
            scope_logs: vec![ScopeLogs {
                scope: Some(InstrumentationScope {
                    attributes: vec![string_kv("service.name", scope)],
                    ..Default::default()
                }),
                log_records: records
                    .iter()
                    .map(|value| LogRecord {
                        attributes: vec![string_kv("service.name", value)],
                        ..Default::default()
                    })
                    .collect(),
                ..Default::default()
            }],
            ..Default::default()
        }],
    }
}

async fn start_server(
    config: ProcessorConfig,
) -> (
    CancellationToken,
    tokio::task::JoinHandle<Result<(), otlp_log_processor::error::ProcessorError>>,
    mpsc::UnboundedReceiver<StatsSnapshot>,
) {
    let (reports_tx, reports_rx) = mpsc::unbounded_channel();
    let cancel_token = CancellationToken::new();
    let server_token = cancel_token.clone();
    let server_task = tokio::spawn(async move {
        server::serve(&config, Arc::new(ChannelReporter(reports_tx)), server_token).await
    });
    (cancel_token, server_task, reports_rx)
}

async fn connect(addr: &'static str) -> LogsServiceClient<Channel> {
    let connect = async {
        loop {
            match LogsServiceClient::connect(addr).await {
                Ok(client) => return client,
                Err(_) => sleep(Duration::from_millis(20)).await,
            }
        }
    };
    timeout(Duration::from_secs(5), connect)
        .await
        .expect("timed out connecting to log processor")
}

#[tokio::test]
async fn log_processor_counts_exported_attributes() {
    let config = ProcessorConfig {
        listen_addr: "127.0.0.1:14317".to_string(),
        flush_interval: Duration::from_millis(200),
        buffer_size: 8,
        ..Default::default()
    };
    let (cancel_token, server_task, mut reports) = start_server(config).await;
    let mut client = connect("http://127.0.0.1:14317").await;

    client
        .export(request("frontend", "frontend", &["checkout", "checkout"]))
        .await
        .expect("export failed");
    client
        .export(request("frontend", "cart", &[]))
        .await
        .expect("export failed");

    let counted = async {
        loop {
            let snapshot = reports.recv().await.expect("reporter closed");
            if snapshot.total() == 6 {
                return snapshot;
            }
        }
    };
    let snapshot = timeout(Duration::from_secs(5), counted)
        .await
        .expect("timed out waiting for stats report");

    assert_eq!(snapshot.get("frontend"), Some(3));
    assert_eq!(snapshot.get("checkout"), Some(2));
    assert_eq!(snapshot.get("cart"), Some(1));
    assert_eq!(snapshot.len(), 3);

    cancel_token.cancel();
    timeout(Duration::from_secs(5), server_task)
        .await
        .expect("server did not stop")
        .expect("server task panicked")
        .expect("server returned an error");

    let mut last = None;
    while let Ok(snapshot) = reports.try_recv() {
        last = Some(snapshot);
    }
    let last = last.expect("no final report after shutdown");
    assert_eq!(last.total(), 6);
}

#[tokio::test]
async fn log_processor_rejects_oversized_messages() {
    let config = ProcessorConfig {
        listen_addr: "127.0.0.1:14318".to_string(),
        max_receive_message_size: 1024,
        ..Default::default()
    };
    let (cancel_token, server_task, _reports) = start_server(config).await;
    let mut client = connect("http://127.0.0.1:14318").await;

    let oversized = "x".repeat(4096);
    let result = client.export(request(&oversized, "scope", &[])).await;
    assert!(result.is_err());

    client
        .export(request("small", "scope", &[]))
        .await
        .expect("small export should succeed");

    cancel_token.cancel();
    timeout(Duration::from_secs(5), server_task)
        .await
        .expect("server did not stop")
        .expect("server task panicked")
        .expect("server returned an error");
}
