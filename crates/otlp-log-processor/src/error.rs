// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

/// Errors that can occur while setting up or running the log processor
#[derive(Debug, thiserror::Error)]
pub enum ProcessorError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Unable to resolve listen address '{0}'")]
    AddrResolution(String),

    #[error("gRPC transport error: {0}")]
    Transport(#[from] tonic::transport::Error),

    #[error("Aggregator task failed: {0}")]
    AggregatorTask(#[from] tokio::task::JoinError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = ProcessorError::InvalidConfig("buffer size must be greater than 0".to_string());
        assert_eq!(
            error.to_string(),
            "Invalid configuration: buffer size must be greater than 0"
        );

        let error = ProcessorError::AddrResolution("nowhere:1".to_string());
        assert_eq!(
            error.to_string(),
            "Unable to resolve listen address 'nowhere:1'"
        );
    }

    #[tokio::test]
    async fn test_join_error_conversion() {
        let task = tokio::spawn(std::future::pending::<()>());
        task.abort();
        let join_error = task.await.unwrap_err();

        let error = ProcessorError::from(join_error);
        assert!(matches!(error, ProcessorError::AggregatorTask(_)));
        assert!(error.to_string().starts_with("Aggregator task failed: "));
        assert!(error.to_string().contains("cancelled"));
    }
}
