// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Actor service that owns the log buffer.
//!
//! Producers submit lines through a cloneable [`AggregatorHandle`]; the
//! flusher drains batches and requeues failed ones through the same handle.
//! The buffer is only ever touched by the service task, so commands are
//! applied sequentially without locks.

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error};

use crate::aggregator::Aggregator;
use crate::constants::{MAX_BUFFERED_RECORDS, MAX_RECORDS_PER_BATCH};
use crate::error::SubmitError;

/// Commands accepted by the aggregator service.
#[derive(Debug)]
pub enum AggregatorCommand {
    /// Buffer a batch of log lines.
    Submit(Vec<String>),
    /// Drain the next batch (empty when the buffer is empty).
    NextBatch(oneshot::Sender<Vec<String>>),
    /// Return an undelivered batch to the front of the buffer.
    Requeue(Vec<String>),
    /// Stop the service.
    Shutdown,
}

/// One-operation capability handed to dispatch layers that only need to
/// submit log lines, without seeing the rest of the pipeline.
pub trait LogSink {
    /// Buffer one log line for forwarding.
    fn submit(&self, line: String) -> Result<(), SubmitError>;
}

/// Cloneable handle for sending commands to the aggregator service.
#[derive(Clone, Debug)]
pub struct AggregatorHandle {
    tx: mpsc::UnboundedSender<AggregatorCommand>,
}

impl AggregatorHandle {
    /// Buffer a batch of log lines (non-blocking).
    pub fn submit_batch(&self, lines: Vec<String>) -> Result<(), SubmitError> {
        self.tx
            .send(AggregatorCommand::Submit(lines))
            .map_err(|_| SubmitError::BufferClosed)
    }

    /// Drain the next batch from the buffer.
    pub async fn next_batch(&self) -> Result<Vec<String>, String> {
        let (response_tx, response_rx) = oneshot::channel();
        self.tx
            .send(AggregatorCommand::NextBatch(response_tx))
            .map_err(|e| format!("Failed to send batch request: {e}"))?;

        response_rx
            .await
            .map_err(|e| format!("Failed to receive batch response: {e}"))
    }

    /// Return an undelivered batch so it is drained again before newer
    /// records.
    pub fn requeue(&self, batch: Vec<String>) -> Result<(), SubmitError> {
        self.tx
            .send(AggregatorCommand::Requeue(batch))
            .map_err(|_| SubmitError::BufferClosed)
    }

    /// Shut down the aggregator service. Further commands will fail.
    pub fn shutdown(&self) -> Result<(), SubmitError> {
        self.tx
            .send(AggregatorCommand::Shutdown)
            .map_err(|_| SubmitError::BufferClosed)
    }
}

impl LogSink for AggregatorHandle {
    fn submit(&self, line: String) -> Result<(), SubmitError> {
        self.submit_batch(vec![line])
    }
}

/// Service task that owns the aggregator and processes commands.
pub struct AggregatorService {
    aggregator: Aggregator,
    rx: mpsc::UnboundedReceiver<AggregatorCommand>,
}

impl AggregatorService {
    /// Create a service with the standard Kinesis batch limits.
    ///
    /// Returns the service (to be spawned) and a handle for sending
    /// commands to it.
    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn default() -> (Self, AggregatorHandle) {
        Self::new(MAX_RECORDS_PER_BATCH, MAX_BUFFERED_RECORDS)
    }

    /// Create a service with custom limits.
    #[must_use]
    pub fn new(max_batch_records: usize, max_buffered_records: usize) -> (Self, AggregatorHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        let service = Self {
            aggregator: Aggregator::new(max_batch_records, max_buffered_records),
            rx,
        };
        let handle = AggregatorHandle { tx };

        (service, handle)
    }

    /// Process commands until shutdown or until every handle is dropped.
    pub async fn run(mut self) {
        debug!("Log aggregator service started");

        while let Some(command) = self.rx.recv().await {
            match command {
                AggregatorCommand::Submit(lines) => {
                    self.aggregator.add_batch(lines);
                }
                AggregatorCommand::NextBatch(response_tx) => {
                    let batch = self.aggregator.next_batch();
                    if response_tx.send(batch).is_err() {
                        error!("Failed to send batch response - receiver dropped");
                    }
                }
                AggregatorCommand::Requeue(batch) => {
                    self.aggregator.requeue(batch);
                }
                AggregatorCommand::Shutdown => {
                    debug!("Log aggregator service shutting down");
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spawn_service(max_batch_records: usize) -> AggregatorHandle {
        let (service, handle) = AggregatorService::new(max_batch_records, 1000);
        tokio::spawn(service.run());
        handle
    }

    #[tokio::test]
    async fn test_submit_then_next_batch() {
        let handle = spawn_service(500);

        handle
            .submit_batch(vec!["one".to_string(), "two".to_string()])
            .unwrap();

        let batch = handle.next_batch().await.unwrap();
        assert_eq!(batch, vec!["one".to_string(), "two".to_string()]);

        let _ = handle.shutdown();
    }

    #[tokio::test]
    async fn test_next_batch_empty_buffer() {
        let handle = spawn_service(500);

        let batch = handle.next_batch().await.unwrap();
        assert!(batch.is_empty());

        let _ = handle.shutdown();
    }

    #[tokio::test]
    async fn test_next_batch_caps_at_batch_limit() {
        let handle = spawn_service(2);

        let lines: Vec<String> = (0..5).map(|i| format!("line-{i}")).collect();
        handle.submit_batch(lines).unwrap();

        assert_eq!(handle.next_batch().await.unwrap().len(), 2);
        assert_eq!(handle.next_batch().await.unwrap().len(), 2);
        assert_eq!(handle.next_batch().await.unwrap().len(), 1);
        assert!(handle.next_batch().await.unwrap().is_empty());

        let _ = handle.shutdown();
    }

    #[tokio::test]
    async fn test_requeued_batch_is_drained_first() {
        let handle = spawn_service(500);

        handle.submit_batch(vec!["newer".to_string()]).unwrap();
        handle
            .requeue(vec!["failed-1".to_string(), "failed-2".to_string()])
            .unwrap();

        let batch = handle.next_batch().await.unwrap();
        assert_eq!(
            batch,
            vec![
                "failed-1".to_string(),
                "failed-2".to_string(),
                "newer".to_string()
            ]
        );

        let _ = handle.shutdown();
    }

    #[tokio::test]
    async fn test_submit_via_log_sink() {
        let handle = spawn_service(500);
        let sink: &dyn LogSink = &handle;

        sink.submit("a line".to_string()).unwrap();

        let batch = handle.next_batch().await.unwrap();
        assert_eq!(batch, vec!["a line".to_string()]);

        let _ = handle.shutdown();
    }

    #[tokio::test]
    async fn test_commands_fail_after_shutdown() {
        let handle = spawn_service(500);

        handle.shutdown().unwrap();

        // Let the service process the shutdown before probing.
        tokio::time::sleep(tokio::time::Duration::from_millis(10)).await;

        assert!(matches!(
            handle.submit_batch(vec!["late".to_string()]),
            Err(SubmitError::BufferClosed)
        ));
        assert!(handle.next_batch().await.is_err());
    }

    #[tokio::test]
    async fn test_next_batch_fails_when_service_never_ran() {
        let (service, handle) = AggregatorService::default();
        drop(service);

        let result = handle.next_batch().await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_cloned_handles_share_the_buffer() {
        let handle = spawn_service(500);
        let clone = handle.clone();

        handle.submit_batch(vec!["from-original".to_string()]).unwrap();
        clone.submit_batch(vec!["from-clone".to_string()]).unwrap();

        let batch = handle.next_batch().await.unwrap();
        assert_eq!(
            batch,
            vec!["from-original".to_string(), "from-clone".to_string()]
        );

        let _ = handle.shutdown();
    }
}
