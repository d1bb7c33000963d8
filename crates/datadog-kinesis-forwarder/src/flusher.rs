// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Periodic flush loop driving the forwarder.
//!
//! The flusher owns the retry policy: a batch whose outcome is `Failure` is
//! requeued whole and retried on the next cycle, including any records the
//! backend already accepted. One flusher task runs per stream, so at most
//! one flush is in flight at a time.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::interval;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use crate::aggregator_service::AggregatorHandle;
use crate::forwarder::{KinesisLogForwarder, SubmissionOutcome};

/// Log type tag attached to forwarded batches in diagnostics.
const LOG_TYPE: &str = "result";

/// Forwarding service wrapper around one [`KinesisLogForwarder`].
#[derive(Clone)]
pub struct Flusher {
    forwarder: Arc<KinesisLogForwarder>,
    aggregator_handle: AggregatorHandle,
    flush_interval: Duration,
}

impl Flusher {
    #[must_use]
    pub fn new(
        forwarder: Arc<KinesisLogForwarder>,
        aggregator_handle: AggregatorHandle,
        flush_interval: Duration,
    ) -> Self {
        Self {
            forwarder,
            aggregator_handle,
            flush_interval,
        }
    }

    /// One flush cycle: submit batches until the buffer is empty or a batch
    /// fails. The failing batch goes back to the front of the buffer and the
    /// cycle stops; the next tick retries it.
    pub async fn flush(&self) {
        loop {
            let batch = match self.aggregator_handle.next_batch().await {
                Ok(batch) => batch,
                Err(e) => {
                    error!("Failed to drain log buffer: {}", e);
                    return;
                }
            };
            if batch.is_empty() {
                return;
            }

            // The whole batch is resubmitted on failure, so keep a copy.
            let retry_copy = batch.clone();
            match self.forwarder.send(batch, LOG_TYPE).await {
                SubmissionOutcome::Success { accepted } => {
                    debug!("Flushed {} log records", accepted);
                }
                SubmissionOutcome::Failure { message } => {
                    debug!(
                        "Re-buffering {} log records after failed submission: {}",
                        retry_copy.len(),
                        message
                    );
                    if self.aggregator_handle.requeue(retry_copy).is_err() {
                        error!("Log buffer has shut down, dropping failed batch");
                    }
                    return;
                }
            }
        }
    }

    /// Run flush cycles on the configured interval until cancelled, then
    /// drain whatever is still buffered.
    pub async fn run(&self, cancel_token: CancellationToken) {
        let mut ticker = interval(self.flush_interval);
        ticker.tick().await; // discard first tick, which is instantaneous

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.flush().await;
                }
                () = cancel_token.cancelled() => {
                    debug!("Flush loop received shutdown signal, draining buffer");
                    self.flush().await;
                    return;
                }
            }
        }
    }
}
