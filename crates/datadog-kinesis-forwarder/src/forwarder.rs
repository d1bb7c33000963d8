// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Core batch forwarder for shipping log records to a Kinesis stream.
//!
//! One `send` call turns an ordered batch of log records into PutRecords
//! entries, submits them in a single request, and collapses the per-record
//! results into a single [`SubmissionOutcome`] for the retry layer.

use std::sync::Arc;

use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::config::ForwarderConfig;
use crate::constants::{MAX_PARTITION_KEY_BYTES, MAX_RECORD_BYTES};
use crate::error::SetupError;
use crate::transport::{PutRecordsResponse, RecordEntry, StreamClient};

/// Result of one batch submission, as seen by the retry layer.
///
/// `Failure` means the batch is unresolved as a whole: either the transport
/// call failed, or at least one record was rejected. The flusher re-buffers
/// the entire batch in both cases, which can redeliver records the backend
/// already accepted. [`BatchDisposition`] keeps the finer-grained view so a
/// future per-record retry strategy can replace this policy without touching
/// callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    /// Every submitted record was accepted.
    Success { accepted: usize },
    /// At least one record was rejected, or the request itself failed.
    Failure { message: String },
}

impl SubmissionOutcome {
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, SubmissionOutcome::Success { .. })
    }
}

/// What actually happened to a submitted batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum BatchDisposition {
    Accepted {
        count: usize,
    },
    PartiallyFailed {
        first_error: String,
        failed_indices: Vec<usize>,
    },
    TransportError {
        cause: String,
    },
}

impl BatchDisposition {
    fn into_outcome(self) -> SubmissionOutcome {
        match self {
            BatchDisposition::Accepted { count } => SubmissionOutcome::Success { accepted: count },
            BatchDisposition::PartiallyFailed { first_error, .. } => SubmissionOutcome::Failure {
                message: first_error,
            },
            BatchDisposition::TransportError { cause } => {
                SubmissionOutcome::Failure { message: cause }
            }
        }
    }
}

/// Interpret a PutRecords response.
///
/// A zero failed count is full acceptance. Otherwise the first entry
/// carrying a non-empty error message represents the whole batch. A nonzero
/// failed count with no error message on any entry is treated as accepted,
/// preserving the legacy interpretation of this response shape.
pub(crate) fn interpret_response(response: &PutRecordsResponse) -> BatchDisposition {
    if response.failed_record_count == 0 {
        return BatchDisposition::Accepted {
            count: response.records.len(),
        };
    }

    let first_error = response
        .records
        .iter()
        .find_map(|record| {
            record
                .error_message
                .as_deref()
                .filter(|message| !message.is_empty())
        })
        .map(str::to_string);

    match first_error {
        Some(first_error) => {
            let failed_indices = response
                .records
                .iter()
                .enumerate()
                .filter(|(_, record)| record.is_failed())
                .map(|(index, _)| index)
                .collect();
            BatchDisposition::PartiallyFailed {
                first_error,
                failed_indices,
            }
        }
        None => {
            warn!(
                "Kinesis reported {} failed records but no error message, treating batch as accepted",
                response.failed_record_count
            );
            BatchDisposition::Accepted {
                count: response.records.len(),
            }
        }
    }
}

/// Truncate to at most `max` bytes without splitting a UTF-8 character.
fn truncate_at_char_boundary(value: &mut String, max: usize) {
    if value.len() <= max {
        return;
    }
    let mut end = max;
    while !value.is_char_boundary(end) {
        end -= 1;
    }
    value.truncate(end);
}

/// Forwards batches of log records to a single Kinesis stream.
///
/// Holds the only state that survives between calls: the transport client,
/// the destination stream name, and the stable partition key derived from
/// host identity at initialization. In random-partition-key mode a fresh
/// key is generated per call rather than stored, so `send` never mutates
/// shared state.
pub struct KinesisLogForwarder {
    client: Arc<dyn StreamClient>,
    stream_name: String,
    partition_key: String,
    random_partition_key: bool,
}

impl KinesisLogForwarder {
    /// Validate configuration, verify the destination stream is reachable,
    /// and derive the stable partition key from the host identity.
    ///
    /// The reachability check runs exactly once here; `send` never
    /// re-verifies it.
    pub async fn initialize(
        config: &ForwarderConfig,
        client: Arc<dyn StreamClient>,
        host_identity: &str,
    ) -> Result<Self, SetupError> {
        config.validate()?;

        let description = client
            .describe_stream(&config.stream_name)
            .await
            .map_err(|e| {
                SetupError::Connectivity(format!(
                    "Could not find Kinesis stream {}: {}",
                    config.stream_name, e
                ))
            })?;
        debug!(
            "Kinesis logging initialized with stream: {} (status {})",
            description.name, description.status
        );

        // Kinesis caps partition keys at 256 bytes.
        let mut partition_key = host_identity.to_string();
        truncate_at_char_boundary(&mut partition_key, MAX_PARTITION_KEY_BYTES);

        Ok(Self {
            client,
            stream_name: config.stream_name.clone(),
            partition_key,
            random_partition_key: config.random_partition_key,
        })
    }

    /// Submit one batch of records.
    ///
    /// Records larger than [`MAX_RECORD_BYTES`] are dropped with a
    /// diagnostic; they are neither retried nor reflected in the outcome.
    /// The surviving records are submitted in a single PutRecords call in
    /// input order. Batches longer than the per-call record limit are the
    /// caller's responsibility to pre-chunk; the forwarder does not split
    /// them. An all-oversized (or empty) batch returns a vacuous success
    /// without any network call.
    pub async fn send(&self, records: Vec<String>, log_type: &str) -> SubmissionOutcome {
        let partition_key = self.batch_partition_key();

        let mut entries: Vec<RecordEntry> = Vec::with_capacity(records.len());
        for record in records {
            if record.len() > MAX_RECORD_BYTES {
                error!(
                    "Kinesis {} log too big ({} bytes), discarding",
                    log_type,
                    record.len()
                );
                continue;
            }
            entries.push(RecordEntry {
                partition_key: partition_key.clone(),
                data: record,
            });
        }

        if entries.is_empty() {
            return SubmissionOutcome::Success { accepted: 0 };
        }

        let submitted = entries.len();
        let disposition = match self.client.put_records(&self.stream_name, entries).await {
            Ok(response) => interpret_response(&response),
            Err(e) => BatchDisposition::TransportError {
                cause: e.to_string(),
            },
        };

        match &disposition {
            BatchDisposition::Accepted { count } => {
                debug!("Successfully sent {} {} logs to Kinesis", count, log_type);
            }
            BatchDisposition::PartiallyFailed {
                first_error,
                failed_indices,
            } => {
                error!(
                    "Kinesis write for {} of {} records failed with error {}",
                    failed_indices.len(),
                    submitted,
                    first_error
                );
            }
            BatchDisposition::TransportError { cause } => {
                error!("Kinesis PutRecords request failed: {}", cause);
            }
        }

        disposition.into_outcome()
    }

    /// Partition key for one batch: a fresh UUID per call in random mode,
    /// the cached host-derived key otherwise.
    fn batch_partition_key(&self) -> String {
        if self.random_partition_key {
            Uuid::new_v4().to_string()
        } else {
            self.partition_key.clone()
        }
    }

    #[must_use]
    pub fn stream_name(&self) -> &str {
        &self.stream_name
    }
}
