// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Transport seam between the forwarder and the streaming backend.
//!
//! The forwarder only ever talks to a [`StreamClient`]. The production
//! implementation wraps the Kinesis SDK ([`crate::kinesis`]); tests
//! substitute stubs so batch construction and result interpretation can be
//! exercised without AWS.

use async_trait::async_trait;

/// A single record prepared for submission: the opaque payload plus the
/// partition key the backend uses to route it to a shard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordEntry {
    pub partition_key: String,
    pub data: String,
}

/// Per-record result reported by the backend for one submitted entry.
///
/// Accepted entries carry a sequence number; rejected entries carry an
/// error code and message instead.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordResult {
    pub sequence_number: Option<String>,
    pub error_code: Option<String>,
    pub error_message: Option<String>,
}

impl RecordResult {
    /// Whether the backend rejected this entry.
    #[must_use]
    pub fn is_failed(&self) -> bool {
        self.error_code.is_some()
            || self
                .error_message
                .as_deref()
                .is_some_and(|message| !message.is_empty())
    }
}

/// Aggregate response to one batch submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PutRecordsResponse {
    /// Number of records the backend rejected, as reported by the backend.
    pub failed_record_count: usize,
    /// Per-record results, in submission order.
    pub records: Vec<RecordResult>,
}

/// Summary of the destination stream returned by the reachability check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamDescription {
    pub name: String,
    pub status: String,
}

/// Error raised by the transport layer itself (network, authentication,
/// malformed response), as opposed to per-record rejections reported inside
/// a [`PutRecordsResponse`].
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct TransportError {
    message: String,
}

impl TransportError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Client for the streaming backend.
#[async_trait]
pub trait StreamClient: Send + Sync {
    /// Look up the named stream. Used once at setup to verify the
    /// destination exists and is reachable; never called per batch.
    async fn describe_stream(
        &self,
        stream_name: &str,
    ) -> Result<StreamDescription, TransportError>;

    /// Submit one batch of records and report per-record acceptance.
    async fn put_records(
        &self,
        stream_name: &str,
        entries: Vec<RecordEntry>,
    ) -> Result<PutRecordsResponse, TransportError>;
}
