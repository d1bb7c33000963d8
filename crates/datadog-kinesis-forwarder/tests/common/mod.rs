// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Stub stream transport for exercising the pipeline without AWS.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use datadog_kinesis_forwarder::transport::{
    PutRecordsResponse, RecordEntry, RecordResult, StreamClient, StreamDescription, TransportError,
};

/// Stream client stub that records every submission.
///
/// Responses can be programmed in order; once the programmed responses run
/// out every batch is accepted in full. `describe_stream` succeeds unless a
/// failure message is configured.
pub struct StubStreamClient {
    describe_error: Option<String>,
    describe_calls: AtomicUsize,
    responses: Mutex<VecDeque<Result<PutRecordsResponse, TransportError>>>,
    puts: Mutex<Vec<(String, Vec<RecordEntry>)>>,
}

impl StubStreamClient {
    pub fn accepting() -> Self {
        Self {
            describe_error: None,
            describe_calls: AtomicUsize::new(0),
            responses: Mutex::new(VecDeque::new()),
            puts: Mutex::new(Vec::new()),
        }
    }

    pub fn with_describe_error(message: &str) -> Self {
        Self {
            describe_error: Some(message.to_string()),
            ..Self::accepting()
        }
    }

    pub fn push_response(&self, response: Result<PutRecordsResponse, TransportError>) {
        self.responses.lock().unwrap().push_back(response);
    }

    /// Every PutRecords submission so far, as (stream name, entries) pairs.
    pub fn puts(&self) -> Vec<(String, Vec<RecordEntry>)> {
        self.puts.lock().unwrap().clone()
    }

    pub fn describe_calls(&self) -> usize {
        self.describe_calls.load(Ordering::SeqCst)
    }

    /// Response accepting every entry in `entries`.
    pub fn full_acceptance(entries: &[RecordEntry]) -> PutRecordsResponse {
        PutRecordsResponse {
            failed_record_count: 0,
            records: entries
                .iter()
                .enumerate()
                .map(|(index, _)| RecordResult {
                    sequence_number: Some(format!("seq-{index}")),
                    ..Default::default()
                })
                .collect(),
        }
    }
}

#[async_trait]
impl StreamClient for StubStreamClient {
    async fn describe_stream(
        &self,
        stream_name: &str,
    ) -> Result<StreamDescription, TransportError> {
        self.describe_calls.fetch_add(1, Ordering::SeqCst);
        match &self.describe_error {
            Some(message) => Err(TransportError::new(message.clone())),
            None => Ok(StreamDescription {
                name: stream_name.to_string(),
                status: "ACTIVE".to_string(),
            }),
        }
    }

    async fn put_records(
        &self,
        stream_name: &str,
        entries: Vec<RecordEntry>,
    ) -> Result<PutRecordsResponse, TransportError> {
        let fallback = Self::full_acceptance(&entries);
        self.puts
            .lock()
            .unwrap()
            .push((stream_name.to_string(), entries));
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(fallback))
    }
}
