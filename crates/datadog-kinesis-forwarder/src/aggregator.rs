// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! In-memory buffer that batches log records for submission.
//!
//! Records accumulate here between flush cycles. Batches drained from the
//! buffer already respect the Kinesis per-call record-count limit, so the
//! forwarder never has to split a submission. The buffer is bounded: under
//! sustained backend failure the oldest records are evicted rather than
//! growing without limit.

use std::collections::VecDeque;

use tracing::warn;

use crate::constants::{MAX_BUFFERED_RECORDS, MAX_RECORDS_PER_BATCH};

/// FIFO buffer of pending log records.
#[derive(Debug)]
pub struct Aggregator {
    records: VecDeque<String>,
    max_batch_records: usize,
    max_buffered_records: usize,
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new(MAX_RECORDS_PER_BATCH, MAX_BUFFERED_RECORDS)
    }
}

impl Aggregator {
    #[must_use]
    pub fn new(max_batch_records: usize, max_buffered_records: usize) -> Self {
        Self {
            records: VecDeque::new(),
            max_batch_records,
            max_buffered_records,
        }
    }

    /// Append records in arrival order. When the buffer is full the oldest
    /// record is evicted for each new arrival, with a diagnostic.
    pub fn add_batch(&mut self, records: Vec<String>) {
        for record in records {
            if self.records.len() >= self.max_buffered_records {
                self.records.pop_front();
                warn!(
                    "Log buffer full ({} records), dropping oldest record",
                    self.max_buffered_records
                );
            }
            self.records.push_back(record);
        }
    }

    /// Drain the next batch, at most the per-call record limit, preserving
    /// arrival order. Returns an empty vector when the buffer is empty.
    pub fn next_batch(&mut self) -> Vec<String> {
        let count = self.records.len().min(self.max_batch_records);
        self.records.drain(..count).collect()
    }

    /// Put a batch that could not be delivered back at the front of the
    /// buffer, preserving its internal order, so it is retried before any
    /// newer records.
    pub fn requeue(&mut self, batch: Vec<String>) {
        for record in batch.into_iter().rev() {
            self.records.push_front(record);
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
