// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Kinesis API limits for record batches.
//!
//! These constants mirror the published Kinesis ingestion constraints. The
//! forwarder enforces the per-record payload limit itself and relies on the
//! aggregator to produce batches that respect the per-call record count.

/// Maximum number of records per PutRecords call. This is the hard limit
/// imposed by the Kinesis API; the forwarder never splits a batch, so
/// callers must stay at or under it.
pub const MAX_RECORDS_PER_BATCH: usize = 500;

/// Maximum size in bytes of a partition key.
pub const MAX_PARTITION_KEY_BYTES: usize = 256;

/// Maximum size in bytes of a single record payload.
///
/// Kinesis caps the combined size of the data blob and the partition key at
/// 1MB, and the partition key can itself be up to 256 bytes, so the payload
/// budget is what remains. Records above this size are dropped before
/// submission.
pub const MAX_RECORD_BYTES: usize = 1_000_000 - MAX_PARTITION_KEY_BYTES;

/// Maximum number of records buffered before the oldest are evicted.
///
/// Assuming an average record of ~1KB this bounds the buffer at roughly
/// 50MB under sustained backend failure.
pub(crate) const MAX_BUFFERED_RECORDS: usize = 50_000;

/// Default number of seconds between flush cycles.
pub const DEFAULT_FLUSH_INTERVAL_SECS: u64 = 10;
