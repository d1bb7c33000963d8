// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Kinesis-backed implementation of the stream transport.

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_kinesis::error::DisplayErrorContext;
use aws_sdk_kinesis::primitives::Blob;
use aws_sdk_kinesis::types::PutRecordsRequestEntry;
use tracing::debug;

use crate::transport::{
    PutRecordsResponse, RecordEntry, RecordResult, StreamClient, StreamDescription, TransportError,
};

/// [`StreamClient`] wrapping the AWS SDK Kinesis client.
///
/// Credentials, retries, and timeouts all follow the SDK's shared
/// configuration; this wrapper only translates between the forwarder's
/// transport types and the SDK's.
#[derive(Debug, Clone)]
pub struct KinesisStreamClient {
    client: aws_sdk_kinesis::Client,
}

impl KinesisStreamClient {
    #[must_use]
    pub fn new(client: aws_sdk_kinesis::Client) -> Self {
        Self { client }
    }

    /// Build a client from the ambient AWS configuration (environment,
    /// profile, instance metadata), optionally overriding the region.
    pub async fn from_env(region: Option<String>) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = region {
            loader = loader.region(aws_config::Region::new(region));
        }
        let sdk_config = loader.load().await;
        Self::new(aws_sdk_kinesis::Client::new(&sdk_config))
    }
}

#[async_trait]
impl StreamClient for KinesisStreamClient {
    async fn describe_stream(
        &self,
        stream_name: &str,
    ) -> Result<StreamDescription, TransportError> {
        let output = self
            .client
            .describe_stream()
            .stream_name(stream_name)
            .send()
            .await
            .map_err(|e| TransportError::new(format!("{}", DisplayErrorContext(e))))?;

        let description = output.stream_description().ok_or_else(|| {
            TransportError::new("DescribeStream returned no stream description")
        })?;

        Ok(StreamDescription {
            name: description.stream_name().to_string(),
            status: description.stream_status().as_str().to_string(),
        })
    }

    async fn put_records(
        &self,
        stream_name: &str,
        entries: Vec<RecordEntry>,
    ) -> Result<PutRecordsResponse, TransportError> {
        let mut records = Vec::with_capacity(entries.len());
        for entry in entries {
            let record = PutRecordsRequestEntry::builder()
                .partition_key(entry.partition_key)
                .data(Blob::new(entry.data))
                .build()
                .map_err(|e| TransportError::new(format!("invalid record entry: {e}")))?;
            records.push(record);
        }

        let output = self
            .client
            .put_records()
            .stream_name(stream_name)
            .set_records(Some(records))
            .send()
            .await
            .map_err(|e| TransportError::new(format!("{}", DisplayErrorContext(e))))?;

        let failed_record_count =
            usize::try_from(output.failed_record_count().unwrap_or(0)).unwrap_or(0);
        let records = output
            .records()
            .iter()
            .map(|record| RecordResult {
                sequence_number: record.sequence_number().map(str::to_string),
                error_code: record.error_code().map(str::to_string),
                error_message: record.error_message().map(str::to_string),
            })
            .collect();

        debug!(
            "PutRecords response for stream {}: {} failed",
            stream_name, failed_record_count
        );

        Ok(PutRecordsResponse {
            failed_record_count,
            records,
        })
    }
}
