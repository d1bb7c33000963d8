// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Forwarder configuration from environment variables.

use std::env;

use crate::constants::DEFAULT_FLUSH_INTERVAL_SECS;
use crate::error::SetupError;

/// Configuration for the Kinesis log forwarder.
#[derive(Debug, Clone)]
pub struct ForwarderConfig {
    /// Name of the destination Kinesis stream. Required, no default.
    pub stream_name: String,
    /// Seconds between flush cycles.
    pub flush_interval_secs: u64,
    /// Generate a fresh random partition key per batch instead of reusing
    /// the host-derived key.
    pub random_partition_key: bool,
    /// AWS region override for the SDK loader.
    pub region: Option<String>,
}

impl Default for ForwarderConfig {
    fn default() -> Self {
        Self {
            stream_name: String::new(),
            flush_interval_secs: DEFAULT_FLUSH_INTERVAL_SECS,
            random_partition_key: false,
            region: None,
        }
    }
}

impl ForwarderConfig {
    /// Create configuration from environment variables.
    pub fn from_env() -> Result<Self, SetupError> {
        let stream_name = env::var("DD_KINESIS_STREAM").unwrap_or_default();
        let flush_interval_secs = env::var("DD_KINESIS_FLUSH_INTERVAL")
            .ok()
            .and_then(|val| val.parse::<u64>().ok())
            .unwrap_or(DEFAULT_FLUSH_INTERVAL_SECS);
        let random_partition_key = env::var("DD_KINESIS_RANDOM_PARTITION_KEY")
            .map(|val| matches!(val.to_lowercase().as_str(), "true" | "1"))
            .unwrap_or(false);
        let region = env::var("DD_KINESIS_REGION")
            .ok()
            .filter(|val| !val.is_empty());

        let config = Self {
            stream_name,
            flush_interval_secs,
            random_partition_key,
            region,
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), SetupError> {
        if self.stream_name.trim().is_empty() {
            return Err(SetupError::Configuration(
                "Stream name must be specified with DD_KINESIS_STREAM".to_string(),
            ));
        }

        if self.flush_interval_secs == 0 {
            return Err(SetupError::Configuration(
                "Flush interval must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}
