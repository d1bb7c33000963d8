// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

/// Errors that can occur while setting up the forwarder.
///
/// Both variants are fatal to startup: the agent logs the error and exits
/// without forwarding anything. Send-time problems are never reported
/// through this type; they come back as values in
/// [`crate::forwarder::SubmissionOutcome`] so the flush layer can apply a
/// single retry policy.
#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("Could not reach Kinesis stream: {0}")]
    Connectivity(String),
}

/// Error returned when a log line cannot be buffered.
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("log buffer has shut down")]
    BufferClosed,
}
