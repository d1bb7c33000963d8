// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

//! Standalone Kinesis log forwarding agent.
//!
//! Reads log lines from stdin, buffers them, and flushes them to the
//! configured Kinesis stream on a fixed interval. Setup errors (missing
//! stream name, unreachable stream) abort startup; delivery failures are
//! retried by the flush loop.

use std::{env, sync::Arc, time::Duration};

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use datadog_kinesis_forwarder::{
    aggregator_service::{AggregatorService, LogSink},
    config::ForwarderConfig,
    flusher::Flusher,
    forwarder::KinesisLogForwarder,
    hostname,
    kinesis::KinesisStreamClient,
};

#[tokio::main]
pub async fn main() {
    let log_level = env::var("DD_LOG_LEVEL")
        .map(|val| val.to_lowercase())
        .unwrap_or("info".to_string());

    let env_filter = format!("h2=off,hyper=off,rustls=off,{}", log_level);

    #[allow(clippy::expect_used)]
    let subscriber = tracing_subscriber::fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_new(env_filter).expect("could not parse log level in configuration"),
        )
        .with_level(true)
        .with_thread_names(false)
        .with_thread_ids(false)
        .with_line_number(false)
        .with_file(false)
        .with_target(true)
        .without_time()
        .finish();

    #[allow(clippy::expect_used)]
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let config = match ForwarderConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Error creating config on Kinesis agent startup: {e}");
            return;
        }
    };

    let host_identity = hostname::host_identity();
    let client = Arc::new(KinesisStreamClient::from_env(config.region.clone()).await);

    let forwarder = match KinesisLogForwarder::initialize(&config, client, &host_identity).await {
        Ok(forwarder) => Arc::new(forwarder),
        Err(e) => {
            error!("Error initializing Kinesis logger: {e}");
            return;
        }
    };
    info!(
        "Kinesis agent started, forwarding to stream {} every {}s",
        forwarder.stream_name(),
        config.flush_interval_secs
    );

    let (service, handle) = AggregatorService::default();
    tokio::spawn(service.run());

    let flusher = Flusher::new(
        forwarder,
        handle.clone(),
        Duration::from_secs(config.flush_interval_secs),
    );
    let cancel_token = CancellationToken::new();
    let flush_task = tokio::spawn({
        let flusher = flusher.clone();
        let cancel_token = cancel_token.clone();
        async move { flusher.run(cancel_token).await }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                match line {
                    Ok(Some(line)) => {
                        if handle.submit(line).is_err() {
                            error!("Log buffer has shut down, stopping intake");
                            break;
                        }
                    }
                    Ok(None) => {
                        debug!("Reached end of input, shutting down");
                        break;
                    }
                    Err(e) => {
                        error!("Failed to read log line: {e}");
                        break;
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                debug!("Received interrupt, shutting down");
                break;
            }
        }
    }

    // Drain whatever is still buffered before exiting.
    cancel_token.cancel();
    if let Err(e) = flush_task.await {
        error!("Flush task failed during shutdown: {e}");
    }
    let _ = handle.shutdown();
}
