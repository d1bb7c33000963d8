// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Host identity used to derive the stable partition key.

use std::env;

use tracing::warn;

/// Identify the host this agent runs on.
///
/// Tries, in order: the `DD_HOSTNAME` override, the `HOSTNAME` environment
/// variable (commonly set in containers), and the system hostname via
/// `gethostname(2)`. Falls back to `"unknown"` so the forwarder can still
/// start when the host cannot be identified; the partition key is only a
/// routing hint.
#[must_use]
pub fn host_identity() -> String {
    for var in ["DD_HOSTNAME", "HOSTNAME"] {
        if let Ok(name) = env::var(var) {
            if !name.is_empty() {
                return name;
            }
        }
    }

    match nix::unistd::gethostname() {
        Ok(name) => {
            if let Some(name) = name.to_str() {
                if !name.is_empty() {
                    return name.to_string();
                }
            }
        }
        Err(e) => {
            warn!("Failed to read system hostname: {}", e);
        }
    }

    warn!("Could not determine host identity, using 'unknown'");
    "unknown".to_string()
}
