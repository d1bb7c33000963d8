// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! # Datadog Kinesis Forwarder
//!
//! Buffered, periodic forwarding of log records to an AWS Kinesis stream.
//!
//! ## Overview
//!
//! Log lines are submitted through a cloneable handle, buffered in memory,
//! and flushed on a fixed interval as PutRecords batches that respect the
//! Kinesis per-call record count and per-record payload limits. A batch
//! with any rejected record is treated as unresolved as a whole and retried
//! on the next cycle.
//!
//! ## Architecture
//!
//! ```text
//!   Log producers
//!       │  submit()
//!       v
//!   ┌──────────────────┐
//!   │ Aggregator       │  (FIFO buffer, bounded, batches of ≤ 500)
//!   │ Service          │
//!   └────────┬─────────┘
//!            │ next_batch / requeue
//!            v
//!   ┌──────────────────┐
//!   │ Flusher          │  (interval loop, all-or-nothing retry)
//!   └────────┬─────────┘
//!            │ send
//!            v
//!   ┌──────────────────┐
//!   │ Forwarder        │  (size filtering, partition keys, PutRecords)
//!   └────────┬─────────┘
//!            │
//!            v
//!   ┌──────────────────┐
//!   │ Kinesis stream   │
//!   └──────────────────┘
//! ```
//!
//! The modules mirror the stages:
//! - [`aggregator`] / [`aggregator_service`]: buffering and batching
//! - [`flusher`]: flush scheduling and retry policy
//! - [`forwarder`]: batch construction and result interpretation
//! - [`transport`] / [`kinesis`]: the backend seam and its AWS SDK
//!   implementation
//! - [`config`], [`hostname`], [`constants`], [`error`]: supporting pieces

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

pub mod aggregator;
pub mod aggregator_service;
pub mod config;
pub mod constants;
pub mod error;
pub mod flusher;
pub mod forwarder;
pub mod hostname;
pub mod kinesis;
pub mod transport;
