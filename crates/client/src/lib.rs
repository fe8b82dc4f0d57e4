// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! quarry-client: transport, query executor, and entity variants for the
//! data daemon.
//!
//! One logical operation owns one socket connection; there is no pool and no
//! shared mutable state between concurrent calls. Validation happens in
//! quarry-core before the socket is ever opened.

pub mod config;
pub mod env;
pub mod executor;
pub mod mitre;
pub mod socket;
pub mod tasks;

#[cfg(test)]
mod testd;

pub use config::ClientConfig;
pub use executor::{QueryExecutor, QueryOutcome, QueryResult};
pub use socket::{ClientError, DaemonSocket};
