// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wire protocol for talking to the data daemon.
//!
//! Wire format: 4-byte length prefix (big-endian) + payload, both
//! directions. Replies carry a leading status token (`ok`/`err`/`due`).

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod request;
mod response;
mod wire;

pub use request::{command_payload, query_payload, QueryRequest};
pub use response::{parse_rows, Reply, Row};
pub use wire::{encode, read_message, write_message, ProtocolError, MAX_PAYLOAD};
