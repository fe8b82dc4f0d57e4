// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the client crate.

use std::path::PathBuf;
use std::time::Duration;

use quarry_core::MAX_LIMIT;

/// Default daemon socket path.
pub const DEFAULT_SOCKET_PATH: &str = "/var/run/quarry/quarryd.sock";

/// Daemon socket path: `QUARRY_SOCKET` > default.
pub fn socket_path() -> PathBuf {
    std::env::var("QUARRY_SOCKET")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_SOCKET_PATH))
}

/// Per-operation IPC timeout (default 10s, `QUARRY_IPC_TIMEOUT_MS`).
pub fn ipc_timeout() -> Duration {
    std::env::var("QUARRY_IPC_TIMEOUT_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(Duration::from_secs(10))
}

/// Page-size ceiling override (`QUARRY_MAX_LIMIT`).
pub fn max_limit() -> u64 {
    std::env::var("QUARRY_MAX_LIMIT")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(MAX_LIMIT)
}
