// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Client configuration, computed once at startup and passed explicitly
//! into constructors. No global singletons, no hidden caches.

use std::path::PathBuf;
use std::time::Duration;

use quarry_core::Limits;

use crate::env;

/// Configuration for one client: where the daemon lives, how long to wait
/// for it, and the pagination policy.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Filesystem path of the daemon's Unix socket.
    pub socket_path: PathBuf,
    /// Per-socket-operation timeout (connect, send, receive).
    pub timeout: Duration,
    /// Pagination policy handed to the query compiler.
    pub limits: Limits,
}

impl ClientConfig {
    pub fn new(socket_path: impl Into<PathBuf>) -> Self {
        ClientConfig {
            socket_path: socket_path.into(),
            timeout: env::ipc_timeout(),
            limits: Limits { max_limit: env::max_limit(), ..Limits::default() },
        }
    }

    /// Resolve everything from the environment.
    pub fn from_env() -> Self {
        Self::new(env::socket_path())
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }
}
