// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-process fake daemon for transport and executor tests. Listens on a
//! Unix socket in a temporary directory and answers each framed request
//! through a scripted handler.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;
use tokio::net::{UnixListener, UnixStream};
use tokio::task::JoinHandle;

use quarry_wire::{read_message, write_message};

use crate::config::ClientConfig;

pub struct TestDaemon {
    // Held so the socket directory outlives the test.
    _dir: TempDir,
    path: PathBuf,
    handle: JoinHandle<()>,
}

impl TestDaemon {
    /// Serve framed request/reply exchanges. The handler sees each request
    /// payload as UTF-8 and returns the reply payload.
    pub fn spawn<F>(handler: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        let handler = Arc::new(handler);
        Self::spawn_with(move |mut stream| {
            let handler = Arc::clone(&handler);
            async move {
                loop {
                    let request = match read_message(&mut stream).await {
                        Ok(payload) if !payload.is_empty() => payload,
                        _ => return,
                    };
                    let text = String::from_utf8_lossy(&request).into_owned();
                    let reply = handler(&text);
                    if write_message(&mut stream, reply.as_bytes()).await.is_err() {
                        return;
                    }
                }
            }
        })
    }

    /// Serve raw streams. Used to script misbehavior the framed handler
    /// cannot express: truncated frames, silence, abrupt closes.
    pub fn spawn_with<F, Fut>(serve: F) -> Self
    where
        F: Fn(UnixStream) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = ()> + Send + 'static,
    {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("quarryd.sock");
        let listener = UnixListener::bind(&path).unwrap();
        let handle = tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                serve(stream).await;
            }
        });
        TestDaemon { _dir: dir, path, handle }
    }

    /// Client config pointing at this daemon, with a test-sized timeout.
    pub fn config(&self) -> ClientConfig {
        ClientConfig::new(&self.path).with_timeout(Duration::from_millis(500))
    }
}

impl Drop for TestDaemon {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
