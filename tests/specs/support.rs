// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scripted daemon for behavior tests, speaking the framed wire protocol on
//! a real Unix socket.

use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;
use tokio::net::UnixListener;
use tokio::task::JoinHandle;

use quarry_client::ClientConfig;
use quarry_wire::{read_message, write_message};

pub struct ScriptedDaemon {
    _dir: TempDir,
    config: ClientConfig,
    handle: JoinHandle<()>,
}

impl ScriptedDaemon {
    /// Start a daemon that answers every framed request through `handler`.
    pub fn start<F>(handler: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("quarryd.sock");
        let listener = UnixListener::bind(&path).unwrap();
        let handler = Arc::new(handler);
        let handle = tokio::spawn(async move {
            while let Ok((mut stream, _)) = listener.accept().await {
                let handler = Arc::clone(&handler);
                loop {
                    let request = match read_message(&mut stream).await {
                        Ok(payload) if !payload.is_empty() => payload,
                        _ => break,
                    };
                    let text = String::from_utf8_lossy(&request).into_owned();
                    let reply = handler(&text);
                    if write_message(&mut stream, reply.as_bytes()).await.is_err() {
                        break;
                    }
                }
            }
        });
        let config = ClientConfig::new(&path).with_timeout(Duration::from_secs(2));
        ScriptedDaemon { _dir: dir, config, handle }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
}

impl Drop for ScriptedDaemon {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
