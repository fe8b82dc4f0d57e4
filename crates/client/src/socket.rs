// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Transport: one Unix-socket connection to the daemon.
//!
//! Open on construction, closed exactly once on every exit path — explicitly
//! via [`DaemonSocket::close`] on success paths, by drop otherwise. No
//! connection reuse across logical operations, no automatic retry.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::net::UnixStream;
use tokio::time;
use tracing::debug;

use quarry_core::{BulkError, QueryError};
use quarry_wire::{read_message, write_message, ProtocolError, Reply};

use crate::config::ClientConfig;

// Error codes surfaced in bulk envelopes.
const CODE_NO_DAEMON: u16 = 1013;
const CODE_COMMUNICATION: u16 = 1014;
const CODE_INVALID_QUERY: u16 = 1405;
const CODE_BACKEND: u16 = 2004;

/// Errors from the transport and executor.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The socket path does not exist; the daemon is not running.
    #[error("daemon socket not found at {}", path.display())]
    SocketNotFound { path: PathBuf },

    #[error("failed to connect to daemon socket: {0}")]
    Connect(#[source] std::io::Error),

    /// The peer did not answer within the configured timeout.
    #[error("daemon did not respond within {0:?}")]
    Timeout(Duration),

    #[error("failed to send request: {0}")]
    Send(#[source] ProtocolError),

    /// Short read, framing violation, or peer error while receiving.
    #[error("failed to receive reply: {0}")]
    Receive(#[source] ProtocolError),

    /// The daemon answered `err`; the message is passed through verbatim.
    #[error("daemon reported an error: {message}")]
    Backend { message: String },

    /// Request validation failed before any I/O.
    #[error(transparent)]
    Query(#[from] QueryError),

    /// Malformed reply payload.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

impl ClientError {
    /// Map onto the numbered catalogue used in bulk envelopes. Identical
    /// failures collapse into one group because the code and message are
    /// both stable.
    pub fn to_bulk_error(&self) -> BulkError {
        match self {
            ClientError::SocketNotFound { .. } | ClientError::Connect(_) => {
                BulkError::new(CODE_NO_DAEMON, self.to_string())
            }
            ClientError::Timeout(_)
            | ClientError::Send(_)
            | ClientError::Receive(_)
            | ClientError::Protocol(_) => BulkError::new(CODE_COMMUNICATION, self.to_string()),
            ClientError::Query(_) => BulkError::new(CODE_INVALID_QUERY, self.to_string()),
            ClientError::Backend { message } => BulkError::new(CODE_BACKEND, message.clone()),
        }
    }
}

/// A single connection to the daemon with per-operation timeouts.
pub struct DaemonSocket {
    stream: Option<UnixStream>,
    timeout: Duration,
}

impl DaemonSocket {
    /// Connect to the configured socket path. A missing path is a hard
    /// precondition failure, reported before any connection attempt.
    pub async fn connect(config: &ClientConfig) -> Result<Self, ClientError> {
        if !config.socket_path.exists() {
            return Err(ClientError::SocketNotFound { path: config.socket_path.clone() });
        }
        let stream = time::timeout(config.timeout, UnixStream::connect(&config.socket_path))
            .await
            .map_err(|_| ClientError::Timeout(config.timeout))?
            .map_err(ClientError::Connect)?;
        debug!(path = %config.socket_path.display(), "connected to daemon");
        Ok(DaemonSocket { stream: Some(stream), timeout: config.timeout })
    }

    /// Frame and send one message.
    pub async fn send(&mut self, payload: &[u8]) -> Result<(), ClientError> {
        let timeout = self.timeout;
        let stream = self.stream_mut(ClientError::Send(ProtocolError::ConnectionClosed))?;
        time::timeout(timeout, write_message(stream, payload))
            .await
            .map_err(|_| ClientError::Timeout(timeout))?
            .map_err(ClientError::Send)
    }

    /// Receive one framed message. An empty payload signals a clean
    /// peer-initiated close.
    pub async fn recv(&mut self) -> Result<Vec<u8>, ClientError> {
        let timeout = self.timeout;
        let stream = self.stream_mut(ClientError::Receive(ProtocolError::ConnectionClosed))?;
        time::timeout(timeout, read_message(stream))
            .await
            .map_err(|_| ClientError::Timeout(timeout))?
            .map_err(ClientError::Receive)
    }

    /// One request/reply exchange, parsed into a [`Reply`].
    pub async fn round_trip(&mut self, payload: &[u8]) -> Result<Reply, ClientError> {
        self.send(payload).await?;
        let reply = self.recv().await?;
        Ok(Reply::parse(&reply)?)
    }

    /// Release the connection. Safe to call more than once; the underlying
    /// descriptor is also released on drop.
    pub async fn close(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            let _ = stream.shutdown().await;
            debug!("daemon connection closed");
        }
    }

    fn stream_mut(&mut self, closed: ClientError) -> Result<&mut UnixStream, ClientError> {
        self.stream.as_mut().ok_or(closed)
    }
}

#[cfg(test)]
#[path = "socket_tests.rs"]
mod tests;
