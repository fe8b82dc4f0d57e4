// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Length-prefix framing over a byte stream.
//!
//! Every message is a 4-byte big-endian length followed by exactly that many
//! payload bytes. A short read is an error, never a truncated success; a
//! clean peer close surfaces as an empty payload.

use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Maximum payload size in either direction.
pub const MAX_PAYLOAD: usize = 64 * 1024;

/// Errors from framing and reply parsing.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("message of {size} bytes exceeds the {max} byte maximum")]
    MessageTooLarge { size: usize, max: usize },

    /// The peer closed the connection mid-message.
    #[error("connection closed")]
    ConnectionClosed,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("reply is not valid UTF-8")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("malformed reply payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unknown reply status token '{token}'")]
    UnknownStatus { token: String },
}

/// Frame a payload: 4-byte big-endian length prefix + payload bytes.
pub fn encode(payload: &[u8]) -> Result<Vec<u8>, ProtocolError> {
    if payload.len() > MAX_PAYLOAD {
        return Err(ProtocolError::MessageTooLarge { size: payload.len(), max: MAX_PAYLOAD });
    }
    let mut framed = Vec::with_capacity(4 + payload.len());
    framed.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    framed.extend_from_slice(payload);
    Ok(framed)
}

/// Write one framed message.
pub async fn write_message<W>(writer: &mut W, payload: &[u8]) -> Result<(), ProtocolError>
where
    W: AsyncWrite + Unpin,
{
    let framed = encode(payload)?;
    writer.write_all(&framed).await?;
    writer.flush().await?;
    Ok(())
}

/// Read one framed message, looping until the announced length is satisfied.
///
/// Returns an empty payload for a clean close: either EOF before any prefix
/// byte, or a zero-length frame. EOF anywhere else is `ConnectionClosed`.
pub async fn read_message<R>(reader: &mut R) -> Result<Vec<u8>, ProtocolError>
where
    R: AsyncRead + Unpin,
{
    let mut prefix = [0u8; 4];
    let mut filled = 0;
    while filled < prefix.len() {
        let n = reader.read(&mut prefix[filled..]).await?;
        if n == 0 {
            if filled == 0 {
                return Ok(Vec::new());
            }
            return Err(ProtocolError::ConnectionClosed);
        }
        filled += n;
    }

    let len = u32::from_be_bytes(prefix) as usize;
    if len == 0 {
        return Ok(Vec::new());
    }
    if len > MAX_PAYLOAD {
        return Err(ProtocolError::MessageTooLarge { size: len, max: MAX_PAYLOAD });
    }

    let mut payload = vec![0u8; len];
    let mut read = 0;
    while read < len {
        let n = reader.read(&mut payload[read..]).await?;
        if n == 0 {
            return Err(ProtocolError::ConnectionClosed);
        }
        read += n;
    }
    Ok(payload)
}

#[cfg(test)]
#[path = "wire_tests.rs"]
mod tests;
