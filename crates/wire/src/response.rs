// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon reply parsing.
//!
//! Every reply payload is UTF-8 text starting with a status token:
//! `ok` (success, remainder is the result), `err` (remainder is an error
//! message), `due` (partial — the caller must re-issue the request).

use serde_json::{Map, Value};

use super::ProtocolError;

/// One result row: column/field name → value.
pub type Row = Map<String, Value>;

/// A parsed daemon reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Success; the remainder is the result payload (possibly empty).
    Ok(String),
    /// The daemon reported an error; the message is passed through verbatim.
    Err(String),
    /// More data pending; the caller must re-poll.
    Due(String),
}

impl Reply {
    /// Parse a reply payload into its status token and remainder.
    pub fn parse(payload: &[u8]) -> Result<Reply, ProtocolError> {
        let text = std::str::from_utf8(payload)?;
        let (token, rest) = match text.split_once(' ') {
            Some((token, rest)) => (token, rest),
            None => (text, ""),
        };
        match token {
            "ok" => Ok(Reply::Ok(rest.to_string())),
            "err" => Ok(Reply::Err(rest.to_string())),
            "due" => Ok(Reply::Due(rest.to_string())),
            _ => Err(ProtocolError::UnknownStatus { token: token.to_string() }),
        }
    }
}

/// Decode a query result payload into rows. An empty payload is zero rows.
pub fn parse_rows(payload: &str) -> Result<Vec<Row>, ProtocolError> {
    if payload.trim().is_empty() {
        return Ok(Vec::new());
    }
    let rows: Vec<Row> = serde_json::from_str(payload)?;
    Ok(rows)
}

#[cfg(test)]
#[path = "response_tests.rs"]
mod tests;
