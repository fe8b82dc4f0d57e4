// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Outgoing payload builders for the daemon's command grammar.
//!
//! Two request forms:
//! - targeted commands: `"<entity> <id> <subcommand> [args]"`
//! - read queries: `"<entity> sql <json>"` where the JSON carries the query
//!   text and its bind parameters, so values never ride inside the text.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use super::ProtocolError;

/// JSON body of a read query request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QueryRequest {
    pub query: String,
    pub params: BTreeMap<String, Value>,
}

/// Build a read-query payload for `entity`.
pub fn query_payload(
    entity: &str,
    query: &str,
    params: impl IntoIterator<Item = (String, Value)>,
) -> Result<Vec<u8>, ProtocolError> {
    let request = QueryRequest {
        query: query.to_string(),
        params: params.into_iter().collect(),
    };
    let body = serde_json::to_string(&request)?;
    Ok(format!("{entity} sql {body}").into_bytes())
}

/// Build a targeted command payload, e.g. `"agent 000 package get"`.
pub fn command_payload(entity: &str, id: &str, subcommand: &str, args: &[&str]) -> Vec<u8> {
    let mut payload = format!("{entity} {id} {subcommand}");
    for arg in args {
        payload.push(' ');
        payload.push_str(arg);
    }
    payload.into_bytes()
}

#[cfg(test)]
#[path = "request_tests.rs"]
mod tests;
