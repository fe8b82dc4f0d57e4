// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Partial-failure aggregation for bulk operations.
//!
//! One `BulkResult` per batch, owned by the operation processing it: each
//! item either lands in `affected_items` or is recorded with its error via
//! [`BulkResult::add_failed_item`]. Rendering picks one of three summary
//! messages from the success/failure ratio.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// A typed, comparable error attached to failed items. Items sharing an
/// identical error are grouped under one entry when rendered.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("error {code}: {message}")]
pub struct BulkError {
    pub code: u16,
    pub message: String,
}

impl BulkError {
    pub fn new(code: u16, message: impl Into<String>) -> Self {
        BulkError { code, message: message.into() }
    }
}

/// Failed items grouped under the error they share.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailedGroup {
    pub error: BulkError,
    pub id: Vec<Value>,
}

/// Rendered response envelope handed to the controller layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub affected_items: Vec<Value>,
    pub failed_items: Vec<FailedGroup>,
    pub total_affected_items: u64,
    pub total_failed_items: u64,
    pub message: String,
}

/// Outcome collector for one bulk operation.
#[derive(Debug, Clone)]
pub struct BulkResult {
    /// Items the operation succeeded on, in processing order. Appended to
    /// directly by the caller.
    pub affected_items: Vec<Value>,
    failed_items: Vec<FailedGroup>,
    total_affected_items: u64,
    all_msg: String,
    some_msg: String,
    none_msg: String,
}

impl BulkResult {
    pub fn new(
        all_msg: impl Into<String>,
        some_msg: impl Into<String>,
        none_msg: impl Into<String>,
    ) -> Self {
        BulkResult {
            affected_items: Vec::new(),
            failed_items: Vec::new(),
            total_affected_items: 0,
            all_msg: all_msg.into(),
            some_msg: some_msg.into(),
            none_msg: none_msg.into(),
        }
    }

    /// Record `item` as failed with `error`, merging into an existing group
    /// when the identical error was already seen.
    pub fn add_failed_item(&mut self, item: Value, error: BulkError) {
        if let Some(group) = self.failed_items.iter_mut().find(|g| g.error == error) {
            group.id.push(item);
        } else {
            self.failed_items.push(FailedGroup { error, id: vec![item] });
        }
    }

    /// Set the reported total explicitly. Not derived from
    /// `affected_items.len()`: callers may report totals distinct from the
    /// returned page.
    pub fn set_total_affected_items(&mut self, total: u64) {
        self.total_affected_items = total;
    }

    pub fn total_failed_items(&self) -> u64 {
        self.failed_items.iter().map(|g| g.id.len() as u64).sum()
    }

    /// Render into a response envelope. Idempotent and side-effect-free.
    pub fn render(&self) -> Envelope {
        let message = if self.affected_items.is_empty() && !self.failed_items.is_empty() {
            &self.none_msg
        } else if self.failed_items.is_empty() {
            &self.all_msg
        } else {
            &self.some_msg
        };
        Envelope {
            affected_items: self.affected_items.clone(),
            failed_items: self.failed_items.clone(),
            total_affected_items: self.total_affected_items,
            total_failed_items: self.total_failed_items(),
            message: message.clone(),
        }
    }
}

#[cfg(test)]
#[path = "bulk_tests.rs"]
mod tests;
