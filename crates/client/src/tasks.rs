// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Task entity: field registry, row reshaping, and bulk task commands.

use std::sync::OnceLock;

use serde_json::Value;
use tracing::{debug, warn};

use quarry_core::{BulkResult, FieldRegistry, QuerySpec};
use quarry_wire::{command_payload, Reply, Row};

use crate::config::ClientConfig;
use crate::executor::{QueryExecutor, QueryOutcome};
use crate::socket::{ClientError, DaemonSocket};

static TASK_REGISTRY: OnceLock<FieldRegistry> = OnceLock::new();

/// Field registry for the task entity.
pub fn task_registry() -> &'static FieldRegistry {
    TASK_REGISTRY.get_or_init(build_task_registry)
}

// Static configuration; the literals are covered by tests.
#[allow(clippy::expect_used)]
fn build_task_registry() -> FieldRegistry {
    FieldRegistry::builder("task")
        .field("task_id", "task_id")
        .field("agent_id", "agent_id")
        .field("node", "node")
        .field("module", "module")
        .field("command", "command")
        .field("create_time", "create_time")
        .field("last_update_time", "last_update_time")
        .field("status", "status")
        .field("error_message", "error_message")
        .extra("agent_list", "agent_id")
        .extra("task_list", "task_id")
        .min_select("task_id")
        .alias("datetime", "create_time")
        .primary_key("task_id")
        .build()
        .expect("task registry literals")
}

/// Convert epoch-second time columns to RFC 3339 for presentation.
pub fn reshape_task_row(row: &mut Row) {
    for key in ["create_time", "last_update_time"] {
        let Some(secs) = row.get(key).and_then(Value::as_i64) else {
            continue;
        };
        if let Some(when) = chrono::DateTime::from_timestamp(secs, 0) {
            row.insert(key.to_string(), Value::from(when.format("%Y-%m-%dT%H:%M:%SZ").to_string()));
        }
    }
}

/// Fetch task records matching `spec`.
pub async fn get_tasks(
    config: &ClientConfig,
    spec: &QuerySpec,
) -> Result<QueryOutcome, ClientError> {
    QueryExecutor::new(config, task_registry())
        .with_reshape(reshape_task_row)
        .run(spec)
        .await
}

/// Send one targeted task command, e.g. `"task 12 cancel"`.
pub async fn send_task_command(
    config: &ClientConfig,
    task_id: &str,
    subcommand: &str,
    args: &[&str],
) -> Result<String, ClientError> {
    let mut socket = DaemonSocket::connect(config).await?;
    let reply = socket.round_trip(&command_payload("task", task_id, subcommand, args)).await;
    socket.close().await;
    match reply? {
        Reply::Ok(body) => Ok(body),
        Reply::Err(message) => Err(ClientError::Backend { message }),
        // Commands are not pollable; a partial reply is a protocol breach
        Reply::Due(_) => Err(ClientError::Backend { message: "unexpected partial reply".into() }),
    }
}

/// Apply `subcommand` to every task in `task_ids`, one socket round-trip
/// per item, collecting outcomes into `result`.
///
/// A failing item is recorded in the aggregator and never aborts the rest of
/// the batch. The returned result is owned by this call; render it once.
pub async fn send_task_commands(
    config: &ClientConfig,
    subcommand: &str,
    task_ids: &[String],
    mut result: BulkResult,
) -> BulkResult {
    for task_id in task_ids {
        match send_task_command(config, task_id, subcommand, &[]).await {
            Ok(_) => {
                debug!(%task_id, subcommand, "task command sent");
                result.affected_items.push(Value::from(task_id.clone()));
            }
            Err(err) => {
                warn!(%task_id, subcommand, error = %err, "task command failed");
                result.add_failed_item(Value::from(task_id.clone()), err.to_bulk_error());
            }
        }
    }

    let total = result.affected_items.len() as u64;
    result.set_total_affected_items(total);
    result
}

/// Cancel every task in `task_ids`.
pub async fn cancel_tasks(config: &ClientConfig, task_ids: &[String]) -> BulkResult {
    let result = BulkResult::new(
        "All specified tasks were cancelled",
        "Some tasks were not cancelled",
        "No task was cancelled",
    );
    send_task_commands(config, "cancel", task_ids, result).await
}

#[cfg(test)]
#[path = "tasks_tests.rs"]
mod tests;
