// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Query executor: drives one connection through count, rows, and relation
//! fan-out, and reshapes raw rows into structured results.

use std::collections::HashMap;

use serde_json::Value;
use tracing::debug;

use quarry_core::{compile, CompiledQuery, FieldRegistry, Filter, PostFilter, QuerySpec, Relation};
use quarry_wire::{parse_rows, query_payload, ProtocolError, Reply, Row};

use crate::config::ClientConfig;
use crate::socket::{ClientError, DaemonSocket};

/// A completed read: one page of rows plus the total matching count.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    pub items: Vec<Row>,
    pub total_items: u64,
}

/// Outcome of one executor call. `Pending` mirrors the daemon's `due`
/// status: more data is being prepared and the caller must re-poll — it is
/// not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    Complete(QueryResult),
    Pending,
}

/// Executes compiled queries for one entity. Holds only shared read-only
/// state; safe to call concurrently, each call owning its own connection.
pub struct QueryExecutor<'a> {
    config: &'a ClientConfig,
    registry: &'a FieldRegistry,
    reshape: Option<fn(&mut Row)>,
}

impl<'a> QueryExecutor<'a> {
    pub fn new(config: &'a ClientConfig, registry: &'a FieldRegistry) -> Self {
        QueryExecutor { config, registry, reshape: None }
    }

    /// Install an entity-specific row reshape, applied to every fetched row.
    pub fn with_reshape(mut self, reshape: fn(&mut Row)) -> Self {
        self.reshape = Some(reshape);
        self
    }

    /// Compile and run `spec`. Validation errors surface before any socket
    /// I/O; the connection is closed on every path.
    pub async fn run(&self, spec: &QuerySpec) -> Result<QueryOutcome, ClientError> {
        let compiled = compile(spec, self.registry, &self.config.limits)?;
        let mut socket = DaemonSocket::connect(self.config).await?;
        let outcome = self.run_compiled(&mut socket, &compiled).await;
        socket.close().await;
        outcome
    }

    async fn run_compiled(
        &self,
        socket: &mut DaemonSocket,
        compiled: &CompiledQuery,
    ) -> Result<QueryOutcome, ClientError> {
        let entity = self.registry.entity();
        let params = || compiled.params.iter().map(|(k, v)| (k.clone(), v.clone()));

        // Total first: same restrictions, no paging.
        let payload = query_payload(entity, &compiled.count_sql, params())?;
        let total_items = match socket.round_trip(&payload).await? {
            Reply::Ok(body) => parse_count(&body)?,
            Reply::Err(message) => return Err(ClientError::Backend { message }),
            Reply::Due(_) => return Ok(QueryOutcome::Pending),
        };

        let payload = query_payload(entity, &compiled.sql, params())?;
        let mut items = match socket.round_trip(&payload).await? {
            Reply::Ok(body) => parse_rows(&body)?,
            Reply::Err(message) => return Err(ClientError::Backend { message }),
            Reply::Due(_) => return Ok(QueryOutcome::Pending),
        };
        debug!(entity, rows = items.len(), total_items, "primary rows fetched");

        if let Some(reshape) = self.reshape {
            for row in &mut items {
                reshape(row);
            }
        }

        for name in &compiled.relations {
            let Some(relation) = self.registry.relation(name) else {
                continue;
            };
            match self.fetch_relation(socket, relation, &mut items).await? {
                RelationOutcome::Done => {}
                RelationOutcome::Pending => return Ok(QueryOutcome::Pending),
            }
        }

        for post_filter in &compiled.post_filters {
            apply_post_filter(&mut items, post_filter);
        }

        Ok(QueryOutcome::Complete(QueryResult { items, total_items }))
    }

    /// Populate one relation field across all rows with a single IN-batched
    /// secondary query. Rows without related entries get an empty list.
    async fn fetch_relation(
        &self,
        socket: &mut DaemonSocket,
        relation: &Relation,
        items: &mut [Row],
    ) -> Result<RelationOutcome, ClientError> {
        let pk = self.registry.primary_key();
        let keys: Vec<Value> =
            items.iter().filter_map(|row| row.get(pk)).cloned().collect();

        let mut grouped: HashMap<String, Vec<Value>> = HashMap::new();
        if !keys.is_empty() {
            let placeholders: Vec<String> =
                (0..keys.len()).map(|i| format!(":key_{i}")).collect();
            let sql = format!(
                "SELECT * FROM {} WHERE {} IN ({})",
                relation.entity,
                relation.key,
                placeholders.join(", ")
            );
            let params = keys
                .iter()
                .enumerate()
                .map(|(i, v)| (format!("key_{i}"), v.clone()));
            let payload = query_payload(&relation.entity, &sql, params)?;

            let related = match socket.round_trip(&payload).await? {
                Reply::Ok(body) => parse_rows(&body)?,
                Reply::Err(message) => return Err(ClientError::Backend { message }),
                Reply::Due(_) => return Ok(RelationOutcome::Pending),
            };
            debug!(relation = %relation.name, rows = related.len(), "relation rows fetched");

            for row in related {
                let Some(key) = row.get(&relation.key).map(value_key) else {
                    continue;
                };
                grouped.entry(key).or_default().push(Value::Object(row));
            }
        }

        for row in items.iter_mut() {
            let related = row
                .get(pk)
                .and_then(|key| grouped.get(&value_key(key)))
                .cloned()
                .unwrap_or_default();
            row.insert(relation.name.clone(), Value::Array(related));
        }
        Ok(RelationOutcome::Done)
    }
}

enum RelationOutcome {
    Done,
    Pending,
}

/// Canonical map key for joining relation rows back to parents.
fn value_key(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn parse_count(payload: &str) -> Result<u64, ClientError> {
    // Either a single-row aggregate result or a bare integer.
    if let Ok(rows) = parse_rows(payload) {
        if let Some(n) = rows.first().and_then(|row| row.values().next()).and_then(Value::as_u64) {
            return Ok(n);
        }
    }
    let n: u64 = serde_json::from_str(payload.trim())
        .map_err(|e| ClientError::Protocol(ProtocolError::Json(e)))?;
    Ok(n)
}

/// Retain rows whose relation list matches the filter: exact filters compare
/// values for equality, non-exact ones by substring.
fn apply_post_filter(items: &mut Vec<Row>, post_filter: &PostFilter) {
    items.retain(|row| match row.get(&post_filter.field) {
        Some(Value::Array(related)) => related
            .iter()
            .any(|entry| entry_matches(entry, &post_filter.filter)),
        _ => false,
    });
}

fn entry_matches(entry: &Value, filter: &Filter) -> bool {
    let values: Vec<&Value> = match entry {
        Value::Object(map) => map.values().collect(),
        other => vec![other],
    };
    match filter {
        Filter::Scalar { value, exact: true } => values.iter().any(|v| *v == value),
        Filter::Scalar { value, exact: false } => {
            let needle = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            values.iter().any(|v| value_key(v).contains(&needle))
        }
        Filter::OneOf(alternatives) => {
            values.iter().any(|v| alternatives.iter().any(|a| a == *v))
        }
    }
}

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;
