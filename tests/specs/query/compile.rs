// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Compiler behavior over the real entity registries.

use serde_json::json;

use quarry_client::mitre::technique_registry;
use quarry_client::tasks::task_registry;
use quarry_core::{compile, Filter, Limits, Order, QueryError, QuerySpec};

#[test]
fn rich_task_query_compiles_to_one_bound_statement() {
    let spec = QuerySpec::new()
        .filter("status", Filter::eq("done"))
        .filter("agent_list", Filter::one_of(["001", "002"]))
        .query("module~upgrade")
        .sort(vec!["datetime".to_string()], Order::Desc)
        .select(["task_id", "status"])
        .limit(10)
        .offset(5);

    let compiled = compile(&spec, task_registry(), &Limits::default()).unwrap();
    assert_eq!(
        compiled.sql,
        "SELECT task_id, status FROM task \
         WHERE status = :status_0 \
         AND agent_id IN (:agent_list_1, :agent_list_2) \
         AND (module LIKE :module_3) \
         ORDER BY create_time DESC, task_id ASC \
         LIMIT :limit OFFSET :offset"
    );
    assert_eq!(
        compiled.count_sql,
        "SELECT COUNT(*) FROM task \
         WHERE status = :status_0 \
         AND agent_id IN (:agent_list_1, :agent_list_2) \
         AND (module LIKE :module_3)"
    );
    let params: Vec<(&str, &serde_json::Value)> =
        compiled.params.iter().map(|(k, v)| (k.as_str(), v)).collect();
    assert_eq!(
        params,
        vec![
            ("status_0", &json!("done")),
            ("agent_list_1", &json!("001")),
            ("agent_list_2", &json!("002")),
            ("module_3", &json!("%upgrade%")),
            ("limit", &json!(10)),
            ("offset", &json!(5)),
        ]
    );
    assert!(compiled.relations.is_empty());
    assert!(compiled.post_filters.is_empty());
}

#[test]
fn distinct_count_wraps_the_restricted_select() {
    let spec = QuerySpec::new().select(["status"]).distinct(true);
    let compiled = compile(&spec, task_registry(), &Limits::default()).unwrap();
    assert_eq!(
        compiled.count_sql,
        "SELECT COUNT(*) FROM (SELECT DISTINCT status, task_id FROM task)"
    );
}

#[test]
fn paging_limits_are_enforced_before_compilation() {
    let limits = Limits { default_limit: 500, max_limit: 1_000 };
    let err = compile(&QuerySpec::new().limit(0), task_registry(), &limits).err().unwrap();
    assert_eq!(err, QueryError::ZeroLimit);

    let err = compile(&QuerySpec::new().limit(1_001), task_registry(), &limits).err().unwrap();
    assert_eq!(err, QueryError::LimitExceeded { limit: 1_001, max: 1_000 });
}

#[test]
fn relation_fields_cannot_be_sorted_on() {
    let spec = QuerySpec::new().sort(vec!["tactics".to_string()], Order::Asc);
    let err = compile(&spec, technique_registry(), &Limits::default()).err().unwrap();
    assert_eq!(
        err,
        QueryError::InvalidSortField { entity: "technique".to_string(), field: "tactics".to_string() }
    );
}

#[test]
fn selecting_a_filter_only_field_is_rejected() {
    let spec = QuerySpec::new().select(["agent_list"]);
    let err = compile(&spec, task_registry(), &Limits::default()).err().unwrap();
    assert_eq!(
        err,
        QueryError::InvalidField { entity: "task".to_string(), field: "agent_list".to_string() }
    );
}
