// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn task_registry() -> FieldRegistry {
    FieldRegistry::builder("task")
        .field("task_id", "task_id")
        .field("status", "status")
        .field("module", "module")
        .relation("steps", "task_step", "task_id")
        .extra("agent_list", "agent_id")
        .min_select("task_id")
        .alias("datetime", "task_id")
        .primary_key("task_id")
        .build()
        .unwrap()
}

#[test]
fn permitted_set_is_fields_union_relations_union_extras() {
    let registry = task_registry();
    assert!(registry.is_permitted("status"));
    assert!(registry.is_permitted("steps"));
    assert!(registry.is_permitted("agent_list"));
    assert!(!registry.is_permitted("hostname"));
}

#[test]
fn alias_resolves_before_lookup() {
    let registry = task_registry();
    assert_eq!(registry.resolve_alias("datetime"), "task_id");
    assert!(registry.is_permitted("datetime"));
    assert_eq!(registry.column("datetime"), Some("task_id"));
}

#[test]
fn relation_lookup_by_name() {
    let registry = task_registry();
    let relation = registry.relation("steps").unwrap();
    assert_eq!(relation.entity, "task_step");
    assert_eq!(relation.key, "task_id");
    assert!(registry.relation("module").is_none());
}

#[test]
fn extra_column_is_fixed_regardless_of_name() {
    let registry = task_registry();
    assert_eq!(registry.extra_column("agent_list"), Some("agent_id"));
    assert_eq!(registry.extra_column("status"), None);
}

#[test]
fn min_select_outside_fields_is_rejected() {
    let err = FieldRegistry::builder("task")
        .field("task_id", "task_id")
        .min_select("status")
        .primary_key("task_id")
        .build()
        .unwrap_err();
    assert_eq!(
        err,
        RegistryError::MinSelectNotField { entity: "task".into(), field: "status".into() }
    );
}

#[test]
fn primary_key_outside_fields_is_rejected() {
    let err = FieldRegistry::builder("task")
        .field("task_id", "task_id")
        .primary_key("status")
        .build()
        .unwrap_err();
    assert!(matches!(err, RegistryError::PrimaryKeyNotField { .. }));
}

#[test]
fn alias_targeting_unknown_field_is_rejected() {
    let err = FieldRegistry::builder("task")
        .field("task_id", "task_id")
        .alias("legacy", "missing")
        .primary_key("task_id")
        .build()
        .unwrap_err();
    assert!(matches!(err, RegistryError::AliasTargetUnknown { .. }));
}

#[test]
fn default_primary_key_is_id() {
    let registry = FieldRegistry::builder("technique")
        .field("id", "id")
        .field("name", "name")
        .build()
        .unwrap();
    assert_eq!(registry.primary_key(), "id");
}
