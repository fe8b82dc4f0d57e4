// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! MITRE catalogue entities: one field registry per table, plus read
//! helpers. All catalogue reads go through the shared executor; relation
//! fields (tactics on a technique, techniques on a group, ...) are fetched
//! from backend join views keyed on the parent `id` and attached as arrays.

use std::sync::OnceLock;

use serde_json::Value;

use quarry_core::{BulkResult, FieldRegistry, QuerySpec};

use crate::config::ClientConfig;
use crate::executor::{QueryExecutor, QueryOutcome};
use crate::socket::ClientError;

static METADATA: OnceLock<FieldRegistry> = OnceLock::new();
static TECHNIQUES: OnceLock<FieldRegistry> = OnceLock::new();
static TACTICS: OnceLock<FieldRegistry> = OnceLock::new();
static GROUPS: OnceLock<FieldRegistry> = OnceLock::new();
static MITIGATIONS: OnceLock<FieldRegistry> = OnceLock::new();
static SOFTWARE: OnceLock<FieldRegistry> = OnceLock::new();
static REFERENCES: OnceLock<FieldRegistry> = OnceLock::new();

// Static configuration; the literals are covered by tests.
#[allow(clippy::expect_used)]
pub fn metadata_registry() -> &'static FieldRegistry {
    METADATA.get_or_init(|| {
        FieldRegistry::builder("metadata")
            .field("key", "key")
            .field("value", "value")
            .min_select("key")
            .primary_key("key")
            .build()
            .expect("metadata registry literals")
    })
}

#[allow(clippy::expect_used)]
pub fn technique_registry() -> &'static FieldRegistry {
    TECHNIQUES.get_or_init(|| {
        catalogue_builder("technique")
            .field("mitre_detection", "mitre_detection")
            .field("network_requirements", "network_requirements")
            .field("remote_support", "remote_support")
            .field("subtechnique_of", "subtechnique_of")
            .relation("tactics", "technique_tactic", "id")
            .relation("mitigations", "technique_mitigation", "id")
            .relation("software", "technique_software", "id")
            .relation("groups", "technique_group", "id")
            .relation("references", "technique_reference", "id")
            .build()
            .expect("technique registry literals")
    })
}

#[allow(clippy::expect_used)]
pub fn tactic_registry() -> &'static FieldRegistry {
    TACTICS.get_or_init(|| {
        catalogue_builder("tactic")
            .field("short_name", "short_name")
            .relation("techniques", "tactic_technique", "id")
            .relation("references", "tactic_reference", "id")
            .build()
            .expect("tactic registry literals")
    })
}

#[allow(clippy::expect_used)]
pub fn group_registry() -> &'static FieldRegistry {
    GROUPS.get_or_init(|| {
        catalogue_builder("group")
            .relation("techniques", "group_technique", "id")
            .relation("software", "group_software", "id")
            .relation("references", "group_reference", "id")
            .build()
            .expect("group registry literals")
    })
}

#[allow(clippy::expect_used)]
pub fn mitigation_registry() -> &'static FieldRegistry {
    MITIGATIONS.get_or_init(|| {
        catalogue_builder("mitigation")
            .relation("techniques", "mitigation_technique", "id")
            .relation("references", "mitigation_reference", "id")
            .build()
            .expect("mitigation registry literals")
    })
}

#[allow(clippy::expect_used)]
pub fn software_registry() -> &'static FieldRegistry {
    SOFTWARE.get_or_init(|| {
        catalogue_builder("software")
            .relation("techniques", "software_technique", "id")
            .relation("groups", "software_group", "id")
            .relation("references", "software_reference", "id")
            .build()
            .expect("software registry literals")
    })
}

#[allow(clippy::expect_used)]
pub fn reference_registry() -> &'static FieldRegistry {
    REFERENCES.get_or_init(|| {
        FieldRegistry::builder("reference")
            .field("id", "id")
            .field("name", "name")
            .field("source", "source")
            .field("external_id", "external_id")
            .field("url", "url")
            .field("description", "description")
            .field("type", "type")
            .min_select("id")
            .build()
            .expect("reference registry literals")
    })
}

// Columns every catalogue table shares.
fn catalogue_builder(entity: &str) -> quarry_core::RegistryBuilder {
    FieldRegistry::builder(entity)
        .field("id", "id")
        .field("name", "name")
        .field("description", "description")
        .field("created_time", "created_time")
        .field("modified_time", "modified_time")
        .field("mitre_version", "mitre_version")
        .field("revoked_by", "revoked_by")
        .field("deprecated", "deprecated")
        .min_select("id")
}

pub async fn get_techniques(
    config: &ClientConfig,
    spec: &QuerySpec,
) -> Result<QueryOutcome, ClientError> {
    QueryExecutor::new(config, technique_registry()).run(spec).await
}

pub async fn get_tactics(
    config: &ClientConfig,
    spec: &QuerySpec,
) -> Result<QueryOutcome, ClientError> {
    QueryExecutor::new(config, tactic_registry()).run(spec).await
}

pub async fn get_groups(
    config: &ClientConfig,
    spec: &QuerySpec,
) -> Result<QueryOutcome, ClientError> {
    QueryExecutor::new(config, group_registry()).run(spec).await
}

pub async fn get_mitigations(
    config: &ClientConfig,
    spec: &QuerySpec,
) -> Result<QueryOutcome, ClientError> {
    QueryExecutor::new(config, mitigation_registry()).run(spec).await
}

pub async fn get_software(
    config: &ClientConfig,
    spec: &QuerySpec,
) -> Result<QueryOutcome, ClientError> {
    QueryExecutor::new(config, software_registry()).run(spec).await
}

pub async fn get_references(
    config: &ClientConfig,
    spec: &QuerySpec,
) -> Result<QueryOutcome, ClientError> {
    QueryExecutor::new(config, reference_registry()).run(spec).await
}

/// Read catalogue metadata into a bulk envelope. A single logical item, so
/// the result carries either every row or one failure group.
pub async fn read_metadata(config: &ClientConfig, spec: &QuerySpec) -> BulkResult {
    let mut result = BulkResult::new(
        "MITRE metadata was successfully read",
        "Could not read some MITRE metadata",
        "Could not read MITRE metadata",
    );
    match QueryExecutor::new(config, metadata_registry()).run(spec).await {
        Ok(QueryOutcome::Complete(reply)) => {
            result.affected_items.extend(reply.items.into_iter().map(Value::Object));
            result.set_total_affected_items(reply.total_items);
        }
        Ok(QueryOutcome::Pending) => {
            let err = ClientError::Backend { message: "backend not ready".into() };
            result.add_failed_item(Value::from("metadata"), err.to_bulk_error());
        }
        Err(err) => {
            result.add_failed_item(Value::from("metadata"), err.to_bulk_error());
        }
    }
    result
}

#[cfg(test)]
#[path = "mitre_tests.rs"]
mod tests;
