// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-entity field registries.
//!
//! A registry is immutable configuration built once at startup and passed by
//! reference into the compiler and executor. It is the field-visibility
//! contract: anything a caller names that is not in `fields`,
//! `relation_fields`, or `extra_fields` is rejected.

use indexmap::IndexMap;
use std::collections::BTreeSet;
use thiserror::Error;

/// A list-valued field populated by a secondary fetch instead of a column in
/// the primary row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relation {
    /// Field name exposed to callers, e.g. `tactics`.
    pub name: String,
    /// Backing relation entity queried for the secondary fetch.
    pub entity: String,
    /// Column in the relation rows that joins back to the parent primary key.
    pub key: String,
}

/// Errors from registry construction. These indicate a programming error in
/// entity configuration, not bad caller input.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("min_select field '{field}' is not a registry field for entity '{entity}'")]
    MinSelectNotField { entity: String, field: String },

    #[error("primary key '{field}' is not a registry field for entity '{entity}'")]
    PrimaryKeyNotField { entity: String, field: String },

    #[error("alias '{alias}' targets unknown field '{field}' for entity '{entity}'")]
    AliasTargetUnknown { entity: String, alias: String, field: String },
}

/// Immutable field configuration for one entity.
#[derive(Debug, Clone)]
pub struct FieldRegistry {
    entity: String,
    fields: IndexMap<String, String>,
    relation_fields: Vec<Relation>,
    extra_fields: IndexMap<String, String>,
    min_select_fields: BTreeSet<String>,
    aliases: IndexMap<String, String>,
    primary_key: String,
}

impl FieldRegistry {
    pub fn builder(entity: impl Into<String>) -> RegistryBuilder {
        RegistryBuilder {
            entity: entity.into(),
            fields: IndexMap::new(),
            relation_fields: Vec::new(),
            extra_fields: IndexMap::new(),
            min_select_fields: BTreeSet::new(),
            aliases: IndexMap::new(),
            primary_key: None,
        }
    }

    /// Entity name this registry describes.
    pub fn entity(&self) -> &str {
        &self.entity
    }

    /// Exposed field names mapped to backend columns, in declaration order.
    pub fn fields(&self) -> &IndexMap<String, String> {
        &self.fields
    }

    pub fn relation_fields(&self) -> &[Relation] {
        &self.relation_fields
    }

    pub fn relation(&self, name: &str) -> Option<&Relation> {
        self.relation_fields.iter().find(|r| r.name == name)
    }

    /// Backend column synthesized for an extra field, if `name` is one.
    pub fn extra_column(&self, name: &str) -> Option<&str> {
        self.extra_fields.get(name).map(String::as_str)
    }

    pub fn min_select_fields(&self) -> &BTreeSet<String> {
        &self.min_select_fields
    }

    pub fn primary_key(&self) -> &str {
        &self.primary_key
    }

    /// Substitute a legacy alias with its canonical field name.
    pub fn resolve_alias<'a>(&'a self, name: &'a str) -> &'a str {
        self.aliases.get(name).map(String::as_str).unwrap_or(name)
    }

    /// Backend column for a stored field (after alias resolution).
    pub fn column(&self, name: &str) -> Option<&str> {
        self.fields.get(self.resolve_alias(name)).map(String::as_str)
    }

    /// Whether `name` (after alias resolution) is anywhere in the permitted
    /// set: stored fields, relation fields, or extra fields.
    pub fn is_permitted(&self, name: &str) -> bool {
        let name = self.resolve_alias(name);
        self.fields.contains_key(name)
            || self.extra_fields.contains_key(name)
            || self.relation_fields.iter().any(|r| r.name == name)
    }
}

/// Builder for [`FieldRegistry`]; `build` enforces the registry invariants.
pub struct RegistryBuilder {
    entity: String,
    fields: IndexMap<String, String>,
    relation_fields: Vec<Relation>,
    extra_fields: IndexMap<String, String>,
    min_select_fields: BTreeSet<String>,
    aliases: IndexMap<String, String>,
    primary_key: Option<String>,
}

impl RegistryBuilder {
    /// Declare a stored field and its backend column.
    pub fn field(mut self, name: impl Into<String>, column: impl Into<String>) -> Self {
        self.fields.insert(name.into(), column.into());
        self
    }

    /// Declare a relation field fetched secondarily from `entity`, joined on
    /// `key`.
    pub fn relation(
        mut self,
        name: impl Into<String>,
        entity: impl Into<String>,
        key: impl Into<String>,
    ) -> Self {
        self.relation_fields.push(Relation {
            name: name.into(),
            entity: entity.into(),
            key: key.into(),
        });
        self
    }

    /// Declare an extra field: accepted in filters, synthesized as an `IN`
    /// clause against `column` regardless of the caller's literal name.
    pub fn extra(mut self, name: impl Into<String>, column: impl Into<String>) -> Self {
        self.extra_fields.insert(name.into(), column.into());
        self
    }

    /// Field always included in the select list.
    pub fn min_select(mut self, name: impl Into<String>) -> Self {
        self.min_select_fields.insert(name.into());
        self
    }

    /// Legacy name substituted with `field` during resolution.
    pub fn alias(mut self, legacy: impl Into<String>, field: impl Into<String>) -> Self {
        self.aliases.insert(legacy.into(), field.into());
        self
    }

    /// Stable sort tie-break column; must be a declared field.
    pub fn primary_key(mut self, name: impl Into<String>) -> Self {
        self.primary_key = Some(name.into());
        self
    }

    pub fn build(self) -> Result<FieldRegistry, RegistryError> {
        let primary_key = self.primary_key.unwrap_or_else(|| "id".to_string());
        if !self.fields.contains_key(&primary_key) {
            return Err(RegistryError::PrimaryKeyNotField {
                entity: self.entity,
                field: primary_key,
            });
        }
        for field in &self.min_select_fields {
            if !self.fields.contains_key(field) {
                return Err(RegistryError::MinSelectNotField {
                    entity: self.entity,
                    field: field.clone(),
                });
            }
        }
        for (alias, field) in &self.aliases {
            let known = self.fields.contains_key(field)
                || self.extra_fields.contains_key(field)
                || self.relation_fields.iter().any(|r| &r.name == field);
            if !known {
                return Err(RegistryError::AliasTargetUnknown {
                    entity: self.entity,
                    alias: alias.clone(),
                    field: field.clone(),
                });
            }
        }
        Ok(FieldRegistry {
            entity: self.entity,
            fields: self.fields,
            relation_fields: self.relation_fields,
            extra_fields: self.extra_fields,
            min_select_fields: self.min_select_fields,
            aliases: self.aliases,
            primary_key,
        })
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
