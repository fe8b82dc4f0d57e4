// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Declarative description of what to fetch from the daemon.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Default page size when the caller does not specify one.
pub const DEFAULT_LIMIT: u64 = 500;

/// Hard ceiling on page size, overridable via `Limits`.
pub const MAX_LIMIT: u64 = 100_000;

/// A single field filter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Filter {
    /// Match any of the alternatives; compiles to `IN (...)`.
    OneOf(Vec<Value>),
    /// Match one value: equality, or `LIKE` when `exact` is false.
    Scalar {
        value: Value,
        exact: bool,
    },
}

impl Filter {
    /// Exact-match filter.
    pub fn eq(value: impl Into<Value>) -> Self {
        Filter::Scalar { value: value.into(), exact: true }
    }

    /// Pattern filter; the value is passed through as a `LIKE` pattern.
    pub fn like(value: impl Into<Value>) -> Self {
        Filter::Scalar { value: value.into(), exact: false }
    }

    /// Filter matching any of the given alternatives.
    pub fn one_of<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Filter::OneOf(values.into_iter().map(Into::into).collect())
    }
}

/// Free-text search over the registry's columns.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Search {
    /// Text to look for (wrapped in `%...%` at compile time).
    pub text: String,
    /// Exclude matches instead of selecting them.
    #[serde(default)]
    pub complementary: bool,
    /// Restrict the search to these fields (default: all registry fields).
    #[serde(default)]
    pub fields: Option<Vec<String>>,
}

impl Search {
    pub fn new(text: impl Into<String>) -> Self {
        Search { text: text.into(), complementary: false, fields: None }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Order {
    Asc,
    Desc,
}

impl Order {
    pub(crate) fn sql(self) -> &'static str {
        match self {
            Order::Asc => "ASC",
            Order::Desc => "DESC",
        }
    }
}

/// Requested sort order: field list plus direction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Sort {
    pub fields: Vec<String>,
    pub order: Order,
}

/// A declarative query specification, produced by the API layer and consumed
/// by the compiler. Every field named here must exist in the target entity's
/// registry or the request is rejected before any I/O.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuerySpec {
    /// Field filters: name → scalar or set of alternatives.
    #[serde(default)]
    pub filters: IndexMap<String, Filter>,
    /// Free-text search.
    #[serde(default)]
    pub search: Option<Search>,
    /// Sort order; a primary-key tie-break is appended at compile time.
    #[serde(default)]
    pub sort: Option<Sort>,
    /// First item to return.
    #[serde(default)]
    pub offset: u64,
    /// Maximum number of items to return.
    pub limit: u64,
    /// Fields to return (default: all registry fields).
    #[serde(default)]
    pub select: Option<Vec<String>>,
    /// Return distinct rows only.
    #[serde(default)]
    pub distinct: bool,
    /// Secondary filter expression, e.g. `"status=done;module~upgrade"`.
    #[serde(default)]
    pub query: String,
}

impl QuerySpec {
    pub fn new() -> Self {
        QuerySpec {
            filters: IndexMap::new(),
            search: None,
            sort: None,
            offset: 0,
            limit: DEFAULT_LIMIT,
            select: None,
            distinct: false,
            query: String::new(),
        }
    }

    pub fn filter(mut self, field: impl Into<String>, filter: Filter) -> Self {
        self.filters.insert(field.into(), filter);
        self
    }

    pub fn search(mut self, search: Search) -> Self {
        self.search = Some(search);
        self
    }

    pub fn sort(mut self, fields: Vec<String>, order: Order) -> Self {
        self.sort = Some(Sort { fields, order });
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = offset;
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = limit;
        self
    }

    pub fn select<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.select = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    pub fn distinct(mut self, distinct: bool) -> Self {
        self.distinct = distinct;
        self
    }

    pub fn query(mut self, query: impl Into<String>) -> Self {
        self.query = query.into();
        self
    }
}

impl Default for QuerySpec {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "request_tests.rs"]
mod tests;
