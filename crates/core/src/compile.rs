// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Query compiler: turns a [`QuerySpec`] plus a [`FieldRegistry`] into a
//! backend query string and a parameter table.
//!
//! Values never travel inside the query text. Every comparison binds a
//! generated `:name` parameter, so caller input cannot reach the daemon's
//! command grammar as syntax.

use indexmap::IndexMap;
use serde_json::Value;

use crate::error::QueryError;
use crate::expr::{Connector, Expr, Operator};
use crate::registry::FieldRegistry;
use crate::request::{Filter, QuerySpec, DEFAULT_LIMIT, MAX_LIMIT};

/// Pagination policy, carried as configuration rather than hard-coded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Page size when the caller does not specify one.
    pub default_limit: u64,
    /// Hard ceiling; anything above is rejected with `LimitExceeded`.
    pub max_limit: u64,
}

impl Default for Limits {
    fn default() -> Self {
        Limits { default_limit: DEFAULT_LIMIT, max_limit: MAX_LIMIT }
    }
}

/// A filter on a relation field, applied by the executor after the secondary
/// fetch rather than compiled into the primary query.
#[derive(Debug, Clone, PartialEq)]
pub struct PostFilter {
    /// Relation field name.
    pub field: String,
    pub filter: Filter,
}

/// Output of compilation: the query text, its count twin, and the bind table.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledQuery {
    /// Row query with `:name` placeholders.
    pub sql: String,
    /// Same restrictions without paging, counting matching rows.
    pub count_sql: String,
    /// Bind parameters, name → value, in generation order.
    pub params: IndexMap<String, Value>,
    /// Relation fields the executor must fan out for.
    pub relations: Vec<String>,
    /// Relation-field filters applied after the fan-out.
    pub post_filters: Vec<PostFilter>,
}

/// Generates collision-free bind-parameter names (`<field>_<n>`).
struct ParamTable {
    params: IndexMap<String, Value>,
    counter: usize,
}

impl ParamTable {
    fn new() -> Self {
        ParamTable { params: IndexMap::new(), counter: 0 }
    }

    fn bind(&mut self, field: &str, value: Value) -> String {
        let name = format!("{}_{}", field.replace('.', "_"), self.counter);
        self.counter += 1;
        self.params.insert(name.clone(), value);
        name
    }

    /// Fixed-name binding for paging and search parameters.
    fn bind_named(&mut self, name: &str, value: Value) {
        self.params.insert(name.to_string(), value);
    }
}

/// Compile `spec` against `registry`, validating every referenced field.
pub fn compile(
    spec: &QuerySpec,
    registry: &FieldRegistry,
    limits: &Limits,
) -> Result<CompiledQuery, QueryError> {
    if spec.limit == 0 {
        return Err(QueryError::ZeroLimit);
    }
    if spec.limit > limits.max_limit {
        return Err(QueryError::LimitExceeded { limit: spec.limit, max: limits.max_limit });
    }

    let mut params = ParamTable::new();
    let mut clauses: Vec<String> = Vec::new();
    let mut post_filters: Vec<PostFilter> = Vec::new();

    compile_filters(spec, registry, &mut params, &mut clauses, &mut post_filters)?;
    compile_search(spec, registry, &mut params, &mut clauses)?;
    compile_expr(spec, registry, &mut params, &mut clauses)?;

    let (columns, relations) = select_columns(spec, registry, &post_filters)?;
    let order = order_by(spec, registry)?;

    let where_sql = if clauses.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", clauses.join(" AND "))
    };
    let distinct = if spec.distinct { "DISTINCT " } else { "" };
    let column_sql = columns.join(", ");
    let entity = registry.entity();

    let sql = format!(
        "SELECT {distinct}{column_sql} FROM {entity}{where_sql} ORDER BY {order} \
         LIMIT :limit OFFSET :offset"
    );
    let count_sql = if spec.distinct {
        format!("SELECT COUNT(*) FROM (SELECT DISTINCT {column_sql} FROM {entity}{where_sql})")
    } else {
        format!("SELECT COUNT(*) FROM {entity}{where_sql}")
    };

    params.bind_named("limit", Value::from(spec.limit));
    params.bind_named("offset", Value::from(spec.offset));

    Ok(CompiledQuery { sql, count_sql, params: params.params, relations, post_filters })
}

/// Resolve an alias and enforce the field-visibility contract.
fn resolve<'a>(registry: &'a FieldRegistry, name: &'a str) -> Result<&'a str, QueryError> {
    let resolved = registry.resolve_alias(name);
    if registry.is_permitted(resolved) {
        Ok(resolved)
    } else {
        Err(QueryError::InvalidField {
            entity: registry.entity().to_string(),
            field: name.to_string(),
        })
    }
}

fn filter_values(filter: &Filter) -> Vec<Value> {
    match filter {
        Filter::Scalar { value, .. } => vec![value.clone()],
        Filter::OneOf(values) => values.clone(),
    }
}

fn compile_filters(
    spec: &QuerySpec,
    registry: &FieldRegistry,
    params: &mut ParamTable,
    clauses: &mut Vec<String>,
    post_filters: &mut Vec<PostFilter>,
) -> Result<(), QueryError> {
    for (name, filter) in &spec.filters {
        let field = resolve(registry, name)?;

        // Extra fields always synthesize an IN clause against their fixed
        // backend column, whatever the caller called the field.
        if let Some(column) = registry.extra_column(field) {
            let names: Vec<String> = filter_values(filter)
                .into_iter()
                .map(|v| format!(":{}", params.bind(field, v)))
                .collect();
            clauses.push(format!("{column} IN ({})", names.join(", ")));
            continue;
        }

        if let Some(column) = registry.column(field) {
            let column = column.to_string();
            match filter {
                Filter::Scalar { value, exact } => {
                    let op = if *exact { "=" } else { "LIKE" };
                    let p = params.bind(field, value.clone());
                    clauses.push(format!("{column} {op} :{p}"));
                }
                Filter::OneOf(values) => {
                    let names: Vec<String> = values
                        .iter()
                        .map(|v| format!(":{}", params.bind(field, v.clone())))
                        .collect();
                    clauses.push(format!("{column} IN ({})", names.join(", ")));
                }
            }
            continue;
        }

        // Permitted but not a stored column: a relation field, matched
        // against the fetched lists after the fan-out.
        post_filters.push(PostFilter { field: field.to_string(), filter: filter.clone() });
    }
    Ok(())
}

fn compile_search(
    spec: &QuerySpec,
    registry: &FieldRegistry,
    params: &mut ParamTable,
    clauses: &mut Vec<String>,
) -> Result<(), QueryError> {
    let Some(search) = &spec.search else {
        return Ok(());
    };

    let columns: Vec<String> = match &search.fields {
        Some(fields) => {
            let mut cols = Vec::with_capacity(fields.len());
            for name in fields {
                let field = resolve(registry, name)?;
                // Only stored columns are searchable.
                let column = registry.column(field).ok_or_else(|| QueryError::InvalidField {
                    entity: registry.entity().to_string(),
                    field: name.clone(),
                })?;
                cols.push(column.to_string());
            }
            cols
        }
        None => registry.fields().values().cloned().collect(),
    };

    params.bind_named("search", Value::from(format!("%{}%", search.text)));
    let matches: Vec<String> = columns.iter().map(|c| format!("{c} LIKE :search")).collect();
    let body = matches.join(" OR ");
    if search.complementary {
        clauses.push(format!("NOT ({body})"));
    } else {
        clauses.push(format!("({body})"));
    }
    Ok(())
}

fn compile_expr(
    spec: &QuerySpec,
    registry: &FieldRegistry,
    params: &mut ParamTable,
    clauses: &mut Vec<String>,
) -> Result<(), QueryError> {
    let Some(expr) = Expr::parse(&spec.query)? else {
        return Ok(());
    };

    let mut sql = comparison_sql(registry, params, &expr.first)?;
    for (connector, comparison) in &expr.rest {
        let joined = match connector {
            Connector::And => " AND ",
            Connector::Or => " OR ",
        };
        sql.push_str(joined);
        sql.push_str(&comparison_sql(registry, params, comparison)?);
    }
    clauses.push(format!("({sql})"));
    Ok(())
}

fn comparison_sql(
    registry: &FieldRegistry,
    params: &mut ParamTable,
    comparison: &crate::expr::Comparison,
) -> Result<String, QueryError> {
    let field = resolve(registry, &comparison.field)?;

    let column = registry
        .column(field)
        .or_else(|| registry.extra_column(field))
        .ok_or_else(|| QueryError::InvalidSortField {
            // Relation fields have no column to compare against.
            entity: registry.entity().to_string(),
            field: comparison.field.clone(),
        })?
        .to_string();

    let value = match comparison.operator {
        Operator::Like => Value::from(format!("%{}%", comparison.value)),
        _ => Value::from(comparison.value.clone()),
    };
    let p = params.bind(field, value);
    Ok(format!("{column} {} :{p}", comparison.operator.sql()))
}

/// Compute the select column list and the relations to fan out for.
fn select_columns(
    spec: &QuerySpec,
    registry: &FieldRegistry,
    post_filters: &[PostFilter],
) -> Result<(Vec<String>, Vec<String>), QueryError> {
    let mut columns: Vec<String> = Vec::new();
    let mut selected_fields: Vec<String> = Vec::new();
    let mut relations: Vec<String> = Vec::new();

    let mut push_field = |field: &str, registry: &FieldRegistry| {
        if selected_fields.iter().any(|f| f == field) {
            return;
        }
        if let Some(column) = registry.fields().get(field) {
            selected_fields.push(field.to_string());
            if column == field {
                columns.push(column.clone());
            } else {
                columns.push(format!("{column} AS {field}"));
            }
        }
    };

    match &spec.select {
        Some(fields) => {
            for name in fields {
                let field = resolve(registry, name)?;
                if registry.relation(field).is_some() {
                    if !relations.iter().any(|r| r == field) {
                        relations.push(field.to_string());
                    }
                } else if registry.fields().contains_key(field) {
                    push_field(field, registry);
                } else {
                    // Extra fields are filter-only; selecting one is invalid.
                    return Err(QueryError::InvalidField {
                        entity: registry.entity().to_string(),
                        field: name.clone(),
                    });
                }
            }
        }
        None => {
            let fields: Vec<String> = registry.fields().keys().cloned().collect();
            for field in &fields {
                push_field(field, registry);
            }
            relations = registry.relation_fields().iter().map(|r| r.name.clone()).collect();
        }
    }

    // Mandatory minimum fields, even when select omits them.
    let min_fields: Vec<String> = registry.min_select_fields().iter().cloned().collect();
    for field in &min_fields {
        push_field(field, registry);
    }

    // A relation filtered on must be fetched even when select omits it.
    for post_filter in post_filters {
        if !relations.iter().any(|r| r == &post_filter.field) {
            relations.push(post_filter.field.clone());
        }
    }

    // The fan-out joins related rows back on the primary key, so any
    // relation fetch forces it into the select list.
    if !relations.is_empty() {
        let pk = registry.primary_key().to_string();
        push_field(&pk, registry);
    }

    Ok((columns, relations))
}

fn order_by(spec: &QuerySpec, registry: &FieldRegistry) -> Result<String, QueryError> {
    let pk_column = registry
        .column(registry.primary_key())
        .unwrap_or(registry.primary_key())
        .to_string();

    let Some(sort) = &spec.sort else {
        return Ok(format!("{pk_column} ASC"));
    };

    let mut terms = Vec::with_capacity(sort.fields.len() + 1);
    let mut saw_pk = false;
    for name in &sort.fields {
        let field = resolve(registry, name)?;
        let column = registry.column(field).ok_or_else(|| QueryError::InvalidSortField {
            entity: registry.entity().to_string(),
            field: name.clone(),
        })?;
        if field == registry.primary_key() {
            saw_pk = true;
        }
        terms.push(format!("{column} {}", sort.order.sql()));
    }
    // Stable tie-break when the caller's sort is not unique.
    if !saw_pk {
        terms.push(format!("{pk_column} ASC"));
    }
    Ok(terms.join(", "))
}

#[cfg(test)]
#[path = "compile_tests.rs"]
mod tests;
