// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Validation errors raised by the query compiler.

use thiserror::Error;

/// Errors raised while validating and compiling a query specification.
///
/// All of these are raised synchronously, before any socket I/O, and are
/// recoverable by the caller correcting its input.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// A field named in filters/sort/select/query is not in the registry.
    #[error("unknown field '{field}' for entity '{entity}'")]
    InvalidField {
        /// Entity the registry describes.
        entity: String,
        /// The offending field name.
        field: String,
    },

    /// A sort field names a relation, which has no stored column to order by.
    #[error("field '{field}' cannot be used to sort entity '{entity}'")]
    InvalidSortField {
        /// Entity the registry describes.
        entity: String,
        /// The offending field name.
        field: String,
    },

    /// A query-expression clause uses an operator outside `=,!=,<,>,~`.
    #[error("invalid operator in expression clause '{clause}'")]
    InvalidOperator {
        /// The clause that failed to parse.
        clause: String,
    },

    /// The requested page size exceeds the configured maximum.
    #[error("limit {limit} exceeds the maximum of {max}")]
    LimitExceeded {
        /// Requested limit.
        limit: u64,
        /// Configured maximum.
        max: u64,
    },

    /// A page size of zero is meaningless and always rejected.
    #[error("limit must be greater than zero")]
    ZeroLimit,
}
