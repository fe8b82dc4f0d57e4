// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! quarry-core: query specifications, field registries, the query compiler,
//! and the bulk-result aggregator.
//!
//! Everything here is pure data and computation — no sockets, no async.
//! Validation happens in this crate so a bad request is rejected before the
//! transport is ever touched.

pub mod bulk;
pub mod compile;
pub mod error;
pub mod expr;
pub mod registry;
pub mod request;

pub use bulk::{BulkError, BulkResult, Envelope, FailedGroup};
pub use compile::{compile, CompiledQuery, Limits, PostFilter};
pub use error::QueryError;
pub use expr::{Comparison, Connector, Expr, Operator};
pub use registry::{FieldRegistry, Relation, RegistryBuilder, RegistryError};
pub use request::{Filter, Order, QuerySpec, Search, Sort, DEFAULT_LIMIT, MAX_LIMIT};
