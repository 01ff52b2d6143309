//! # Repository Module
//!
//! Database repository implementations for Bakeline.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  HTTP handler                                                           │
//! │       │                                                                 │
//! │       │  db.documents().create(tenant, DocumentKind::Bill, &input)      │
//! │       ▼                                                                 │
//! │  DocumentRepository                                                     │
//! │  ├── validates + prices lines (bakeline-core)                          │
//! │  ├── BEGIN IMMEDIATE                                                    │
//! │  ├── resolves / creates customer   ── party::insert_party              │
//! │  ├── allocates number              ── sequence::allocate               │
//! │  ├── inserts header + lines                                            │
//! │  ├── drops the customer's draft    ── draft::delete_in                 │
//! │  └── COMMIT                                                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database                                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Functions taking `&mut SqliteConnection` run on whatever connection they
//! are handed, so one transaction can span several repositories.
//!
//! ## Available Repositories
//!
//! - [`SequenceRepository`](sequence::SequenceRepository) - Code settings and next-code preview
//! - [`PartyRepository`](party::PartyRepository) - Customers and vendors
//! - [`AgentRepository`](agent::AgentRepository) - Sales agents
//! - [`ProductRepository`](product::ProductRepository) - Product lookup and search
//! - [`DocumentRepository`](document::DocumentRepository) - Bills, orders, special orders
//! - [`DraftRepository`](draft::DraftRepository) - Parked carts

pub mod agent;
pub mod document;
pub mod draft;
pub mod party;
pub mod product;
pub mod sequence;

use sqlx::{Sqlite, SqlitePool, Transaction};

use crate::error::DbResult;

/// Opens a transaction that holds the SQLite write lock from its first
/// statement.
///
/// A plain `BEGIN` starts as a reader; upgrading to a writer after another
/// connection has committed fails with `SQLITE_BUSY` without waiting on the
/// busy timeout. `BEGIN IMMEDIATE` waits for the lock up front instead.
pub(crate) async fn begin_write(pool: &SqlitePool) -> DbResult<Transaction<'static, Sqlite>> {
    Ok(pool.begin_with("BEGIN IMMEDIATE").await?)
}

/// Trims an optional text field, treating blank as absent.
pub(crate) fn clean(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
