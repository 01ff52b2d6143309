//! # State Module
//!
//! Shared state handed to every handler.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  AppState (Clone, Arc inside)                                          │
//! │  ├── db       Database      SQLite pool, thread-safe by itself         │
//! │  ├── carts    CartRegistry  live carts behind a tokio Mutex            │
//! │  └── config   ApiConfig     read-only after startup                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod cart;

use std::sync::Arc;

use bakeline_db::Database;

use crate::config::ApiConfig;

pub use cart::{CartRegistry, JsonFileSessionStore};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<Inner>,
}

struct Inner {
    db: Database,
    carts: CartRegistry,
    config: ApiConfig,
}

impl AppState {
    pub fn new(db: Database, carts: CartRegistry, config: ApiConfig) -> Self {
        AppState {
            inner: Arc::new(Inner { db, carts, config }),
        }
    }

    pub fn db(&self) -> &Database {
        &self.inner.db
    }

    pub fn carts(&self) -> &CartRegistry {
        &self.inner.carts
    }

    pub fn config(&self) -> &ApiConfig {
        &self.inner.config
    }
}
