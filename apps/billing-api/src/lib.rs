//! # Bakeline Billing API
//!
//! HTTP server behind the bakery billing screens.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Billing API                                      │
//! │                                                                         │
//! │  Browser ───► axum Router ───► routes::* ───► bakeline-db ───► SQLite   │
//! │                     │                                                   │
//! │                     └──────► CartRegistry ───► sessions/<id>.json       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//! - [`config`] - Environment configuration
//! - [`error`] - `ApiError` and its HTTP mapping
//! - [`routes`] - One router per resource
//! - [`state`] - Shared state and the cart session registry

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use tracing::Level;
use tracing_subscriber::EnvFilter;

pub use config::{ApiConfig, ConfigError};
pub use error::{ApiError, ApiResult, ErrorCode};
pub use routes::router;
pub use state::{AppState, CartRegistry, JsonFileSessionStore};

/// Installs the global tracing subscriber. `RUST_LOG` overrides the default
/// filter.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,bakeline=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_max_level(Level::TRACE)
        .with_target(true)
        .init();
}
