//! # Routes
//!
//! One module per resource, each contributing a `Router<AppState>`.
//!
//! ```text
//! /health                                              health.rs
//! /api/tenants/{tenant}/bills/unsynced|synced          bills.rs
//! /api/tenants/{tenant}/codes/{series}[/next]          codes.rs
//! /api/tenants/{tenant}/parties/{kind}[/{code}]        parties.rs
//! /api/tenants/{tenant}/customers/by-phone/{phone}     parties.rs
//! /api/tenants/{tenant}/agents                         agents.rs
//! /api/tenants/{tenant}/products[/{code}]              products.rs
//! /api/tenants/{tenant}/documents/{kind}[/{number}]    documents.rs
//! /api/tenants/{tenant}/drafts[/{phone}]               drafts.rs
//! /api/carts/{session}[/actions]                       carts.rs
//! ```

pub mod agents;
pub mod bills;
pub mod carts;
pub mod codes;
pub mod documents;
pub mod drafts;
pub mod health;
pub mod parties;
pub mod products;

use axum::Router;

use crate::state::AppState;

/// Builds the full router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(health::routes())
        .merge(bills::routes())
        .merge(codes::routes())
        .merge(parties::routes())
        .merge(agents::routes())
        .merge(products::routes())
        .merge(documents::routes())
        .merge(drafts::routes())
        .merge(carts::routes())
        .with_state(state)
}
