//! # Product Endpoints
//!
//! ```text
//! GET /api/tenants/{tenant}/products?q=plum&category=Cakes&limit=50
//! GET /api/tenants/{tenant}/products/categories
//! GET /api/tenants/{tenant}/products/{code}
//! ```
//!
//! ## Retry
//! The billing screen loads the product list once when it opens. Transient
//! database failures on that list are retried with exponential backoff:
//!
//! ```text
//! attempt 1 ──✗──► wait ~200ms ──► attempt 2 ──✗──► wait ~400ms ──► attempt 3
//!                                                                      │
//!                                                   ✗ ──► 503 UNAVAILABLE
//! ```
//!
//! Validation and not-found errors are returned immediately.

use std::future::Future;
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use backoff::backoff::Backoff;
use backoff::ExponentialBackoff;
use bakeline_core::Product;
use bakeline_db::{DbError, DbResult, ProductQuery};
use tracing::warn;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/tenants/{tenant}/products", get(list_products))
        .route(
            "/api/tenants/{tenant}/products/categories",
            get(list_categories),
        )
        .route("/api/tenants/{tenant}/products/{code}", get(get_product))
}

async fn list_products(
    State(state): State<AppState>,
    Path(tenant): Path<String>,
    Query(query): Query<ProductQuery>,
) -> ApiResult<Json<Vec<Product>>> {
    let repo = state.db().products();
    let attempts = state.config().product_fetch_attempts;
    let products = with_retry(attempts, || repo.search(&tenant, &query)).await?;
    Ok(Json(products))
}

async fn list_categories(
    State(state): State<AppState>,
    Path(tenant): Path<String>,
) -> ApiResult<Json<Vec<String>>> {
    Ok(Json(state.db().products().categories(&tenant).await?))
}

async fn get_product(
    State(state): State<AppState>,
    Path((tenant, code)): Path<(String, String)>,
) -> ApiResult<Json<Product>> {
    state
        .db()
        .products()
        .get_by_code(&tenant, &code)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("product", &code))
}

// =============================================================================
// Retry
// =============================================================================

fn is_transient(err: &DbError) -> bool {
    matches!(
        err,
        DbError::ConnectionFailed(_) | DbError::PoolExhausted | DbError::QueryFailed(_)
    )
}

fn fetch_backoff() -> ExponentialBackoff {
    ExponentialBackoff {
        initial_interval: Duration::from_millis(200),
        max_interval: Duration::from_secs(2),
        multiplier: 2.0,
        max_elapsed_time: None,
        ..Default::default()
    }
}

/// Runs `op` up to `attempts` times, sleeping between transient failures.
async fn with_retry<T, F, Fut>(attempts: u32, mut op: F) -> DbResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = DbResult<T>>,
{
    let attempts = attempts.max(1);
    let mut backoff = fetch_backoff();
    let mut attempt = 1;

    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt < attempts && is_transient(&e) => {
                let delay = backoff
                    .next_backoff()
                    .unwrap_or(backoff.max_interval);
                warn!(
                    attempt,
                    attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "Product fetch failed, retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
