//! # Cart Endpoints
//!
//! The billing screen's working cart, kept server-side so it survives a
//! page reload.
//!
//! ```text
//! GET    /api/carts/{session}            ──► CartView
//! POST   /api/carts/{session}/actions    { "type": "add_product", "line": {...} } ──► CartView
//! DELETE /api/carts/{session}            ──► 204
//! ```

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use bakeline_core::cart::{CartAction, CartState};
use bakeline_core::gst::DocumentTotals;
use serde::Serialize;

use crate::error::ApiResult;
use crate::state::AppState;

/// Cart state with running totals in the configured tax mode.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub session_id: String,
    pub state: CartState,
    pub totals: DocumentTotals,
}

impl CartView {
    fn build(app: &AppState, session_id: String, state: CartState) -> ApiResult<Self> {
        let totals = state.totals(app.config().default_tax_mode)?;
        Ok(CartView {
            session_id,
            state,
            totals,
        })
    }
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/carts/{session}", get(get_cart).delete(discard_cart))
        .route("/api/carts/{session}/actions", post(dispatch))
}

async fn get_cart(
    State(app): State<AppState>,
    Path(session): Path<String>,
) -> ApiResult<Json<CartView>> {
    let state = app.carts().state(&session).await?;
    Ok(Json(CartView::build(&app, session, state)?))
}

async fn dispatch(
    State(app): State<AppState>,
    Path(session): Path<String>,
    Json(action): Json<CartAction>,
) -> ApiResult<Json<CartView>> {
    let state = app.carts().dispatch(&session, action).await?;
    Ok(Json(CartView::build(&app, session, state)?))
}

async fn discard_cart(
    State(app): State<AppState>,
    Path(session): Path<String>,
) -> ApiResult<StatusCode> {
    app.carts().discard(&session).await?;
    Ok(StatusCode::NO_CONTENT)
}
