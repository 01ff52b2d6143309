//! # Draft Endpoints
//!
//! ```text
//! GET    /api/tenants/{tenant}/drafts            parked carts, newest first
//! GET    /api/tenants/{tenant}/drafts/{phone}    decoded cart
//! PUT    /api/tenants/{tenant}/drafts/{phone}    park (replaces)
//! DELETE /api/tenants/{tenant}/drafts/{phone}    204, or 404 when nothing parked
//! ```

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use bakeline_core::cart::CartState;
use bakeline_core::Draft;
use bakeline_db::DraftInput;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// One row of the parked-drafts list.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftSummary {
    pub customer_phone: String,
    pub customer_name: Option<String>,
    pub items: usize,
    pub created_at: DateTime<Utc>,
}

impl From<&Draft> for DraftSummary {
    fn from(draft: &Draft) -> Self {
        let items = match draft.cart_state() {
            Ok(cart) => cart.item_count(),
            Err(e) => {
                warn!(phone = %draft.customer_phone, error = %e, "Unreadable draft");
                0
            }
        };
        DraftSummary {
            customer_phone: draft.customer_phone.clone(),
            customer_name: draft.customer_name.clone(),
            items,
            created_at: draft.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftView {
    pub customer_phone: String,
    pub customer_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub cart: CartState,
}

impl DraftView {
    fn decode(draft: Draft) -> ApiResult<Self> {
        let cart = draft.cart_state()?;
        Ok(DraftView {
            customer_phone: draft.customer_phone,
            customer_name: draft.customer_name,
            created_at: draft.created_at,
            cart,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveDraftRequest {
    #[serde(default)]
    pub customer_name: Option<String>,
    pub cart: CartState,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/tenants/{tenant}/drafts", get(list_drafts))
        .route(
            "/api/tenants/{tenant}/drafts/{phone}",
            get(get_draft).put(save_draft).delete(delete_draft),
        )
}

async fn list_drafts(
    State(state): State<AppState>,
    Path(tenant): Path<String>,
) -> ApiResult<Json<Vec<DraftSummary>>> {
    let drafts = state.db().drafts().list(&tenant).await?;
    Ok(Json(drafts.iter().map(DraftSummary::from).collect()))
}

async fn get_draft(
    State(state): State<AppState>,
    Path((tenant, phone)): Path<(String, String)>,
) -> ApiResult<Json<DraftView>> {
    let draft = state
        .db()
        .drafts()
        .get(&tenant, &phone)
        .await?
        .ok_or_else(|| ApiError::not_found("draft", &phone))?;
    Ok(Json(DraftView::decode(draft)?))
}

async fn save_draft(
    State(state): State<AppState>,
    Path((tenant, phone)): Path<(String, String)>,
    Json(request): Json<SaveDraftRequest>,
) -> ApiResult<Json<DraftView>> {
    let input = DraftInput {
        customer_phone: phone,
        customer_name: request.customer_name,
        cart: request.cart,
    };
    let draft = state.db().drafts().save(&tenant, &input).await?;
    Ok(Json(DraftView::decode(draft)?))
}

async fn delete_draft(
    State(state): State<AppState>,
    Path((tenant, phone)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    if state.db().drafts().delete(&tenant, &phone).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("draft", &phone))
    }
}

#[cfg(test)]
mod tests {
    use crate::routes::test_support::{api, test_app, TENANT};
    use axum::http::StatusCode;
    use serde_json::{json, Value};

    fn cart(quantity: i64) -> Value {
        json!({
            "lines": [{
                "productCode": "BUN",
                "description": "Sweet Bun",
                "hsnCode": "1905",
                "rate": 4550,
                "taxRate": 500,
                "quantity": quantity
            }]
        })
    }

    #[tokio::test]
    async fn test_park_and_fetch() {
        let (app, _) = test_app().await;
        let uri = format!("/api/tenants/{}/drafts/9876543210", TENANT);
        let (status, saved) = api(
            &app,
            "PUT",
            &uri,
            Some(json!({ "customerName": "Asha", "cart": cart(2) })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(saved["customerName"], "Asha");

        let (status, fetched) = api(&app, "GET", &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched["cart"]["lines"][0]["quantity"], 2);

        // Parking again replaces
        api(&app, "PUT", &uri, Some(json!({ "cart": cart(5) }))).await;
        let list_uri = format!("/api/tenants/{}/drafts", TENANT);
        let (_, list) = api(&app, "GET", &list_uri, None).await;
        let list = list.as_array().unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0]["customerPhone"], "9876543210");
        assert_eq!(list[0]["items"], 1);
    }

    #[tokio::test]
    async fn test_delete_draft() {
        let (app, _) = test_app().await;
        let uri = format!("/api/tenants/{}/drafts/9876543210", TENANT);
        api(&app, "PUT", &uri, Some(json!({ "cart": cart(1) }))).await;

        let (status, _) = api(&app, "DELETE", &uri, None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _) = api(&app, "DELETE", &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = api(&app, "GET", &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_rejects_empty_cart_and_bad_phone() {
        let (app, _) = test_app().await;
        let uri = format!("/api/tenants/{}/drafts/9876543210", TENANT);
        let (status, body) = api(&app, "PUT", &uri, Some(json!({ "cart": {} }))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["code"], "BUSINESS_LOGIC");

        let uri = format!("/api/tenants/{}/drafts/12345", TENANT);
        let (status, _) = api(&app, "PUT", &uri, Some(json!({ "cart": cart(1) }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_rejects_negative_quantity() {
        let (app, _) = test_app().await;
        let uri = format!("/api/tenants/{}/drafts/9876543210", TENANT);
        let (status, body) = api(&app, "PUT", &uri, Some(json!({ "cart": cart(-3) }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");

        let (status, _) = api(&app, "GET", &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_bill_clears_parked_draft() {
        let (app, _) = test_app().await;
        let uri = format!("/api/tenants/{}/drafts/9876543210", TENANT);
        api(&app, "PUT", &uri, Some(json!({ "cart": cart(1) }))).await;

        let bill_uri = format!("/api/tenants/{}/documents/bill", TENANT);
        let (status, _) = api(
            &app,
            "POST",
            &bill_uri,
            Some(json!({
                "documentDate": "2024-03-01",
                "customer": { "name": "Asha", "phone": "9876543210" },
                "lines": cart(1)["lines"].clone()
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, _) = api(&app, "GET", &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
