//! # Code Series Endpoints
//!
//! ```text
//! GET /api/tenants/{tenant}/codes/{series}        ──► { "prefix": "INV", "width": 6 }
//! PUT /api/tenants/{tenant}/codes/{series}        { "prefix": "B24", "width": 4 }
//! GET /api/tenants/{tenant}/codes/{series}/next   ──► { "series": "bill", "code": "INV000043" }
//! ```
//!
//! `next` is a preview for the billing screen. The number is only taken
//! when the document is saved.

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use bakeline_core::sequence::{CodeSeries, SeriesFormat};
use serde::Serialize;

use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct NextCodeResponse {
    pub series: CodeSeries,
    pub code: String,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/tenants/{tenant}/codes/{series}",
            get(get_format).put(set_format),
        )
        .route("/api/tenants/{tenant}/codes/{series}/next", get(next_code))
}

async fn get_format(
    State(state): State<AppState>,
    Path((tenant, series)): Path<(String, String)>,
) -> ApiResult<Json<SeriesFormat>> {
    let series: CodeSeries = series.parse()?;
    let format = state.db().sequences().format(&tenant, series).await?;
    Ok(Json(format))
}

async fn set_format(
    State(state): State<AppState>,
    Path((tenant, series)): Path<(String, String)>,
    Json(format): Json<SeriesFormat>,
) -> ApiResult<Json<SeriesFormat>> {
    let series: CodeSeries = series.parse()?;
    state.db().sequences().set_format(&tenant, series, &format).await?;
    Ok(Json(format))
}

async fn next_code(
    State(state): State<AppState>,
    Path((tenant, series)): Path<(String, String)>,
) -> ApiResult<Json<NextCodeResponse>> {
    let series: CodeSeries = series.parse()?;
    let code = state.db().sequences().next_code(&tenant, series).await?;
    Ok(Json(NextCodeResponse { series, code }))
}

#[cfg(test)]
mod tests {
    use crate::routes::test_support::{api, test_app, TENANT};
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn test_next_code_preview() {
        let (app, _) = test_app().await;
        let uri = format!("/api/tenants/{}/codes/special-order/next", TENANT);
        let (status, body) = api(&app, "GET", &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["series"], "special_order");
        assert_eq!(body["code"], "SPO000001");

        // Previewing does not reserve
        let (_, again) = api(&app, "GET", &uri, None).await;
        assert_eq!(again["code"], "SPO000001");
    }

    #[tokio::test]
    async fn test_custom_format() {
        let (app, _) = test_app().await;
        let uri = format!("/api/tenants/{}/codes/customer", TENANT);
        let (status, _) = api(&app, "PUT", &uri, Some(json!({ "prefix": "C", "width": 3 }))).await;
        assert_eq!(status, StatusCode::OK);

        let (_, format) = api(&app, "GET", &uri, None).await;
        assert_eq!(format["prefix"], "C");

        let uri = format!("/api/tenants/{}/codes/customer/next", TENANT);
        let (_, body) = api(&app, "GET", &uri, None).await;
        assert_eq!(body["code"], "C001");
    }

    #[tokio::test]
    async fn test_bad_series_and_format() {
        let (app, _) = test_app().await;
        let uri = format!("/api/tenants/{}/codes/receipt/next", TENANT);
        let (status, body) = api(&app, "GET", &uri, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");

        let uri = format!("/api/tenants/{}/codes/bill", TENANT);
        let (status, _) = api(&app, "PUT", &uri, Some(json!({ "prefix": "inv", "width": 0 }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
