//! # Customer and Vendor Endpoints
//!
//! ```text
//! GET  /api/tenants/{tenant}/parties/{kind}                list
//! POST /api/tenants/{tenant}/parties/{kind}                create (201)
//! GET  /api/tenants/{tenant}/parties/{kind}/{code}         fetch
//! PUT  /api/tenants/{tenant}/parties/{kind}/{code}         update
//! GET  /api/tenants/{tenant}/customers/by-phone/{phone}    billing screen lookup
//! ```

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use bakeline_core::{Party, PartyInput, PartyKind};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/tenants/{tenant}/parties/{kind}",
            get(list_parties).post(create_party),
        )
        .route(
            "/api/tenants/{tenant}/parties/{kind}/{code}",
            get(get_party).put(update_party),
        )
        .route(
            "/api/tenants/{tenant}/customers/by-phone/{phone}",
            get(customer_by_phone),
        )
}

async fn list_parties(
    State(state): State<AppState>,
    Path((tenant, kind)): Path<(String, String)>,
) -> ApiResult<Json<Vec<Party>>> {
    let kind: PartyKind = kind.parse()?;
    let parties = state.db().parties().list(&tenant, kind).await?;
    Ok(Json(parties))
}

async fn create_party(
    State(state): State<AppState>,
    Path((tenant, kind)): Path<(String, String)>,
    Json(input): Json<PartyInput>,
) -> ApiResult<(StatusCode, Json<Party>)> {
    let kind: PartyKind = kind.parse()?;
    let party = state.db().parties().create(&tenant, kind, &input).await?;
    Ok((StatusCode::CREATED, Json(party)))
}

async fn get_party(
    State(state): State<AppState>,
    Path((tenant, kind, code)): Path<(String, String, String)>,
) -> ApiResult<Json<Party>> {
    let kind: PartyKind = kind.parse()?;
    state
        .db()
        .parties()
        .get_by_code(&tenant, kind, &code)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(kind.as_str(), &code))
}

async fn update_party(
    State(state): State<AppState>,
    Path((tenant, kind, code)): Path<(String, String, String)>,
    Json(input): Json<PartyInput>,
) -> ApiResult<Json<Party>> {
    let kind: PartyKind = kind.parse()?;
    let party = state
        .db()
        .parties()
        .update(&tenant, kind, &code, &input)
        .await?;
    Ok(Json(party))
}

async fn customer_by_phone(
    State(state): State<AppState>,
    Path((tenant, phone)): Path<(String, String)>,
) -> ApiResult<Json<Party>> {
    state
        .db()
        .parties()
        .find_by_phone(&tenant, PartyKind::Customer, &phone)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("customer", &phone))
}

#[cfg(test)]
mod tests {
    use crate::routes::test_support::{api, test_app, TENANT};
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn test_create_list_and_fetch() {
        let (app, _) = test_app().await;
        let uri = format!("/api/tenants/{}/parties/customers", TENANT);
        let (status, created) = api(
            &app,
            "POST",
            &uri,
            Some(json!({ "name": "Asha Rao", "phone": "9876543210", "city": "Pune" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["code"], "CUS0001");
        assert_eq!(created["kind"], "customer");

        let (_, listed) = api(&app, "GET", &uri, None).await;
        assert_eq!(listed.as_array().unwrap().len(), 1);

        let uri = format!("/api/tenants/{}/parties/customer/CUS0001", TENANT);
        let (status, fetched) = api(&app, "GET", &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched["city"], "Pune");

        let uri = format!("/api/tenants/{}/parties/vendor/CUS0001", TENANT);
        let (status, _) = api(&app, "GET", &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_update_and_phone_lookup() {
        let (app, _) = test_app().await;
        let uri = format!("/api/tenants/{}/parties/customer", TENANT);
        api(
            &app,
            "POST",
            &uri,
            Some(json!({ "name": "Asha", "phone": "9876543210" })),
        )
        .await;

        let uri = format!("/api/tenants/{}/parties/customer/CUS0001", TENANT);
        let (status, updated) = api(
            &app,
            "PUT",
            &uri,
            Some(json!({ "name": "Asha Rao", "phone": "9876543211", "pincode": "411001" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["name"], "Asha Rao");

        let uri = format!("/api/tenants/{}/customers/by-phone/9876543211", TENANT);
        let (status, found) = api(&app, "GET", &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(found["code"], "CUS0001");

        let uri = format!("/api/tenants/{}/customers/by-phone/9000000000", TENANT);
        let (status, _) = api(&app, "GET", &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_validation_errors() {
        let (app, _) = test_app().await;
        let uri = format!("/api/tenants/{}/parties/customer", TENANT);
        let (status, body) = api(
            &app,
            "POST",
            &uri,
            Some(json!({ "name": "Asha", "phone": "12345" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");

        let uri = format!("/api/tenants/{}/parties/supplier", TENANT);
        let (status, _) = api(&app, "GET", &uri, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
