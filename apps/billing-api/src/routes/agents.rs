//! Sales agent endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use bakeline_core::{Agent, AgentInput};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/tenants/{tenant}/agents",
            get(list_agents).post(create_agent),
        )
        .route("/api/tenants/{tenant}/agents/{code}", get(get_agent))
}

async fn list_agents(
    State(state): State<AppState>,
    Path(tenant): Path<String>,
) -> ApiResult<Json<Vec<Agent>>> {
    Ok(Json(state.db().agents().list(&tenant).await?))
}

async fn create_agent(
    State(state): State<AppState>,
    Path(tenant): Path<String>,
    Json(input): Json<AgentInput>,
) -> ApiResult<(StatusCode, Json<Agent>)> {
    let agent = state.db().agents().create(&tenant, &input).await?;
    Ok((StatusCode::CREATED, Json(agent)))
}

async fn get_agent(
    State(state): State<AppState>,
    Path((tenant, code)): Path<(String, String)>,
) -> ApiResult<Json<Agent>> {
    state
        .db()
        .agents()
        .get_by_code(&tenant, &code)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("agent", &code))
}

#[cfg(test)]
mod tests {
    use crate::routes::test_support::{api, test_app, TENANT};
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn test_create_and_list_agents() {
        let (app, _) = test_app().await;
        let uri = format!("/api/tenants/{}/agents", TENANT);

        let (status, agent) = api(
            &app,
            "POST",
            &uri,
            Some(json!({ "name": "Ravi", "phone": "9811111111", "commissionBps": 250 })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(agent["code"], "AGT0001");
        assert_eq!(agent["commission_bps"], 250);

        let (status, listed) = api(&app, "GET", &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(listed.as_array().unwrap().len(), 1);

        let uri = format!("/api/tenants/{}/agents/AGT0001", TENANT);
        let (status, fetched) = api(&app, "GET", &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched["name"], "Ravi");
    }

    #[tokio::test]
    async fn test_agents_are_per_tenant() {
        let (app, _) = test_app().await;
        api(
            &app,
            "POST",
            &format!("/api/tenants/{}/agents", TENANT),
            Some(json!({ "name": "Ravi" })),
        )
        .await;

        let (_, listed) = api(&app, "GET", "/api/tenants/tenant-b/agents", None).await;
        assert!(listed.as_array().unwrap().is_empty());

        let (status, _) = api(&app, "GET", "/api/tenants/tenant-b/agents/AGT0001", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
