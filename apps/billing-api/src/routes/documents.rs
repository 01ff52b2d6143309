//! # Document Endpoints
//!
//! Bills, orders and special orders share one set of routes; `{kind}` picks
//! the number series and table rows.
//!
//! ```text
//! POST /api/tenants/{tenant}/documents/{kind}                     create (201)
//! GET  /api/tenants/{tenant}/documents/{kind}?limit=50            headers, newest first
//! GET  /api/tenants/{tenant}/documents/{kind}/{number}            header + lines
//! GET  /api/tenants/{tenant}/documents/{kind}/{number}/invoice    print model
//! ```
//!
//! A request without `taxMode` is priced with the configured default.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use bakeline_core::invoice::Invoice;
use bakeline_core::{
    CustomerRef, Document, DocumentKind, DocumentWithLines, LineInput, Money, NewDocument,
    TaxMode,
};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

const DEFAULT_LIST_LIMIT: u32 = 50;
const MAX_LIST_LIMIT: u32 = 500;

/// Body of a create request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDocumentRequest {
    pub document_date: NaiveDate,
    #[serde(default)]
    pub customer: Option<CustomerRef>,
    #[serde(default)]
    pub agent_code: Option<String>,
    #[serde(default)]
    pub tax_mode: Option<TaxMode>,
    pub lines: Vec<LineInput>,
    #[serde(default)]
    pub discount: Money,
    #[serde(default)]
    pub advance: Money,
    #[serde(default)]
    pub delivery_date: Option<NaiveDate>,
    #[serde(default)]
    pub remarks: Option<String>,
}

impl CreateDocumentRequest {
    fn into_new_document(self, default_mode: TaxMode) -> NewDocument {
        NewDocument {
            document_date: self.document_date,
            customer: self.customer,
            agent_code: self.agent_code,
            tax_mode: self.tax_mode.unwrap_or(default_mode),
            lines: self.lines,
            discount: self.discount,
            advance: self.advance,
            delivery_date: self.delivery_date,
            remarks: self.remarks,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub limit: Option<u32>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/tenants/{tenant}/documents/{kind}",
            get(list_documents).post(create_document),
        )
        .route(
            "/api/tenants/{tenant}/documents/{kind}/{number}",
            get(get_document),
        )
        .route(
            "/api/tenants/{tenant}/documents/{kind}/{number}/invoice",
            get(get_invoice),
        )
}

async fn create_document(
    State(state): State<AppState>,
    Path((tenant, kind)): Path<(String, String)>,
    Json(request): Json<CreateDocumentRequest>,
) -> ApiResult<(StatusCode, Json<DocumentWithLines>)> {
    let kind: DocumentKind = kind.parse()?;
    let input = request.into_new_document(state.config().default_tax_mode);
    let record = state.db().documents().create(&tenant, kind, &input).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

async fn list_documents(
    State(state): State<AppState>,
    Path((tenant, kind)): Path<(String, String)>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Vec<Document>>> {
    let kind: DocumentKind = kind.parse()?;
    let limit = query
        .limit
        .unwrap_or(DEFAULT_LIST_LIMIT)
        .clamp(1, MAX_LIST_LIMIT);
    let documents = state.db().documents().list(&tenant, kind, limit).await?;
    Ok(Json(documents))
}

async fn fetch(
    state: &AppState,
    tenant: &str,
    kind: &str,
    number: &str,
) -> ApiResult<DocumentWithLines> {
    let kind: DocumentKind = kind.parse()?;
    state
        .db()
        .documents()
        .get(tenant, kind, number)
        .await?
        .ok_or_else(|| ApiError::not_found(kind.as_str(), number))
}

async fn get_document(
    State(state): State<AppState>,
    Path((tenant, kind, number)): Path<(String, String, String)>,
) -> ApiResult<Json<DocumentWithLines>> {
    Ok(Json(fetch(&state, &tenant, &kind, &number).await?))
}

async fn get_invoice(
    State(state): State<AppState>,
    Path((tenant, kind, number)): Path<(String, String, String)>,
) -> ApiResult<Json<Invoice>> {
    let record = fetch(&state, &tenant, &kind, &number).await?;
    Ok(Json(Invoice::from_document(&record)))
}
