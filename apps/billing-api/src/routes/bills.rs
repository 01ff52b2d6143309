//! # Bill Sync Endpoints
//!
//! The head-office job pulls bills that have not been synced yet, then
//! reports which numbers it stored.
//!
//! ```text
//! GET  /api/tenants/{tenant}/bills/unsynced   ──► [BillRecord, ...]
//! POST /api/tenants/{tenant}/bills/synced     { "numbers": ["INV000001"] }
//! ```
//!
//! Records carry no nulls: a missing customer name becomes
//! "Walk-in Customer", a missing customer code becomes "CASH", and missing
//! phone, agent or remarks become empty strings.

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use bakeline_core::gst::TaxedLine;
use bakeline_core::{DocumentKind, DocumentWithLines, Money, TaxMode, WALK_IN_CUSTOMER};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Customer code on bills without a customer record.
pub const CASH_CUSTOMER_CODE: &str = "CASH";

/// A bill as handed to the sync job.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BillRecord {
    pub bill_number: String,
    pub bill_date: NaiveDate,
    pub customer_code: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub agent_code: String,
    pub tax_mode: TaxMode,
    pub subtotal: Money,
    pub cgst: Money,
    pub sgst: Money,
    pub discount: Money,
    pub round_off: Money,
    pub total: Money,
    pub remarks: String,
    pub lines: Vec<TaxedLine>,
}

impl From<DocumentWithLines> for BillRecord {
    fn from(record: DocumentWithLines) -> Self {
        let DocumentWithLines { document: doc, lines } = record;
        BillRecord {
            bill_number: doc.number,
            bill_date: doc.document_date,
            customer_code: doc
                .customer_code
                .unwrap_or_else(|| CASH_CUSTOMER_CODE.to_string()),
            customer_name: doc
                .customer_name
                .unwrap_or_else(|| WALK_IN_CUSTOMER.to_string()),
            customer_phone: doc.customer_phone.unwrap_or_default(),
            agent_code: doc.agent_code.unwrap_or_default(),
            tax_mode: doc.tax_mode,
            subtotal: Money::from_paise(doc.subtotal_paise),
            cgst: Money::from_paise(doc.cgst_paise),
            sgst: Money::from_paise(doc.sgst_paise),
            discount: Money::from_paise(doc.discount_paise),
            round_off: Money::from_paise(doc.round_off_paise),
            total: Money::from_paise(doc.total_paise),
            remarks: doc.remarks.unwrap_or_default(),
            lines: lines.iter().map(TaxedLine::from).collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct MarkSyncedRequest {
    pub numbers: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct MarkSyncedResponse {
    pub updated: u64,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/tenants/{tenant}/bills/unsynced", get(unsynced))
        .route("/api/tenants/{tenant}/bills/synced", post(mark_synced))
}

async fn unsynced(
    State(state): State<AppState>,
    Path(tenant): Path<String>,
) -> ApiResult<Json<Vec<BillRecord>>> {
    let records = state
        .db()
        .documents()
        .unsynced(&tenant, DocumentKind::Bill)
        .await?;
    Ok(Json(records.into_iter().map(BillRecord::from).collect()))
}

async fn mark_synced(
    State(state): State<AppState>,
    Path(tenant): Path<String>,
    Json(request): Json<MarkSyncedRequest>,
) -> ApiResult<Json<MarkSyncedResponse>> {
    if request.numbers.is_empty() {
        return Err(ApiError::validation("numbers must not be empty"));
    }
    let updated = state
        .db()
        .documents()
        .mark_synced(&tenant, DocumentKind::Bill, &request.numbers)
        .await?;
    info!(tenant_id = %tenant, updated, "Bills acknowledged by sync job");
    Ok(Json(MarkSyncedResponse { updated }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::test_support::{api, test_app, TENANT};
    use axum::http::StatusCode;
    use serde_json::json;

    fn bill_body(customer: serde_json::Value) -> serde_json::Value {
        json!({
            "documentDate": "2024-03-01",
            "customer": customer,
            "lines": [{
                "productCode": "BUN",
                "description": "Sweet Bun",
                "hsnCode": "1905",
                "quantity": 2,
                "rate": 4550,
                "taxRate": 500
            }]
        })
    }

    #[tokio::test]
    async fn test_unsynced_fills_defaults() {
        let (app, _) = test_app().await;
        let uri = format!("/api/tenants/{}/documents/bill", TENANT);
        let (status, _) = api(&app, "POST", &uri, Some(bill_body(json!(null)))).await;
        assert_eq!(status, StatusCode::CREATED);

        let uri = format!("/api/tenants/{}/bills/unsynced", TENANT);
        let (status, body) = api(&app, "GET", &uri, None).await;
        assert_eq!(status, StatusCode::OK);

        let bills = body.as_array().unwrap();
        assert_eq!(bills.len(), 1);
        assert_eq!(bills[0]["billNumber"], "INV000001");
        assert_eq!(bills[0]["customerCode"], "CASH");
        assert_eq!(bills[0]["customerName"], "Walk-in Customer");
        assert_eq!(bills[0]["customerPhone"], "");
        assert_eq!(bills[0]["remarks"], "");
        assert_eq!(bills[0]["lines"][0]["productCode"], "BUN");
        assert_eq!(bills[0]["total"], 9100);
    }

    #[tokio::test]
    async fn test_mark_synced_removes_from_unsynced() {
        let (app, _) = test_app().await;
        let customer = json!({ "name": "Asha", "phone": "9876543210" });
        let uri = format!("/api/tenants/{}/documents/bill", TENANT);
        api(&app, "POST", &uri, Some(bill_body(customer.clone()))).await;
        api(&app, "POST", &uri, Some(bill_body(customer))).await;

        let uri = format!("/api/tenants/{}/bills/synced", TENANT);
        let (status, body) =
            api(&app, "POST", &uri, Some(json!({ "numbers": ["INV000001"] }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["updated"], 1);

        let uri = format!("/api/tenants/{}/bills/unsynced", TENANT);
        let (_, body) = api(&app, "GET", &uri, None).await;
        let bills = body.as_array().unwrap();
        assert_eq!(bills.len(), 1);
        assert_eq!(bills[0]["billNumber"], "INV000002");
        assert_eq!(bills[0]["customerCode"], "CUS0001");
        assert_eq!(bills[0]["customerName"], "Asha");
    }

    #[tokio::test]
    async fn test_mark_synced_requires_numbers() {
        let (app, _) = test_app().await;
        let uri = format!("/api/tenants/{}/bills/synced", TENANT);
        let (status, body) = api(&app, "POST", &uri, Some(json!({ "numbers": [] }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");
    }
}
