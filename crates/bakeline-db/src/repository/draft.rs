//! # Draft Repository
//!
//! Parked carts. A cashier parks a half-built bill against the customer's
//! phone number and picks it up again later.
//!
//! ```text
//! save(phone, cart)   ── replaces any draft already parked for the phone
//! get / list          ── read back, newest first
//! document created    ── draft for the phone is dropped in the same tx
//! ```

use bakeline_core::cart::CartState;
use bakeline_core::validation::{validate_name, validate_phone};
use bakeline_core::{CoreError, Draft};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::info;
use uuid::Uuid;

use super::{begin_write, clean};
use crate::error::{DbError, DbResult};

const DRAFT_COLUMNS: &str = "id, tenant_id, customer_phone, customer_name, payload, created_at";

/// A cart to park.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftInput {
    pub customer_phone: String,
    #[serde(default)]
    pub customer_name: Option<String>,
    pub cart: CartState,
}

/// Repository for parked drafts.
#[derive(Debug, Clone)]
pub struct DraftRepository {
    pool: SqlitePool,
}

impl DraftRepository {
    pub fn new(pool: SqlitePool) -> Self {
        DraftRepository { pool }
    }

    /// Parks a cart, replacing the phone's previous draft.
    pub async fn save(&self, tenant_id: &str, input: &DraftInput) -> DbResult<Draft> {
        validate_phone(&input.customer_phone)?;
        let customer_name = clean(&input.customer_name);
        if let Some(name) = &customer_name {
            validate_name("customer name", name)?;
        }
        if input.cart.is_empty() {
            return Err(CoreError::EmptyDocument {
                kind: "draft".to_string(),
            }
            .into());
        }
        let cart = input.cart.normalized()?;

        let payload = serde_json::to_string(&cart)
            .map_err(|e| DbError::Internal(format!("Failed to encode draft: {}", e)))?;

        let draft = Draft {
            id: Uuid::new_v4().to_string(),
            tenant_id: tenant_id.to_string(),
            customer_phone: input.customer_phone.trim().to_string(),
            customer_name,
            payload,
            created_at: Utc::now(),
        };

        let mut tx = begin_write(&self.pool).await?;
        let replaced = delete_in(&mut tx, tenant_id, &draft.customer_phone).await?;

        sqlx::query(
            r#"
            INSERT INTO drafts (id, tenant_id, customer_phone, customer_name, payload, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&draft.id)
        .bind(&draft.tenant_id)
        .bind(&draft.customer_phone)
        .bind(&draft.customer_name)
        .bind(&draft.payload)
        .bind(draft.created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(
            tenant_id = %tenant_id,
            phone = %draft.customer_phone,
            items = cart.item_count(),
            replaced = replaced > 0,
            "Parked draft"
        );
        Ok(draft)
    }

    pub async fn get(&self, tenant_id: &str, customer_phone: &str) -> DbResult<Option<Draft>> {
        let sql = format!(
            "SELECT {} FROM drafts WHERE tenant_id = ?1 AND customer_phone = ?2",
            DRAFT_COLUMNS
        );
        let draft = sqlx::query_as::<_, Draft>(&sql)
            .bind(tenant_id)
            .bind(customer_phone.trim())
            .fetch_optional(&self.pool)
            .await?;
        Ok(draft)
    }

    /// Fetches and decodes the parked cart for a phone.
    pub async fn load_state(
        &self,
        tenant_id: &str,
        customer_phone: &str,
    ) -> DbResult<Option<CartState>> {
        match self.get(tenant_id, customer_phone).await? {
            Some(draft) => Ok(Some(draft.cart_state()?)),
            None => Ok(None),
        }
    }

    /// Lists parked drafts, newest first.
    pub async fn list(&self, tenant_id: &str) -> DbResult<Vec<Draft>> {
        let sql = format!(
            "SELECT {} FROM drafts WHERE tenant_id = ?1 ORDER BY created_at DESC",
            DRAFT_COLUMNS
        );
        let drafts = sqlx::query_as::<_, Draft>(&sql)
            .bind(tenant_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(drafts)
    }

    /// Drops the draft for a phone. Returns whether one existed.
    pub async fn delete(&self, tenant_id: &str, customer_phone: &str) -> DbResult<bool> {
        let mut conn = self.pool.acquire().await?;
        let removed = delete_in(&mut conn, tenant_id, customer_phone.trim()).await?;
        Ok(removed > 0)
    }
}

pub(crate) async fn delete_in(
    conn: &mut SqliteConnection,
    tenant_id: &str,
    customer_phone: &str,
) -> DbResult<u64> {
    let result = sqlx::query("DELETE FROM drafts WHERE tenant_id = ?1 AND customer_phone = ?2")
        .bind(tenant_id)
        .bind(customer_phone)
        .execute(&mut *conn)
        .await?;
    Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{product, test_db, TENANT};
    use bakeline_core::cart::{CartAction, CartLine};

    fn cart_with(code: &str, qty: i64) -> CartState {
        let mut cart = CartState::default();
        cart.apply(CartAction::AddProduct {
            line: CartLine::from_product(&product(code, "Item", "Cakes", 5_000, 500), qty),
        })
        .unwrap();
        cart
    }

    fn input(phone: &str, cart: CartState) -> DraftInput {
        DraftInput {
            customer_phone: phone.to_string(),
            customer_name: Some("Asha".to_string()),
            cart,
        }
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let db = test_db().await;
        let cart = cart_with("BUN", 2);
        db.drafts().save(TENANT, &input("9876543210", cart.clone())).await.unwrap();

        let loaded = db.drafts().load_state(TENANT, "9876543210").await.unwrap();
        assert_eq!(loaded, Some(cart));

        let draft = db.drafts().get(TENANT, "9876543210").await.unwrap().unwrap();
        assert_eq!(draft.customer_name.as_deref(), Some("Asha"));

        assert!(db.drafts().get("tenant-b", "9876543210").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_replaces_previous_draft() {
        let db = test_db().await;
        db.drafts().save(TENANT, &input("9876543210", cart_with("BUN", 2))).await.unwrap();
        db.drafts().save(TENANT, &input("9876543210", cart_with("PAV", 5))).await.unwrap();
        db.drafts().save(TENANT, &input("9811111111", cart_with("BUN", 1))).await.unwrap();

        let drafts = db.drafts().list(TENANT).await.unwrap();
        assert_eq!(drafts.len(), 2);

        let state = db.drafts().load_state(TENANT, "9876543210").await.unwrap().unwrap();
        assert_eq!(state.lines.len(), 1);
        assert_eq!(state.lines[0].product_code, "PAV");
        assert_eq!(state.lines[0].quantity, 5);
    }

    #[tokio::test]
    async fn test_save_rejects_empty_cart_and_bad_phone() {
        let db = test_db().await;
        let empty = db.drafts().save(TENANT, &input("9876543210", CartState::default())).await;
        assert!(matches!(
            empty,
            Err(DbError::Domain(CoreError::EmptyDocument { .. }))
        ));

        let bad_phone = db.drafts().save(TENANT, &input("12345", cart_with("BUN", 1))).await;
        assert!(matches!(bad_phone, Err(DbError::Domain(CoreError::Validation(_)))));
    }

    #[tokio::test]
    async fn test_save_rejects_invalid_lines_and_merges_repeats() {
        let db = test_db().await;
        let mut cart = cart_with("BUN", 1);
        cart.lines[0].quantity = -3;
        let err = db.drafts().save(TENANT, &input("9876543210", cart)).await;
        assert!(matches!(err, Err(DbError::Domain(CoreError::Validation(_)))));
        assert!(db.drafts().get(TENANT, "9876543210").await.unwrap().is_none());

        let mut cart = cart_with("BUN", 1);
        cart.lines.push(cart.lines[0].clone());
        db.drafts().save(TENANT, &input("9876543210", cart)).await.unwrap();

        let state = db.drafts().load_state(TENANT, "9876543210").await.unwrap().unwrap();
        assert_eq!(state.lines.len(), 1);
        assert_eq!(state.lines[0].quantity, 2);
    }

    #[tokio::test]
    async fn test_delete() {
        let db = test_db().await;
        db.drafts().save(TENANT, &input("9876543210", cart_with("BUN", 2))).await.unwrap();

        assert!(db.drafts().delete(TENANT, "9876543210").await.unwrap());
        assert!(!db.drafts().delete(TENANT, "9876543210").await.unwrap());
        assert!(db.drafts().load_state(TENANT, "9876543210").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_corrupt_payload_surfaces_as_domain_error() {
        let db = test_db().await;
        sqlx::query(
            "INSERT INTO drafts (id, tenant_id, customer_phone, customer_name, payload, created_at) \
             VALUES ('d1', ?1, '9876543210', NULL, 'not json', ?2)",
        )
        .bind(TENANT)
        .bind(Utc::now())
        .execute(db.pool())
        .await
        .unwrap();

        let result = db.drafts().load_state(TENANT, "9876543210").await;
        assert!(matches!(result, Err(DbError::Domain(CoreError::CorruptDraft(_)))));
    }
}
