//! # Party Repository
//!
//! Customers and vendors. Both live in `parties`, numbered from their own
//! code series (CUS0001..., VEN0001...).
//!
//! ## Lifecycle
//! ```text
//! first bill for a new phone ──► insert_party (inside the bill's transaction)
//! customer form              ──► create / update
//! (no delete: bills keep pointing at the code)
//! ```

use bakeline_core::validation::{validate_party_input, validate_phone};
use bakeline_core::{Party, PartyInput, PartyKind};
use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};
use uuid::Uuid;

use super::{begin_write, clean, sequence};
use crate::error::{DbError, DbResult};

const PARTY_COLUMNS: &str = r#"
    id, tenant_id, kind, code, name, phone,
    address_line1, address_line2, city, state, pincode,
    birthday, anniversary, gst_number,
    created_at, updated_at
"#;

/// Repository for customer and vendor records.
#[derive(Debug, Clone)]
pub struct PartyRepository {
    pool: SqlitePool,
}

impl PartyRepository {
    pub fn new(pool: SqlitePool) -> Self {
        PartyRepository { pool }
    }

    /// Creates a party under the next free code of its series.
    pub async fn create(
        &self,
        tenant_id: &str,
        kind: PartyKind,
        input: &PartyInput,
    ) -> DbResult<Party> {
        validate_party_input(input)?;

        let mut tx = begin_write(&self.pool).await?;
        let party = insert_party(&mut tx, tenant_id, kind, input).await?;
        tx.commit().await?;

        info!(
            tenant_id = %tenant_id,
            kind = %kind,
            code = %party.code,
            "Created party"
        );
        Ok(party)
    }

    pub async fn get_by_code(
        &self,
        tenant_id: &str,
        kind: PartyKind,
        code: &str,
    ) -> DbResult<Option<Party>> {
        let mut conn = self.pool.acquire().await?;
        fetch_by_code(&mut conn, tenant_id, kind, code).await
    }

    /// Finds the most recently updated party with this phone number.
    pub async fn find_by_phone(
        &self,
        tenant_id: &str,
        kind: PartyKind,
        phone: &str,
    ) -> DbResult<Option<Party>> {
        validate_phone(phone)?;
        let mut conn = self.pool.acquire().await?;
        fetch_by_phone(&mut conn, tenant_id, kind, phone.trim()).await
    }

    /// Lists parties of a kind in code order.
    pub async fn list(&self, tenant_id: &str, kind: PartyKind) -> DbResult<Vec<Party>> {
        let sql = format!(
            "SELECT {} FROM parties WHERE tenant_id = ?1 AND kind = ?2 ORDER BY code",
            PARTY_COLUMNS
        );
        let parties = sqlx::query_as::<_, Party>(&sql)
            .bind(tenant_id)
            .bind(kind)
            .fetch_all(&self.pool)
            .await?;
        Ok(parties)
    }

    /// Replaces the editable fields of a party. The code never changes.
    pub async fn update(
        &self,
        tenant_id: &str,
        kind: PartyKind,
        code: &str,
        input: &PartyInput,
    ) -> DbResult<Party> {
        validate_party_input(input)?;
        debug!(tenant_id = %tenant_id, kind = %kind, code = %code, "Updating party");

        let result = sqlx::query(
            r#"
            UPDATE parties SET
                name = ?4,
                phone = ?5,
                address_line1 = ?6,
                address_line2 = ?7,
                city = ?8,
                state = ?9,
                pincode = ?10,
                birthday = ?11,
                anniversary = ?12,
                gst_number = ?13,
                updated_at = ?14
            WHERE tenant_id = ?1 AND kind = ?2 AND code = ?3
            "#,
        )
        .bind(tenant_id)
        .bind(kind)
        .bind(code)
        .bind(input.name.trim())
        .bind(input.phone.trim())
        .bind(clean(&input.address_line1))
        .bind(clean(&input.address_line2))
        .bind(clean(&input.city))
        .bind(clean(&input.state))
        .bind(clean(&input.pincode))
        .bind(input.birthday)
        .bind(input.anniversary)
        .bind(clean(&input.gst_number).map(|g| g.to_uppercase()))
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found(kind.as_str(), code));
        }

        self.get_by_code(tenant_id, kind, code)
            .await?
            .ok_or_else(|| DbError::not_found(kind.as_str(), code))
    }

    pub async fn count(&self, tenant_id: &str, kind: PartyKind) -> DbResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM parties WHERE tenant_id = ?1 AND kind = ?2")
                .bind(tenant_id)
                .bind(kind)
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }
}

// =============================================================================
// Connection-level helpers (shared with document creation)
// =============================================================================

pub(crate) async fn fetch_by_code(
    conn: &mut SqliteConnection,
    tenant_id: &str,
    kind: PartyKind,
    code: &str,
) -> DbResult<Option<Party>> {
    let sql = format!(
        "SELECT {} FROM parties WHERE tenant_id = ?1 AND kind = ?2 AND code = ?3",
        PARTY_COLUMNS
    );
    let party = sqlx::query_as::<_, Party>(&sql)
        .bind(tenant_id)
        .bind(kind)
        .bind(code)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(party)
}

pub(crate) async fn fetch_by_phone(
    conn: &mut SqliteConnection,
    tenant_id: &str,
    kind: PartyKind,
    phone: &str,
) -> DbResult<Option<Party>> {
    let sql = format!(
        r#"
        SELECT {} FROM parties
        WHERE tenant_id = ?1 AND kind = ?2 AND phone = ?3
        ORDER BY updated_at DESC
        LIMIT 1
        "#,
        PARTY_COLUMNS
    );
    let party = sqlx::query_as::<_, Party>(&sql)
        .bind(tenant_id)
        .bind(kind)
        .bind(phone)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(party)
}

/// Allocates a code and inserts the party on `conn`.
///
/// The caller owns the transaction and must have validated `input`.
pub(crate) async fn insert_party(
    conn: &mut SqliteConnection,
    tenant_id: &str,
    kind: PartyKind,
    input: &PartyInput,
) -> DbResult<Party> {
    let code = sequence::allocate(&mut *conn, tenant_id, kind.series()).await?;
    let now = Utc::now();

    let party = Party {
        id: Uuid::new_v4().to_string(),
        tenant_id: tenant_id.to_string(),
        kind,
        code,
        name: input.name.trim().to_string(),
        phone: input.phone.trim().to_string(),
        address_line1: clean(&input.address_line1),
        address_line2: clean(&input.address_line2),
        city: clean(&input.city),
        state: clean(&input.state),
        pincode: clean(&input.pincode),
        birthday: input.birthday,
        anniversary: input.anniversary,
        gst_number: clean(&input.gst_number).map(|g| g.to_uppercase()),
        created_at: now,
        updated_at: now,
    };

    sqlx::query(
        r#"
        INSERT INTO parties (
            id, tenant_id, kind, code, name, phone,
            address_line1, address_line2, city, state, pincode,
            birthday, anniversary, gst_number,
            created_at, updated_at
        ) VALUES (
            ?1, ?2, ?3, ?4, ?5, ?6,
            ?7, ?8, ?9, ?10, ?11,
            ?12, ?13, ?14,
            ?15, ?16
        )
        "#,
    )
    .bind(&party.id)
    .bind(&party.tenant_id)
    .bind(party.kind)
    .bind(&party.code)
    .bind(&party.name)
    .bind(&party.phone)
    .bind(&party.address_line1)
    .bind(&party.address_line2)
    .bind(&party.city)
    .bind(&party.state)
    .bind(&party.pincode)
    .bind(party.birthday)
    .bind(party.anniversary)
    .bind(&party.gst_number)
    .bind(party.created_at)
    .bind(party.updated_at)
    .execute(&mut *conn)
    .await?;

    Ok(party)
}
