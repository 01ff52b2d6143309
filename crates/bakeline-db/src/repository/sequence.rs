//! # Sequence Repository
//!
//! Configured prefixes and pad widths, and the next-code lookups built on
//! top of them.
//!
//! ## Preview vs Allocation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  next_code()  (preview, billing screen header)                          │
//! │     prefix ─► scan codes ─► max + 1        plain reads, may race        │
//! │                                                                         │
//! │  allocate()   (inside entity creation)                                  │
//! │     BEGIN IMMEDIATE                         ◄── takes the write lock    │
//! │     INSERT .. code_settings .. DO NOTHING                               │
//! │     SELECT prefix, width                                                │
//! │     SELECT codes ─► max + 1                                             │
//! │     INSERT entity                                                       │
//! │     COMMIT                                  ◄── releases the lock       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! SQLite has one writer at a time. Every transaction that allocates is
//! opened with `BEGIN IMMEDIATE` (see `begin_write`), even when it reads
//! before it gets here, so a second allocator waits on the busy timeout
//! until the first commits and then sees its code. The unique index on
//! `(tenant_id, kind, code)` rejects anything that slips past.

use bakeline_core::sequence::{CodeSeries, SeriesFormat};
use bakeline_core::validation;
use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};

use crate::error::DbResult;

/// Repository for code series settings.
#[derive(Debug, Clone)]
pub struct SequenceRepository {
    pool: SqlitePool,
}

impl SequenceRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SequenceRepository { pool }
    }

    /// Returns the series format, persisting the default on first use.
    pub async fn format(&self, tenant_id: &str, series: CodeSeries) -> DbResult<SeriesFormat> {
        let mut conn = self.pool.acquire().await?;
        ensure_format(&mut conn, tenant_id, series).await
    }

    /// Changes the prefix or width of a series.
    ///
    /// Existing codes keep their old prefix; numbering restarts from the
    /// highest code carrying the new one.
    pub async fn set_format(
        &self,
        tenant_id: &str,
        series: CodeSeries,
        format: &SeriesFormat,
    ) -> DbResult<()> {
        validation::validate_prefix(&format.prefix)?;
        validation::validate_width(format.width)?;

        info!(
            tenant_id = %tenant_id,
            series = %series,
            prefix = %format.prefix,
            width = format.width,
            "Updating code series"
        );

        sqlx::query(
            r#"
            INSERT INTO code_settings (tenant_id, series, prefix, width, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT (tenant_id, series) DO UPDATE SET
                prefix = excluded.prefix,
                width = excluded.width,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(tenant_id)
        .bind(series)
        .bind(&format.prefix)
        .bind(format.width)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Previews the next code of a series.
    ///
    /// Nothing is reserved: two callers can be shown the same code. Codes
    /// are only handed out by the create operations.
    pub async fn next_code(&self, tenant_id: &str, series: CodeSeries) -> DbResult<String> {
        let mut conn = self.pool.acquire().await?;
        let format = ensure_format(&mut conn, tenant_id, series).await?;
        let existing = existing_codes(&mut conn, tenant_id, series).await?;
        Ok(format.next(existing.iter().map(String::as_str)))
    }
}

/// Reads the series format, inserting the default when none is stored.
///
/// Any write statement takes the SQLite write lock, even when the conflict
/// clause leaves the table unchanged.
pub(crate) async fn ensure_format(
    conn: &mut SqliteConnection,
    tenant_id: &str,
    series: CodeSeries,
) -> DbResult<SeriesFormat> {
    let default = series.default_setting();

    let inserted = sqlx::query(
        r#"
        INSERT INTO code_settings (tenant_id, series, prefix, width, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5)
        ON CONFLICT (tenant_id, series) DO NOTHING
        "#,
    )
    .bind(tenant_id)
    .bind(series)
    .bind(&default.prefix)
    .bind(default.width)
    .bind(Utc::now())
    .execute(&mut *conn)
    .await?;

    if inserted.rows_affected() > 0 {
        info!(
            tenant_id = %tenant_id,
            series = %series,
            prefix = %default.prefix,
            "Stored default code prefix"
        );
    }

    let (prefix, width): (String, u32) = sqlx::query_as(
        "SELECT prefix, width FROM code_settings WHERE tenant_id = ?1 AND series = ?2",
    )
    .bind(tenant_id)
    .bind(series)
    .fetch_one(&mut *conn)
    .await?;

    Ok(SeriesFormat::new(prefix, width))
}

/// All codes already used in a series, in no particular order.
pub(crate) async fn existing_codes(
    conn: &mut SqliteConnection,
    tenant_id: &str,
    series: CodeSeries,
) -> DbResult<Vec<String>> {
    // Party kinds and document kinds are stored under the series name.
    let query = match series {
        CodeSeries::Customer | CodeSeries::Vendor => {
            sqlx::query_scalar::<_, String>(
                "SELECT code FROM parties WHERE tenant_id = ?1 AND kind = ?2",
            )
            .bind(tenant_id)
            .bind(series.as_str())
        }
        CodeSeries::Agent => {
            sqlx::query_scalar::<_, String>("SELECT code FROM agents WHERE tenant_id = ?1")
                .bind(tenant_id)
        }
        CodeSeries::Bill | CodeSeries::Order | CodeSeries::SpecialOrder => {
            sqlx::query_scalar::<_, String>(
                "SELECT number FROM documents WHERE tenant_id = ?1 AND kind = ?2",
            )
            .bind(tenant_id)
            .bind(series.as_str())
        }
    };

    Ok(query.fetch_all(&mut *conn).await?)
}

/// Hands out the next code of a series.
///
/// Must run inside the transaction that inserts the entity carrying the
/// code.
pub(crate) async fn allocate(
    conn: &mut SqliteConnection,
    tenant_id: &str,
    series: CodeSeries,
) -> DbResult<String> {
    let format = ensure_format(&mut *conn, tenant_id, series).await?;
    let existing = existing_codes(&mut *conn, tenant_id, series).await?;
    let code = format.next(existing.iter().map(String::as_str));

    debug!(tenant_id = %tenant_id, series = %series, code = %code, "Allocated code");
    Ok(code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{customer_input, test_db, TENANT};
    use bakeline_core::PartyKind;

    #[tokio::test]
    async fn test_empty_series_starts_at_one_and_persists_default() {
        let db = test_db().await;

        let code = db.sequences().next_code(TENANT, CodeSeries::Customer).await.unwrap();
        assert_eq!(code, "CUS0001");

        let stored: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM code_settings WHERE tenant_id = ?1 AND series = 'customer'",
        )
        .bind(TENANT)
        .fetch_one(db.pool())
        .await
        .unwrap();
        assert_eq!(stored, 1);
    }

    #[tokio::test]
    async fn test_preview_does_not_reserve() {
        let db = test_db().await;
        let first = db.sequences().next_code(TENANT, CodeSeries::Bill).await.unwrap();
        let second = db.sequences().next_code(TENANT, CodeSeries::Bill).await.unwrap();
        assert_eq!(first, "INV000001");
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_next_code_follows_max_existing() {
        let db = test_db().await;
        for phone in ["9000000001", "9000000002", "9000000003"] {
            db.parties()
                .create(TENANT, PartyKind::Customer, &customer_input("Asha", phone))
                .await
                .unwrap();
        }

        let next = db.sequences().next_code(TENANT, CodeSeries::Customer).await.unwrap();
        assert_eq!(next, "CUS0004");

        // Vendors are a separate series
        let vendor = db.sequences().next_code(TENANT, CodeSeries::Vendor).await.unwrap();
        assert_eq!(vendor, "VEN0001");
    }

    #[tokio::test]
    async fn test_series_are_scoped_by_tenant() {
        let db = test_db().await;
        db.parties()
            .create(TENANT, PartyKind::Customer, &customer_input("Asha", "9000000001"))
            .await
            .unwrap();

        let other = db
            .sequences()
            .next_code("tenant-b", CodeSeries::Customer)
            .await
            .unwrap();
        assert_eq!(other, "CUS0001");
    }

    #[tokio::test]
    async fn test_custom_format() {
        let db = test_db().await;
        db.sequences()
            .set_format(TENANT, CodeSeries::Bill, &SeriesFormat::new("B24", 3))
            .await
            .unwrap();

        let format = db.sequences().format(TENANT, CodeSeries::Bill).await.unwrap();
        assert_eq!(format, SeriesFormat::new("B24", 3));

        let next = db.sequences().next_code(TENANT, CodeSeries::Bill).await.unwrap();
        assert_eq!(next, "B24001");
    }

    #[tokio::test]
    async fn test_invalid_format_is_rejected() {
        let db = test_db().await;
        let result = db
            .sequences()
            .set_format(TENANT, CodeSeries::Bill, &SeriesFormat::new("inv-", 6))
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_allocate_inside_transaction() {
        let db = test_db().await;
        let mut tx = db.pool().begin().await.unwrap();
        let code = allocate(&mut tx, TENANT, CodeSeries::Agent).await.unwrap();
        tx.commit().await.unwrap();
        assert_eq!(code, "AGT0001");
    }
}
