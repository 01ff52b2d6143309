//! # Document Repository
//!
//! Bills, orders and special orders. They share one header table and one
//! line table, told apart by `kind`, and each kind has its own number series.
//!
//! ## Create Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  NewDocument                                                            │
//! │       │                                                                 │
//! │       ▼  validate lines, price lines, compute totals (no I/O)          │
//! │  BEGIN                                                                  │
//! │       │                                                                 │
//! │       ├── customer by code / phone, or create on first transaction     │
//! │       ├── agent must exist when given                                  │
//! │       ├── allocate number (INV000043)                                  │
//! │       ├── INSERT header, INSERT lines                                  │
//! │       └── DELETE the customer's parked draft                           │
//! │       │                                                                 │
//! │  COMMIT ──► DocumentWithLines                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Any failure rolls the whole thing back: no number is consumed, no
//! customer is created, the draft stays parked.

use bakeline_core::gst::{price_lines, DocumentTotals, TaxedLine};
use bakeline_core::validation::{
    validate_code, validate_name, validate_phone, validate_quantity, validate_rate,
    validate_tax_rate_bps,
};
use bakeline_core::{
    CoreError, CustomerRef, Document, DocumentKind, DocumentLine, DocumentWithLines, NewDocument,
    PartyInput, PartyKind, ValidationError, WALK_IN_CUSTOMER,
};
use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};
use uuid::Uuid;

use super::{agent, begin_write, clean, draft, party, sequence};
use crate::error::{DbError, DbResult};

const DOCUMENT_COLUMNS: &str = r#"
    id, tenant_id, kind, number, document_date,
    customer_code, customer_name, customer_phone, agent_code, tax_mode,
    subtotal_paise, cgst_paise, sgst_paise, discount_paise, round_off_paise,
    total_paise, advance_paise, delivery_date, remarks, is_synced,
    created_at, updated_at
"#;

const LINE_COLUMNS: &str = r#"
    id, document_id, line_no, product_code, description, hsn_code,
    quantity, rate_paise, taxable_paise, cgst_rate_bps, sgst_rate_bps,
    cgst_paise, sgst_paise, line_total_paise
"#;

/// Customer fields written onto a document header.
#[derive(Debug, Default)]
struct HeaderCustomer {
    code: Option<String>,
    name: Option<String>,
    phone: Option<String>,
}

/// Repository for bills, orders and special orders.
#[derive(Debug, Clone)]
pub struct DocumentRepository {
    pool: SqlitePool,
}

impl DocumentRepository {
    pub fn new(pool: SqlitePool) -> Self {
        DocumentRepository { pool }
    }

    /// Creates a document, numbering it from its kind's series.
    pub async fn create(
        &self,
        tenant_id: &str,
        kind: DocumentKind,
        input: &NewDocument,
    ) -> DbResult<DocumentWithLines> {
        validate_new_document(kind, input)?;

        let taxed = price_lines(&input.lines, input.tax_mode)?;
        let totals = DocumentTotals::compute(&taxed, input.discount, input.advance)?;

        let mut tx = begin_write(&self.pool).await?;

        let customer = match &input.customer {
            Some(customer) => resolve_customer(&mut tx, tenant_id, customer).await?,
            None => HeaderCustomer::default(),
        };

        let agent_code = clean(&input.agent_code);
        if let Some(code) = &agent_code {
            if agent::fetch_by_code(&mut tx, tenant_id, code).await?.is_none() {
                return Err(DbError::not_found("agent", code.as_str()));
            }
        }

        let number = sequence::allocate(&mut tx, tenant_id, kind.series()).await?;
        let now = Utc::now();

        let document = Document {
            id: Uuid::new_v4().to_string(),
            tenant_id: tenant_id.to_string(),
            kind,
            number,
            document_date: input.document_date,
            customer_code: customer.code,
            customer_name: customer.name,
            customer_phone: customer.phone,
            agent_code,
            tax_mode: input.tax_mode,
            subtotal_paise: totals.subtotal.paise(),
            cgst_paise: totals.cgst.paise(),
            sgst_paise: totals.sgst.paise(),
            discount_paise: totals.discount.paise(),
            round_off_paise: totals.round_off.paise(),
            total_paise: totals.total.paise(),
            advance_paise: totals.advance.paise(),
            delivery_date: input.delivery_date,
            remarks: clean(&input.remarks),
            is_synced: false,
            created_at: now,
            updated_at: now,
        };

        insert_header(&mut tx, &document).await?;

        let mut lines = Vec::with_capacity(taxed.len());
        for (index, line) in taxed.iter().enumerate() {
            let line = to_document_line(&document.id, index, line);
            insert_line(&mut tx, &line).await?;
            lines.push(line);
        }

        if let Some(phone) = &document.customer_phone {
            let removed = draft::delete_in(&mut tx, tenant_id, phone).await?;
            if removed > 0 {
                debug!(tenant_id = %tenant_id, phone = %phone, "Dropped parked draft");
            }
        }

        tx.commit().await?;

        info!(
            tenant_id = %tenant_id,
            kind = %kind,
            number = %document.number,
            total = %totals.total,
            lines = lines.len(),
            "Created document"
        );

        Ok(DocumentWithLines { document, lines })
    }

    /// Fetches a document and its lines by number.
    pub async fn get(
        &self,
        tenant_id: &str,
        kind: DocumentKind,
        number: &str,
    ) -> DbResult<Option<DocumentWithLines>> {
        let mut conn = self.pool.acquire().await?;

        let sql = format!(
            "SELECT {} FROM documents WHERE tenant_id = ?1 AND kind = ?2 AND number = ?3",
            DOCUMENT_COLUMNS
        );
        let document = sqlx::query_as::<_, Document>(&sql)
            .bind(tenant_id)
            .bind(kind)
            .bind(number)
            .fetch_optional(&mut *conn)
            .await?;

        match document {
            Some(document) => {
                let lines = fetch_lines(&mut conn, &document.id).await?;
                Ok(Some(DocumentWithLines { document, lines }))
            }
            None => Ok(None),
        }
    }

    /// Lists headers of one kind, newest first.
    pub async fn list(
        &self,
        tenant_id: &str,
        kind: DocumentKind,
        limit: u32,
    ) -> DbResult<Vec<Document>> {
        let sql = format!(
            r#"
            SELECT {} FROM documents
            WHERE tenant_id = ?1 AND kind = ?2
            ORDER BY document_date DESC, number DESC
            LIMIT ?3
            "#,
            DOCUMENT_COLUMNS
        );
        let documents = sqlx::query_as::<_, Document>(&sql)
            .bind(tenant_id)
            .bind(kind)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(documents)
    }

    /// Documents not yet picked up by the sync job, in number order.
    pub async fn unsynced(
        &self,
        tenant_id: &str,
        kind: DocumentKind,
    ) -> DbResult<Vec<DocumentWithLines>> {
        let mut conn = self.pool.acquire().await?;

        let sql = format!(
            r#"
            SELECT {} FROM documents
            WHERE tenant_id = ?1 AND kind = ?2 AND is_synced = 0
            ORDER BY number
            "#,
            DOCUMENT_COLUMNS
        );
        let documents = sqlx::query_as::<_, Document>(&sql)
            .bind(tenant_id)
            .bind(kind)
            .fetch_all(&mut *conn)
            .await?;

        let mut records = Vec::with_capacity(documents.len());
        for document in documents {
            let lines = fetch_lines(&mut conn, &document.id).await?;
            records.push(DocumentWithLines { document, lines });
        }
        Ok(records)
    }

    /// Flags documents as synced. Returns how many changed state.
    ///
    /// Unknown or already-synced numbers are skipped.
    pub async fn mark_synced(
        &self,
        tenant_id: &str,
        kind: DocumentKind,
        numbers: &[String],
    ) -> DbResult<u64> {
        let mut tx = begin_write(&self.pool).await?;
        let now = Utc::now();
        let mut updated = 0;

        for number in numbers {
            let result = sqlx::query(
                r#"
                UPDATE documents SET is_synced = 1, updated_at = ?4
                WHERE tenant_id = ?1 AND kind = ?2 AND number = ?3 AND is_synced = 0
                "#,
            )
            .bind(tenant_id)
            .bind(kind)
            .bind(number)
            .bind(now)
            .execute(&mut *tx)
            .await?;
            updated += result.rows_affected();
        }

        tx.commit().await?;

        info!(
            tenant_id = %tenant_id,
            kind = %kind,
            requested = numbers.len(),
            updated,
            "Marked documents synced"
        );
        Ok(updated)
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn validate_new_document(kind: DocumentKind, input: &NewDocument) -> DbResult<()> {
    if input.lines.is_empty() {
        return Err(CoreError::EmptyDocument {
            kind: kind.title().to_string(),
        }
        .into());
    }

    for line in &input.lines {
        validate_code("product_code", &line.product_code)?;
        validate_name("description", &line.description)?;
        validate_code("hsn_code", &line.hsn_code)?;
        validate_quantity(line.quantity)?;
        validate_rate(line.rate)?;
        validate_tax_rate_bps(line.tax_rate.bps())?;
    }

    if let Some(delivery) = input.delivery_date {
        if delivery < input.document_date {
            return Err(ValidationError::invalid_format(
                "delivery_date",
                "must not be before the document date",
            )
            .into());
        }
    }

    if let Some(customer) = &input.customer {
        if !customer.phone.trim().is_empty() {
            validate_phone(&customer.phone)?;
        }
    }

    Ok(())
}

/// Works out the customer fields of the header.
///
/// ```text
/// code given        → must exist
/// phone known       → existing customer
/// phone new         → customer created now (first transaction)
/// no phone          → name only, no customer record
/// ```
async fn resolve_customer(
    conn: &mut SqliteConnection,
    tenant_id: &str,
    customer: &CustomerRef,
) -> DbResult<HeaderCustomer> {
    let name = customer.name.trim();
    let phone = customer.phone.trim();

    if let Some(code) = clean(&customer.code) {
        let party = party::fetch_by_code(&mut *conn, tenant_id, PartyKind::Customer, &code)
            .await?
            .ok_or_else(|| DbError::not_found("customer", code.as_str()))?;
        return Ok(HeaderCustomer {
            code: Some(party.code),
            name: Some(if name.is_empty() { party.name } else { name.to_string() }),
            phone: Some(party.phone),
        });
    }

    if phone.is_empty() {
        return Ok(HeaderCustomer {
            name: (!name.is_empty()).then(|| name.to_string()),
            ..Default::default()
        });
    }

    if let Some(party) =
        party::fetch_by_phone(&mut *conn, tenant_id, PartyKind::Customer, phone).await?
    {
        return Ok(HeaderCustomer {
            code: Some(party.code),
            name: Some(if name.is_empty() { party.name } else { name.to_string() }),
            phone: Some(party.phone),
        });
    }

    let input = PartyInput {
        name: if name.is_empty() {
            WALK_IN_CUSTOMER.to_string()
        } else {
            name.to_string()
        },
        phone: phone.to_string(),
        ..Default::default()
    };
    validate_name("customer name", &input.name)?;

    let party = party::insert_party(&mut *conn, tenant_id, PartyKind::Customer, &input).await?;
    info!(
        tenant_id = %tenant_id,
        code = %party.code,
        "Created customer on first transaction"
    );

    Ok(HeaderCustomer {
        code: Some(party.code),
        name: Some(party.name),
        phone: Some(party.phone),
    })
}

fn to_document_line(document_id: &str, index: usize, line: &TaxedLine) -> DocumentLine {
    DocumentLine {
        id: Uuid::new_v4().to_string(),
        document_id: document_id.to_string(),
        line_no: index as i64 + 1,
        product_code: line.product_code.trim().to_string(),
        description: line.description.trim().to_string(),
        hsn_code: line.hsn_code.trim().to_string(),
        quantity: line.quantity,
        rate_paise: line.rate.paise(),
        taxable_paise: line.taxable_value.paise(),
        cgst_rate_bps: line.cgst_rate.bps(),
        sgst_rate_bps: line.sgst_rate.bps(),
        cgst_paise: line.cgst_amount.paise(),
        sgst_paise: line.sgst_amount.paise(),
        line_total_paise: line.line_total.paise(),
    }
}

async fn insert_header(conn: &mut SqliteConnection, doc: &Document) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO documents (
            id, tenant_id, kind, number, document_date,
            customer_code, customer_name, customer_phone, agent_code, tax_mode,
            subtotal_paise, cgst_paise, sgst_paise, discount_paise, round_off_paise,
            total_paise, advance_paise, delivery_date, remarks, is_synced,
            created_at, updated_at
        ) VALUES (
            ?1, ?2, ?3, ?4, ?5,
            ?6, ?7, ?8, ?9, ?10,
            ?11, ?12, ?13, ?14, ?15,
            ?16, ?17, ?18, ?19, ?20,
            ?21, ?22
        )
        "#,
    )
    .bind(&doc.id)
    .bind(&doc.tenant_id)
    .bind(doc.kind)
    .bind(&doc.number)
    .bind(doc.document_date)
    .bind(&doc.customer_code)
    .bind(&doc.customer_name)
    .bind(&doc.customer_phone)
    .bind(&doc.agent_code)
    .bind(doc.tax_mode)
    .bind(doc.subtotal_paise)
    .bind(doc.cgst_paise)
    .bind(doc.sgst_paise)
    .bind(doc.discount_paise)
    .bind(doc.round_off_paise)
    .bind(doc.total_paise)
    .bind(doc.advance_paise)
    .bind(doc.delivery_date)
    .bind(&doc.remarks)
    .bind(doc.is_synced)
    .bind(doc.created_at)
    .bind(doc.updated_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

async fn insert_line(conn: &mut SqliteConnection, line: &DocumentLine) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO document_lines (
            id, document_id, line_no, product_code, description, hsn_code,
            quantity, rate_paise, taxable_paise, cgst_rate_bps, sgst_rate_bps,
            cgst_paise, sgst_paise, line_total_paise
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
        "#,
    )
    .bind(&line.id)
    .bind(&line.document_id)
    .bind(line.line_no)
    .bind(&line.product_code)
    .bind(&line.description)
    .bind(&line.hsn_code)
    .bind(line.quantity)
    .bind(line.rate_paise)
    .bind(line.taxable_paise)
    .bind(line.cgst_rate_bps)
    .bind(line.sgst_rate_bps)
    .bind(line.cgst_paise)
    .bind(line.sgst_paise)
    .bind(line.line_total_paise)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

async fn fetch_lines(conn: &mut SqliteConnection, document_id: &str) -> DbResult<Vec<DocumentLine>> {
    let sql = format!(
        "SELECT {} FROM document_lines WHERE document_id = ?1 ORDER BY line_no",
        LINE_COLUMNS
    );
    let lines = sqlx::query_as::<_, DocumentLine>(&sql)
        .bind(document_id)
        .fetch_all(&mut *conn)
        .await?;
    Ok(lines)
}

// =============================================================================
// Unit Tests
// =============================================================================
