//! # Invoice Print Model
//!
//! Everything the print view needs for one stored document, assembled in
//! one place: header, taxed lines, HSN summary, totals and amount in words.
//!
//! ```text
//! ┌──────────────────────────── Tax Invoice ────────────────────────────┐
//! │ INV000042                                         01-03-2024        │
//! │ Customer: Asha (9876543210)                                         │
//! ├─────────────────────────────────────────────────────────────────────┤
//! │ lines ...                                                           │
//! ├────────── HSN ──────┬── Taxable ──┬── CGST ──┬── SGST ──┬── Tax ───┤
//! │ 1905 @ 2.5% + 2.5%  │    130.00   │   3.25   │   3.25   │   6.50   │
//! ├─────────────────────┴─────────────┴──────────┴──────────┴──────────┤
//! │ Round off 0.50                                  Total ₹137.00       │
//! │ One Hundred Thirty Seven Rupees Only                                │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::gst::{summarize_by_hsn, DocumentTotals, HsnSummaryRow, TaxedLine};
use crate::money::Money;
use crate::types::{Document, DocumentKind, DocumentWithLines, TaxMode};
use crate::words::amount_in_words;
use crate::WALK_IN_CUSTOMER;

impl From<&Document> for DocumentTotals {
    fn from(doc: &Document) -> Self {
        DocumentTotals {
            subtotal: Money::from_paise(doc.subtotal_paise),
            cgst: Money::from_paise(doc.cgst_paise),
            sgst: Money::from_paise(doc.sgst_paise),
            discount: Money::from_paise(doc.discount_paise),
            round_off: Money::from_paise(doc.round_off_paise),
            total: doc.total(),
            advance: Money::from_paise(doc.advance_paise),
            balance_due: doc.balance_due(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub title: String,
    pub kind: DocumentKind,
    pub number: String,
    #[ts(as = "String")]
    pub document_date: NaiveDate,
    pub customer_code: Option<String>,
    pub customer_name: String,
    pub customer_phone: Option<String>,
    pub agent_code: Option<String>,
    pub tax_mode: TaxMode,
    pub lines: Vec<TaxedLine>,
    pub hsn_summary: Vec<HsnSummaryRow>,
    pub totals: DocumentTotals,
    pub amount_in_words: String,
    #[ts(as = "Option<String>")]
    pub delivery_date: Option<NaiveDate>,
    pub remarks: Option<String>,
}

impl Invoice {
    /// Builds the print model from stored values; nothing is recomputed
    /// except the HSN grouping.
    pub fn from_document(record: &DocumentWithLines) -> Self {
        let doc = &record.document;
        let lines: Vec<TaxedLine> = record.lines.iter().map(TaxedLine::from).collect();
        let hsn_summary = summarize_by_hsn(&lines);
        let totals = DocumentTotals::from(doc);

        Invoice {
            title: doc.kind.title().to_string(),
            kind: doc.kind,
            number: doc.number.clone(),
            document_date: doc.document_date,
            customer_code: doc.customer_code.clone(),
            customer_name: doc
                .customer_name
                .clone()
                .filter(|name| !name.trim().is_empty())
                .unwrap_or_else(|| WALK_IN_CUSTOMER.to_string()),
            customer_phone: doc.customer_phone.clone(),
            agent_code: doc.agent_code.clone(),
            tax_mode: doc.tax_mode,
            lines,
            hsn_summary,
            amount_in_words: amount_in_words(totals.total),
            totals,
            delivery_date: doc.delivery_date,
            remarks: doc.remarks.clone(),
        }
    }
}
