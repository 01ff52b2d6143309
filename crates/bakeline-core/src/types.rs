//! # Domain Types
//!
//! Core domain types used throughout Bakeline.
//!
//! ## Type Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │     Party       │   │    Document     │   │  DocumentLine   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  kind           │   │  kind           │   │  product_code   │       │
//! │  │  code (CUS0001) │   │  number         │   │  hsn_code       │       │
//! │  │  phone          │   │  totals         │   │  cgst / sgst    │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │     Draft       │   │     Agent       │       │
//! │  │  code, hsn      │   │  keyed by phone │   │  code, name     │       │
//! │  │  rate, tax bps  │   │  cart payload   │   │  commission     │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every entity has:
//! - `id`: UUID v4, immutable, used for relations
//! - Business code: (CUS0001, INV000042, ...) human-readable, unique per tenant

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;
use crate::sequence::CodeSeries;

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// 1 basis point = 0.01%. GST slabs: 0, 500, 1200, 1800, 2800.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxRate(u32);

impl TaxRate {
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Creates a tax rate from a percentage, rounded to the basis point.
    ///
    /// Only finite values from 0 to 100 are accepted.
    pub fn from_percentage(pct: f64) -> Result<Self, ValidationError> {
        if !pct.is_finite() || !(0.0..=100.0).contains(&pct) {
            return Err(ValidationError::OutOfRange {
                field: "tax_rate".to_string(),
                min: 0,
                max: 100,
            });
        }
        Ok(TaxRate((pct * 100.0).round() as u32))
    }

    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Splits a total GST rate into its (CGST, SGST) halves.
    ///
    /// An odd basis point goes to CGST so the halves always add back up.
    pub const fn split_gst(&self) -> (TaxRate, TaxRate) {
        let sgst = self.0 / 2;
        (TaxRate(self.0 - sgst), TaxRate(sgst))
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate::zero()
    }
}

// =============================================================================
// Tax Mode
// =============================================================================

/// Whether product rates include GST.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum TaxMode {
    /// Counter price already includes GST (bakery shelf prices).
    #[default]
    Inclusive,
    /// GST is added on top of the rate.
    Exclusive,
}

impl TaxMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaxMode::Inclusive => "inclusive",
            TaxMode::Exclusive => "exclusive",
        }
    }
}

impl FromStr for TaxMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "inclusive" => Ok(TaxMode::Inclusive),
            "exclusive" => Ok(TaxMode::Exclusive),
            _ => Err(ValidationError::NotAllowed {
                field: "tax_mode".to_string(),
                allowed: vec!["inclusive".to_string(), "exclusive".to_string()],
            }),
        }
    }
}

// =============================================================================
// Party (Customer / Vendor)
// =============================================================================

/// Customers and vendors share one table, told apart by kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PartyKind {
    Customer,
    Vendor,
}

impl PartyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PartyKind::Customer => "customer",
            PartyKind::Vendor => "vendor",
        }
    }

    /// The code series that numbers this kind of party.
    pub fn series(&self) -> CodeSeries {
        match self {
            PartyKind::Customer => CodeSeries::Customer,
            PartyKind::Vendor => CodeSeries::Vendor,
        }
    }
}

impl fmt::Display for PartyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PartyKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "customer" | "customers" => Ok(PartyKind::Customer),
            "vendor" | "vendors" => Ok(PartyKind::Vendor),
            _ => Err(ValidationError::NotAllowed {
                field: "party kind".to_string(),
                allowed: vec!["customer".to_string(), "vendor".to_string()],
            }),
        }
    }
}

/// A customer or vendor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Party {
    pub id: String,
    pub tenant_id: String,
    pub kind: PartyKind,
    /// Business code, unique per (tenant, kind).
    pub code: String,
    pub name: String,
    pub phone: String,
    pub address_line1: Option<String>,
    pub address_line2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<String>,
    #[ts(as = "Option<String>")]
    pub birthday: Option<NaiveDate>,
    #[ts(as = "Option<String>")]
    pub anniversary: Option<NaiveDate>,
    pub gst_number: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// Editable party fields, used for both create and update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PartyInput {
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub address_line1: Option<String>,
    #[serde(default)]
    pub address_line2: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub pincode: Option<String>,
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub birthday: Option<NaiveDate>,
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub anniversary: Option<NaiveDate>,
    #[serde(default)]
    pub gst_number: Option<String>,
}

// =============================================================================
// Product
// =============================================================================

/// Dietary marking printed next to each item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum FoodType {
    #[default]
    Veg,
    NonVeg,
    Egg,
}

/// A product on the menu. Managed outside the billing flows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    pub id: String,
    pub tenant_id: String,
    pub code: String,
    pub description: String,
    /// Menu group ("Cakes", "Breads", "Savouries", ...).
    pub category: String,
    /// HSN classification code printed on the GST invoice.
    pub hsn_code: String,
    /// Rate in paise.
    pub rate_paise: i64,
    pub stock_quantity: i64,
    /// Total GST rate in basis points.
    pub tax_rate_bps: u32,
    pub food_type: FoodType,
    pub is_active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    #[inline]
    pub fn rate(&self) -> Money {
        Money::from_paise(self.rate_paise)
    }

    #[inline]
    pub fn tax_rate(&self) -> TaxRate {
        TaxRate::from_bps(self.tax_rate_bps)
    }
}

// =============================================================================
// Documents (Bill / Order / Special Order)
// =============================================================================

/// The three document types sharing header/detail storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    /// Counter sale.
    Bill,
    /// Franchise/bulk order.
    Order,
    /// Custom cake and celebration orders with delivery date and advance.
    SpecialOrder,
}

impl DocumentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::Bill => "bill",
            DocumentKind::Order => "order",
            DocumentKind::SpecialOrder => "special_order",
        }
    }

    pub fn series(&self) -> CodeSeries {
        match self {
            DocumentKind::Bill => CodeSeries::Bill,
            DocumentKind::Order => CodeSeries::Order,
            DocumentKind::SpecialOrder => CodeSeries::SpecialOrder,
        }
    }

    /// Title printed at the top of the invoice.
    pub fn title(&self) -> &'static str {
        match self {
            DocumentKind::Bill => "Tax Invoice",
            DocumentKind::Order => "Order Invoice",
            DocumentKind::SpecialOrder => "Special Order",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "bill" | "bills" => Ok(DocumentKind::Bill),
            "order" | "orders" => Ok(DocumentKind::Order),
            "special_order" | "special_orders" => Ok(DocumentKind::SpecialOrder),
            _ => Err(ValidationError::NotAllowed {
                field: "document kind".to_string(),
                allowed: vec![
                    "bill".to_string(),
                    "order".to_string(),
                    "special_order".to_string(),
                ],
            }),
        }
    }
}

/// Document header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Document {
    pub id: String,
    pub tenant_id: String,
    pub kind: DocumentKind,
    pub number: String,
    #[ts(as = "String")]
    pub document_date: NaiveDate,
    pub customer_code: Option<String>,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub agent_code: Option<String>,
    pub tax_mode: TaxMode,
    /// Sum of line taxable values.
    pub subtotal_paise: i64,
    pub cgst_paise: i64,
    pub sgst_paise: i64,
    pub discount_paise: i64,
    pub round_off_paise: i64,
    pub total_paise: i64,
    pub advance_paise: i64,
    #[ts(as = "Option<String>")]
    pub delivery_date: Option<NaiveDate>,
    pub remarks: Option<String>,
    pub is_synced: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Document {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_paise(self.total_paise)
    }

    /// Amount still to collect (special orders take an advance).
    #[inline]
    pub fn balance_due(&self) -> Money {
        Money::from_paise(self.total_paise - self.advance_paise)
    }
}

/// Document detail line with its frozen tax breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct DocumentLine {
    pub id: String,
    pub document_id: String,
    pub line_no: i64,
    pub product_code: String,
    pub description: String,
    pub hsn_code: String,
    pub quantity: i64,
    pub rate_paise: i64,
    pub taxable_paise: i64,
    pub cgst_rate_bps: u32,
    pub sgst_rate_bps: u32,
    pub cgst_paise: i64,
    pub sgst_paise: i64,
    pub line_total_paise: i64,
}

/// A stored document with its lines in line order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DocumentWithLines {
    pub document: Document,
    pub lines: Vec<DocumentLine>,
}

/// A line as entered at the counter, before tax is worked out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LineInput {
    pub product_code: String,
    pub description: String,
    pub hsn_code: String,
    pub quantity: i64,
    pub rate: Money,
    /// Total GST rate; split evenly into CGST and SGST.
    pub tax_rate: TaxRate,
}

/// Customer details captured on a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CustomerRef {
    #[serde(default)]
    pub code: Option<String>,
    pub name: String,
    pub phone: String,
}

/// Everything needed to create a bill, order or special order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct NewDocument {
    #[ts(as = "String")]
    pub document_date: NaiveDate,
    #[serde(default)]
    pub customer: Option<CustomerRef>,
    #[serde(default)]
    pub agent_code: Option<String>,
    #[serde(default)]
    pub tax_mode: TaxMode,
    pub lines: Vec<LineInput>,
    #[serde(default)]
    pub discount: Money,
    #[serde(default)]
    pub advance: Money,
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub delivery_date: Option<NaiveDate>,
    #[serde(default)]
    pub remarks: Option<String>,
}

// =============================================================================
// Draft
// =============================================================================

/// A parked, incomplete bill. At most one per (tenant, customer phone).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Draft {
    pub id: String,
    pub tenant_id: String,
    pub customer_phone: String,
    pub customer_name: Option<String>,
    /// Serialized [`crate::cart::CartState`].
    pub payload: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Agent
// =============================================================================

/// A sales agent credited on orders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Agent {
    pub id: String,
    pub tenant_id: String,
    pub code: String,
    pub name: String,
    pub phone: Option<String>,
    pub commission_bps: u32,
    pub is_active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct AgentInput {
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub commission_bps: u32,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tax_rate_from_percentage() {
        let rate = TaxRate::from_percentage(2.5).unwrap();
        assert_eq!(rate.bps(), 250);
        assert!((rate.percentage() - 2.5).abs() < 0.001);
        assert_eq!(TaxRate::from_percentage(100.0).unwrap().bps(), 10_000);
        assert_eq!(TaxRate::from_percentage(0.0).unwrap().bps(), 0);
    }

    #[test]
    fn test_tax_rate_from_percentage_rejects_out_of_range() {
        for pct in [-5.0, 100.5, f64::NAN, f64::INFINITY, f64::NEG_INFINITY, 1e12] {
            assert!(
                matches!(TaxRate::from_percentage(pct), Err(ValidationError::OutOfRange { .. })),
                "{} accepted",
                pct
            );
        }
    }

    #[test]
    fn test_split_gst() {
        let (cgst, sgst) = TaxRate::from_bps(500).split_gst();
        assert_eq!((cgst.bps(), sgst.bps()), (250, 250));

        let (cgst, sgst) = TaxRate::from_bps(5).split_gst();
        assert_eq!((cgst.bps(), sgst.bps()), (3, 2));
    }

    #[test]
    fn test_document_kind_parsing() {
        assert_eq!("bill".parse::<DocumentKind>().unwrap(), DocumentKind::Bill);
        assert_eq!(
            "special-order".parse::<DocumentKind>().unwrap(),
            DocumentKind::SpecialOrder
        );
        assert_eq!("Orders".parse::<DocumentKind>().unwrap(), DocumentKind::Order);
        assert!("receipt".parse::<DocumentKind>().is_err());
    }

    #[test]
    fn test_party_kind_series() {
        assert_eq!(PartyKind::Customer.series(), CodeSeries::Customer);
        assert_eq!("vendors".parse::<PartyKind>().unwrap(), PartyKind::Vendor);
    }

    #[test]
    fn test_tax_mode_default_is_inclusive() {
        assert_eq!(TaxMode::default(), TaxMode::Inclusive);
        assert_eq!("EXCLUSIVE".parse::<TaxMode>().unwrap(), TaxMode::Exclusive);
    }

    #[test]
    fn test_new_document_defaults_from_json() {
        let json = r#"{
            "documentDate": "2024-03-01",
            "lines": []
        }"#;
        let doc: NewDocument = serde_json::from_str(json).unwrap();
        assert_eq!(doc.tax_mode, TaxMode::Inclusive);
        assert!(doc.discount.is_zero());
        assert!(doc.customer.is_none());
    }
}
