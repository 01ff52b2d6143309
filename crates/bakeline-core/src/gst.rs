//! # GST Computation and HSN Aggregation
//!
//! Turns counter lines into taxed lines, taxed lines into document totals,
//! and groups taxed lines into the HSN summary printed under a GST invoice.
//!
//! ## Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  LineInput (code, hsn, qty, rate, 5%)                                   │
//! │       │                                                                 │
//! │       ▼  price_line(mode)                                               │
//! │  TaxedLine (taxable, cgst 2.5%, sgst 2.5%, amounts)                     │
//! │       │                                                                 │
//! │       ├──► DocumentTotals::compute   subtotal, taxes, round off, total │
//! │       │                                                                 │
//! │       └──► summarize_by_hsn          one row per (hsn, cgst, sgst)     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Tax amounts are worked out per line and only ever summed afterwards, so
//! the HSN summary, the document totals and the printed lines always agree
//! to the paisa.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{DocumentLine, LineInput, TaxMode, TaxRate};

// =============================================================================
// Taxed Line
// =============================================================================

/// A line with its GST breakdown worked out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TaxedLine {
    pub product_code: String,
    pub description: String,
    pub hsn_code: String,
    pub quantity: i64,
    pub rate: Money,
    pub taxable_value: Money,
    pub cgst_rate: TaxRate,
    pub sgst_rate: TaxRate,
    pub cgst_amount: Money,
    pub sgst_amount: Money,
    pub line_total: Money,
}

impl TaxedLine {
    #[inline]
    pub fn total_tax(&self) -> Money {
        self.cgst_amount + self.sgst_amount
    }
}

impl From<&DocumentLine> for TaxedLine {
    fn from(line: &DocumentLine) -> Self {
        TaxedLine {
            product_code: line.product_code.clone(),
            description: line.description.clone(),
            hsn_code: line.hsn_code.clone(),
            quantity: line.quantity,
            rate: Money::from_paise(line.rate_paise),
            taxable_value: Money::from_paise(line.taxable_paise),
            cgst_rate: TaxRate::from_bps(line.cgst_rate_bps),
            sgst_rate: TaxRate::from_bps(line.sgst_rate_bps),
            cgst_amount: Money::from_paise(line.cgst_paise),
            sgst_amount: Money::from_paise(line.sgst_paise),
            line_total: Money::from_paise(line.line_total_paise),
        }
    }
}

/// Works out the GST breakdown of one line.
///
/// ## Exclusive
/// `taxable = rate × qty`, each half of GST computed on it, added on top.
///
/// ## Inclusive
/// `gross = rate × qty` is what the customer pays. The taxable part is
/// backed out of the gross, CGST is computed on it and SGST takes the
/// remainder, so `taxable + cgst + sgst == gross` exactly.
///
/// Fails with [`CoreError::AmountOverflow`] when the amounts leave i64.
pub fn price_line(input: &LineInput, mode: TaxMode) -> CoreResult<TaxedLine> {
    let overflow = || CoreError::AmountOverflow(format!("line {}", input.product_code));
    let (cgst_rate, sgst_rate) = input.tax_rate.split_gst();
    let gross = input
        .rate
        .checked_multiply_quantity(input.quantity)
        .ok_or_else(overflow)?;

    let (taxable_value, cgst_amount, sgst_amount) = match mode {
        TaxMode::Exclusive => (
            gross,
            gross.calculate_tax(cgst_rate),
            gross.calculate_tax(sgst_rate),
        ),
        TaxMode::Inclusive => {
            let taxable = gross.taxable_from_inclusive(input.tax_rate);
            let cgst = taxable.calculate_tax(cgst_rate);
            (taxable, cgst, gross - taxable - cgst)
        }
    };

    let line_total = taxable_value
        .checked_add(cgst_amount)
        .and_then(|m| m.checked_add(sgst_amount))
        .ok_or_else(overflow)?;

    Ok(TaxedLine {
        product_code: input.product_code.clone(),
        description: input.description.clone(),
        hsn_code: input.hsn_code.clone(),
        quantity: input.quantity,
        rate: input.rate,
        taxable_value,
        cgst_rate,
        sgst_rate,
        cgst_amount,
        sgst_amount,
        line_total,
    })
}

/// Prices every line of a document.
pub fn price_lines(inputs: &[LineInput], mode: TaxMode) -> CoreResult<Vec<TaxedLine>> {
    inputs.iter().map(|line| price_line(line, mode)).collect()
}

/// Sums amounts, failing instead of wrapping.
fn checked_total<I>(amounts: I, field: &str) -> CoreResult<Money>
where
    I: IntoIterator<Item = Money>,
{
    amounts
        .into_iter()
        .try_fold(Money::zero(), |acc, m| acc.checked_add(m))
        .ok_or_else(|| CoreError::AmountOverflow(field.to_string()))
}

// =============================================================================
// Document Totals
// =============================================================================

/// Header totals of a bill, order or special order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DocumentTotals {
    pub subtotal: Money,
    pub cgst: Money,
    pub sgst: Money,
    pub discount: Money,
    /// Difference between the exact amount and the whole-rupee total.
    pub round_off: Money,
    pub total: Money,
    pub advance: Money,
    pub balance_due: Money,
}

impl DocumentTotals {
    /// Totals `lines`, applies a flat discount and rounds to the rupee.
    ///
    /// ## Errors
    /// - discount larger than the gross amount
    /// - advance larger than the rounded total
    /// - sums that overflow
    pub fn compute(lines: &[TaxedLine], discount: Money, advance: Money) -> CoreResult<Self> {
        let subtotal = checked_total(lines.iter().map(|l| l.taxable_value), "subtotal")?;
        let cgst = checked_total(lines.iter().map(|l| l.cgst_amount), "cgst")?;
        let sgst = checked_total(lines.iter().map(|l| l.sgst_amount), "sgst")?;
        let gross = checked_total([subtotal, cgst, sgst], "gross amount")?;

        if discount.is_negative() || advance.is_negative() {
            let field = if discount.is_negative() { "discount" } else { "advance" };
            return Err(ValidationError::MustBePositive {
                field: field.to_string(),
            }
            .into());
        }

        if discount > gross {
            return Err(CoreError::AmountExceeds {
                field: "discount".to_string(),
                amount: discount.paise(),
                limit_field: "gross amount".to_string(),
                limit: gross.paise(),
            });
        }

        let exact = gross - discount;
        let total = exact.round_to_rupee();

        if advance > total {
            return Err(CoreError::AmountExceeds {
                field: "advance".to_string(),
                amount: advance.paise(),
                limit_field: "total".to_string(),
                limit: total.paise(),
            });
        }

        Ok(DocumentTotals {
            subtotal,
            cgst,
            sgst,
            discount,
            round_off: total - exact,
            total,
            advance,
            balance_due: total - advance,
        })
    }

    #[inline]
    pub fn total_tax(&self) -> Money {
        self.cgst + self.sgst
    }
}

// =============================================================================
// HSN Summary
// =============================================================================

/// One row of the HSN-wise tax summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct HsnSummaryRow {
    pub hsn_code: String,
    pub cgst_rate: TaxRate,
    pub sgst_rate: TaxRate,
    pub quantity: i64,
    pub taxable_value: Money,
    pub cgst_amount: Money,
    pub sgst_amount: Money,
    pub total_tax: Money,
}

/// Groups lines by (HSN code, CGST rate, SGST rate).
///
/// Rows come out in the order each group first appears on the invoice.
///
/// ```rust
/// use bakeline_core::gst::{price_lines, summarize_by_hsn};
/// use bakeline_core::money::Money;
/// use bakeline_core::types::{LineInput, TaxMode, TaxRate};
///
/// let line = |code: &str, hsn: &str, qty| LineInput {
///     product_code: code.into(),
///     description: code.into(),
///     hsn_code: hsn.into(),
///     quantity: qty,
///     rate: Money::from_rupees(100),
///     tax_rate: TaxRate::from_bps(500),
/// };
/// let taxed = price_lines(&[line("A", "1905", 1), line("B", "1905", 2)], TaxMode::Exclusive)
///     .unwrap();
/// let summary = summarize_by_hsn(&taxed);
/// assert_eq!(summary.len(), 1);
/// assert_eq!(summary[0].quantity, 3);
/// assert_eq!(summary[0].taxable_value, Money::from_rupees(300));
/// ```
pub fn summarize_by_hsn<'a, I>(lines: I) -> Vec<HsnSummaryRow>
where
    I: IntoIterator<Item = &'a TaxedLine>,
{
    let mut rows: Vec<HsnSummaryRow> = Vec::new();

    for line in lines {
        let existing = rows.iter_mut().find(|row| {
            row.hsn_code == line.hsn_code
                && row.cgst_rate == line.cgst_rate
                && row.sgst_rate == line.sgst_rate
        });

        match existing {
            Some(row) => {
                row.quantity += line.quantity;
                row.taxable_value += line.taxable_value;
                row.cgst_amount += line.cgst_amount;
                row.sgst_amount += line.sgst_amount;
                row.total_tax += line.total_tax();
            }
            None => rows.push(HsnSummaryRow {
                hsn_code: line.hsn_code.clone(),
                cgst_rate: line.cgst_rate,
                sgst_rate: line.sgst_rate,
                quantity: line.quantity,
                taxable_value: line.taxable_value,
                cgst_amount: line.cgst_amount,
                sgst_amount: line.sgst_amount,
                total_tax: line.total_tax(),
            }),
        }
    }

    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(code: &str, hsn: &str, qty: i64, rate_paise: i64, bps: u32) -> LineInput {
        LineInput {
            product_code: code.to_string(),
            description: format!("Item {}", code),
            hsn_code: hsn.to_string(),
            quantity: qty,
            rate: Money::from_paise(rate_paise),
            tax_rate: TaxRate::from_bps(bps),
        }
    }

    #[test]
    fn test_price_line_exclusive() {
        let line = price_line(&input("PLUM", "1905", 2, 25_000, 1_800), TaxMode::Exclusive).unwrap();

        assert_eq!(line.taxable_value.paise(), 50_000);
        assert_eq!(line.cgst_rate.bps(), 900);
        assert_eq!(line.cgst_amount.paise(), 4_500);
        assert_eq!(line.sgst_amount.paise(), 4_500);
        assert_eq!(line.line_total.paise(), 59_000);
    }

    #[test]
    fn test_price_line_inclusive_keeps_gross() {
        // ₹45.50 × 3 = ₹136.50 including 5% GST
        let line = price_line(&input("BUN", "1905", 3, 4_550, 500), TaxMode::Inclusive).unwrap();

        assert_eq!(line.taxable_value.paise(), 13_000);
        assert_eq!(line.cgst_amount.paise(), 325);
        assert_eq!(line.sgst_amount.paise(), 325);
        assert_eq!(line.line_total.paise(), 13_650);
    }

    #[test]
    fn test_price_line_inclusive_odd_paise_goes_to_sgst() {
        // ₹10.00 incl 5%: taxable 952.38 → 952, cgst 23.8 → 24, sgst = 1000-952-24 = 24
        let line = price_line(&input("TEA", "0902", 1, 1_000, 500), TaxMode::Inclusive).unwrap();
        assert_eq!(line.taxable_value.paise(), 952);
        assert_eq!(line.cgst_amount.paise(), 24);
        assert_eq!(line.sgst_amount.paise(), 24);
        assert_eq!(line.line_total.paise(), 1_000);
    }

    #[test]
    fn test_zero_rated_line() {
        let line = price_line(&input("BREAD", "1905", 2, 4_000, 0), TaxMode::Inclusive).unwrap();
        assert_eq!(line.taxable_value.paise(), 8_000);
        assert!(line.total_tax().is_zero());
    }

    #[test]
    fn test_summary_groups_by_hsn_and_rates() {
        let lines = price_lines(
            &[
                input("A", "1905", 1, 10_000, 500),
                input("B", "2105", 2, 5_000, 1_800),
                input("C", "1905", 3, 10_000, 500),
                input("D", "1905", 1, 10_000, 1_800),
            ],
            TaxMode::Exclusive,
        )
        .unwrap();

        let summary = summarize_by_hsn(&lines);

        assert_eq!(summary.len(), 3);
        assert_eq!(summary[0].hsn_code, "1905");
        assert_eq!(summary[0].cgst_rate.bps(), 250);
        assert_eq!(summary[0].quantity, 4);
        assert_eq!(summary[0].taxable_value.paise(), 40_000);
        assert_eq!(summary[0].cgst_amount.paise(), 1_000);
        assert_eq!(summary[0].total_tax.paise(), 2_000);

        assert_eq!(summary[1].hsn_code, "2105");
        assert_eq!(summary[2].hsn_code, "1905");
        assert_eq!(summary[2].cgst_rate.bps(), 900);
    }

    #[test]
    fn test_summary_preserves_line_sums() {
        let inputs: Vec<LineInput> = (0..40)
            .map(|i| {
                input(
                    &format!("P{}", i),
                    ["1905", "2105", "0902", "1704"][i % 4],
                    (i as i64 % 7) + 1,
                    1_037 * (i as i64 + 1),
                    [0, 500, 1_200, 1_800, 2_800][i % 5],
                )
            })
            .collect();

        for mode in [TaxMode::Inclusive, TaxMode::Exclusive] {
            let lines = price_lines(&inputs, mode).unwrap();
            let summary = summarize_by_hsn(&lines);

            let line_taxable: Money = lines.iter().map(|l| l.taxable_value).sum();
            let group_taxable: Money = summary.iter().map(|r| r.taxable_value).sum();
            assert_eq!(line_taxable, group_taxable);

            let line_tax: Money = lines.iter().map(|l| l.total_tax()).sum();
            let group_tax: Money = summary.iter().map(|r| r.total_tax).sum();
            assert_eq!(line_tax, group_tax);

            let line_qty: i64 = lines.iter().map(|l| l.quantity).sum();
            let group_qty: i64 = summary.iter().map(|r| r.quantity).sum();
            assert_eq!(line_qty, group_qty);
        }
    }

    #[test]
    fn test_summary_of_empty_invoice() {
        assert!(summarize_by_hsn(&Vec::<TaxedLine>::new()).is_empty());
    }

    #[test]
    fn test_document_totals_round_off() {
        // 3 × ₹45.50 inclusive = ₹136.50 → ₹137.00
        let lines = price_lines(&[input("BUN", "1905", 3, 4_550, 500)], TaxMode::Inclusive).unwrap();
        let totals = DocumentTotals::compute(&lines, Money::zero(), Money::zero()).unwrap();

        assert_eq!(totals.subtotal.paise(), 13_000);
        assert_eq!(totals.total_tax().paise(), 650);
        assert_eq!(totals.round_off.paise(), 50);
        assert_eq!(totals.total.paise(), 13_700);
        assert_eq!(totals.balance_due, totals.total);
    }

    #[test]
    fn test_document_totals_with_discount_and_advance() {
        let lines = price_lines(&[input("CAKE", "1905", 1, 120_000, 1_800)], TaxMode::Inclusive).unwrap();
        let totals =
            DocumentTotals::compute(&lines, Money::from_rupees(100), Money::from_rupees(500))
                .unwrap();

        assert_eq!(totals.total.paise(), 110_000);
        assert!(totals.round_off.is_zero());
        assert_eq!(totals.balance_due.paise(), 60_000);
    }

    #[test]
    fn test_document_totals_rejects_oversized_amounts() {
        let lines = price_lines(&[input("BUN", "1905", 1, 1_000, 0)], TaxMode::Inclusive).unwrap();

        let err = DocumentTotals::compute(&lines, Money::from_rupees(11), Money::zero());
        assert!(matches!(err, Err(CoreError::AmountExceeds { .. })));

        let err = DocumentTotals::compute(&lines, Money::zero(), Money::from_rupees(11));
        assert!(matches!(err, Err(CoreError::AmountExceeds { .. })));

        let err = DocumentTotals::compute(&lines, Money::from_paise(-1), Money::zero());
        assert!(matches!(err, Err(CoreError::Validation(_))));
    }

    #[test]
    fn test_overflowing_line_is_an_error() {
        let err = price_line(&input("GOLD", "7108", 9_999, i64::MAX / 1_000, 0), TaxMode::Exclusive);
        assert!(matches!(err, Err(CoreError::AmountOverflow(_))));

        // Fits alone, but 100% tax on top does not
        let err = price_line(&input("GOLD", "7108", 1, i64::MAX - 10, 10_000), TaxMode::Exclusive);
        assert!(matches!(err, Err(CoreError::AmountOverflow(_))));
    }

    #[test]
    fn test_totals_overflow_is_an_error() {
        let big = input("GOLD", "7108", 1, i64::MAX / 2 + 1, 0);
        let lines = price_lines(&[big.clone(), big], TaxMode::Exclusive).unwrap();

        let err = DocumentTotals::compute(&lines, Money::zero(), Money::zero());
        assert!(matches!(err, Err(CoreError::AmountOverflow(_))));
    }
}
