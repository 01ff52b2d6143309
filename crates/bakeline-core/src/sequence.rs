//! # Code Sequences
//!
//! Customer codes, vendor codes, agent codes and document numbers all share
//! one shape: `{prefix}{zero-padded number}`.
//!
//! ## Next-Code Algorithm
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  existing: CUS0007, CUS0012, CUS00X9, OLD-3, CUS0010                    │
//! │                │                                                        │
//! │                ▼  parse_suffix("CUS")                                   │
//! │           7, 12, ─, ─, 10       (non-numeric or foreign codes skipped)  │
//! │                │                                                        │
//! │                ▼  max + 1                                               │
//! │               13                                                        │
//! │                │                                                        │
//! │                ▼  zero-pad to width 4                                   │
//! │            CUS0013                                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! This module only does the arithmetic. Fetching existing codes, and doing
//! so inside a write transaction, is bakeline-db's job.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;

/// A numbered series of business codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum CodeSeries {
    Customer,
    Vendor,
    Agent,
    Bill,
    Order,
    SpecialOrder,
}

impl CodeSeries {
    pub const ALL: [CodeSeries; 6] = [
        CodeSeries::Customer,
        CodeSeries::Vendor,
        CodeSeries::Agent,
        CodeSeries::Bill,
        CodeSeries::Order,
        CodeSeries::SpecialOrder,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CodeSeries::Customer => "customer",
            CodeSeries::Vendor => "vendor",
            CodeSeries::Agent => "agent",
            CodeSeries::Bill => "bill",
            CodeSeries::Order => "order",
            CodeSeries::SpecialOrder => "special_order",
        }
    }

    /// Prefix persisted the first time a tenant uses the series.
    pub fn default_prefix(&self) -> &'static str {
        match self {
            CodeSeries::Customer => "CUS",
            CodeSeries::Vendor => "VEN",
            CodeSeries::Agent => "AGT",
            CodeSeries::Bill => "INV",
            CodeSeries::Order => "ORD",
            CodeSeries::SpecialOrder => "SPO",
        }
    }

    /// Default zero-pad width of the numeric part.
    pub fn default_width(&self) -> u32 {
        match self {
            CodeSeries::Customer | CodeSeries::Vendor | CodeSeries::Agent => 4,
            CodeSeries::Bill | CodeSeries::Order | CodeSeries::SpecialOrder => 6,
        }
    }

    pub fn default_setting(&self) -> SeriesFormat {
        SeriesFormat {
            prefix: self.default_prefix().to_string(),
            width: self.default_width(),
        }
    }
}

impl fmt::Display for CodeSeries {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CodeSeries {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        CodeSeries::ALL
            .into_iter()
            .find(|series| series.as_str() == normalized)
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "series".to_string(),
                allowed: CodeSeries::ALL
                    .iter()
                    .map(|s| s.as_str().to_string())
                    .collect(),
            })
    }
}

/// Prefix and pad width of a series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SeriesFormat {
    pub prefix: String,
    pub width: u32,
}

impl SeriesFormat {
    pub fn new(prefix: impl Into<String>, width: u32) -> Self {
        SeriesFormat {
            prefix: prefix.into(),
            width,
        }
    }

    /// Renders `number` in this series.
    pub fn format(&self, number: u64) -> String {
        format_code(&self.prefix, number, self.width)
    }

    /// Computes the code following every code in `existing`.
    pub fn next<'a, I>(&self, existing: I) -> String
    where
        I: IntoIterator<Item = &'a str>,
    {
        next_code(&self.prefix, self.width, existing)
    }
}

/// Extracts the numeric suffix of `code` if it belongs to `prefix`.
///
/// Returns `None` when the code has a different prefix, nothing after the
/// prefix, or anything other than ASCII digits after it.
pub fn parse_suffix(code: &str, prefix: &str) -> Option<u64> {
    let rest = code.strip_prefix(prefix)?;
    if rest.is_empty() || !rest.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    rest.parse().ok()
}

/// Formats `{prefix}{number}` with the number zero-padded to `width`.
///
/// Numbers wider than `width` are written in full.
pub fn format_code(prefix: &str, number: u64, width: u32) -> String {
    format!("{}{:0width$}", prefix, number, width = width as usize)
}

/// Highest suffix among `existing` codes of the series, 0 when none.
pub fn max_suffix<'a, I>(prefix: &str, existing: I) -> u64
where
    I: IntoIterator<Item = &'a str>,
{
    existing
        .into_iter()
        .filter_map(|code| parse_suffix(code, prefix))
        .max()
        .unwrap_or(0)
}

/// Returns the code after the highest existing one.
///
/// ```rust
/// use bakeline_core::sequence::next_code;
///
/// let existing = ["INV000041", "INV000007"];
/// assert_eq!(next_code("INV", 6, existing), "INV000042");
/// assert_eq!(next_code("INV", 6, []), "INV000001");
/// ```
pub fn next_code<'a, I>(prefix: &str, width: u32, existing: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    format_code(prefix, max_suffix(prefix, existing) + 1, width)
}
