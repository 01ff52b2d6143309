//! # Validation Module
//!
//! Input validation for everything the billing screens send.
//!
//! ## Validation Layers
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Layer 1: Browser                                                       │
//! │  └── Basic format checks, immediate feedback                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: billing-api handler                                           │
//! │  ├── Deserialization (types, required fields)                          │
//! │  └── THIS MODULE: business rules (phone, GSTIN, quantities, ...)       │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: SQLite                                                        │
//! │  └── NOT NULL, UNIQUE (tenant, kind, code), foreign keys               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use bakeline_core::validation::{validate_phone, validate_quantity};
//!
//! validate_phone("9876543210").unwrap();
//! validate_quantity(5).unwrap();
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{AgentInput, PartyInput};
use crate::{MAX_ITEM_QUANTITY, MAX_RATE_PAISE};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

const MAX_NAME_LEN: usize = 200;
const MAX_CODE_LEN: usize = 30;
const MAX_ADDRESS_LEN: usize = 200;
const MAX_PREFIX_LEN: usize = 10;
const MAX_CODE_WIDTH: u32 = 12;

// =============================================================================
// Identity & Contact
// =============================================================================

/// Validates a 10-digit Indian mobile number.
///
/// ```rust
/// use bakeline_core::validation::validate_phone;
///
/// assert!(validate_phone("9876543210").is_ok());
/// assert!(validate_phone("98765").is_err());
/// assert!(validate_phone("98765-43210").is_err());
/// ```
pub fn validate_phone(phone: &str) -> ValidationResult<()> {
    let phone = phone.trim();

    if phone.is_empty() {
        return Err(ValidationError::Required {
            field: "phone".to_string(),
        });
    }

    if phone.len() != 10 || !phone.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ValidationError::invalid_format(
            "phone",
            "must be exactly 10 digits",
        ));
    }

    Ok(())
}

/// Validates a 6-digit postal code.
pub fn validate_pincode(pincode: &str) -> ValidationResult<()> {
    let pincode = pincode.trim();
    let valid = pincode.len() == 6
        && pincode.bytes().all(|b| b.is_ascii_digit())
        && !pincode.starts_with('0');

    if !valid {
        return Err(ValidationError::invalid_format(
            "pincode",
            "must be 6 digits not starting with 0",
        ));
    }

    Ok(())
}

/// Validates the shape of a GSTIN.
///
/// ## Layout
/// ```text
///   27  AAPFU0939F  1   Z   V
///   ──  ──────────  ─   ─   ─
///   │   │           │   │   └── check character
///   │   │           │   └────── always 'Z'
///   │   │           └────────── entity number (1-9, A-Z)
///   │   └────────────────────── PAN: 5 letters, 4 digits, 1 letter
///   └────────────────────────── state code
/// ```
///
/// The check character is not verified.
pub fn validate_gstin(gstin: &str) -> ValidationResult<()> {
    let gstin = gstin.trim();
    let bytes = gstin.as_bytes();

    if bytes.len() != 15 {
        return Err(ValidationError::invalid_format(
            "gst_number",
            "must be 15 characters",
        ));
    }

    let state_ok = bytes[0..2].iter().all(u8::is_ascii_digit) && &bytes[0..2] != b"00";
    let pan_ok = bytes[2..7].iter().all(u8::is_ascii_uppercase)
        && bytes[7..11].iter().all(u8::is_ascii_digit)
        && bytes[11].is_ascii_uppercase();
    let entity_ok = bytes[12].is_ascii_uppercase() || (b'1'..=b'9').contains(&bytes[12]);
    let tail_ok = bytes[13] == b'Z'
        && (bytes[14].is_ascii_uppercase() || bytes[14].is_ascii_digit());

    if !(state_ok && pan_ok && entity_ok && tail_ok) {
        return Err(ValidationError::invalid_format(
            "gst_number",
            "must be state code, PAN, entity number, 'Z' and check character",
        ));
    }

    Ok(())
}

/// Validates a person or business name.
pub fn validate_name(field: &str, name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if name.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LEN,
        });
    }

    Ok(())
}

/// Validates a business code (product code, customer code, document number).
///
/// ## Rules
/// - Not empty, at most 30 characters
/// - Letters, digits, hyphens and underscores only
pub fn validate_code(field: &str, code: &str) -> ValidationResult<()> {
    let code = code.trim();

    if code.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if code.len() > MAX_CODE_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_CODE_LEN,
        });
    }

    if !code
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::invalid_format(
            field,
            "must contain only letters, numbers, hyphens, and underscores",
        ));
    }

    Ok(())
}

/// Validates a search query, returning it trimmed.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.len() > 100 {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: 100,
        });
    }

    Ok(query.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a line quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed [`MAX_ITEM_QUANTITY`]
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a unit rate. Zero is allowed (complimentary items).
pub fn validate_rate(rate: Money) -> ValidationResult<()> {
    if rate.is_negative() || rate.paise() > MAX_RATE_PAISE {
        return Err(ValidationError::OutOfRange {
            field: "rate".to_string(),
            min: 0,
            max: MAX_RATE_PAISE,
        });
    }

    Ok(())
}

/// Validates a tax rate in basis points (0% to 100%).
pub fn validate_tax_rate_bps(bps: u32) -> ValidationResult<()> {
    if bps > 10_000 {
        return Err(ValidationError::OutOfRange {
            field: "tax_rate".to_string(),
            min: 0,
            max: 10_000,
        });
    }

    Ok(())
}

// =============================================================================
// Code Series Settings
// =============================================================================

/// Validates a code-series prefix: 1-10 uppercase letters or digits.
pub fn validate_prefix(prefix: &str) -> ValidationResult<()> {
    if prefix.is_empty() {
        return Err(ValidationError::Required {
            field: "prefix".to_string(),
        });
    }

    if prefix.len() > MAX_PREFIX_LEN {
        return Err(ValidationError::TooLong {
            field: "prefix".to_string(),
            max: MAX_PREFIX_LEN,
        });
    }

    if !prefix
        .chars()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
    {
        return Err(ValidationError::invalid_format(
            "prefix",
            "must contain only uppercase letters and digits",
        ));
    }

    Ok(())
}

/// Validates the zero-pad width of a code series.
pub fn validate_width(width: u32) -> ValidationResult<()> {
    if width == 0 || width > MAX_CODE_WIDTH {
        return Err(ValidationError::OutOfRange {
            field: "width".to_string(),
            min: 1,
            max: MAX_CODE_WIDTH as i64,
        });
    }

    Ok(())
}

// =============================================================================
// Composite Validators
// =============================================================================

fn validate_optional_len(field: &str, value: &Option<String>, max: usize) -> ValidationResult<()> {
    match value {
        Some(v) if v.chars().count() > max => Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        }),
        _ => Ok(()),
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Validates a customer/vendor form.
pub fn validate_party_input(input: &PartyInput) -> ValidationResult<()> {
    validate_name("name", &input.name)?;
    validate_phone(&input.phone)?;
    validate_optional_len("address_line1", &input.address_line1, MAX_ADDRESS_LEN)?;
    validate_optional_len("address_line2", &input.address_line2, MAX_ADDRESS_LEN)?;
    validate_optional_len("city", &input.city, MAX_NAME_LEN)?;
    validate_optional_len("state", &input.state, MAX_NAME_LEN)?;

    if let Some(pincode) = present(&input.pincode) {
        validate_pincode(pincode)?;
    }
    if let Some(gstin) = present(&input.gst_number) {
        validate_gstin(gstin)?;
    }

    Ok(())
}

/// Validates an agent form.
pub fn validate_agent_input(input: &AgentInput) -> ValidationResult<()> {
    validate_name("name", &input.name)?;
    if let Some(phone) = present(&input.phone) {
        validate_phone(phone)?;
    }
    validate_tax_rate_bps(input.commission_bps).map_err(|_| ValidationError::OutOfRange {
        field: "commission".to_string(),
        min: 0,
        max: 10_000,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_phone() {
        assert!(validate_phone("9876543210").is_ok());
        assert!(validate_phone(" 9876543210 ").is_ok());

        assert!(matches!(
            validate_phone(""),
            Err(ValidationError::Required { .. })
        ));
        assert!(validate_phone("987654321").is_err());
        assert!(validate_phone("98765432100").is_err());
        assert!(validate_phone("98765O3210").is_err());
    }

    #[test]
    fn test_validate_pincode() {
        assert!(validate_pincode("560001").is_ok());
        assert!(validate_pincode("056001").is_err());
        assert!(validate_pincode("5600").is_err());
        assert!(validate_pincode("56000A").is_err());
    }

    #[test]
    fn test_validate_gstin() {
        assert!(validate_gstin("27AAPFU0939F1ZV").is_ok());
        assert!(validate_gstin("29ABCDE1234F2Z5").is_ok());

        assert!(validate_gstin("27AAPFU0939F1Z").is_err());
        assert!(validate_gstin("00AAPFU0939F1ZV").is_err());
        assert!(validate_gstin("27AAPF10939F1ZV").is_err());
        assert!(validate_gstin("27AAPFU0939F1XV").is_err());
        assert!(validate_gstin("27aapfu0939f1zv").is_err());
        assert!(validate_gstin("27AAPFU0939F0ZV").is_err());
    }

    #[test]
    fn test_validate_code() {
        assert!(validate_code("code", "CUS0001").is_ok());
        assert!(validate_code("code", "PLUM-CAKE_1KG").is_ok());
        assert!(validate_code("code", "").is_err());
        assert!(validate_code("code", "has space").is_err());
        assert!(validate_code("code", &"A".repeat(31)).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(MAX_ITEM_QUANTITY).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-2).is_err());
        assert!(validate_quantity(MAX_ITEM_QUANTITY + 1).is_err());
    }

    #[test]
    fn test_validate_rate_and_tax() {
        assert!(validate_rate(Money::zero()).is_ok());
        assert!(validate_rate(Money::from_paise(-1)).is_err());
        assert!(validate_rate(Money::from_paise(MAX_RATE_PAISE)).is_ok());
        assert!(validate_rate(Money::from_paise(MAX_RATE_PAISE + 1)).is_err());
        assert!(validate_rate(Money::from_paise(i64::MAX / 2)).is_err());
        assert!(validate_tax_rate_bps(2_800).is_ok());
        assert!(validate_tax_rate_bps(10_001).is_err());
    }

    #[test]
    fn test_validate_prefix_and_width() {
        assert!(validate_prefix("INV").is_ok());
        assert!(validate_prefix("B2").is_ok());
        assert!(validate_prefix("").is_err());
        assert!(validate_prefix("inv").is_err());
        assert!(validate_prefix("INV-").is_err());
        assert!(validate_prefix("ABCDEFGHIJK").is_err());

        assert!(validate_width(4).is_ok());
        assert!(validate_width(0).is_err());
        assert!(validate_width(13).is_err());
    }

    #[test]
    fn test_validate_party_input() {
        let mut input = PartyInput {
            name: "Asha Bakers".to_string(),
            phone: "9876543210".to_string(),
            pincode: Some("".to_string()),
            ..Default::default()
        };
        assert!(validate_party_input(&input).is_ok());

        input.gst_number = Some("NOT-A-GSTIN".to_string());
        assert!(validate_party_input(&input).is_err());

        input.gst_number = None;
        input.name = "  ".to_string();
        assert!(validate_party_input(&input).is_err());
    }

    #[test]
    fn test_validate_agent_input() {
        let input = AgentInput {
            name: "Ravi".to_string(),
            phone: None,
            commission_bps: 250,
        };
        assert!(validate_agent_input(&input).is_ok());

        let input = AgentInput {
            commission_bps: 20_000,
            ..input
        };
        assert!(validate_agent_input(&input).is_err());
    }
}
