//! # Amount in Words
//!
//! Spells out invoice totals the way Indian GST invoices print them:
//!
//! ```text
//!   ₹1,50,000.00 → "One Lakh Fifty Thousand Rupees Only"
//!   ₹1,234.50    → "One Thousand Two Hundred Thirty Four Rupees and Fifty Paise Only"
//! ```
//!
//! ## Indian Grouping
//! ```text
//! ┌──────────┬───────┬───────┬──────────┬─────────┬──────┐
//! │  crore   │ lakh  │ thou- │ hundred  │  tens   │ ones │
//! │  10^7    │ 10^5  │ sand  │  10^2    │         │      │
//! └──────────┴───────┴───────┴──────────┴─────────┴──────┘
//!  Crore counts of 100 and above are spelled with the same grouping:
//!  10^9 → "One Hundred Crore"
//! ```

use crate::money::Money;

const ONES: [&str; 20] = [
    "Zero", "One", "Two", "Three", "Four", "Five", "Six", "Seven", "Eight", "Nine", "Ten",
    "Eleven", "Twelve", "Thirteen", "Fourteen", "Fifteen", "Sixteen", "Seventeen", "Eighteen",
    "Nineteen",
];

const TENS: [&str; 10] = [
    "", "", "Twenty", "Thirty", "Forty", "Fifty", "Sixty", "Seventy", "Eighty", "Ninety",
];

const CRORE: u64 = 10_000_000;
const LAKH: u64 = 100_000;

/// Names of the currency units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrencyNames {
    pub major: &'static str,
    pub major_one: &'static str,
    pub minor: &'static str,
    pub minor_one: &'static str,
}

impl CurrencyNames {
    pub const RUPEE: CurrencyNames = CurrencyNames {
        major: "Rupees",
        major_one: "Rupee",
        minor: "Paise",
        minor_one: "Paisa",
    };
}

impl Default for CurrencyNames {
    fn default() -> Self {
        CurrencyNames::RUPEE
    }
}

/// Spells out an amount in rupees and paise.
///
/// ```rust
/// use bakeline_core::money::Money;
/// use bakeline_core::words::amount_in_words;
///
/// assert_eq!(amount_in_words(Money::zero()), "Zero Rupees Only");
/// assert_eq!(
///     amount_in_words(Money::from_rupees(150_000)),
///     "One Lakh Fifty Thousand Rupees Only"
/// );
/// ```
pub fn amount_in_words(amount: Money) -> String {
    amount_in_words_with(amount, CurrencyNames::RUPEE)
}

/// Same as [`amount_in_words`] with custom unit names.
pub fn amount_in_words_with(amount: Money, names: CurrencyNames) -> String {
    let paise_total = amount.paise().unsigned_abs();
    let major = paise_total / 100;
    let minor = paise_total % 100;

    let unit = |n: u64, one: &'static str, many: &'static str| if n == 1 { one } else { many };

    let body = match (major, minor) {
        (0, 0) => format!("{} {}", integer_words(0), names.major),
        (_, 0) => format!(
            "{} {}",
            integer_words(major),
            unit(major, names.major_one, names.major)
        ),
        (0, _) => format!(
            "{} {}",
            integer_words(minor),
            unit(minor, names.minor_one, names.minor)
        ),
        _ => format!(
            "{} {} and {} {}",
            integer_words(major),
            unit(major, names.major_one, names.major),
            integer_words(minor),
            unit(minor, names.minor_one, names.minor)
        ),
    };

    if amount.is_negative() {
        format!("Minus {} Only", body)
    } else {
        format!("{} Only", body)
    }
}

/// Spells out a whole number using Indian grouping.
///
/// ```rust
/// use bakeline_core::words::integer_words;
/// assert_eq!(integer_words(1_05_00_000), "One Crore Five Lakh");
/// ```
pub fn integer_words(n: u64) -> String {
    if n == 0 {
        return ONES[0].to_string();
    }

    let mut parts: Vec<String> = Vec::new();

    let crores = n / CRORE;
    if crores > 0 {
        parts.push(format!("{} Crore", integer_words(crores)));
    }

    let rest = n % CRORE;
    let lakhs = rest / LAKH;
    let thousands = (rest / 1_000) % 100;
    let hundreds = (rest / 100) % 10;
    let tail = rest % 100;

    if lakhs > 0 {
        parts.push(format!("{} Lakh", two_digit_words(lakhs)));
    }
    if thousands > 0 {
        parts.push(format!("{} Thousand", two_digit_words(thousands)));
    }
    if hundreds > 0 {
        parts.push(format!("{} Hundred", ONES[hundreds as usize]));
    }
    if tail > 0 {
        parts.push(two_digit_words(tail));
    }

    parts.join(" ")
}

/// Words for 1..=99.
fn two_digit_words(n: u64) -> String {
    let n = n as usize;
    if n < 20 {
        return ONES[n].to_string();
    }
    let (tens, ones) = (n / 10, n % 10);
    if ones == 0 {
        TENS[tens].to_string()
    } else {
        format!("{} {}", TENS[tens], ONES[ones])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero() {
        assert_eq!(amount_in_words(Money::zero()), "Zero Rupees Only");
    }

    #[test]
    fn test_lakh() {
        assert_eq!(
            amount_in_words(Money::from_rupees(150_000)),
            "One Lakh Fifty Thousand Rupees Only"
        );
    }

    #[test]
    fn test_small_numbers() {
        assert_eq!(integer_words(7), "Seven");
        assert_eq!(integer_words(13), "Thirteen");
        assert_eq!(integer_words(40), "Forty");
        assert_eq!(integer_words(99), "Ninety Nine");
        assert_eq!(integer_words(100), "One Hundred");
        assert_eq!(integer_words(101), "One Hundred One");
        assert_eq!(integer_words(1_000), "One Thousand");
    }

    #[test]
    fn test_full_indian_grouping() {
        assert_eq!(
            integer_words(123_456_789),
            "Twelve Crore Thirty Four Lakh Fifty Six Thousand Seven Hundred Eighty Nine"
        );
        assert_eq!(integer_words(10_000_000), "One Crore");
        assert_eq!(integer_words(10_01_000), "Ten Lakh One Thousand");
    }

    #[test]
    fn test_crore_count_above_ninety_nine() {
        assert_eq!(integer_words(1_000_000_000), "One Hundred Crore");
        assert_eq!(
            integer_words(12_345_00_00_000),
            "Twelve Thousand Three Hundred Forty Five Crore"
        );
    }

    #[test]
    fn test_rupees_and_paise() {
        assert_eq!(
            amount_in_words(Money::from_rupees_paise(1_234, 50)),
            "One Thousand Two Hundred Thirty Four Rupees and Fifty Paise Only"
        );
        assert_eq!(amount_in_words(Money::from_paise(75)), "Seventy Five Paise Only");
    }

    #[test]
    fn test_singular_units() {
        assert_eq!(amount_in_words(Money::from_rupees(1)), "One Rupee Only");
        assert_eq!(
            amount_in_words(Money::from_paise(101)),
            "One Rupee and One Paisa Only"
        );
    }

    #[test]
    fn test_negative_amount() {
        assert_eq!(
            amount_in_words(Money::from_rupees(-250)),
            "Minus Two Hundred Fifty Rupees Only"
        );
    }

    #[test]
    fn test_custom_currency_names() {
        let names = CurrencyNames {
            major: "Dollars",
            major_one: "Dollar",
            minor: "Cents",
            minor_one: "Cent",
        };
        assert_eq!(
            amount_in_words_with(Money::from_rupees_paise(2, 5), names),
            "Two Dollars and Five Cents Only"
        );
    }
}
