//! Number and boolean recognition for `normalizeTypes`.
//!
//! Recognized values are rewritten to a canonical string; everything else is
//! returned untouched.

use std::str::FromStr;

use bigdecimal::BigDecimal;
use once_cell::sync::Lazy;
use regex::Regex;

/// Plain digits, or digits in well-formed thousands groups, with optional fraction
static NUMBER_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[-+]?(?:[0-9]{1,3}(?:,[0-9]{3})+|[0-9]+)(?:\.[0-9]+)?$").unwrap()
});

const CURRENCY_SYMBOLS: &[char] = &['$', '€', '£', '¥'];

/// A cell value recognized as something other than free text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalizedValue {
    Number(BigDecimal),
    Boolean(bool),
}

impl NormalizedValue {
    /// Numbers are tried before booleans, so `1` and `0` stay numeric
    pub fn infer(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.is_empty() {
            return None;
        }
        parse_number(value)
            .map(NormalizedValue::Number)
            .or_else(|| parse_boolean(value).map(NormalizedValue::Boolean))
    }

    pub fn canonical(&self) -> String {
        match self {
            NormalizedValue::Number(number) => number.to_plain_string(),
            NormalizedValue::Boolean(flag) => flag.to_string(),
        }
    }
}

/// `true/yes/1` and `false/no/0`, case-insensitive
pub fn parse_boolean(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" => Some(true),
        "false" | "no" | "0" => Some(false),
        _ => None,
    }
}

/// Parse a number that may carry a currency symbol, thousands separators,
/// or a percent sign. Percentages become fractions (`15%` is `0.15`).
pub fn parse_number(value: &str) -> Option<BigDecimal> {
    let mut text = value.trim();

    let percent = if let Some(rest) = text.strip_suffix('%') {
        text = rest.trim_end();
        true
    } else if let Some(rest) = text.strip_prefix('%') {
        text = rest.trim_start();
        true
    } else {
        false
    };

    let (sign, unsigned) = match text.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", text.strip_prefix('+').unwrap_or(text)),
    };
    let unsigned = unsigned
        .strip_prefix(CURRENCY_SYMBOLS)
        .map(str::trim_start)
        .unwrap_or(unsigned);

    let candidate = format!("{}{}", sign, unsigned);
    if !NUMBER_PATTERN.is_match(&candidate) {
        return None;
    }

    let digits = candidate.replace(',', "");
    let integer_part = digits
        .trim_start_matches(['-', '+'])
        .split('.')
        .next()
        .unwrap_or("");
    // Zero-padded codes like 007 or 02134 are identifiers
    if integer_part.len() > 1 && integer_part.starts_with('0') {
        return None;
    }

    let number = BigDecimal::from_str(&digits).ok()?;
    if percent {
        let (mantissa, scale) = number.as_bigint_and_exponent();
        Some(BigDecimal::new(mantissa, scale + 2))
    } else {
        Some(number)
    }
}

/// Canonical string of a recognized value, otherwise the input unchanged
pub fn normalize_type(value: &str) -> String {
    match NormalizedValue::infer(value) {
        Some(normalized) => normalized.canonical(),
        None => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbers_are_canonicalized() {
        assert_eq!(normalize_type("1,234"), "1234");
        assert_eq!(normalize_type("1,234.50"), "1234.50");
        assert_eq!(normalize_type("+5"), "5");
        assert_eq!(normalize_type("-0.5"), "-0.5");
        assert_eq!(normalize_type("42"), "42");
    }

    #[test]
    fn test_currency_and_percent() {
        assert_eq!(normalize_type("$1,200.00"), "1200.00");
        assert_eq!(normalize_type("€ 15"), "15");
        assert_eq!(normalize_type("-$3"), "-3");
        assert_eq!(normalize_type("15%"), "0.15");
        assert_eq!(normalize_type("12.5 %"), "0.125");
    }

    #[test]
    fn test_booleans() {
        assert_eq!(normalize_type("YES"), "true");
        assert_eq!(normalize_type("False"), "false");
        assert_eq!(normalize_type("no"), "false");
        assert_eq!(normalize_type("1"), "1");
        assert_eq!(parse_boolean("0"), Some(false));
    }

    #[test]
    fn test_unrecognized_values_are_untouched() {
        assert_eq!(normalize_type("12,34"), "12,34");
        assert_eq!(normalize_type("007"), "007");
        assert_eq!(normalize_type("N/A"), "N/A");
        assert_eq!(normalize_type("2024-03-04"), "2024-03-04");
        assert_eq!(normalize_type(""), "");
    }

    #[test]
    fn test_idempotent() {
        for raw in ["$1,234.50", "15%", "Yes", "-7", "hello"] {
            let once = normalize_type(raw);
            assert_eq!(normalize_type(&once), once, "not stable for {}", raw);
        }
    }
}
