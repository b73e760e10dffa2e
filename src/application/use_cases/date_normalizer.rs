//! Lenient date recognition for the `iso` date mode.
//!
//! Formats are tried in order, so an ambiguous `3/4/2024` reads month-first.
//! Anything that does not parse is returned unchanged.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};

const DATE_FORMATS: &[&str] = &[
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%d.%m.%Y",
    "%m-%d-%Y",
    "%d %b %Y",
    "%d %B %Y",
    "%b %d, %Y",
    "%B %d, %Y",
];

const DATE_TIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"];

/// Parse a cell as a calendar date
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() || !value.bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }

    DATE_FORMATS
        .iter()
        .filter_map(|format| NaiveDate::parse_from_str(value, format).ok())
        .find(has_four_digit_year)
        .or_else(|| {
            DATE_TIME_FORMATS
                .iter()
                .filter_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
                .map(|moment| moment.date())
                .find(has_four_digit_year)
        })
        .or_else(|| {
            DateTime::parse_from_rfc3339(value)
                .ok()
                .map(|moment| moment.date_naive())
                .filter(has_four_digit_year)
        })
}

// `%Y` happily reads "24" as year 24
fn has_four_digit_year(date: &NaiveDate) -> bool {
    (1000..=9999).contains(&date.year())
}

/// Rewrite a recognizable date as `YYYY-MM-DD`, otherwise return it unchanged
pub fn to_iso_date(value: &str) -> String {
    match parse_date(value) {
        Some(date) => date.format("%Y-%m-%d").to_string(),
        None => value.to_string(),
    }
}
