//! Monetary value and date helpers shared by the domain services.
//!
//! Values are kept as decimal text inside the records (that is how the backup
//! files store them) and only turned into `f64` when aggregating.

use chrono::NaiveDate;

/// Strip leading zeros from a typed value; empty input becomes "0".
///
/// A fractional value keeps a single zero before the separator, so "00.5"
/// becomes "0.5" rather than ".5".
pub fn normalize_value(input: &str) -> String {
    let stripped = input.trim().trim_start_matches('0');

    if stripped.is_empty() {
        "0".to_string()
    } else if stripped.starts_with('.') || stripped.starts_with(',') {
        format!("0{}", stripped)
    } else {
        stripped.to_string()
    }
}

/// Parse a typed amount, accepting "R$" prefixes and a comma as decimal separator
pub fn parse_amount(input: &str) -> Option<f64> {
    let mut cleaned = input.trim().replace("R$", "").replace(' ', "");
    if cleaned.contains(',') {
        // pt-BR style: "1.234,56"
        cleaned = cleaned.replace('.', "").replace(',', ".");
    }
    if cleaned.is_empty() {
        return None;
    }

    cleaned.parse::<f64>().ok().filter(|amount| amount.is_finite())
}

/// Lenient reading used by aggregation: anything unparseable counts as zero
pub fn amount_of(value: &str) -> f64 {
    parse_amount(value).unwrap_or(0.0)
}

/// Parse a record date. Accepts "YYYY-MM-DD" and full RFC 3339 timestamps
/// (only the date part is used).
pub fn parse_date(date_str: &str) -> Option<NaiveDate> {
    let date_part = date_str.trim().split('T').next()?;
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}
