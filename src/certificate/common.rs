//! Common utilities for certificate generation.
//!
//! Shared helpers for Spanish date formatting, amount spelling, Typst escaping
//! and filename construction.

use chrono::{Datelike, NaiveDate};
use lazy_static::lazy_static;
use regex::Regex;
use std::path::Path;

use super::numbers::spanish_cardinal;

/// Shown in place of an exit date when the contract is still running.
pub const CURRENT_DATE_MARKER: &str = "la actualidad";

/// Returned by [`amount_to_words`] when the input holds no usable number.
pub const INVALID_AMOUNT_MARKER: &str = "Salario no válido";

/// Currency unit appended to spelled-out amounts.
pub const CURRENCY_WORD: &str = "pesos";

pub const CURRENCY_PREFIX: &str = "$";

const MONTHS: [&str; 12] = [
    "enero",
    "febrero",
    "marzo",
    "abril",
    "mayo",
    "junio",
    "julio",
    "agosto",
    "septiembre",
    "octubre",
    "noviembre",
    "diciembre",
];

lazy_static! {
    static ref NON_DIGITS: Regex = Regex::new(r"[^0-9]").expect("static regex");
}

/// Spanish month name for a 1-based month number.
pub fn month_name(month: u32) -> &'static str {
    let index = (month.max(1) as usize - 1).min(MONTHS.len() - 1);
    MONTHS[index]
}

/// Format a `YYYYMMDD` date code as Spanish display text.
///
/// Blank input means the period is still open and yields
/// [`CURRENT_DATE_MARKER`]. Anything that is not exactly eight digits forming
/// a valid calendar date is returned unchanged.
///
/// ```
/// use certificados_laborales::certificate::common::format_date;
/// assert_eq!(format_date("20240201"), "1 de febrero de 2024");
/// ```
pub fn format_date(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return CURRENT_DATE_MARKER.to_string();
    }

    if trimmed.len() != 8 || !trimmed.chars().all(|c| c.is_ascii_digit()) {
        return raw.to_string();
    }

    match NaiveDate::parse_from_str(trimmed, "%Y%m%d") {
        Ok(date) => format!(
            "{} de {} de {}",
            date.day(),
            month_name(date.month()),
            date.year()
        ),
        Err(_) => raw.to_string(),
    }
}

/// Spell out a monetary amount in Spanish, e.g. `"$2,400,000"` becomes
/// `"Dos millones cuatrocientos mil pesos"`.
///
/// Every non-digit character is discarded first. Empty or unparseable input
/// yields [`INVALID_AMOUNT_MARKER`]; this never fails.
pub fn amount_to_words(raw: &str) -> String {
    let digits = NON_DIGITS.replace_all(raw, "");
    if digits.is_empty() {
        return INVALID_AMOUNT_MARKER.to_string();
    }

    match digits.parse::<u64>() {
        Ok(value) => format!("{} {}", capitalize(&spanish_cardinal(value)), CURRENCY_WORD),
        Err(_) => INVALID_AMOUNT_MARKER.to_string(),
    }
}

/// Prefix an amount with the currency sign unless it already carries one.
pub fn with_currency_prefix(amount: &str) -> String {
    if amount.contains(CURRENCY_PREFIX) {
        amount.to_string()
    } else {
        format!("{CURRENCY_PREFIX}{amount}")
    }
}

/// Uppercase the first character, leaving the rest untouched.
pub fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Escape special characters for Typst strings.
pub fn escape_typst_string(value: &str) -> String {
    value
        .replace('\\', r"\\")
        .replace('"', r#"\""#)
        .replace('\n', r"\n")
}

/// Employer name as it appears inside a certificate filename.
pub fn sanitize_employer_for_filename(name: &str) -> String {
    name.replace(' ', "_").replace(',', "").replace('/', "_")
}

/// `Certificate_<employee>_<employer>_<id>.pdf`
pub fn certificate_filename(employee_name: &str, employer_name: &str, national_id: &str) -> String {
    format!(
        "Certificate_{}_{}_{}.pdf",
        employee_name.replace(' ', "_"),
        sanitize_employer_for_filename(employer_name),
        national_id
    )
}

/// Get the static assets directory path.
pub fn get_static_dir() -> &'static Path {
    Path::new(concat!(env!("CARGO_MANIFEST_DIR"), "/static"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_date_strips_leading_zero() {
        assert_eq!(format_date("20240201"), "1 de febrero de 2024");
        assert_eq!(format_date("20231215"), "15 de diciembre de 2023");
    }

    #[test]
    fn test_format_date_blank_is_current() {
        assert_eq!(format_date(""), "la actualidad");
        assert_eq!(format_date("   "), "la actualidad");
    }

    #[test]
    fn test_format_date_invalid_passthrough() {
        assert_eq!(format_date("not-a-date"), "not-a-date");
        assert_eq!(format_date("20241301"), "20241301");
        assert_eq!(format_date("2024021"), "2024021");
    }

    #[test]
    fn test_amount_to_words() {
        assert_eq!(
            amount_to_words("$2,400,000"),
            "Dos millones cuatrocientos mil pesos"
        );
        assert_eq!(amount_to_words("1300000"), "Un millón trescientos mil pesos");
        assert_eq!(amount_to_words(""), INVALID_AMOUNT_MARKER);
        assert_eq!(amount_to_words("$ abc"), INVALID_AMOUNT_MARKER);
    }

    #[test]
    fn test_amount_to_words_overflow_is_invalid() {
        assert_eq!(
            amount_to_words("999999999999999999999999"),
            INVALID_AMOUNT_MARKER
        );
    }

    #[test]
    fn test_with_currency_prefix() {
        assert_eq!(with_currency_prefix("1.300.000"), "$1.300.000");
        assert_eq!(with_currency_prefix("$1.300.000"), "$1.300.000");
    }

    #[test]
    fn test_certificate_filename() {
        assert_eq!(
            certificate_filename("Ana María Ruiz", "ACME, S.A.S/Norte", "1144"),
            "Certificate_Ana_María_Ruiz_ACME_S.A.S_Norte_1144.pdf"
        );
    }

    #[test]
    fn test_escape_typst_string() {
        assert_eq!(escape_typst_string(r#"Calle "15""#), r#"Calle \"15\""#);
    }
}
