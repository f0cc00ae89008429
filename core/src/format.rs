//! CPF and date helpers shared by the service and the view.
//!
//! Dates travel as `YYYY-MM-DD`; the backend may append a time component,
//! which is dropped. Display uses the Brazilian short form `dd/mm/yyyy`.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

const WIRE_DATE: &str = "%Y-%m-%d";
const DISPLAY_DATE: &str = "%d/%m/%Y";

/// Keep only the ASCII digits of a CPF.
pub fn normalize_cpf(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Format a CPF as `000.000.000-00`.
///
/// Input whose digit count is not 11 is returned unchanged.
pub fn format_cpf(cpf: &str) -> String {
    let digits = normalize_cpf(cpf);
    if digits.len() != 11 {
        return cpf.to_string();
    }
    format!(
        "{}.{}.{}-{}",
        &digits[0..3],
        &digits[3..6],
        &digits[6..9],
        &digits[9..11]
    )
}

/// A birth date as handed to the service: a typed value or free text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateInput {
    Date(NaiveDate),
    DateTime(DateTime<Utc>),
    Text(String),
}

impl From<NaiveDate> for DateInput {
    fn from(value: NaiveDate) -> Self {
        DateInput::Date(value)
    }
}

impl From<DateTime<Utc>> for DateInput {
    fn from(value: DateTime<Utc>) -> Self {
        DateInput::DateTime(value)
    }
}

impl From<&str> for DateInput {
    fn from(value: &str) -> Self {
        DateInput::Text(value.to_string())
    }
}

impl From<String> for DateInput {
    fn from(value: String) -> Self {
        DateInput::Text(value)
    }
}

/// Convert a date-like value to the `YYYY-MM-DD` wire form.
///
/// Returns `None` when the value is absent or cannot be read as a date.
pub fn date_for_transport(value: Option<&DateInput>) -> Option<String> {
    let date = match value? {
        DateInput::Date(date) => *date,
        DateInput::DateTime(at) => at.date_naive(),
        DateInput::Text(text) => parse_date_text(text)?,
    };
    Some(date.format(WIRE_DATE).to_string())
}

/// Short Brazilian date (`dd/mm/yyyy`) for a wire value.
///
/// Absent or empty values render as an empty string. Values that are not
/// dates are shown as received.
pub fn format_date_display(value: Option<&str>) -> String {
    let Some(raw) = value.filter(|v| !v.trim().is_empty()) else {
        return String::new();
    };
    match NaiveDate::parse_from_str(truncate_date(raw), WIRE_DATE) {
        Ok(date) => date.format(DISPLAY_DATE).to_string(),
        Err(_) => raw.to_string(),
    }
}

/// Date portion of a wire value (`2024-03-05T10:00:00` -> `2024-03-05`).
pub fn truncate_date(value: &str) -> &str {
    let value = value.trim();
    match value.find(['T', ' ']) {
        Some(idx) => &value[..idx],
        None => value,
    }
}

fn parse_date_text(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if let Ok(date) = NaiveDate::parse_from_str(text, WIRE_DATE) {
        return Some(date);
    }
    if let Ok(at) = DateTime::parse_from_rfc3339(text) {
        return Some(at.with_timezone(&Utc).date_naive());
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .map(|at| at.date())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cpf_with_punctuation_is_regrouped() {
        assert_eq!(format_cpf("98765432100"), "987.654.321-00");
        assert_eq!(format_cpf("987.654.321-00"), "987.654.321-00");
        assert_eq!(format_cpf(" 987 654x321/00 "), "987.654.321-00");
    }

    #[test]
    fn cpf_with_wrong_digit_count_is_returned_unchanged() {
        assert_eq!(format_cpf("123.456.789-0"), "123.456.789-0");
        assert_eq!(format_cpf("123456789012"), "123456789012");
        assert_eq!(format_cpf("abc"), "abc");
        assert_eq!(format_cpf(""), "");
    }

    #[test]
    fn normalize_strips_everything_but_digits() {
        assert_eq!(normalize_cpf("123.456.789-09"), "12345678909");
        assert_eq!(normalize_cpf("--"), "");
    }

    #[test]
    fn transport_date_from_absent_is_none() {
        assert_eq!(date_for_transport(None), None);
    }

    #[test]
    fn transport_date_from_text() {
        let utc = DateInput::from("2024-03-05T00:00:00Z");
        assert_eq!(date_for_transport(Some(&utc)).as_deref(), Some("2024-03-05"));

        let plain = DateInput::from("1985-05-15");
        assert_eq!(date_for_transport(Some(&plain)).as_deref(), Some("1985-05-15"));

        let local = DateInput::from("1990-12-31T23:10:00");
        assert_eq!(date_for_transport(Some(&local)).as_deref(), Some("1990-12-31"));

        let fractional = DateInput::from("1990-12-31T23:10:00.1234567");
        assert_eq!(date_for_transport(Some(&fractional)).as_deref(), Some("1990-12-31"));
    }

    #[test]
    fn transport_date_converts_offsets_to_utc() {
        let shifted = DateInput::from("2024-03-05T22:30:00-03:00");
        assert_eq!(date_for_transport(Some(&shifted)).as_deref(), Some("2024-03-06"));
    }

    #[test]
    fn transport_date_rejects_garbage() {
        assert_eq!(date_for_transport(Some(&DateInput::from("not a date"))), None);
        assert_eq!(date_for_transport(Some(&DateInput::from(""))), None);
        assert_eq!(date_for_transport(Some(&DateInput::from("2024-02-30"))), None);
    }

    #[test]
    fn transport_date_from_typed_values() {
        let date = NaiveDate::from_ymd_opt(2001, 1, 9).unwrap();
        assert_eq!(date_for_transport(Some(&date.into())).as_deref(), Some("2001-01-09"));

        let at = date.and_hms_opt(12, 0, 0).unwrap().and_utc();
        assert_eq!(date_for_transport(Some(&at.into())).as_deref(), Some("2001-01-09"));
    }

    #[test]
    fn display_date() {
        assert_eq!(format_date_display(Some("1985-05-15")), "15/05/1985");
        assert_eq!(format_date_display(Some("2024-03-05T14:22:10.5")), "05/03/2024");
        assert_eq!(format_date_display(None), "");
        assert_eq!(format_date_display(Some("")), "");
        assert_eq!(format_date_display(Some("ontem")), "ontem");
    }

    #[test]
    fn truncation_keeps_the_date_portion() {
        assert_eq!(truncate_date("1985-05-15T00:00:00"), "1985-05-15");
        assert_eq!(truncate_date("1985-05-15 00:00:00"), "1985-05-15");
        assert_eq!(truncate_date("1985-05-15"), "1985-05-15");
    }
}
