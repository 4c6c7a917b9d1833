//! Date normalization: bank-declared formats first, then generic fallbacks.

use chrono::{Datelike, NaiveDate};

/// Fallback formats tried after a bank's declared formats.
pub const GENERIC_FORMATS: &[&str] = &[
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%d %b %Y",
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%d/%m/%y",
    "%d-%m-%y",
    "%d %b %y",
];

/// Parse a date string, trying `preferred` formats before the generic set.
pub fn parse_date(raw: &str, preferred: &[&str]) -> Option<NaiveDate> {
    let normalized: String = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    for fmt in preferred.iter().chain(GENERIC_FORMATS.iter()) {
        if let Ok(d) = NaiveDate::parse_from_str(&normalized, fmt) {
            return Some(d);
        }
    }
    None
}

/// Re-anchor a two-digit-year date onto the statement period's year, when the
/// pivot guess landed outside it. `DD MMM YY` rows are otherwise ambiguous.
pub fn anchor_year(date: NaiveDate, period_year: Option<i32>) -> NaiveDate {
    match period_year {
        Some(y) if date.year() != y => NaiveDate::from_ymd_opt(y, date.month(), date.day())
            .unwrap_or(date),
        _ => date,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generic_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert_eq!(parse_date("05/03/2024", &[]), Some(expected));
        assert_eq!(parse_date("05-03-2024", &[]), Some(expected));
        assert_eq!(parse_date("05 Mar 2024", &[]), Some(expected));
        assert_eq!(parse_date("2024-03-05", &[]), Some(expected));
    }

    #[test]
    fn test_preferred_wins_over_generic() {
        // 03/05/2024 is ambiguous; a bank declaring %m/%d/%Y reads it as
        // March 5th where the generic %d/%m/%Y fallback would say May 3rd.
        let d = parse_date("03/05/2024", &["%m/%d/%Y"]).unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
    }

    #[test]
    fn test_extra_whitespace() {
        let expected = NaiveDate::from_ymd_opt(2023, 2, 16).unwrap();
        assert_eq!(parse_date("16  Feb   23", &["%d %b %y"]), Some(expected));
    }

    #[test]
    fn test_unparseable() {
        assert_eq!(parse_date("not a date", &[]), None);
    }

    #[test]
    fn test_anchor_year() {
        let d = NaiveDate::from_ymd_opt(2069, 2, 16).unwrap();
        let anchored = anchor_year(d, Some(2023));
        assert_eq!(anchored, NaiveDate::from_ymd_opt(2023, 2, 16).unwrap());
        assert_eq!(anchor_year(d, None), d);
    }
}
