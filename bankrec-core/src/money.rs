//! Amount normalization for bank statement text.
//!
//! Handles thousands separators (both western 1,234,567.00 and Indian
//! lakh-style 12,34,567.00 grouping), currency symbols, parenthesized
//! negatives, and explicit +/- signs. Direction words (Cr/Dr/C/D) are the
//! pattern layer's job; this module only turns a numeric token into f64.

/// Rounding tolerance for balance/summary cross-checks, in currency units.
pub const AMOUNT_EPSILON: f64 = 0.01;

pub fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() <= AMOUNT_EPSILON
}

/// Parse a monetary token to a signed f64. Returns `None` when no usable
/// number remains after stripping separators and symbols.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let mut s = raw.trim().to_string();
    if s.is_empty() {
        return None;
    }

    let mut negative = false;
    if s.starts_with('(') && s.ends_with(')') {
        negative = true;
        s = s[1..s.len() - 1].to_string();
    }

    // Strip currency symbols, separators and stray whitespace.
    let cleaned: String = s
        .chars()
        .filter(|c| !matches!(c, ',' | '₹' | '$' | '`' | ' ' | '\u{a0}'))
        .collect();
    let cleaned = cleaned.trim_start_matches('+');

    let value: f64 = cleaned.parse().ok()?;
    Some(if negative { -value } else { value })
}
