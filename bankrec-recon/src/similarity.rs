//! Description similarity for fuzzy matching.
//!
//! Statement narrations and email snippets rarely agree verbatim
//! ("SWIGGY BANGALORE" vs "Swiggy*Bangalore Order"), so matching works on
//! lowercased alphanumeric tokens plus a short table of known merchant
//! aliases that appear under different names on the two sides.

/// Merchant spelling variants; any pair across a group counts as the same
/// merchant.
const MERCHANT_ALIASES: &[&[&str]] = &[
    &["zomato", "zomato limited"],
    &["swiggy", "www swiggy com"],
    &["amazon", "amazon pay", "amzn"],
    &["flipkart", "fkrt"],
    &["paytm", "paytm payments"],
    &["uber", "uber india"],
    &["ola", "ola cabs"],
];

/// Similarity floor applied when both descriptions hit the same alias group.
const ALIAS_FLOOR: f64 = 0.75;

/// Tokens this short (UPI, POS, REF...) carry no merchant signal.
const MIN_TOKEN_LEN: usize = 4;

pub fn normalize(desc: &str) -> String {
    let mut out = String::with_capacity(desc.len());
    for c in desc.chars() {
        if c.is_alphanumeric() {
            out.extend(c.to_lowercase());
        } else {
            out.push(' ');
        }
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn tokens(normalized: &str) -> Vec<&str> {
    normalized
        .split_whitespace()
        .filter(|t| t.len() >= MIN_TOKEN_LEN)
        .collect()
}

/// Token-overlap similarity in 0.0..=1.0. Identical normalized strings
/// score 1.0; disjoint token sets score 0.0.
pub fn description_similarity(a: &str, b: &str) -> f64 {
    let na = normalize(a);
    let nb = normalize(b);
    if na.is_empty() || nb.is_empty() {
        return 0.0;
    }
    if na == nb {
        return 1.0;
    }

    let ta = tokens(&na);
    let tb = tokens(&nb);
    let overlap = if ta.is_empty() || tb.is_empty() {
        0.0
    } else {
        let shared = ta.iter().filter(|t| tb.contains(t)).count();
        shared as f64 / ta.len().max(tb.len()) as f64
    };

    let alias_hit = MERCHANT_ALIASES.iter().any(|group| {
        group.iter().any(|v| na.contains(v)) && group.iter().any(|v| nb.contains(v))
    });
    if alias_hit {
        overlap.max(ALIAS_FLOOR)
    } else {
        overlap
    }
}
