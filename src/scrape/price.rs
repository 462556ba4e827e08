//! Price-string normalization
//!
//! Shops render the same price many ways: `"1 749,99 zł"`,
//! `"1\u{a0}749,99\u{a0}zł"`, `"2120.00"`, `"1749,99"`. Everything here is
//! pure and total; an unparsable string is simply no value, never an error.

use regex::Regex;
use std::sync::LazyLock;

/// Price-shaped substring: digits with optional space/NBSP grouping and a
/// two-digit decimal part after a comma or dot, e.g. "1 749,99" or "1749.99"
static PRICE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\d\x{00a0}\x{202f}\s]+[,.]\d{2}").expect("price regex is valid")
});

/// Normalizes a raw price string into a canonical decimal value
///
/// Handles currency symbols, alphabetic noise, NBSP/space thousands
/// separators, and either a comma or a dot as the decimal separator. When
/// several dots survive cleanup, all but the last are treated as thousands
/// separators. Zero and negative values are "no value", not an error.
pub fn normalize_price(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    // Keep digits and separators; decimal comma becomes a dot; currency
    // tokens, letters, and whitespace (thousands grouping) all drop out.
    let mut cleaned = String::with_capacity(trimmed.len());
    for c in trimmed.chars() {
        match c {
            '0'..='9' | '.' => cleaned.push(c),
            ',' => cleaned.push('.'),
            _ => {}
        }
    }

    // More than one dot left: the last one is the decimal point
    if let Some(last_dot) = cleaned.rfind('.') {
        let (head, tail) = cleaned.split_at(last_dot);
        if head.contains('.') {
            cleaned = format!("{}{}", head.replace('.', ""), tail);
        }
    }

    match cleaned.parse::<f64>() {
        Ok(value) if value > 0.0 => Some(value),
        _ => None,
    }
}

/// Scans free text for the first plausible price-shaped substring
///
/// Returns the normalized value together with the matched text. Values at
/// or below `min_plausible` are rejected as page noise (ratings, quantities,
/// pixel sizes) and the scan continues.
pub fn find_price_in_text(text: &str, min_plausible: f64) -> Option<(f64, String)> {
    for m in PRICE_RE.find_iter(text) {
        if let Some(value) = normalize_price(m.as_str()) {
            if value > min_plausible {
                return Some((value, m.as_str().trim().to_string()));
            }
        }
    }
    None
}
