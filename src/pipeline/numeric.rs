use std::sync::OnceLock;

use regex::Regex;

/// Monetary values found by scanning the raw text, independent of the
/// structuring service. Used only as a consistency oracle; never persisted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumericToken(pub f64);

/// Scans text for Brazilian-format monetary values: `R$ 1.234,56`,
/// `1.234,56`, `123,45` and `123.45`.
pub struct NumericTokenExtractor;

fn amount_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        // alternation order matters: currency-prefixed and thousand-separated
        // forms must win over the bare decimal forms
        Regex::new(
            r"R\$\s*\d{1,3}(?:\.\d{3})*,\d{2}\b|\b\d{1,3}(?:\.\d{3})+,\d{2}\b|\b\d+,\d{2}\b|\b\d+\.\d{2}\b",
        )
        .expect("amount pattern compiles")
    })
}

impl NumericTokenExtractor {
    pub fn extract(text: &str) -> Vec<NumericToken> {
        amount_pattern()
            .find_iter(text)
            .filter_map(|m| normalize_token(m.as_str()))
            .filter(|v| *v > 0.0)
            .map(NumericToken)
            .collect()
    }
}

/// `R$ 1.234,56` -> 1234.56. Comma-decimal forms drop the thousands dots;
/// dot-decimal forms parse directly.
fn normalize_token(token: &str) -> Option<f64> {
    let digits: String = token
        .trim_start_matches("R$")
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    let normalized = if digits.contains(',') {
        digits.replace('.', "").replace(',', ".")
    } else {
        digits
    };
    normalized.parse().ok()
}
