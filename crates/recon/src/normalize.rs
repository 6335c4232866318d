//! Canonical comparison forms for identity fields and amounts.
//!
//! Every function here is total: missing or garbled input collapses to an
//! empty string or `None`, never an error.

/// Spreadsheet exports render empty cells as one of these.
fn is_missing(raw: &str) -> bool {
    let t = raw.trim();
    t.is_empty()
        || t.eq_ignore_ascii_case("nan")
        || t.eq_ignore_ascii_case("none")
        || t.eq_ignore_ascii_case("null")
}

/// Normalize a person name: lower-case, punctuation as separators, single spaces.
///
/// Token order is preserved; use [`sorted_tokens`] for an order-insensitive form.
pub fn clean_name(raw: &str) -> String {
    if is_missing(raw) {
        return String::new();
    }
    let separated: String = raw
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '\'' { c } else { ' ' })
        .collect();
    separated
        .split_whitespace()
        .map(|t| t.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Join name parts, skipping blanks, then [`clean_name`] the result.
pub fn full_name(first: &str, middle: &str, last: &str) -> String {
    let parts: Vec<&str> = [first, middle, last]
        .into_iter()
        .filter(|p| !is_missing(p))
        .collect();
    clean_name(&parts.join(" "))
}

/// Tokens of an already-clean name, sorted and re-joined.
pub fn sorted_tokens(name: &str) -> String {
    let mut tokens: Vec<&str> = name.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

/// Strip every non-alphanumeric character and upper-case the rest.
pub fn clean_identifier(raw: &str) -> String {
    if is_missing(raw) {
        return String::new();
    }
    raw.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_uppercase)
        .collect()
}

/// Coerce a phone/contact cell to a number.
///
/// Leading zeros are not significant (`"0244123456"` and `"244123456"` are the
/// same contact). Integral float renderings such as `"244123456.0"` are
/// accepted; anything else yields `None`.
pub fn clean_contact(raw: &str) -> Option<u64> {
    let t = raw.trim();
    if is_missing(t) {
        return None;
    }
    if let Ok(n) = t.parse::<u64>() {
        return Some(n);
    }
    let f: f64 = t.parse().ok()?;
    if f.is_finite() && f >= 0.0 && f.fract() == 0.0 && f < u64::MAX as f64 {
        Some(f as u64)
    } else {
        None
    }
}

/// Parse a currency amount into minor units (cents), rounding half away from zero.
///
/// Thousands separators and surrounding whitespace are tolerated.
pub fn parse_amount_cents(raw: &str) -> Option<i64> {
    if is_missing(raw) {
        return None;
    }
    let compact: String = raw.chars().filter(|c| *c != ',' && !c.is_whitespace()).collect();
    let value: f64 = compact.parse().ok()?;
    if !value.is_finite() {
        return None;
    }
    let cents = (value * 100.0).round();
    if cents.abs() >= i64::MAX as f64 {
        return None;
    }
    Some(cents as i64)
}

/// Render minor units as a plain two-decimal amount (`53980` → `"539.80"`).
pub fn format_cents(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{sign}{}.{:02}", abs / 100, abs % 100)
}
