//! Employee-range normalization: free-text ranges to numeric point estimates.

use tracing::debug;

use crate::features::FieldValue;

/// Converts an employee-range cell like `"51-200"` to `125.5` or `"1000+"`
/// to `1000.0`. Unparseable input yields `f64::NAN`; this never fails.
pub fn parse_range_midpoint(value: &FieldValue) -> f64 {
    match value {
        FieldValue::Missing => f64::NAN,
        FieldValue::Number(number) => *number,
        FieldValue::Text(text) => parse_range_midpoint_str(text),
    }
}

/// String form of [`parse_range_midpoint`]. Rules are tried in order and a
/// failed range split falls through to the remaining rules; only the final
/// whole-number parse (and a failed `+` suffix) produce the NaN sentinel.
pub fn parse_range_midpoint_str(raw: &str) -> f64 {
    let s = raw.trim();
    if s.is_empty() {
        return f64::NAN;
    }

    // "1000+" style: no fallthrough on failure.
    if let Some(prefix) = s.strip_suffix('+') {
        return parse_plain(prefix).unwrap_or(f64::NAN);
    }

    // "51-200" or "51 - 200" style.
    if s.contains('-') {
        let cleaned = s.replace(',', "");
        if let Some((lo, hi)) = cleaned.split_once('-') {
            if let (Some(lo), Some(hi)) = (parse_plain(lo), parse_plain(hi)) {
                return (lo + hi) / 2.0;
            }
        }
    }

    // "2 to 5", "26 to 50" style. The containment check is case-insensitive
    // but the split is literal, so "26 TO 50" falls through to the final rule.
    if s.to_ascii_lowercase().contains(" to ") {
        let cleaned = s.replace(',', "");
        if let Some((lo, hi)) = cleaned.split_once(" to ") {
            if let (Some(lo), Some(hi)) = (parse_plain(lo), parse_plain(hi)) {
                return (lo + hi) / 2.0;
            }
        }
    }

    match parse_plain(s) {
        Some(number) => number,
        None => {
            debug!(raw, "employee range did not parse");
            f64::NAN
        }
    }
}

fn parse_plain(part: &str) -> Option<f64> {
    let cleaned = part.replace(',', "");
    let trimmed = cleaned.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok()
}
