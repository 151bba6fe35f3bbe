//! Lenient numeric coercion for dirty spreadsheet values.
//!
//! Every function here defaults instead of erroring: a dashboard must stay
//! renderable when a cell holds garbage.

/// Parses a possibly comma-formatted value ("1,234.5") into a float,
/// defaulting to 0.0.
pub fn coerce_number(raw: &str) -> f64 {
    let cleaned = raw.trim().replace(',', "");
    if cleaned.is_empty() {
        return 0.0;
    }
    cleaned.parse::<f64>().unwrap_or(0.0)
}

/// Parses a count column into an integer, accepting comma formatting and
/// float-shaped text, defaulting to 0.
pub fn coerce_count(raw: &str) -> i64 {
    let cleaned = raw.trim().replace(',', "");
    if cleaned.is_empty() {
        return 0;
    }
    cleaned
        .parse::<i64>()
        .unwrap_or_else(|_| cleaned.parse::<f64>().map(|f| f as i64).unwrap_or(0))
}

/// Normalizes a percent cell to the 0–100 scale.
///
/// Detects the representation: text with a trailing `%` is already a
/// percentage; a plain number at or below 1.0 is a fraction and gets
/// scaled up; anything larger is taken as a percentage as-is.
pub fn coerce_percent(raw: &str) -> f64 {
    let trimmed = raw.trim();
    if let Some(stripped) = trimmed.strip_suffix('%') {
        return coerce_number(stripped);
    }
    let value = coerce_number(trimmed);
    if value != 0.0 && value.abs() <= 1.0 {
        value * 100.0
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coerce_number_strips_commas() {
        assert_eq!(coerce_number("1,234"), 1234.0);
        assert_eq!(coerce_number("12,34,567.25"), 1234567.25);
    }

    #[test]
    fn test_coerce_number_defaults_to_zero() {
        assert_eq!(coerce_number(""), 0.0);
        assert_eq!(coerce_number("n/a"), 0.0);
        assert_eq!(coerce_number("  "), 0.0);
    }

    #[test]
    fn test_coerce_count_accepts_float_text() {
        assert_eq!(coerce_count("42"), 42);
        assert_eq!(coerce_count("42.0"), 42);
        assert_eq!(coerce_count("1,200"), 1200);
        assert_eq!(coerce_count("junk"), 0);
    }

    #[test]
    fn test_coerce_percent_detects_representation() {
        assert_eq!(coerce_percent("45%"), 45.0);
        assert_eq!(coerce_percent("45.5%"), 45.5);
        assert_eq!(coerce_percent("0.45"), 45.0);
        assert_eq!(coerce_percent("1"), 100.0);
        assert_eq!(coerce_percent("45"), 45.0);
        assert_eq!(coerce_percent(""), 0.0);
    }
}
