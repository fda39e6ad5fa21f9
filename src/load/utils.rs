/// Trim whitespace + strip outer quotes if present.
pub fn clean_str(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.starts_with('"') && trimmed.ends_with('"') && trimmed.len() >= 2 {
        trimmed[1..trimmed.len() - 1].to_string()
    } else {
        trimmed.to_string()
    }
}

/// `"2001 [YR2001]"` → `"2001"`. Splits on a single space, so labels
/// without one come back unchanged.
pub fn short_label(raw: &str) -> &str {
    raw.split(' ').next().unwrap_or(raw)
}

/// True for a non-empty label made only of numeric characters.
pub fn is_numeric_label(label: &str) -> bool {
    !label.is_empty() && label.chars().all(char::is_numeric)
}

/// Numeric coercion for one cell: anything that does not parse
/// (World Bank's `..`, `N/A`, blanks) is missing. NaN counts as missing.
pub fn parse_numeric(cell: &str) -> Option<f64> {
    let cleaned = clean_str(cell);
    match cleaned.parse::<f64>() {
        Ok(v) if !v.is_nan() => Some(v),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_label_drops_year_suffix() {
        assert_eq!(short_label("2001 [YR2001]"), "2001");
        assert_eq!(short_label("Country"), "Country");
        assert_eq!(short_label("Series Code"), "Series");
        assert_eq!(short_label(""), "");
    }

    #[test]
    fn numeric_labels() {
        assert!(is_numeric_label("1998"));
        assert!(!is_numeric_label("Series"));
        assert!(!is_numeric_label("20a1"));
        assert!(!is_numeric_label(""));
    }

    #[test]
    fn coercion_turns_tokens_into_missing() {
        assert_eq!(parse_numeric("12.5"), Some(12.5));
        assert_eq!(parse_numeric(" \"-3\" "), Some(-3.0));
        assert_eq!(parse_numeric("1e3"), Some(1000.0));
        assert_eq!(parse_numeric(".."), None);
        assert_eq!(parse_numeric("N/A"), None);
        assert_eq!(parse_numeric(""), None);
        assert_eq!(parse_numeric("NaN"), None);
    }
}
