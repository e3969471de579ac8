use once_cell::sync::Lazy;
use regex::Regex;

static TRAILING_DIGITS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([0-9]+)$").expect("trailing digit regex should compile"));

/// 1) Trim whitespace + strip outer quotes if present.
pub fn clean_str(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.starts_with('"') && trimmed.ends_with('"') && trimmed.len() >= 2 {
        trimmed[1..trimmed.len() - 1].trim().to_string()
    } else {
        trimmed.to_string()
    }
}

/// 2) Trailing run of ASCII digits (`"Event 99"` → `"99"`), or the trimmed
/// field itself when it does not end in a digit.
pub fn trailing_number(field: &str) -> String {
    let trimmed = field.trim();
    TRAILING_DIGITS
        .captures(trimmed)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_str_strips_quotes_and_whitespace() {
        assert_eq!(clean_str("  \"Heat 3\" "), "Heat 3");
        assert_eq!(clean_str("\""), "\"");
        assert_eq!(clean_str(" 42 "), "42");
    }

    #[test]
    fn trailing_number_prefers_digit_run() {
        assert_eq!(trailing_number("Women's 50m Free Event 45"), "45");
        assert_eq!(trailing_number(" 12 "), "12");
        assert_eq!(trailing_number("Finals"), "Finals");
        assert_eq!(trailing_number("12a"), "12a");
        assert_eq!(trailing_number("Heat \u{0663}"), "Heat \u{0663}");
        assert_eq!(trailing_number(""), "");
    }
}
