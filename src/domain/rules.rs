use std::sync::LazyLock;

use regex::Regex;

pub const EMAIL_FORMAT_MESSAGE: &str = "The email address format is invalid.";

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern should compile")
});

/// Empty and absent values are skipped; only filled-in addresses are checked.
pub fn email<R>(_record: &R, value: Option<&str>) -> Option<String> {
    match value {
        Some(value) if !value.is_empty() && !EMAIL_PATTERN.is_match(value) => {
            Some(EMAIL_FORMAT_MESSAGE.to_string())
        }
        _ => None,
    }
}

pub fn required_message(header: &str) -> String {
    format!("{header} is required.")
}

pub fn is_blank(value: Option<&str>) -> bool {
    value.map(|v| v.trim().is_empty()).unwrap_or(true)
}
