//! Input checks shared by the form handlers.

use regex::Regex;

lazy_static::lazy_static! {
    static ref EMAIL_RE: Regex = Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").unwrap();
}

pub const MAX_NAME_LEN: usize = 100;
pub const MAX_TEXT_LEN: usize = 5000;

pub fn validate_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

pub fn ensure_max_len(value: &str, max: usize) -> bool {
    value.chars().count() <= max
}

/// Trims a form value and maps blank input to `None`.
pub fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// HTML checkboxes are only submitted when ticked.
pub fn checkbox(value: Option<&str>) -> bool {
    matches!(value.map(str::trim), Some(v) if !v.is_empty() && v != "off" && v != "false")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_shapes() {
        assert!(validate_email("jane.doe+x@example.co"));
        assert!(!validate_email("jane@"));
        assert!(!validate_email("no-at-sign.example.com"));
    }

    #[test]
    fn blank_values_collapse() {
        assert_eq!(non_blank(Some("  hi ")), Some("hi".to_string()));
        assert_eq!(non_blank(Some("   ")), None);
        assert_eq!(non_blank(None), None);
    }

    #[test]
    fn checkbox_values() {
        assert!(checkbox(Some("on")));
        assert!(checkbox(Some("true")));
        assert!(!checkbox(Some("off")));
        assert!(!checkbox(None));
    }

    #[test]
    fn length_counts_characters() {
        assert!(ensure_max_len("ééé", 3));
        assert!(!ensure_max_len("abcd", 3));
    }
}
