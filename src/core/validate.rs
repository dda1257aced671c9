//! Input coercion for user-supplied task and goal fields.
//!
//! Malformed values are never rejected here. Each function maps whatever the
//! front end hands over onto a value that satisfies the model invariants.

use chrono::NaiveDate;

use super::task::Priority;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Unknown or empty priority strings become `Medium`.
pub fn priority(raw: &str) -> Priority {
    Priority::from_keyword(raw.trim()).unwrap_or(Priority::Medium)
}

/// Goal target is at least 1.
pub fn target(raw: i64) -> u32 {
    u32::try_from(raw.max(1)).unwrap_or(u32::MAX)
}

/// Parse a target from free text; anything non-numeric counts as 1.
pub fn target_from_input(raw: &str) -> u32 {
    target(parse_int(raw).unwrap_or(1))
}

/// Goal progress is clamped into `[0, target]`.
pub fn current(raw: i64, target: u32) -> u32 {
    u32::try_from(raw.max(0)).unwrap_or(u32::MAX).min(target)
}

/// Parse progress from free text; anything non-numeric counts as 0.
pub fn current_from_input(raw: &str, target: u32) -> u32 {
    current(parse_int(raw).unwrap_or(0), target)
}

/// Parse a `YYYY-MM-DD` calendar date.
pub fn date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).ok()
}

pub const UNTITLED: &str = "Untitled";

/// Titles are never blank.
pub fn title(raw: String) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        UNTITLED.to_string()
    } else if trimmed.len() == raw.len() {
        raw
    } else {
        trimmed.to_string()
    }
}

/// Blank optional text becomes `None`.
pub fn optional_text(raw: Option<String>) -> Option<String> {
    raw.filter(|s| !s.trim().is_empty())
}

// Leading integer, like a lenient form field: "12 pages" reads as 12.
pub(crate) fn parse_int(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    let end = trimmed
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || (i == 0 && (c == '-' || c == '+'))))
        .map(|(i, _)| i)
        .unwrap_or(trimmed.len());
    trimmed[..end].parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_priority_becomes_medium() {
        assert_eq!(priority("urgent"), Priority::Medium);
        assert_eq!(priority(""), Priority::Medium);
        assert_eq!(priority("HIGH"), Priority::Medium);
        assert_eq!(priority("high"), Priority::High);
        assert_eq!(priority(" low "), Priority::Low);
    }

    #[test]
    fn target_is_at_least_one() {
        assert_eq!(target(-5), 1);
        assert_eq!(target(0), 1);
        assert_eq!(target(20), 20);
        assert_eq!(target_from_input("abc"), 1);
        assert_eq!(target_from_input("12 chapters"), 12);
    }

    #[test]
    fn current_is_clamped_to_target() {
        assert_eq!(current(10, 1), 1);
        assert_eq!(current(-3, 10), 0);
        assert_eq!(current(7, 10), 7);
        assert_eq!(current_from_input("", 10), 0);
        assert_eq!(current_from_input("99", 10), 10);
    }

    #[test]
    fn dates_parse_strictly() {
        assert_eq!(date("2026-02-24"), NaiveDate::from_ymd_opt(2026, 2, 24));
        assert_eq!(date("2026-02-30"), None);
        assert_eq!(date("next week"), None);
    }

    #[test]
    fn blank_titles_get_a_placeholder() {
        assert_eq!(title(String::new()), UNTITLED);
        assert_eq!(title("   ".into()), UNTITLED);
        assert_eq!(title(" Essay ".into()), "Essay");
    }

    #[test]
    fn blank_text_is_dropped() {
        assert_eq!(optional_text(Some("  ".into())), None);
        assert_eq!(optional_text(Some("notes".into())), Some("notes".into()));
    }
}
