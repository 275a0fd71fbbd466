//! Internal helpers for field validation.
//!
//! These utilities are **not** part of the public API. They centralize the
//! column constraints so every tracker enforces the same rules.

use crate::{EngineError, ResultEngine};

/// Trim a required text field and check it against the column length.
pub(crate) fn required_text(value: &str, label: &str, max_len: usize) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidValue(format!(
            "{label} must not be empty"
        )));
    }
    check_len(trimmed, label, max_len)?;
    Ok(trimmed.to_string())
}

/// Trim an optional text field; blank values become `None`.
pub(crate) fn optional_text(
    value: Option<String>,
    label: &str,
    max_len: usize,
) -> ResultEngine<Option<String>> {
    let Some(value) = value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
    else {
        return Ok(None);
    };
    check_len(value, label, max_len)?;
    Ok(Some(value.to_string()))
}

/// Append a line to a free-text notes field.
pub(crate) fn append_note(
    notes: &mut Option<String>,
    line: String,
    max_len: usize,
) -> ResultEngine<()> {
    let joined = match notes.as_deref() {
        Some(existing) if !existing.is_empty() => format!("{existing}\n{line}"),
        _ => line,
    };
    check_len(&joined, "notes", max_len)?;
    *notes = Some(joined);
    Ok(())
}

/// Parse a stored id, reporting a malformed row as a missing `what`.
pub(crate) fn parse_id(value: &str, what: &str) -> ResultEngine<uuid::Uuid> {
    uuid::Uuid::parse_str(value).map_err(|_| EngineError::KeyNotFound(format!("{what} not exists")))
}

pub(crate) fn non_negative(value: i64, label: &str) -> ResultEngine<()> {
    if value < 0 {
        return Err(EngineError::InvalidValue(format!("{label} must be >= 0")));
    }
    Ok(())
}

fn check_len(value: &str, label: &str, max_len: usize) -> ResultEngine<()> {
    if value.chars().count() > max_len {
        return Err(EngineError::InvalidValue(format!(
            "{label} must be at most {max_len} characters"
        )));
    }
    Ok(())
}

/// Whole days left until `end`, rounded up. Zero once `end` has passed.
pub(crate) fn days_until(
    now: chrono::DateTime<chrono::Utc>,
    end: chrono::DateTime<chrono::Utc>,
) -> i64 {
    let secs = end.signed_duration_since(now).num_seconds();
    if secs <= 0 {
        return 0;
    }
    (secs + 86_399) / 86_400
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use super::*;

    #[test]
    fn required_text_trims_and_rejects_blank() {
        assert_eq!(required_text("  Gas  ", "name", 10).unwrap(), "Gas");
        assert_eq!(
            required_text("   ", "name", 10),
            Err(EngineError::InvalidValue("name must not be empty".to_string()))
        );
    }

    #[test]
    fn text_longer_than_column_is_rejected() {
        assert!(required_text("abcdef", "name", 5).is_err());
        assert!(optional_text(Some("abcdef".to_string()), "notes", 5).is_err());
        assert_eq!(optional_text(Some("   ".to_string()), "notes", 5), Ok(None));
    }

    #[test]
    fn append_note_joins_lines() {
        let mut notes = None;
        append_note(&mut notes, "first".to_string(), 100).unwrap();
        append_note(&mut notes, "second".to_string(), 100).unwrap();
        assert_eq!(notes.as_deref(), Some("first\nsecond"));
    }

    #[test]
    fn append_note_keeps_notes_when_too_long() {
        let mut notes = Some("kept".to_string());
        assert!(append_note(&mut notes, "x".repeat(20), 10).is_err());
        assert_eq!(notes.as_deref(), Some("kept"));
    }

    #[test]
    fn days_until_rounds_up() {
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap();
        assert_eq!(days_until(now, now + Duration::days(90)), 90);
        assert_eq!(days_until(now, now + Duration::hours(1)), 1);
        assert_eq!(days_until(now, now - Duration::days(3)), 0);
    }
}
