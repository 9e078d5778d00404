//! Argument checks shared by every connector method.
//!
//! Each helper returns [`ConnectorError::Validation`] with a message naming the
//! offending field, so failures surface before any HTTP call is made.

use std::fmt::Display;

use crate::error::ConnectorError;

type Result<T = ()> = std::result::Result<T, ConnectorError>;

/// Rejects empty or whitespace-only strings.
///
/// # Examples
///
/// ```
/// use ai_connectors::validate::require_non_empty;
///
/// assert!(require_non_empty("model", "gpt-4o").is_ok());
/// let err = require_non_empty("model", "  ").unwrap_err();
/// assert_eq!(err.to_string(), "invalid request: `model` must not be empty");
/// ```
pub fn require_non_empty(field: &str, value: &str) -> Result {
    if value.trim().is_empty() {
        return Err(ConnectorError::validation(format!(
            "`{field}` must not be empty"
        )));
    }
    Ok(())
}

/// Rejects an empty slice.
pub fn require_non_empty_list<T>(field: &str, values: &[T]) -> Result {
    if values.is_empty() {
        return Err(ConnectorError::validation(format!(
            "`{field}` must contain at least one item"
        )));
    }
    Ok(())
}

/// Checks `min <= value <= max`.
///
/// # Examples
///
/// ```
/// use ai_connectors::validate::require_range;
///
/// assert!(require_range("temperature", 0.7, 0.0, 2.0).is_ok());
/// assert!(require_range("n", 0, 1, 10).is_err());
/// ```
pub fn require_range<T>(field: &str, value: T, min: T, max: T) -> Result
where
    T: PartialOrd + Display + Copy,
{
    // NaN fails both comparisons, so it is rejected as well.
    if !(value >= min && value <= max) {
        return Err(ConnectorError::validation(format!(
            "`{field}` must be between {min} and {max}, got {value}"
        )));
    }
    Ok(())
}

/// Checks an optional value against a range; `None` passes.
pub fn require_range_opt<T>(field: &str, value: Option<T>, min: T, max: T) -> Result
where
    T: PartialOrd + Display + Copy,
{
    match value {
        Some(value) => require_range(field, value, min, max),
        None => Ok(()),
    }
}

/// Checks `value >= min`.
pub fn require_at_least<T>(field: &str, value: T, min: T) -> Result
where
    T: PartialOrd + Display + Copy,
{
    if !(value >= min) {
        return Err(ConnectorError::validation(format!(
            "`{field}` must be at least {min}, got {value}"
        )));
    }
    Ok(())
}

/// Limits a string to `max` characters.
pub fn require_max_len(field: &str, value: &str, max: usize) -> Result {
    let len = value.chars().count();
    if len > max {
        return Err(ConnectorError::validation(format!(
            "`{field}` must be at most {max} characters, got {len}"
        )));
    }
    Ok(())
}

/// Limits a slice to `max` items.
pub fn require_max_items<T>(field: &str, values: &[T], max: usize) -> Result {
    if values.len() > max {
        return Err(ConnectorError::validation(format!(
            "`{field}` must contain at most {max} items, got {}",
            values.len()
        )));
    }
    Ok(())
}

/// Limits a byte payload such as an upload to `max` bytes.
pub fn require_max_bytes(field: &str, value: &[u8], max: usize) -> Result {
    if value.len() > max {
        return Err(ConnectorError::validation(format!(
            "`{field}` must be at most {max} bytes, got {}",
            value.len()
        )));
    }
    Ok(())
}

/// Accepts only one of the listed values.
///
/// # Examples
///
/// ```
/// use ai_connectors::validate::require_one_of;
///
/// assert!(require_one_of("style", "vivid", &["vivid", "natural"]).is_ok());
/// let err = require_one_of("style", "noir", &["vivid", "natural"]).unwrap_err();
/// assert!(err.to_string().contains("vivid, natural"));
/// ```
pub fn require_one_of(field: &str, value: &str, allowed: &[&str]) -> Result {
    if !allowed.contains(&value) {
        return Err(ConnectorError::validation(format!(
            "`{field}` must be one of {}, got `{value}`",
            allowed.join(", ")
        )));
    }
    Ok(())
}

/// Same as [`require_one_of`] for optional values.
pub fn require_one_of_opt(field: &str, value: Option<&str>, allowed: &[&str]) -> Result {
    match value {
        Some(value) => require_one_of(field, value, allowed),
        None => Ok(()),
    }
}

/// Requires `value` to be a positive multiple of `factor`.
pub fn require_multiple_of(field: &str, value: u32, factor: u32) -> Result {
    if factor == 0 || value == 0 || value % factor != 0 {
        return Err(ConnectorError::validation(format!(
            "`{field}` must be a positive multiple of {factor}, got {value}"
        )));
    }
    Ok(())
}

/// Ensures an identifier can be spliced into a URL path as a single segment.
///
/// # Examples
///
/// ```
/// use ai_connectors::validate::require_path_segment;
///
/// assert!(require_path_segment("file_id", "file-abc123").is_ok());
/// assert!(require_path_segment("file_id", "../secrets").is_err());
/// ```
pub fn require_path_segment(field: &str, value: &str) -> Result {
    require_non_empty(field, value)?;
    if value
        .chars()
        .any(|ch| matches!(ch, '/' | '?' | '#' | '%') || ch.is_whitespace())
        || value == "."
        || value == ".."
    {
        return Err(ConnectorError::validation(format!(
            "`{field}` must be a single path segment, got `{value}`"
        )));
    }
    Ok(())
}

/// Requires exactly one of two mutually exclusive options.
pub fn require_exactly_one(field_a: &str, a_set: bool, field_b: &str, b_set: bool) -> Result {
    match (a_set, b_set) {
        (true, false) | (false, true) => Ok(()),
        (true, true) => Err(ConnectorError::validation(format!(
            "`{field_a}` and `{field_b}` are mutually exclusive"
        ))),
        (false, false) => Err(ConnectorError::validation(format!(
            "one of `{field_a}` or `{field_b}` is required"
        ))),
    }
}

/// Rejects setting both of two mutually exclusive options; neither is fine.
pub fn require_at_most_one(field_a: &str, a_set: bool, field_b: &str, b_set: bool) -> Result {
    if a_set && b_set {
        return Err(ConnectorError::validation(format!(
            "`{field_a}` and `{field_b}` are mutually exclusive"
        )));
    }
    Ok(())
}

/// Rejects `stream: true`; responses are always read in full.
pub fn reject_streaming(stream: Option<bool>) -> Result {
    if stream == Some(true) {
        return Err(ConnectorError::validation(
            "`stream` is not supported; responses are returned in full",
        ));
    }
    Ok(())
}
