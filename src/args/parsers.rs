use serde_json::Value;

use crate::error::{AppError, AppResult, ConfigError};

/// Parses a header argument in `Name: value` form.
///
/// # Errors
///
/// Returns an error when the separator is missing or the name is empty.
pub fn parse_header(input: &str) -> AppResult<(String, String)> {
    input
        .split_once(':')
        .map(|(name, value)| (name.trim().to_owned(), value.trim().to_owned()))
        .filter(|(name, _)| !name.is_empty())
        .ok_or_else(|| {
            AppError::config(ConfigError::MalformedHeader {
                header: input.to_owned(),
            })
        })
}

/// Interprets a `-d` body argument: JSON when it parses, the raw string
/// otherwise.
#[must_use]
pub fn parse_body_data(input: &str) -> Value {
    serde_json::from_str(input).unwrap_or_else(|_| Value::String(input.to_owned()))
}
