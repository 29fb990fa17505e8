//! Explicit input validators shared by the services

use validator::Validate;

use crate::error::{AppError, AppResult};

/// Return the value when it is present and not blank
pub fn require_text(value: Option<&str>, message: &str) -> AppResult<String> {
    match value {
        Some(text) if !text.trim().is_empty() => Ok(text.to_string()),
        _ => Err(AppError::Validation(message.to_string())),
    }
}

/// Return the value when it is present and not blank, `None` otherwise
pub fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .filter(|text| !text.trim().is_empty())
        .map(str::to_string)
}

/// Run the derived `validator` rules of a payload
pub fn validate_payload<T: Validate>(payload: &T) -> AppResult<()> {
    payload.validate().map_err(AppError::from)
}
