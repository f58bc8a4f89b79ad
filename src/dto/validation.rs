//! Validation helpers for DTOs.

use validator::ValidationError;

const MAX_LANGUAGE_LEN: usize = 8;

/// Validates that a language code is 2 to 8 lowercase ASCII letters.
///
/// # Examples
///
/// ```ignore
/// validate_language("de")      // Ok
/// validate_language("DE")      // Err - uppercase
/// validate_language("e")       // Err - too short
/// ```
pub fn validate_language(code: &str) -> Result<(), ValidationError> {
    if code.len() < 2 || code.len() > MAX_LANGUAGE_LEN {
        let mut err = ValidationError::new("language_length");
        err.message = Some(
            format!(
                "Language code must be 2 to {MAX_LANGUAGE_LEN} characters (got {})",
                code.len()
            )
            .into(),
        );
        return Err(err);
    }

    if !code.chars().all(|c| c.is_ascii_lowercase()) {
        let mut err = ValidationError::new("language_format");
        err.message = Some("Language code must contain only lowercase letters".into());
        return Err(err);
    }

    Ok(())
}

/// Validates that a free-text field is not blank once trimmed.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("Value must not be blank".into());
        return Err(err);
    }
    Ok(())
}

/// Validates that a username only uses ASCII letters, digits, `_` and `-`.
pub fn validate_username(name: &str) -> Result<(), ValidationError> {
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        let mut err = ValidationError::new("username_format");
        err.message = Some("Username may only contain letters, digits, `_` and `-`".into());
        return Err(err);
    }
    Ok(())
}
