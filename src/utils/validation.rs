// file: src/utils/validation.rs
// description: input validation helpers
// reference: input validation patterns

use crate::error::{BookshelfError, Result};

pub struct Validator;

impl Validator {
    /// Rejects empty and whitespace-only values.
    pub fn validate_non_blank(field: &str, value: &str) -> Result<()> {
        if value.trim().is_empty() {
            return Err(BookshelfError::validation(field, "must not be empty"));
        }
        Ok(())
    }

    pub fn validate_url(url: &str) -> Result<()> {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(BookshelfError::validation(
                "url",
                format!("Invalid URL format: {}", url),
            ));
        }
        Ok(())
    }

    /// User ids arrive from an HTTP header or the command line.
    pub fn validate_user_id(user_id: &str) -> Result<()> {
        Self::validate_non_blank("user_id", user_id)?;

        if user_id.len() > 256 {
            return Err(BookshelfError::validation(
                "user_id",
                "too long (max 256 bytes)",
            ));
        }

        if user_id.chars().any(char::is_control) {
            return Err(BookshelfError::validation(
                "user_id",
                "must not contain control characters",
            ));
        }

        Ok(())
    }
}
