pub mod create;
pub mod update;

pub use create::{CreateNoteCommand, CreateNoteError, CreateNoteResponse};
pub use update::{UpdateNoteCommand, UpdateNoteError, UpdateNoteResponse};

/// Longest accepted note, in characters
pub const MAX_CONTENT_LENGTH: usize = 10_000;

/// Note text problems shared by create and update
#[derive(Debug, thiserror::Error, Clone, Copy, PartialEq, Eq)]
pub enum ContentValidationError {
    #[error("Note content cannot be empty")]
    Required,

    #[error("Note content must be at most {MAX_CONTENT_LENGTH} characters")]
    TooLong,
}

/// Trim note text and check it is usable
pub fn validate_content(content: &str) -> Result<&str, ContentValidationError> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(ContentValidationError::Required);
    }
    if trimmed.chars().count() > MAX_CONTENT_LENGTH {
        return Err(ContentValidationError::TooLong);
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_content() {
        assert_eq!(validate_content("  looks fine \n"), Ok("looks fine"));
        assert_eq!(validate_content(" \t "), Err(ContentValidationError::Required));
        assert_eq!(
            validate_content(&"n".repeat(MAX_CONTENT_LENGTH + 1)),
            Err(ContentValidationError::TooLong)
        );
    }
}
