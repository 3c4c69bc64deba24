use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("Empty message")]
    EmptyMessage,
}

/// Rejects blank input before any classification happens.
pub fn validate_message(message: &str) -> Result<&str, CoreError> {
    if message.trim().is_empty() {
        return Err(CoreError::EmptyMessage);
    }
    Ok(message)
}
