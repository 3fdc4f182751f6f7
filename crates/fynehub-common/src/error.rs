//! Error types for Fyne Creator Hub

use thiserror::Error;

/// Main error type for Fyne Creator Hub
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Precondition failed: {0}")]
    Precondition(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for Fyne Creator Hub
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Returns the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Error::Config(_) => 500,
            Error::Database(_) => 500,
            Error::Validation(_) => 422,
            Error::Precondition(_) => 409,
            Error::NotFound(_) => 404,
            Error::PermissionDenied(_) => 403,
            Error::Auth(_) => 401,
            Error::Internal(_) => 500,
            Error::Other(_) => 500,
        }
    }

    /// Returns the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Error::Config(_) => "CONFIG_ERROR",
            Error::Database(_) => "DATABASE_ERROR",
            Error::Validation(_) => "VALIDATION_ERROR",
            Error::Precondition(_) => "PRECONDITION_FAILED",
            Error::NotFound(_) => "NOT_FOUND",
            Error::PermissionDenied(_) => "FORBIDDEN",
            Error::Auth(_) => "UNAUTHORIZED",
            Error::Internal(_) => "INTERNAL_ERROR",
            Error::Other(_) => "INTERNAL_ERROR",
        }
    }

    /// Whether the caller may retry the operation unchanged.
    ///
    /// Only transient store failures qualify; validation and precondition
    /// failures require the caller to change the request first.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Database(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(Error::Validation("bad".into()).status_code(), 422);
        assert_eq!(Error::Precondition("state".into()).status_code(), 409);
        assert_eq!(Error::NotFound("x".into()).status_code(), 404);
        assert_eq!(Error::PermissionDenied("x".into()).status_code(), 403);
    }

    #[test]
    fn test_retryable() {
        assert!(Error::Database("timeout".into()).is_retryable());
        assert!(!Error::Validation("dup".into()).is_retryable());
        assert!(!Error::Precondition("already approved".into()).is_retryable());
    }
}
