//! Authentication errors.

use somon_shared::AppError;
use thiserror::Error;

use super::password::PasswordError;
use crate::ledger::LedgerError;

/// Errors that can occur during registration, login and session lookup.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Registration input is malformed.
    #[error("{0}")]
    Validation(String),

    /// Another account already uses this email.
    #[error("Account with email {0} already exists")]
    EmailTaken(String),

    /// Unknown email or wrong password. Deliberately indistinguishable.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Token is unknown, revoked or expired.
    #[error("Session not found or expired")]
    SessionNotFound,

    /// Password hashing failed.
    #[error(transparent)]
    Credential(#[from] PasswordError),

    /// Backend failure.
    #[error("Auth store error: {0}")]
    Store(String),
}

impl AuthError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::EmailTaken(_) => "EMAIL_TAKEN",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::SessionNotFound => "SESSION_NOT_FOUND",
            Self::Credential(_) => "CREDENTIAL_ERROR",
            Self::Store(_) => "STORE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::EmailTaken(_) => 409,
            Self::InvalidCredentials | Self::SessionNotFound => 401,
            Self::Credential(_) | Self::Store(_) => 500,
        }
    }
}

impl From<LedgerError> for AuthError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::DuplicateEmail(email) => Self::EmailTaken(email),
            other => Self::Store(other.to_string()),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match &err {
            AuthError::Validation(msg) => Self::Validation(msg.clone()),
            AuthError::EmailTaken(_) => Self::Conflict(err.to_string()),
            AuthError::InvalidCredentials | AuthError::SessionNotFound => {
                Self::Unauthorized(err.to_string())
            }
            AuthError::Credential(_) => Self::Internal(err.to_string()),
            AuthError::Store(msg) => Self::Database(msg.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(AuthError::Validation("name is required".into()), 400)]
    #[case(AuthError::EmailTaken("a@b.c".into()), 409)]
    #[case(AuthError::InvalidCredentials, 401)]
    #[case(AuthError::SessionNotFound, 401)]
    #[case(AuthError::Credential(PasswordError::InvalidHash), 500)]
    #[case(AuthError::Store("timeout".into()), 500)]
    fn test_status_survives_conversion(#[case] err: AuthError, #[case] status: u16) {
        assert_eq!(err.http_status_code(), status);
        let app: AppError = err.into();
        assert_eq!(app.status_code(), status);
    }

    #[test]
    fn test_duplicate_email_from_store() {
        let err: AuthError = LedgerError::DuplicateEmail("ali@example.com".into()).into();
        assert!(matches!(err, AuthError::EmailTaken(ref e) if e == "ali@example.com"));
        assert!(err.to_string().contains("already exists"));
    }
}
