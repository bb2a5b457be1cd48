//! JSON error responses.
//!
//! Every failed request renders as `{ "error": code, "message": text }`.
//! Domain errors keep their own machine codes; server-side failures are
//! logged and their details withheld from the client.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use somon_core::{auth::AuthError, currency::RateError, ledger::LedgerError};
use somon_shared::AppError;
use tracing::error;

const INTERNAL_MESSAGE: &str = "An internal error occurred";

/// An error ready to be rendered as an HTTP response.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl ApiError {
    /// Creates an error with an explicit status and code.
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    /// 401 for requests without a usable session.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", message)
    }

    /// Returns the HTTP status.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns the machine-readable code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.code
    }

    /// Returns the client-facing message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    fn from_domain(status: u16, code: &'static str, err: &dyn std::fmt::Display) -> Self {
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            error!(code, error = %err, "request failed");
            Self::new(status, code, INTERNAL_MESSAGE)
        } else {
            Self::new(status, code, err.to_string())
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(json!({
                "error": self.code,
                "message": self.message
            })),
        )
            .into_response()
    }
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        Self::from_domain(err.http_status_code(), err.error_code(), &err)
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        Self::from_domain(err.http_status_code(), err.error_code(), &err)
    }
}

impl From<RateError> for ApiError {
    fn from(err: RateError) -> Self {
        Self::from_domain(err.http_status_code(), err.error_code(), &err)
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self::from_domain(err.status_code(), err.error_code(), &err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;
    use somon_shared::types::{AccountId, Currency, Money};

    #[rstest]
    #[case(LedgerError::InvalidAmount(dec!(0)).into(), 400, "INVALID_AMOUNT")]
    #[case(LedgerError::SameAccount.into(), 400, "SAME_ACCOUNT")]
    #[case(LedgerError::AccountNotFound(AccountId::new()).into(), 404, "ACCOUNT_NOT_FOUND")]
    #[case(
        LedgerError::InsufficientFunds {
            account_id: AccountId::new(),
            available: Money::new(dec!(10), Currency::Tjs),
            requested: Money::new(dec!(20), Currency::Tjs),
        }.into(),
        422,
        "INSUFFICIENT_FUNDS"
    )]
    #[case(AuthError::InvalidCredentials.into(), 401, "INVALID_CREDENTIALS")]
    #[case(AuthError::EmailTaken("a@b.c".into()).into(), 409, "EMAIL_TAKEN")]
    #[case(RateError::Unavailable { from: Currency::Usd, to: Currency::Eur }.into(), 422, "RATE_UNAVAILABLE")]
    #[case(RateError::Source("timeout".into()).into(), 502, "RATE_SOURCE_ERROR")]
    #[case(AppError::NotFound("x".into()).into(), 404, "NOT_FOUND")]
    fn test_domain_errors_keep_status_and_code(
        #[case] err: ApiError,
        #[case] status: u16,
        #[case] code: &str,
    ) {
        assert_eq!(err.status().as_u16(), status);
        assert_eq!(err.code(), code);
    }

    #[test]
    fn test_server_errors_hide_details() {
        let err = ApiError::from(LedgerError::Store("connection reset".into()));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message(), INTERNAL_MESSAGE);

        let err = ApiError::from(RateError::Source("upstream said 503".into()));
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
        assert!(!err.message().contains("503"));
    }

    #[test]
    fn test_client_errors_keep_message() {
        let err = ApiError::from(LedgerError::SameAccount);
        assert_eq!(err.message(), LedgerError::SameAccount.to_string());
    }
}
