//! Ledger error types for validation and state errors.
//!
//! Validation errors are raised before the store is touched. Everything the
//! store raises is returned after its atomic unit was rolled back, so a
//! failed operation never leaves a partial effect behind.

use rust_decimal::Decimal;
use somon_shared::AppError;
use somon_shared::types::{AccountId, Currency, Money};
use thiserror::Error;

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    // ========== Validation Errors ==========
    /// Amount is zero, negative, finer than the stored scale or larger than
    /// a balance can hold.
    #[error(
        "Invalid amount {0}: must be positive, at most 9999999999999999.9999, \
         with at most 4 decimal places"
    )]
    InvalidAmount(Decimal),

    /// Exchange rate is zero or negative, or converts the amount into more
    /// than a balance can hold.
    #[error("Invalid exchange rate {0}: must be positive and yield a storable amount")]
    InvalidRate(Decimal),

    /// Sender and recipient are the same account.
    #[error("Cannot transfer to the same account")]
    SameAccount,

    /// Source and target currencies are the same.
    #[error("Cannot convert {0} into itself")]
    SameCurrency(Currency),

    // ========== Business Rule Errors ==========
    /// Balance does not cover the requested debit.
    #[error("Insufficient funds: available {available}, requested {requested}")]
    InsufficientFunds {
        /// Account that would have been debited.
        account_id: AccountId,
        /// Balance at the time of the check.
        available: Money,
        /// Amount that was requested.
        requested: Money,
    },

    /// Credit would push a balance past the largest storable amount.
    #[error("Balance limit exceeded: {balance} cannot take a further {credit}")]
    BalanceLimitExceeded {
        /// Balance before the credit.
        balance: Money,
        /// Amount that was to be credited.
        credit: Money,
    },

    // ========== Account Errors ==========
    /// Account not found.
    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),

    /// Another account already uses this email.
    #[error("Account with email {0} already exists")]
    DuplicateEmail(String),

    // ========== Infrastructure Errors ==========
    /// Backend failure. The operation was rolled back.
    #[error("Ledger store error: {0}")]
    Store(String),
}

impl LedgerError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidAmount(_) => "INVALID_AMOUNT",
            Self::InvalidRate(_) => "INVALID_RATE",
            Self::SameAccount => "SAME_ACCOUNT",
            Self::SameCurrency(_) => "SAME_CURRENCY",
            Self::InsufficientFunds { .. } => "INSUFFICIENT_FUNDS",
            Self::BalanceLimitExceeded { .. } => "BALANCE_LIMIT_EXCEEDED",
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::DuplicateEmail(_) => "EMAIL_TAKEN",
            Self::Store(_) => "STORE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - validation errors
            Self::InvalidAmount(_) | Self::InvalidRate(_) | Self::SameAccount | Self::SameCurrency(_) => {
                400
            }

            // 404 Not Found
            Self::AccountNotFound(_) => 404,

            // 409 Conflict
            Self::DuplicateEmail(_) => 409,

            // 422 Unprocessable Entity - business rule violations
            Self::InsufficientFunds { .. } | Self::BalanceLimitExceeded { .. } => 422,

            // 500 Internal Server Error
            Self::Store(_) => 500,
        }
    }

    /// Returns true if the input was rejected before reaching the store.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        self.http_status_code() == 400
    }
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        match &err {
            LedgerError::InvalidAmount(_)
            | LedgerError::InvalidRate(_)
            | LedgerError::SameAccount
            | LedgerError::SameCurrency(_) => Self::Validation(err.to_string()),
            LedgerError::InsufficientFunds { .. } | LedgerError::BalanceLimitExceeded { .. } => {
                Self::BusinessRule(err.to_string())
            }
            LedgerError::AccountNotFound(_) => Self::NotFound(err.to_string()),
            LedgerError::DuplicateEmail(_) => Self::Conflict(err.to_string()),
            LedgerError::Store(msg) => Self::Database(msg.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn insufficient() -> LedgerError {
        LedgerError::InsufficientFunds {
            account_id: AccountId::new(),
            available: Money::new(dec!(50), Currency::Tjs),
            requested: Money::new(dec!(80), Currency::Tjs),
        }
    }

    #[rstest]
    #[case(LedgerError::InvalidAmount(dec!(0)), 400, "INVALID_AMOUNT")]
    #[case(LedgerError::InvalidRate(dec!(-1)), 400, "INVALID_RATE")]
    #[case(LedgerError::SameAccount, 400, "SAME_ACCOUNT")]
    #[case(LedgerError::SameCurrency(Currency::Usd), 400, "SAME_CURRENCY")]
    #[case(insufficient(), 422, "INSUFFICIENT_FUNDS")]
    #[case(
        LedgerError::BalanceLimitExceeded {
            balance: Money::new(dec!(9999999999999999), Currency::Eur),
            credit: Money::new(dec!(1), Currency::Eur),
        },
        422,
        "BALANCE_LIMIT_EXCEEDED"
    )]
    #[case(LedgerError::AccountNotFound(AccountId::new()), 404, "ACCOUNT_NOT_FOUND")]
    #[case(LedgerError::DuplicateEmail("a@b.c".into()), 409, "EMAIL_TAKEN")]
    #[case(LedgerError::Store("connection reset".into()), 500, "STORE_ERROR")]
    fn test_status_and_code(#[case] err: LedgerError, #[case] status: u16, #[case] code: &str) {
        assert_eq!(err.http_status_code(), status);
        assert_eq!(err.error_code(), code);

        let app: AppError = err.into();
        assert_eq!(app.status_code(), status);
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            insufficient().to_string(),
            "Insufficient funds: available 50 TJS, requested 80 TJS"
        );
        assert_eq!(
            LedgerError::DuplicateEmail("ali@example.com".into()).to_string(),
            "Account with email ali@example.com already exists"
        );
    }

    #[test]
    fn test_is_validation() {
        assert!(LedgerError::SameAccount.is_validation());
        assert!(!insufficient().is_validation());
        assert!(!LedgerError::Store(String::new()).is_validation());
    }
}
