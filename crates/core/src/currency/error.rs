//! Exchange rate resolution errors.

use rust_decimal::Decimal;
use somon_shared::AppError;
use somon_shared::types::Currency;
use thiserror::Error;

/// Errors that can occur while resolving an exchange rate.
///
/// None of these ever touch a balance.
#[derive(Debug, Error)]
pub enum RateError {
    /// The source has no usable price for one of the currencies.
    #[error("No exchange rate available for {from} to {to}")]
    Unavailable {
        /// Source currency.
        from: Currency,
        /// Target currency.
        to: Currency,
    },

    /// The converted amount would not fit a balance.
    #[error("Converting {amount} {from} to {to} exceeds the largest storable amount")]
    OutOfRange {
        /// Amount of the source currency.
        amount: Decimal,
        /// Source currency.
        from: Currency,
        /// Target currency.
        to: Currency,
    },

    /// The rate source could not be reached or answered with garbage.
    #[error("Exchange rate source failed: {0}")]
    Source(String),

    /// The rate source or pivot is misconfigured.
    #[error("Exchange rate configuration error: {0}")]
    Configuration(String),
}

impl RateError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Unavailable { .. } => "RATE_UNAVAILABLE",
            Self::OutOfRange { .. } => "AMOUNT_OUT_OF_RANGE",
            Self::Source(_) => "RATE_SOURCE_ERROR",
            Self::Configuration(_) => "CONFIGURATION_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::Unavailable { .. } | Self::OutOfRange { .. } => 422,
            Self::Source(_) => 502,
            Self::Configuration(_) => 500,
        }
    }
}

impl From<RateError> for AppError {
    fn from(err: RateError) -> Self {
        match err {
            RateError::Unavailable { .. } | RateError::OutOfRange { .. } => {
                Self::BusinessRule(err.to_string())
            }
            RateError::Source(msg) => Self::ExternalService(msg),
            RateError::Configuration(msg) => Self::Internal(msg),
        }
    }
}
