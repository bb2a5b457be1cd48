//! Exchange rate quote types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use somon_shared::types::Currency;

use super::conversion::convert_amount;
use super::error::RateError;

/// Exchange rate between two currencies at the moment it was resolved.
///
/// Quotes are never persisted. The rate is `units of to / one unit of from`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateQuote {
    /// Source currency.
    pub from: Currency,
    /// Target currency.
    pub to: Currency,
    /// Exchange rate (1 `from` = rate `to`).
    pub rate: Decimal,
    /// When the quote was resolved.
    pub quoted_at: DateTime<Utc>,
}

impl RateQuote {
    /// Creates a quote stamped with the current time.
    #[must_use]
    pub fn new(from: Currency, to: Currency, rate: Decimal) -> Self {
        Self {
            from,
            to,
            rate,
            quoted_at: Utc::now(),
        }
    }

    /// Applies the quote to an amount of the source currency.
    ///
    /// # Errors
    ///
    /// [`RateError::OutOfRange`] if the converted amount would not fit a
    /// balance.
    pub fn apply(&self, amount: Decimal) -> Result<ConversionQuote, RateError> {
        let converted = convert_amount(amount, self.rate).ok_or(RateError::OutOfRange {
            amount,
            from: self.from,
            to: self.to,
        })?;

        Ok(ConversionQuote {
            from: self.from,
            to: self.to,
            rate: self.rate,
            amount,
            converted,
            quoted_at: self.quoted_at,
        })
    }
}

/// Preview of a conversion: what `amount` would turn into at `rate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionQuote {
    /// Source currency.
    pub from: Currency,
    /// Target currency.
    pub to: Currency,
    /// Rate the preview was computed with.
    pub rate: Decimal,
    /// Amount of the source currency.
    pub amount: Decimal,
    /// Amount of the target currency, rounded to the stored scale.
    pub converted: Decimal,
    /// When the underlying rate was resolved.
    pub quoted_at: DateTime<Utc>,
}
