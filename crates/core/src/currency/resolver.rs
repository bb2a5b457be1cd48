//! Exchange rate resolution through a pegged home currency.
//!
//! The home currency has no market quote of its own. It is pegged to a
//! reference currency with a fixed factor and every other pair is asked of
//! the external [`RateSource`]:
//!
//! | from  | to    | rate                              |
//! |-------|-------|-----------------------------------|
//! | X     | X     | 1 (no source call)                |
//! | pivot | Y     | `factor * market(reference, Y)`   |
//! | X     | pivot | `market(X, reference) / factor`   |
//! | X     | Y     | `market(X, Y)`                    |
//!
//! Every `market` lookup goes to the source, including
//! `market(reference, reference)`, so pivot to reference fails like any
//! other pair when the source is not configured.
//!
//! The two pivot paths are not reciprocal once the market moves. That is
//! accepted: a quote is only ever used in the direction it was asked for.

use rust_decimal::Decimal;
use somon_shared::config::RatesConfig;
use somon_shared::types::Currency;
use tracing::debug;

use super::error::RateError;
use super::exchange::{ConversionQuote, RateQuote};
use super::source::RateSource;

/// Peg between the home currency and a market-quoted reference currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PivotConfig {
    pivot: Currency,
    reference: Currency,
    factor: Decimal,
    reverse_factor: Decimal,
}

impl PivotConfig {
    /// Creates a peg where one `pivot` is worth `factor` units of `reference`.
    pub fn new(pivot: Currency, reference: Currency, factor: Decimal) -> Result<Self, RateError> {
        if pivot == reference {
            return Err(RateError::Configuration(format!(
                "pivot and reference currency are both {pivot}"
            )));
        }
        if factor <= Decimal::ZERO {
            return Err(RateError::Configuration(format!(
                "pivot factor must be positive, got {factor}"
            )));
        }

        let reverse_factor = Decimal::ONE
            .checked_div(factor)
            .ok_or_else(|| RateError::Configuration(format!("pivot factor {factor} has no inverse")))?;

        Ok(Self {
            pivot,
            reference,
            factor,
            reverse_factor,
        })
    }

    /// The pegged home currency.
    #[must_use]
    pub const fn pivot(&self) -> Currency {
        self.pivot
    }

    /// The currency the pivot is pegged against.
    #[must_use]
    pub const fn reference(&self) -> Currency {
        self.reference
    }

    /// Units of reference per one pivot.
    #[must_use]
    pub const fn factor(&self) -> Decimal {
        self.factor
    }

    /// Units of pivot per one reference.
    #[must_use]
    pub const fn reverse_factor(&self) -> Decimal {
        self.reverse_factor
    }
}

impl Default for PivotConfig {
    /// TJS pegged at 0.092 USD.
    fn default() -> Self {
        let factor = Decimal::new(92, 3);
        Self {
            pivot: Currency::Tjs,
            reference: Currency::Usd,
            factor,
            reverse_factor: Decimal::ONE / factor,
        }
    }
}

impl TryFrom<&RatesConfig> for PivotConfig {
    type Error = RateError;

    fn try_from(config: &RatesConfig) -> Result<Self, Self::Error> {
        Self::new(config.pivot, config.reference, config.pivot_factor)
    }
}

/// Resolves exchange rates between any two supported currencies.
#[derive(Debug, Clone)]
pub struct RateResolver<S: RateSource> {
    source: S,
    pivot: PivotConfig,
}

impl<S: RateSource> RateResolver<S> {
    /// Creates a resolver over the given source.
    pub const fn new(source: S, pivot: PivotConfig) -> Self {
        Self { source, pivot }
    }

    /// Returns the peg this resolver bridges the home currency with.
    pub const fn pivot(&self) -> &PivotConfig {
        &self.pivot
    }

    /// Resolves the rate for converting `from` into `to`.
    ///
    /// # Errors
    ///
    /// - [`RateError::Unavailable`] if the source has no positive price for
    ///   one of the currencies involved
    /// - [`RateError::Source`] if the source call fails
    /// - [`RateError::Configuration`] if the source is not configured
    pub async fn resolve(&self, from: Currency, to: Currency) -> Result<RateQuote, RateError> {
        let pivot = self.pivot.pivot;
        let reference = self.pivot.reference;

        let rate = if from == to {
            Decimal::ONE
        } else if from == pivot {
            let market = self.market_rate(reference, to).await?;
            positive_product(self.pivot.factor, market, from, to)?
        } else if to == pivot {
            let market = self.market_rate(from, reference).await?;
            positive_product(market, self.pivot.reverse_factor, from, to)?
        } else {
            self.market_rate(from, to).await?
        };

        debug!(%from, %to, %rate, "resolved exchange rate");
        Ok(RateQuote::new(from, to, rate))
    }

    /// Resolves a rate and previews converting `amount` with it.
    ///
    /// Nothing is debited or credited.
    pub async fn quote_conversion(
        &self,
        from: Currency,
        to: Currency,
        amount: Decimal,
    ) -> Result<ConversionQuote, RateError> {
        self.resolve(from, to).await?.apply(amount)
    }

    /// Market rate between two non-pivot currencies, always read from the
    /// source. Pivot paths land here with the reference on one side, which
    /// may also be the other side (TJS to USD asks the source for USD/USD).
    async fn market_rate(&self, from: Currency, to: Currency) -> Result<Decimal, RateError> {
        let prices = self.source.latest_prices(from, to).await?;
        let price = |currency: Currency| {
            prices
                .get(currency.code())
                .copied()
                .filter(|p| *p > Decimal::ZERO)
                .ok_or(RateError::Unavailable { from, to })
        };

        let from_price = price(from)?;
        let to_price = price(to)?;

        to_price
            .checked_div(from_price)
            .filter(|rate| *rate > Decimal::ZERO)
            .ok_or(RateError::Unavailable { from, to })
    }
}

fn positive_product(
    a: Decimal,
    b: Decimal,
    from: Currency,
    to: Currency,
) -> Result<Decimal, RateError> {
    a.checked_mul(b)
        .filter(|rate| *rate > Decimal::ZERO)
        .ok_or(RateError::Unavailable { from, to })
}
