//! Multi-currency handling and exchange rate resolution.
//!
//! Rates between two currencies are resolved through a [`RateResolver`]:
//! the home currency is bridged to a reference currency with a fixed peg,
//! everything else is quoted by an external [`RateSource`].

pub mod conversion;
pub mod error;
pub mod exchange;
pub mod open_exchange;
pub mod resolver;
pub mod source;

#[cfg(test)]
mod props;

pub use conversion::{AMOUNT_SCALE, MAX_AMOUNT, convert_amount, round_amount};
pub use error::RateError;
pub use exchange::{ConversionQuote, RateQuote};
pub use open_exchange::{OpenExchangeRatesClient, RateSourceConfig};
pub use resolver::{PivotConfig, RateResolver};
pub use source::RateSource;
