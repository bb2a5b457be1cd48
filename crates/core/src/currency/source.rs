//! Exchange rate source capability.

use std::collections::HashMap;

use rust_decimal::Decimal;
use somon_shared::types::Currency;

use super::error::RateError;

/// A provider of current market prices.
///
/// Implementations return a mapping from ISO 4217 code to the price of that
/// currency relative to the provider's own base. Only the ratio between two
/// entries is meaningful.
pub trait RateSource: Send + Sync {
    /// Fetches the latest prices for the two currencies.
    ///
    /// A code missing from the returned map is not an error here; the caller
    /// decides what an absent price means.
    fn latest_prices(
        &self,
        from: Currency,
        to: Currency,
    ) -> impl std::future::Future<Output = Result<HashMap<String, Decimal>, RateError>> + Send;
}
