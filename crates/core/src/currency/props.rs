//! Property-based tests for currency conversion and rate resolution.
//!
//! - Converted amounts carry at most 4 decimal places
//! - A currency converted into itself resolves to 1 without a source call
//! - Every resolved rate is positive when the source prices are positive

use proptest::prelude::*;
use rust_decimal::Decimal;
use somon_shared::types::Currency;

use super::conversion::{MAX_AMOUNT, convert_amount, round_amount};
use super::resolver::tests::FixedPrices;
use super::resolver::{PivotConfig, RateResolver};

/// Strategy to generate positive decimal amounts (0.0001 to 1,000,000.0000).
fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..10_000_000_000i64).prop_map(|units| Decimal::new(units, 4))
}

/// Strategy to generate positive exchange rates (0.000001 to 10000).
fn positive_rate() -> impl Strategy<Value = Decimal> {
    (1i64..10_000_000_000i64).prop_map(|v| Decimal::new(v, 6))
}

fn any_currency() -> impl Strategy<Value = Currency> {
    prop::sample::select(Currency::ALL.to_vec())
}

fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap()
        .block_on(future)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Conversion result is always rounded to 4 decimal places.
    #[test]
    fn prop_convert_rounds_to_4_decimals(
        amount in positive_amount(),
        rate in positive_rate(),
    ) {
        let result = convert_amount(amount, rate).unwrap();
        prop_assert!(result.scale() <= 4, "{} has more than 4 decimal places", result);
    }

    /// Converting at rate 1 keeps the amount.
    #[test]
    fn prop_unit_rate_preserves_amount(amount in positive_amount()) {
        prop_assert_eq!(convert_amount(amount, Decimal::ONE), Some(round_amount(amount)));
    }

    /// Conversion never produces a negative amount.
    #[test]
    fn prop_conversion_is_non_negative(
        amount in positive_amount(),
        rate in positive_rate(),
    ) {
        prop_assert!(convert_amount(amount, rate).unwrap() >= Decimal::ZERO);
    }

    /// Scaling past the storable maximum never panics; it is refused.
    #[test]
    fn prop_conversion_past_max_is_refused(amount in positive_amount()) {
        let rate = (MAX_AMOUNT / amount) + Decimal::ONE;
        prop_assert_eq!(convert_amount(amount, rate), None);
    }

    /// resolve(X, X) = 1 and the source is never asked.
    #[test]
    fn prop_identity_rate_without_source_call(currency in any_currency()) {
        let resolver = RateResolver::new(FixedPrices::default(), PivotConfig::default());
        let quote = block_on(resolver.resolve(currency, currency)).unwrap();

        prop_assert_eq!(quote.rate, Decimal::ONE);
        prop_assert_eq!(quote.from, quote.to);
    }

    /// Any pair resolves to a positive rate when every price is positive.
    #[test]
    fn prop_resolved_rates_are_positive(
        from in any_currency(),
        to in any_currency(),
        usd in positive_rate(),
        eur in positive_rate(),
    ) {
        let source = FixedPrices::new(&[(Currency::Usd, usd), (Currency::Eur, eur)]);
        let resolver = RateResolver::new(source, PivotConfig::default());
        let quote = block_on(resolver.resolve(from, to)).unwrap();

        prop_assert!(quote.rate > Decimal::ZERO, "{} -> {} resolved to {}", from, to, quote.rate);
    }
}
