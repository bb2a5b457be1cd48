//! Property-based tests for ledger input validation.

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::error::LedgerError;
use super::validation::{validate_amount, validate_rate};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Every positive amount at the stored scale is accepted unchanged.
    #[test]
    fn prop_positive_amounts_accepted(units in 1i64..i64::MAX, scale in 0u32..=4) {
        let amount = Decimal::new(units, scale);
        prop_assert_eq!(validate_amount(amount).unwrap(), amount);
    }

    /// Zero and negative amounts are always rejected.
    #[test]
    fn prop_non_positive_amounts_rejected(units in i64::MIN..=0i64, scale in 0u32..=4) {
        let amount = Decimal::new(units, scale);
        let rejected = matches!(validate_amount(amount), Err(LedgerError::InvalidAmount(_)));
        prop_assert!(rejected);
    }

    /// A rate passes exactly when it is positive.
    #[test]
    fn prop_rate_accepted_iff_positive(units in any::<i64>(), scale in 0u32..=10) {
        let rate = Decimal::new(units, scale);
        prop_assert_eq!(validate_rate(rate).is_ok(), rate > Decimal::ZERO);
    }
}
