//! Validation rules for ledger inputs.
//!
//! These run before any store access; a rejected input never reaches the
//! database.

use rust_decimal::Decimal;

use super::error::LedgerError;
use crate::currency::{AMOUNT_SCALE, MAX_AMOUNT};

/// Validates a monetary amount.
///
/// The amount must be strictly positive, no larger than [`MAX_AMOUNT`] and
/// representable at the stored scale (trailing zeros do not count).
pub fn validate_amount(amount: Decimal) -> Result<Decimal, LedgerError> {
    if amount <= Decimal::ZERO
        || amount > MAX_AMOUNT
        || amount.normalize().scale() > AMOUNT_SCALE
    {
        return Err(LedgerError::InvalidAmount(amount));
    }
    Ok(amount)
}

/// Validates an exchange rate. It must be strictly positive.
pub fn validate_rate(rate: Decimal) -> Result<Decimal, LedgerError> {
    if rate <= Decimal::ZERO {
        return Err(LedgerError::InvalidRate(rate));
    }
    Ok(rate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[rstest]
    #[case(dec!(0.0001))]
    #[case(dec!(1))]
    #[case(dec!(100.50))]
    #[case(dec!(12.340000))]
    #[case(dec!(9999999999999999.9999))]
    fn test_accepts_positive_amounts(#[case] amount: Decimal) {
        assert_eq!(validate_amount(amount).unwrap(), amount);
    }

    #[rstest]
    #[case(dec!(0))]
    #[case(dec!(-0.01))]
    #[case(dec!(-100))]
    #[case(dec!(0.00001))]
    #[case(dec!(1.23456))]
    #[case(dec!(10000000000000000))]
    #[case(dec!(10000000000000000.0000))]
    #[case(Decimal::MAX)]
    fn test_rejects_invalid_amounts(#[case] amount: Decimal) {
        assert!(matches!(
            validate_amount(amount),
            Err(LedgerError::InvalidAmount(a)) if a == amount
        ));
    }

    #[test]
    fn test_rate_must_be_positive() {
        assert!(validate_rate(dec!(0.9)).is_ok());
        assert!(validate_rate(dec!(0.0000001)).is_ok());
        assert!(matches!(validate_rate(dec!(0)), Err(LedgerError::InvalidRate(_))));
        assert!(matches!(validate_rate(dec!(-1.5)), Err(LedgerError::InvalidRate(_))));
    }
}
