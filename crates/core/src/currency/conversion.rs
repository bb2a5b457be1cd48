//! Currency conversion logic.
//!
//! CRITICAL: Rounding strategy for multi-currency:
//! - Balances are stored with 4 decimal places
//! - Use banker's rounding (round half to even)

use rust_decimal::Decimal;
use rust_decimal::RoundingStrategy;

/// Number of decimal places every stored amount carries.
pub const AMOUNT_SCALE: u32 = 4;

/// Largest amount a balance column can hold: `NUMERIC(20,4)`, so
/// 9999999999999999.9999.
pub const MAX_AMOUNT: Decimal =
    Decimal::from_parts(0x630F_FFFF, 0x6BC7_5E2D, 0x5, false, AMOUNT_SCALE);

/// Converts an amount using the given exchange rate.
///
/// The result is rounded to [`AMOUNT_SCALE`] places with banker's rounding
/// (round half to even) to minimize cumulative errors. Returns `None` if
/// the product overflows or rounds to more than [`MAX_AMOUNT`].
///
/// # Example
///
/// ```
/// use rust_decimal_macros::dec;
/// use somon_core::currency::convert_amount;
///
/// assert_eq!(convert_amount(dec!(100), dec!(0.9)), Some(dec!(90.0000)));
/// ```
#[must_use]
pub fn convert_amount(amount: Decimal, rate: Decimal) -> Option<Decimal> {
    amount
        .checked_mul(rate)
        .map(round_amount)
        .filter(|converted| *converted <= MAX_AMOUNT)
}

/// Rounds a value to the stored amount scale using banker's rounding.
#[must_use]
pub fn round_amount(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(AMOUNT_SCALE, RoundingStrategy::MidpointNearestEven)
}
