//! Per-currency account balances.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use somon_shared::types::{Currency, Money};

use super::error::LedgerError;
use crate::currency::MAX_AMOUNT;

/// Balances of one account, one slot per supported currency.
///
/// Every committed operation leaves each slot at zero or above.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balances {
    /// Somoni balance.
    #[serde(rename = "TJS")]
    pub tjs: Decimal,
    /// Dollar balance.
    #[serde(rename = "USD")]
    pub usd: Decimal,
    /// Euro balance.
    #[serde(rename = "EUR")]
    pub eur: Decimal,
}

impl Balances {
    /// Balances of a freshly opened account: `grant` in the home currency.
    #[must_use]
    pub fn opening(grant: Decimal) -> Self {
        let mut balances = Self::default();
        balances.set(Currency::HOME, grant);
        balances
    }

    /// Returns the balance held in `currency`.
    #[must_use]
    pub const fn get(&self, currency: Currency) -> Decimal {
        match currency {
            Currency::Tjs => self.tjs,
            Currency::Usd => self.usd,
            Currency::Eur => self.eur,
        }
    }

    /// Returns the balance held in `currency` as [`Money`].
    #[must_use]
    pub const fn money(&self, currency: Currency) -> Money {
        Money::new(self.get(currency), currency)
    }

    /// Overwrites the balance held in `currency`.
    pub fn set(&mut self, currency: Currency, amount: Decimal) {
        *self.slot_mut(currency) = amount;
    }

    /// Adds `amount` to the balance in `currency`.
    ///
    /// Nothing changes if the result would exceed [`MAX_AMOUNT`].
    pub fn credit(&mut self, currency: Currency, amount: Decimal) -> Result<(), LedgerError> {
        let current = self.get(currency);
        let next = current
            .checked_add(amount)
            .filter(|next| *next <= MAX_AMOUNT)
            .ok_or(LedgerError::BalanceLimitExceeded {
                balance: Money::new(current, currency),
                credit: Money::new(amount, currency),
            })?;

        self.set(currency, next);
        Ok(())
    }

    /// Subtracts `amount` from the balance in `currency`.
    ///
    /// Callers check [`Balances::covers`] first; this does not.
    pub fn debit(&mut self, currency: Currency, amount: Decimal) {
        *self.slot_mut(currency) -= amount;
    }

    /// Returns true if the balance in `currency` is at least `amount`.
    #[must_use]
    pub fn covers(&self, currency: Currency, amount: Decimal) -> bool {
        self.get(currency) >= amount
    }

    /// Returns true if no slot is negative.
    #[must_use]
    pub fn is_non_negative(&self) -> bool {
        Currency::ALL
            .iter()
            .all(|c| self.get(*c) >= Decimal::ZERO)
    }

    fn slot_mut(&mut self, currency: Currency) -> &mut Decimal {
        match currency {
            Currency::Tjs => &mut self.tjs,
            Currency::Usd => &mut self.usd,
            Currency::Eur => &mut self.eur,
        }
    }
}
