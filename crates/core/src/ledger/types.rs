//! Domain types for ledger operations.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use somon_shared::auth::AccountSummary;
use somon_shared::types::{AccountId, Currency, Money};

use super::balance::Balances;
use super::transaction::TransactionRecord;

/// A customer account with its balances.
#[derive(Debug, Clone, Serialize)]
pub struct Account {
    /// Account ID.
    pub id: AccountId,
    /// Display name.
    pub name: String,
    /// Login email, unique across accounts.
    pub email: String,
    /// Argon2 PHC string. Never serialized.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Current balances.
    pub balances: Balances,
    /// When the account was opened.
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// Returns the balance held in `currency`.
    #[must_use]
    pub const fn balance(&self, currency: Currency) -> Money {
        self.balances.money(currency)
    }

    /// Returns the public identity of this account.
    #[must_use]
    pub fn summary(&self) -> AccountSummary {
        AccountSummary {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
        }
    }
}

/// Input for opening an account.
#[derive(Debug, Clone)]
pub struct NewAccount {
    /// Display name.
    pub name: String,
    /// Login email, already normalized.
    pub email: String,
    /// Argon2 PHC string.
    pub password_hash: String,
    /// Home-currency balance the account starts with.
    pub opening_balance: Decimal,
}

/// Another account that can receive a transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recipient {
    /// Account ID.
    pub id: AccountId,
    /// Display name.
    pub name: String,
}

/// A validated transfer, ready for the store.
#[derive(Debug, Clone, Copy)]
pub struct TransferPosting {
    /// Account debited.
    pub from: AccountId,
    /// Account credited.
    pub to: AccountId,
    /// Positive home-currency amount.
    pub amount: Decimal,
}

/// A validated conversion, ready for the store.
#[derive(Debug, Clone, Copy)]
pub struct ConversionPosting {
    /// Account converting.
    pub account_id: AccountId,
    /// Currency debited.
    pub from: Currency,
    /// Currency credited.
    pub to: Currency,
    /// Positive amount of `from` to debit.
    pub amount: Decimal,
    /// Amount of `to` to credit, already rounded.
    pub credit: Decimal,
    /// Rate `credit` was computed with.
    pub rate: Decimal,
}

/// Result of a committed transfer.
#[derive(Debug, Clone, Serialize)]
pub struct TransferReceipt {
    /// Record appended to the sender's history.
    pub sent: TransactionRecord,
    /// Record appended to the recipient's history.
    pub received: TransactionRecord,
}

/// Result of a committed conversion.
#[derive(Debug, Clone, Serialize)]
pub struct ConversionReceipt {
    /// Record appended to the account's history.
    pub record: TransactionRecord,
    /// Amount taken from the source balance.
    pub debited: Money,
    /// Amount added to the target balance.
    pub credited: Money,
    /// Rate applied.
    pub rate: Decimal,
}
