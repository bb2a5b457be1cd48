//! Transaction history records.
//!
//! One record is appended per side effect on one account. Records are never
//! updated or deleted.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use somon_shared::types::{AccountId, Currency, Money, TransactionRecordId};

/// What kind of operation produced a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    /// Money entering the system.
    Deposit,
    /// One side of a transfer between two accounts.
    Transfer,
    /// Exchange between two balances of one account.
    Conversion,
}

impl TransactionKind {
    /// Returns the stored string form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Deposit => "deposit",
            Self::Transfer => "transfer",
            Self::Conversion => "conversion",
        }
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TransactionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "deposit" => Ok(Self::Deposit),
            "transfer" => Ok(Self::Transfer),
            "conversion" => Ok(Self::Conversion),
            _ => Err(format!("Unknown transaction kind: {s}")),
        }
    }
}

/// An immutable history entry for one account.
///
/// `amount` is signed: positive credits the account, negative debits it.
/// Conversions are the exception and record the debited amount unsigned in
/// the source currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// Record ID.
    pub id: TransactionRecordId,
    /// Account this record belongs to.
    pub account_id: AccountId,
    /// Operation that produced the record.
    pub kind: TransactionKind,
    /// Signed amount.
    pub amount: Decimal,
    /// Currency of `amount`.
    pub currency: Currency,
    /// Human-readable description.
    pub description: String,
    /// When the record was committed.
    pub created_at: DateTime<Utc>,
}

impl TransactionRecord {
    fn new(
        account_id: AccountId,
        kind: TransactionKind,
        amount: Decimal,
        currency: Currency,
        description: String,
    ) -> Self {
        Self {
            id: TransactionRecordId::new(),
            account_id,
            kind,
            amount,
            currency,
            description,
            created_at: Utc::now(),
        }
    }

    /// Home-currency deposit of `amount`.
    #[must_use]
    pub fn deposit(account_id: AccountId, amount: Decimal) -> Self {
        Self::new(
            account_id,
            TransactionKind::Deposit,
            amount,
            Currency::HOME,
            "Deposit".to_string(),
        )
    }

    /// Sender side of a transfer.
    #[must_use]
    pub fn transfer_out(sender: AccountId, amount: Decimal, recipient_name: &str) -> Self {
        Self::new(
            sender,
            TransactionKind::Transfer,
            -amount,
            Currency::HOME,
            format!("Transfer to {recipient_name}"),
        )
    }

    /// Recipient side of a transfer.
    #[must_use]
    pub fn transfer_in(recipient: AccountId, amount: Decimal, sender_name: &str) -> Self {
        Self::new(
            recipient,
            TransactionKind::Transfer,
            amount,
            Currency::HOME,
            format!("Received from {sender_name}"),
        )
    }

    /// Conversion of `amount` of `from` into `to`.
    #[must_use]
    pub fn conversion(account_id: AccountId, from: Currency, to: Currency, amount: Decimal) -> Self {
        Self::new(
            account_id,
            TransactionKind::Conversion,
            amount,
            from,
            format!("Conversion to {to}"),
        )
    }

    /// Returns the amount as [`Money`].
    #[must_use]
    pub const fn money(&self) -> Money {
        Money::new(self.amount, self.currency)
    }
}
