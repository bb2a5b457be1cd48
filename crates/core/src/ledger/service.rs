//! Ledger service: validates and commits balance-moving operations.
//!
//! The service holds no state of its own. Every operation validates its
//! input, then commits through exactly one atomic [`LedgerStore`] call.

use std::sync::Arc;

use rust_decimal::Decimal;
use somon_shared::types::{AccountId, Currency, PageRequest, PageResponse};
use tracing::{error, info, warn};

use super::error::LedgerError;
use super::store::LedgerStore;
use super::transaction::TransactionRecord;
use super::types::{
    Account, ConversionPosting, ConversionReceipt, Recipient, TransferPosting, TransferReceipt,
};
use super::validation::{validate_amount, validate_rate};
use crate::currency::convert_amount;

/// Account ledger engine.
#[derive(Debug)]
pub struct LedgerService<S: LedgerStore> {
    store: Arc<S>,
}

impl<S: LedgerStore> Clone for LedgerService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: LedgerStore> LedgerService<S> {
    /// Creates a service over the given store.
    pub const fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Credits `amount` of the home currency to an account.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::InvalidAmount`] if `amount` is not positive
    /// - [`LedgerError::AccountNotFound`] if the account does not exist
    /// - [`LedgerError::BalanceLimitExceeded`] if the balance would exceed
    ///   the largest storable amount
    pub async fn deposit(
        &self,
        account_id: AccountId,
        amount: Decimal,
    ) -> Result<TransactionRecord, LedgerError> {
        let amount = validate_amount(amount)?;

        let record = self
            .store
            .apply_deposit(account_id, amount)
            .await
            .inspect_err(|e| log_failure("deposit", account_id, e))?;

        info!(%account_id, %amount, "deposit committed");
        Ok(record)
    }

    /// Moves `amount` of the home currency from one account to another.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::InvalidAmount`] if `amount` is not positive
    /// - [`LedgerError::SameAccount`] if sender and recipient are the same
    /// - [`LedgerError::AccountNotFound`] if either account does not exist
    /// - [`LedgerError::InsufficientFunds`] if the sender cannot cover it
    pub async fn transfer(
        &self,
        from: AccountId,
        to: AccountId,
        amount: Decimal,
    ) -> Result<TransferReceipt, LedgerError> {
        let amount = validate_amount(amount)?;
        if from == to {
            return Err(LedgerError::SameAccount);
        }

        let receipt = self
            .store
            .apply_transfer(TransferPosting { from, to, amount })
            .await
            .inspect_err(|e| log_failure("transfer", from, e))?;

        info!(%from, %to, %amount, "transfer committed");
        Ok(receipt)
    }

    /// Converts `amount` of `from` into `to` at the caller-supplied `rate`.
    ///
    /// The credited amount is rounded to 4 decimal places with banker's
    /// rounding.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::InvalidAmount`] if `amount` is not positive
    /// - [`LedgerError::InvalidRate`] if `rate` is not positive or the
    ///   converted amount is larger than a balance can hold
    /// - [`LedgerError::SameCurrency`] if `from` equals `to`
    /// - [`LedgerError::AccountNotFound`] if the account does not exist
    /// - [`LedgerError::InsufficientFunds`] if the `from` balance cannot cover it
    pub async fn convert_currency(
        &self,
        account_id: AccountId,
        from: Currency,
        to: Currency,
        amount: Decimal,
        rate: Decimal,
    ) -> Result<ConversionReceipt, LedgerError> {
        let amount = validate_amount(amount)?;
        let rate = validate_rate(rate)?;
        if from == to {
            return Err(LedgerError::SameCurrency(from));
        }

        let credit = convert_amount(amount, rate).ok_or(LedgerError::InvalidRate(rate))?;

        let posting = ConversionPosting {
            account_id,
            from,
            to,
            amount,
            credit,
            rate,
        };

        let receipt = self
            .store
            .apply_conversion(posting)
            .await
            .inspect_err(|e| log_failure("conversion", account_id, e))?;

        info!(
            %account_id,
            debited = %receipt.debited,
            credited = %receipt.credited,
            %rate,
            "conversion committed"
        );
        Ok(receipt)
    }

    /// Loads an account with its current balances.
    pub async fn get_balance(&self, account_id: AccountId) -> Result<Account, LedgerError> {
        self.store
            .find_account(account_id)
            .await?
            .ok_or(LedgerError::AccountNotFound(account_id))
    }

    /// Lists an account's history, newest first.
    pub async fn get_transactions(
        &self,
        account_id: AccountId,
        page: PageRequest,
    ) -> Result<PageResponse<TransactionRecord>, LedgerError> {
        self.get_balance(account_id).await?;
        self.store
            .list_transactions(account_id, page.normalized())
            .await
    }

    /// Lists every other account as a possible transfer recipient.
    pub async fn list_recipients(&self, account_id: AccountId) -> Result<Vec<Recipient>, LedgerError> {
        self.get_balance(account_id).await?;
        self.store.list_recipients(account_id).await
    }
}

fn log_failure(operation: &'static str, account_id: AccountId, err: &LedgerError) {
    if err.http_status_code() >= 500 {
        error!(operation, %account_id, error = %err, "ledger operation failed");
    } else {
        warn!(operation, %account_id, error = %err, "ledger operation rejected");
    }
}
