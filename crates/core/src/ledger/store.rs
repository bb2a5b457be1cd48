//! Persistence capability for the ledger.

use rust_decimal::Decimal;
use somon_shared::types::{AccountId, PageRequest, PageResponse};

use super::error::LedgerError;
use super::transaction::TransactionRecord;
use super::types::{
    Account, ConversionPosting, ConversionReceipt, NewAccount, Recipient, TransferPosting,
    TransferReceipt,
};

/// Durable account balances and append-only history.
///
/// Each `apply_*` method is one atomic unit: the balance check, every
/// balance change and every appended record commit together or not at all.
/// Concurrent calls touching the same account are serialized, so a balance
/// checked inside the unit is still the balance when it is written.
pub trait LedgerStore: Send + Sync {
    /// Opens an account.
    ///
    /// Fails with [`LedgerError::DuplicateEmail`] if the email is taken,
    /// including when a concurrent call takes it first.
    fn create_account(
        &self,
        input: NewAccount,
    ) -> impl std::future::Future<Output = Result<Account, LedgerError>> + Send;

    /// Loads an account by id.
    fn find_account(
        &self,
        id: AccountId,
    ) -> impl std::future::Future<Output = Result<Option<Account>, LedgerError>> + Send;

    /// Loads an account by its normalized email.
    fn find_account_by_email(
        &self,
        email: &str,
    ) -> impl std::future::Future<Output = Result<Option<Account>, LedgerError>> + Send;

    /// Lists every account other than `exclude`, ordered by name.
    fn list_recipients(
        &self,
        exclude: AccountId,
    ) -> impl std::future::Future<Output = Result<Vec<Recipient>, LedgerError>> + Send;

    /// Lists an account's history, newest first.
    fn list_transactions(
        &self,
        account_id: AccountId,
        page: PageRequest,
    ) -> impl std::future::Future<Output = Result<PageResponse<TransactionRecord>, LedgerError>> + Send;

    /// Credits the home-currency balance and appends one deposit record.
    fn apply_deposit(
        &self,
        account_id: AccountId,
        amount: Decimal,
    ) -> impl std::future::Future<Output = Result<TransactionRecord, LedgerError>> + Send;

    /// Moves home currency between two accounts and appends one record to
    /// each history.
    ///
    /// Fails with [`LedgerError::InsufficientFunds`] if the sender's balance
    /// does not cover the amount at the moment it is locked.
    fn apply_transfer(
        &self,
        posting: TransferPosting,
    ) -> impl std::future::Future<Output = Result<TransferReceipt, LedgerError>> + Send;

    /// Debits one balance, credits another and appends one conversion record.
    ///
    /// Fails with [`LedgerError::InsufficientFunds`] if the source balance
    /// does not cover the amount at the moment it is locked.
    fn apply_conversion(
        &self,
        posting: ConversionPosting,
    ) -> impl std::future::Future<Output = Result<ConversionReceipt, LedgerError>> + Send;
}
