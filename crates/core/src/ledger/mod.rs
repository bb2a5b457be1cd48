//! Account ledger: balances, history and the operations that move money.
//!
//! This module implements the core ledger functionality:
//! - Per-currency account balances
//! - Append-only transaction history
//! - Input validation for amounts and rates
//! - The `LedgerStore` capability every backend implements
//! - `LedgerService`, which validates and commits each operation atomically
//! - An in-memory store with the same guarantees for tests and demos

pub mod balance;
pub mod error;
pub mod memory;
pub mod service;
pub mod store;
pub mod transaction;
pub mod types;
pub mod validation;

#[cfg(test)]
mod service_props;
#[cfg(test)]
mod validation_props;

pub use balance::Balances;
pub use error::LedgerError;
pub use memory::InMemoryLedgerStore;
pub use service::LedgerService;
pub use store::LedgerStore;
pub use transaction::{TransactionKind, TransactionRecord};
pub use types::{
    Account, ConversionPosting, ConversionReceipt, NewAccount, Recipient, TransferPosting,
    TransferReceipt,
};
pub use validation::{validate_amount, validate_rate};
