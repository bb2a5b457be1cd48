//! In-memory ledger store.
//!
//! All state sits behind one mutex, so every operation is serialized and
//! trivially atomic: checks and writes happen under the same guard and
//! nothing is written until every check has passed.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use rust_decimal::Decimal;
use somon_shared::types::{AccountId, Currency, Money, PageRequest, PageResponse};

use super::balance::Balances;
use super::error::LedgerError;
use super::store::LedgerStore;
use super::transaction::TransactionRecord;
use super::types::{
    Account, ConversionPosting, ConversionReceipt, NewAccount, Recipient, TransferPosting,
    TransferReceipt,
};

#[derive(Debug, Default)]
struct LedgerState {
    accounts: BTreeMap<AccountId, Account>,
    /// Commit order; newest last.
    records: Vec<TransactionRecord>,
}

impl LedgerState {
    fn account(&self, id: AccountId) -> Result<&Account, LedgerError> {
        self.accounts.get(&id).ok_or(LedgerError::AccountNotFound(id))
    }

    fn balances_mut(&mut self, id: AccountId) -> Result<&mut Balances, LedgerError> {
        self.accounts
            .get_mut(&id)
            .map(|account| &mut account.balances)
            .ok_or(LedgerError::AccountNotFound(id))
    }
}

/// [`LedgerStore`] kept entirely in process memory.
#[derive(Debug, Default)]
pub struct InMemoryLedgerStore {
    state: Mutex<LedgerState>,
}

impl InMemoryLedgerStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, LedgerState>, LedgerError> {
        self.state
            .lock()
            .map_err(|_| LedgerError::Store("ledger state lock poisoned".to_string()))
    }
}

fn insufficient(
    account_id: AccountId,
    balances: &Balances,
    currency: Currency,
    amount: Decimal,
) -> LedgerError {
    LedgerError::InsufficientFunds {
        account_id,
        available: balances.money(currency),
        requested: Money::new(amount, currency),
    }
}

impl LedgerStore for InMemoryLedgerStore {
    async fn create_account(&self, input: NewAccount) -> Result<Account, LedgerError> {
        let mut state = self.lock()?;

        if state.accounts.values().any(|a| a.email == input.email) {
            return Err(LedgerError::DuplicateEmail(input.email));
        }

        let account = Account {
            id: AccountId::new(),
            name: input.name,
            email: input.email,
            password_hash: input.password_hash,
            balances: Balances::opening(input.opening_balance),
            created_at: Utc::now(),
        };
        state.accounts.insert(account.id, account.clone());

        Ok(account)
    }

    async fn find_account(&self, id: AccountId) -> Result<Option<Account>, LedgerError> {
        Ok(self.lock()?.accounts.get(&id).cloned())
    }

    async fn find_account_by_email(&self, email: &str) -> Result<Option<Account>, LedgerError> {
        Ok(self
            .lock()?
            .accounts
            .values()
            .find(|a| a.email == email)
            .cloned())
    }

    async fn list_recipients(&self, exclude: AccountId) -> Result<Vec<Recipient>, LedgerError> {
        let state = self.lock()?;
        let mut recipients: Vec<Recipient> = state
            .accounts
            .values()
            .filter(|a| a.id != exclude)
            .map(|a| Recipient {
                id: a.id,
                name: a.name.clone(),
            })
            .collect();
        recipients.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));

        Ok(recipients)
    }

    async fn list_transactions(
        &self,
        account_id: AccountId,
        page: PageRequest,
    ) -> Result<PageResponse<TransactionRecord>, LedgerError> {
        let state = self.lock()?;
        let page = page.normalized();

        let mine: Vec<&TransactionRecord> = state
            .records
            .iter()
            .rev()
            .filter(|r| r.account_id == account_id)
            .collect();
        let total = u64::try_from(mine.len()).unwrap_or(u64::MAX);

        let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
        let limit = usize::try_from(page.limit()).unwrap_or(usize::MAX);
        let data = mine.into_iter().skip(offset).take(limit).cloned().collect();

        Ok(PageResponse::new(data, page, total))
    }

    async fn apply_deposit(
        &self,
        account_id: AccountId,
        amount: Decimal,
    ) -> Result<TransactionRecord, LedgerError> {
        let mut state = self.lock()?;

        state.balances_mut(account_id)?.credit(Currency::HOME, amount)?;

        let record = TransactionRecord::deposit(account_id, amount);
        state.records.push(record.clone());

        Ok(record)
    }

    async fn apply_transfer(&self, posting: TransferPosting) -> Result<TransferReceipt, LedgerError> {
        let TransferPosting { from, to, amount } = posting;
        let mut state = self.lock()?;

        let recipient_name = state.account(to)?.name.clone();
        let sender = state.account(from)?;
        let sender_name = sender.name.clone();
        if !sender.balances.covers(Currency::HOME, amount) {
            return Err(insufficient(from, &sender.balances, Currency::HOME, amount));
        }

        // Credit first: it is the only step that can still fail.
        state.balances_mut(to)?.credit(Currency::HOME, amount)?;
        state.balances_mut(from)?.debit(Currency::HOME, amount);

        let sent = TransactionRecord::transfer_out(from, amount, &recipient_name);
        let received = TransactionRecord::transfer_in(to, amount, &sender_name);
        state.records.push(sent.clone());
        state.records.push(received.clone());

        Ok(TransferReceipt { sent, received })
    }

    async fn apply_conversion(
        &self,
        posting: ConversionPosting,
    ) -> Result<ConversionReceipt, LedgerError> {
        let ConversionPosting {
            account_id,
            from,
            to,
            amount,
            credit,
            rate,
        } = posting;
        let mut state = self.lock()?;

        let balances = state.balances_mut(account_id)?;
        if !balances.covers(from, amount) {
            return Err(insufficient(account_id, balances, from, amount));
        }
        balances.credit(to, credit)?;
        balances.debit(from, amount);

        let record = TransactionRecord::conversion(account_id, from, to, amount);
        state.records.push(record.clone());

        Ok(ConversionReceipt {
            record,
            debited: Money::new(amount, from),
            credited: Money::new(credit, to),
            rate,
        })
    }
}
