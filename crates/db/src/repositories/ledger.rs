//! Ledger repository: Postgres-backed [`LedgerStore`].
//!
//! Every mutation runs inside one database transaction. The affected
//! account rows are locked with `SELECT ... FOR UPDATE` before their
//! balances are read, so the read-check-write sequence cannot interleave
//! with another mutation of the same account. Transfers lock both rows in
//! ascending id order. Returning early drops the transaction, which rolls
//! it back.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, SqlErr, TransactionTrait,
    sea_query::Expr,
};
use somon_core::ledger::{
    Account, Balances, ConversionPosting, ConversionReceipt, LedgerError, LedgerStore, NewAccount,
    Recipient, TransactionKind, TransactionRecord, TransferPosting, TransferReceipt,
};
use somon_shared::types::{
    AccountId, Currency, Money, PageRequest, PageResponse, TransactionRecordId,
};

use crate::entities::{accounts, transactions};

/// Ledger repository over a pooled connection.
#[derive(Debug, Clone)]
pub struct LedgerRepository {
    db: DatabaseConnection,
}

impl LedgerRepository {
    /// Creates a new ledger repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

/// Column holding the balance for `currency`.
const fn balance_column(currency: Currency) -> accounts::Column {
    match currency {
        Currency::Tjs => accounts::Column::BalanceTjs,
        Currency::Usd => accounts::Column::BalanceUsd,
        Currency::Eur => accounts::Column::BalanceEur,
    }
}

#[allow(clippy::needless_pass_by_value)]
fn store_err(err: DbErr) -> LedgerError {
    LedgerError::Store(err.to_string())
}

fn balances_of(model: &accounts::Model) -> Balances {
    Balances {
        tjs: model.balance_tjs,
        usd: model.balance_usd,
        eur: model.balance_eur,
    }
}

fn account_from_model(model: accounts::Model) -> Account {
    let balances = balances_of(&model);
    Account {
        id: AccountId::from_uuid(model.id),
        name: model.name,
        email: model.email,
        password_hash: model.password_hash,
        balances,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

fn record_from_model(model: transactions::Model) -> Result<TransactionRecord, LedgerError> {
    let kind: TransactionKind = model.kind.parse().map_err(LedgerError::Store)?;
    let currency: Currency = model.currency.parse().map_err(LedgerError::Store)?;

    Ok(TransactionRecord {
        id: TransactionRecordId::from_uuid(model.id),
        account_id: AccountId::from_uuid(model.account_id),
        kind,
        amount: model.amount,
        currency,
        description: model.description,
        created_at: model.created_at.with_timezone(&Utc),
    })
}

/// Loads an account row and holds its lock until the transaction ends.
async fn lock_account<C: ConnectionTrait>(
    conn: &C,
    id: AccountId,
) -> Result<accounts::Model, LedgerError> {
    accounts::Entity::find_by_id(id.into_inner())
        .lock_exclusive()
        .one(conn)
        .await
        .map_err(store_err)?
        .ok_or(LedgerError::AccountNotFound(id))
}

/// Writes new balance values for the given currencies.
async fn write_balances<C: ConnectionTrait>(
    conn: &C,
    id: AccountId,
    changes: &[(Currency, Decimal)],
) -> Result<(), LedgerError> {
    let mut update = accounts::Entity::update_many()
        .col_expr(accounts::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(accounts::Column::Id.eq(id.into_inner()));

    for (currency, value) in changes {
        update = update.col_expr(balance_column(*currency), Expr::value(*value));
    }

    update.exec(conn).await.map_err(store_err)?;
    Ok(())
}

async fn insert_record<C: ConnectionTrait>(
    conn: &C,
    record: &TransactionRecord,
) -> Result<(), LedgerError> {
    transactions::ActiveModel {
        id: Set(record.id.into_inner()),
        account_id: Set(record.account_id.into_inner()),
        kind: Set(record.kind.as_str().to_string()),
        amount: Set(record.amount),
        currency: Set(record.currency.code().to_string()),
        description: Set(record.description.clone()),
        created_at: Set(record.created_at.into()),
    }
    .insert(conn)
    .await
    .map_err(store_err)?;

    Ok(())
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

impl LedgerStore for LedgerRepository {
    async fn create_account(&self, input: NewAccount) -> Result<Account, LedgerError> {
        let now = Utc::now().into();
        let email = input.email.clone();
        let opening = Balances::opening(input.opening_balance);

        let account = accounts::ActiveModel {
            id: Set(AccountId::new().into_inner()),
            name: Set(input.name),
            email: Set(input.email),
            password_hash: Set(input.password_hash),
            balance_tjs: Set(opening.tjs),
            balance_usd: Set(opening.usd),
            balance_eur: Set(opening.eur),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = account.insert(&self.db).await.map_err(|e| match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => LedgerError::DuplicateEmail(email),
            _ => store_err(e),
        })?;

        Ok(account_from_model(model))
    }

    async fn find_account(&self, id: AccountId) -> Result<Option<Account>, LedgerError> {
        let model = accounts::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map_err(store_err)?;

        Ok(model.map(account_from_model))
    }

    async fn find_account_by_email(&self, email: &str) -> Result<Option<Account>, LedgerError> {
        let model = accounts::Entity::find()
            .filter(accounts::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(store_err)?;

        Ok(model.map(account_from_model))
    }

    async fn list_recipients(&self, exclude: AccountId) -> Result<Vec<Recipient>, LedgerError> {
        let models = accounts::Entity::find()
            .filter(accounts::Column::Id.ne(exclude.into_inner()))
            .order_by_asc(accounts::Column::Name)
            .order_by_asc(accounts::Column::Id)
            .all(&self.db)
            .await
            .map_err(store_err)?;

        Ok(models
            .into_iter()
            .map(|m| Recipient {
                id: AccountId::from_uuid(m.id),
                name: m.name,
            })
            .collect())
    }

    async fn list_transactions(
        &self,
        account_id: AccountId,
        page: PageRequest,
    ) -> Result<PageResponse<TransactionRecord>, LedgerError> {
        let page = page.normalized();
        let query = transactions::Entity::find()
            .filter(transactions::Column::AccountId.eq(account_id.into_inner()));

        let total = query.clone().count(&self.db).await.map_err(store_err)?;

        let models = query
            .order_by_desc(transactions::Column::CreatedAt)
            .order_by_desc(transactions::Column::Id)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .map_err(store_err)?;

        let records = models
            .into_iter()
            .map(record_from_model)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(PageResponse::new(records, page, total))
    }

    async fn apply_deposit(
        &self,
        account_id: AccountId,
        amount: Decimal,
    ) -> Result<TransactionRecord, LedgerError> {
        let txn = self.db.begin().await.map_err(store_err)?;

        let account = lock_account(&txn, account_id).await?;
        let mut balances = balances_of(&account);
        balances.credit(Currency::HOME, amount)?;

        write_balances(&txn, account_id, &[(Currency::HOME, balances.get(Currency::HOME))]).await?;

        let record = TransactionRecord::deposit(account_id, amount);
        insert_record(&txn, &record).await?;

        txn.commit().await.map_err(store_err)?;
        Ok(record)
    }

    async fn apply_transfer(&self, posting: TransferPosting) -> Result<TransferReceipt, LedgerError> {
        let TransferPosting { from, to, amount } = posting;
        let txn = self.db.begin().await.map_err(store_err)?;

        // Ascending id order so two opposite transfers cannot deadlock.
        let (first, second) = if from < to { (from, to) } else { (to, from) };
        let first_row = lock_account(&txn, first).await?;
        let second_row = lock_account(&txn, second).await?;
        let (sender, recipient) = if first == from {
            (first_row, second_row)
        } else {
            (second_row, first_row)
        };

        let mut sender_balances = balances_of(&sender);
        if !sender_balances.covers(Currency::HOME, amount) {
            return Err(insufficient(from, &sender_balances, Currency::HOME, amount));
        }
        let mut recipient_balances = balances_of(&recipient);

        recipient_balances.credit(Currency::HOME, amount)?;
        sender_balances.debit(Currency::HOME, amount);

        write_balances(&txn, from, &[(Currency::HOME, sender_balances.get(Currency::HOME))]).await?;
        write_balances(&txn, to, &[(Currency::HOME, recipient_balances.get(Currency::HOME))]).await?;

        let sent = TransactionRecord::transfer_out(from, amount, &recipient.name);
        let received = TransactionRecord::transfer_in(to, amount, &sender.name);
        insert_record(&txn, &sent).await?;
        insert_record(&txn, &received).await?;

        txn.commit().await.map_err(store_err)?;
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
        let txn = self.db.begin().await.map_err(store_err)?;

        let account = lock_account(&txn, account_id).await?;
        let mut balances = balances_of(&account);
        if !balances.covers(from, amount) {
            return Err(insufficient(account_id, &balances, from, amount));
        }

        balances.credit(to, credit)?;
        balances.debit(from, amount);
        write_balances(
            &txn,
            account_id,
            &[(from, balances.get(from)), (to, balances.get(to))],
        )
        .await?;

        let record = TransactionRecord::conversion(account_id, from, to, amount);
        insert_record(&txn, &record).await?;

        txn.commit().await.map_err(store_err)?;
        Ok(ConversionReceipt {
            record,
            debited: Money::new(amount, from),
            credited: Money::new(credit, to),
            rate,
        })
    }
}
