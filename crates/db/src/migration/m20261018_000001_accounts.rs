//! Accounts and transaction history.
//!
//! Balances live in one NUMERIC(20,4) column per supported currency, each
//! guarded by a CHECK so no committed write can leave it negative.
//! The transactions table is append-only.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(ACCOUNTS_SQL).await?;
        db.execute_unprepared(TRANSACTIONS_SQL).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(
            r"
DROP TABLE IF EXISTS transactions CASCADE;
DROP FUNCTION IF EXISTS prevent_transaction_mutation();
DROP TABLE IF EXISTS accounts CASCADE;
",
        )
        .await?;
        Ok(())
    }
}

const ACCOUNTS_SQL: &str = r"
CREATE TABLE accounts (
    id UUID PRIMARY KEY,
    name VARCHAR(255) NOT NULL,
    email VARCHAR(255) NOT NULL,
    password_hash TEXT NOT NULL,
    balance_tjs NUMERIC(20, 4) NOT NULL DEFAULT 0,
    balance_usd NUMERIC(20, 4) NOT NULL DEFAULT 0,
    balance_eur NUMERIC(20, 4) NOT NULL DEFAULT 0,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT uq_accounts_email UNIQUE (email),
    CONSTRAINT chk_accounts_name_not_blank CHECK (length(trim(name)) > 0),
    CONSTRAINT chk_balance_tjs_non_negative CHECK (balance_tjs >= 0),
    CONSTRAINT chk_balance_usd_non_negative CHECK (balance_usd >= 0),
    CONSTRAINT chk_balance_eur_non_negative CHECK (balance_eur >= 0)
);

-- Recipient picker lists accounts by name
CREATE INDEX idx_accounts_name ON accounts(name, id);
";

const TRANSACTIONS_SQL: &str = r"
CREATE TABLE transactions (
    id UUID PRIMARY KEY,
    account_id UUID NOT NULL REFERENCES accounts(id) ON DELETE RESTRICT,
    kind VARCHAR(16) NOT NULL,
    amount NUMERIC(20, 4) NOT NULL,
    currency VARCHAR(3) NOT NULL,
    description TEXT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_transactions_kind CHECK (kind IN ('deposit', 'transfer', 'conversion')),
    CONSTRAINT chk_transactions_currency CHECK (currency IN ('TJS', 'USD', 'EUR'))
);

-- History is read newest first per account
CREATE INDEX idx_transactions_account_created ON transactions(account_id, created_at DESC, id DESC);

CREATE FUNCTION prevent_transaction_mutation() RETURNS trigger AS $$
BEGIN
    RAISE EXCEPTION 'transactions are append-only';
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_transactions_append_only
    BEFORE UPDATE OR DELETE ON transactions
    FOR EACH ROW EXECUTE FUNCTION prevent_transaction_mutation();
";
