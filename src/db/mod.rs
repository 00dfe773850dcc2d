//! Database connection management and schema bootstrap.

use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

use crate::config::PostgresConfig;

/// DDL for the two ledger tables.
///
/// `accounts` is keyed by uuid with a unique human-readable account number;
/// `transactions` is keyed by `(transaction_id, created_at)` so the table
/// can be time-partitioned without changing the schema. Enum-valued columns
/// are stored as TEXT, money as fixed-point NUMERIC.
const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS accounts (
        account_id        UUID PRIMARY KEY,
        account_number    TEXT NOT NULL UNIQUE,
        owner_user_id     UUID NOT NULL,
        owner_email       TEXT NOT NULL,
        account_type      TEXT NOT NULL,
        account_status    TEXT NOT NULL DEFAULT 'ACTIVE',
        balance           NUMERIC(19,4) NOT NULL DEFAULT 0,
        available_balance NUMERIC(19,4) NOT NULL DEFAULT 0,
        credit_limit      NUMERIC(19,4) NOT NULL DEFAULT 0,
        overdraft_limit   NUMERIC(19,4) NOT NULL DEFAULT 0,
        minimum_balance   NUMERIC(19,4) NOT NULL DEFAULT 0,
        currency          TEXT NOT NULL DEFAULT 'CAD',
        version           BIGINT NOT NULL DEFAULT 0,
        opened_at         TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        created_at        TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at        TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        CONSTRAINT chk_available_le_balance CHECK (available_balance <= balance)
    )
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS idx_accounts_owner_email
        ON accounts (owner_email, opened_at)
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS transactions (
        transaction_id     UUID NOT NULL,
        created_at         TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        from_account_id    UUID,
        to_account_id      UUID,
        transaction_type   TEXT NOT NULL,
        amount             NUMERIC(19,4) NOT NULL CHECK (amount > 0),
        currency           TEXT NOT NULL DEFAULT 'CAD',
        fee_amount         NUMERIC(19,4) NOT NULL DEFAULT 0,
        exchange_rate      NUMERIC(19,8) NOT NULL DEFAULT 1,
        description        TEXT,
        reference_number   TEXT NOT NULL,
        transaction_status TEXT NOT NULL DEFAULT 'PENDING',
        processed_at       TIMESTAMPTZ,
        updated_at         TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        PRIMARY KEY (transaction_id, created_at)
    )
    "#,
    r#"
    CREATE UNIQUE INDEX IF NOT EXISTS uq_transactions_reference_number
        ON transactions (reference_number)
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS idx_transactions_recipient_status
        ON transactions (to_account_id, transaction_status, created_at DESC)
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS idx_transactions_from_account
        ON transactions (from_account_id, created_at DESC)
    "#,
];

/// Name of the unique index guarding `reference_number`; duplicate-key
/// violations on it are mapped to `EngineError::DuplicateReference`.
pub const REFERENCE_NUMBER_CONSTRAINT: &str = "uq_transactions_reference_number";

/// PostgreSQL database connection pool
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create a new database connection pool
    pub async fn connect(config: &PostgresConfig) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
            .connect(&config.url)
            .await?;

        tracing::info!("PostgreSQL connection pool established");
        Ok(Self { pool })
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Check database health
    pub async fn health_check(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Create the ledger tables and indexes if they do not exist yet
    pub async fn init_schema(&self) -> Result<(), sqlx::Error> {
        for ddl in SCHEMA {
            sqlx::query(ddl).execute(&self.pool).await?;
        }
        tracing::info!("Ledger schema ready");
        Ok(())
    }
}
