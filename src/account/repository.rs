//! Repository layer for the account store.
//!
//! Reads take the pool; anything that mutates (or reads in preparation for
//! a mutation) takes the caller's open connection so it participates in the
//! caller's transaction and holds the row lock until commit or rollback.

use rust_decimal::Decimal;
use sqlx::postgres::PgRow;
use sqlx::{PgConnection, PgPool, Row};

use super::models::{Account, AccountStatus, AccountType};
use crate::core_types::AccountId;
use crate::engine::error::EngineError;

const ACCOUNT_COLUMNS: &str = r#"account_id, account_number, owner_user_id, owner_email,
       account_type, account_status, balance, available_balance,
       credit_limit, overdraft_limit, minimum_balance, currency,
       version, opened_at, created_at, updated_at"#;

/// Account repository.
///
/// `apply_balance_delta` is the only balance mutation entry point; callers
/// must hold the row lock (via `lock_for_update`/`lock_pair`) first.
pub struct AccountRepository;

impl AccountRepository {
    /// Get an account by id
    pub async fn find_by_id(
        pool: &PgPool,
        account_id: AccountId,
    ) -> Result<Option<Account>, EngineError> {
        let row = sqlx::query(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE account_id = $1"
        ))
        .bind(account_id)
        .fetch_optional(pool)
        .await?;

        row.map(|r| row_to_account(&r)).transpose()
    }

    /// Get an account by its human-readable account number
    pub async fn find_by_account_number(
        pool: &PgPool,
        account_number: &str,
    ) -> Result<Option<Account>, EngineError> {
        let row = sqlx::query(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE account_number = $1"
        ))
        .bind(account_number)
        .fetch_optional(pool)
        .await?;

        row.map(|r| row_to_account(&r)).transpose()
    }

    /// Resolve an owner identity (email) to their primary account.
    ///
    /// When an owner has several accounts the earliest-opened one wins, so
    /// the selection is deterministic.
    pub async fn find_primary_for_owner(
        pool: &PgPool,
        owner_email: &str,
    ) -> Result<Option<Account>, EngineError> {
        let row = sqlx::query(&format!(
            r#"SELECT {ACCOUNT_COLUMNS} FROM accounts
               WHERE lower(owner_email) = lower($1)
               ORDER BY opened_at ASC, account_id ASC
               LIMIT 1"#
        ))
        .bind(owner_email)
        .fetch_optional(pool)
        .await?;

        row.map(|r| row_to_account(&r)).transpose()
    }

    /// Load an account under `FOR UPDATE` inside the caller's transaction.
    ///
    /// The row lock linearizes concurrent mutations of the same account.
    pub async fn lock_for_update(
        conn: &mut PgConnection,
        account_id: AccountId,
    ) -> Result<Option<Account>, EngineError> {
        let row = sqlx::query(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE account_id = $1 FOR UPDATE"
        ))
        .bind(account_id)
        .fetch_optional(&mut *conn)
        .await?;

        row.map(|r| row_to_account(&r)).transpose()
    }

    /// Lock two accounts, always acquiring the lower account id first.
    ///
    /// Fixed acquisition order prevents lock-ordering deadlocks between
    /// concurrent opposite-direction transfers. Returns the accounts in the
    /// order they were requested.
    pub async fn lock_pair(
        conn: &mut PgConnection,
        first: AccountId,
        second: AccountId,
    ) -> Result<(Account, Account), EngineError> {
        debug_assert_ne!(first, second);

        let (lo, hi) = if first < second {
            (first, second)
        } else {
            (second, first)
        };

        let lo_account = Self::lock_for_update(conn, lo)
            .await?
            .ok_or(EngineError::AccountNotFound(lo))?;
        let hi_account = Self::lock_for_update(conn, hi)
            .await?
            .ok_or(EngineError::AccountNotFound(hi))?;

        if first < second {
            Ok((lo_account, hi_account))
        } else {
            Ok((hi_account, lo_account))
        }
    }

    /// Apply a signed delta to an account's balance and available balance.
    ///
    /// The only mutation entry point. Bumps `version` and refreshes
    /// `updated_at`; the version guard surfaces `Conflict` if the row was
    /// mutated outside the lock the caller holds.
    pub async fn apply_balance_delta(
        conn: &mut PgConnection,
        account_id: AccountId,
        delta: Decimal,
        expected_version: i64,
    ) -> Result<Account, EngineError> {
        let row = sqlx::query(&format!(
            r#"UPDATE accounts
               SET balance = balance + $1,
                   available_balance = available_balance + $1,
                   version = version + 1,
                   updated_at = NOW()
               WHERE account_id = $2 AND version = $3
               RETURNING {ACCOUNT_COLUMNS}"#
        ))
        .bind(delta)
        .bind(account_id)
        .bind(expected_version)
        .fetch_optional(&mut *conn)
        .await?;

        match row {
            Some(r) => row_to_account(&r),
            None => Err(EngineError::Conflict(account_id)),
        }
    }

    /// Insert a new account row (account opening itself is out of scope;
    /// used by bootstrap and tests)
    pub async fn create(pool: &PgPool, account: &Account) -> Result<(), EngineError> {
        sqlx::query(
            r#"INSERT INTO accounts
                   (account_id, account_number, owner_user_id, owner_email,
                    account_type, account_status, balance, available_balance,
                    credit_limit, overdraft_limit, minimum_balance, currency,
                    version, opened_at, created_at, updated_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)"#,
        )
        .bind(account.account_id)
        .bind(&account.account_number)
        .bind(account.owner_user_id)
        .bind(&account.owner_email)
        .bind(account.account_type.as_str())
        .bind(account.status.as_str())
        .bind(account.balance)
        .bind(account.available_balance)
        .bind(account.credit_limit)
        .bind(account.overdraft_limit)
        .bind(account.minimum_balance)
        .bind(&account.currency)
        .bind(account.version)
        .bind(account.opened_at)
        .bind(account.created_at)
        .bind(account.updated_at)
        .execute(pool)
        .await?;
        Ok(())
    }
}

/// Convert a database row into an [`Account`]
fn row_to_account(row: &PgRow) -> Result<Account, EngineError> {
    let status_str: String = row.get("account_status");
    let status = AccountStatus::parse(&status_str)
        .ok_or_else(|| EngineError::Persistence(format!("Invalid account status: {status_str}")))?;

    let type_str: String = row.get("account_type");
    let account_type = AccountType::parse(&type_str)
        .ok_or_else(|| EngineError::Persistence(format!("Invalid account type: {type_str}")))?;

    Ok(Account {
        account_id: row.get("account_id"),
        account_number: row.get("account_number"),
        owner_user_id: row.get("owner_user_id"),
        owner_email: row.get("owner_email"),
        account_type,
        status,
        balance: row.get("balance"),
        available_balance: row.get("available_balance"),
        credit_limit: row.get("credit_limit"),
        overdraft_limit: row.get("overdraft_limit"),
        minimum_balance: row.get("minimum_balance"),
        currency: row.get("currency"),
        version: row.get("version"),
        opened_at: row.get("opened_at"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}
