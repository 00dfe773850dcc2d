//! Repository layer for the transaction ledger.
//!
//! Status updates use a status-guarded conditional UPDATE (compare-and-swap
//! on the `transaction_status` column), so concurrent resolution attempts on
//! the same PENDING record serialize in the database: exactly one wins.

use sqlx::postgres::PgRow;
use sqlx::{PgConnection, PgPool, Row};

use super::models::{Transaction, TransactionStatus, TransactionType};
use crate::core_types::{AccountId, TransactionId};
use crate::db::REFERENCE_NUMBER_CONSTRAINT;
use crate::engine::error::EngineError;

const TRANSACTION_COLUMNS: &str = r#"transaction_id, created_at, from_account_id, to_account_id,
       transaction_type, amount, currency, fee_amount, exchange_rate,
       description, reference_number, transaction_status, processed_at, updated_at"#;

pub struct TransactionRepository;

impl TransactionRepository {
    /// Append a record to the ledger.
    ///
    /// Fails with `DuplicateReference` when the caller-visible reference
    /// number collides with an existing record.
    pub async fn append(conn: &mut PgConnection, tx: &Transaction) -> Result<(), EngineError> {
        let result = sqlx::query(
            r#"INSERT INTO transactions
                   (transaction_id, created_at, from_account_id, to_account_id,
                    transaction_type, amount, currency, fee_amount, exchange_rate,
                    description, reference_number, transaction_status, processed_at, updated_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)"#,
        )
        .bind(tx.transaction_id)
        .bind(tx.created_at)
        .bind(tx.from_account_id)
        .bind(tx.to_account_id)
        .bind(tx.transaction_type.as_str())
        .bind(tx.amount)
        .bind(&tx.currency)
        .bind(tx.fee_amount)
        .bind(tx.exchange_rate)
        .bind(&tx.description)
        .bind(&tx.reference_number)
        .bind(tx.status.as_str())
        .bind(tx.processed_at)
        .bind(tx.updated_at)
        .execute(&mut *conn)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db_err))
                if db_err.constraint() == Some(REFERENCE_NUMBER_CONSTRAINT) =>
            {
                Err(EngineError::DuplicateReference(tx.reference_number.clone()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Get a transaction by id
    pub async fn find_by_id(
        pool: &PgPool,
        transaction_id: TransactionId,
    ) -> Result<Option<Transaction>, EngineError> {
        let row = sqlx::query(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE transaction_id = $1"
        ))
        .bind(transaction_id)
        .fetch_optional(pool)
        .await?;

        row.map(|r| row_to_transaction(&r)).transpose()
    }

    /// PENDING transactions addressed to a recipient, newest first.
    ///
    /// Resolution policy: when several PENDING transfers target the same
    /// recipient, the engine resolves the most recent one. Rows are locked
    /// so a concurrent resolver waits instead of reading stale status.
    pub async fn find_pending_for_recipient(
        conn: &mut PgConnection,
        recipient: AccountId,
    ) -> Result<Vec<Transaction>, EngineError> {
        let rows = sqlx::query(&format!(
            r#"SELECT {TRANSACTION_COLUMNS} FROM transactions
               WHERE to_account_id = $1 AND transaction_status = $2
               ORDER BY created_at DESC
               FOR UPDATE"#
        ))
        .bind(recipient)
        .bind(TransactionStatus::Pending.as_str())
        .fetch_all(&mut *conn)
        .await?;

        rows.iter().map(row_to_transaction).collect()
    }

    /// Most recent transfer addressed to a recipient regardless of status.
    ///
    /// Used to tell "nothing was ever pending" (`NoPendingTransaction`)
    /// apart from "already resolved" (`InvalidStateTransition`).
    pub async fn find_latest_for_recipient(
        conn: &mut PgConnection,
        recipient: AccountId,
    ) -> Result<Option<Transaction>, EngineError> {
        let row = sqlx::query(&format!(
            r#"SELECT {TRANSACTION_COLUMNS} FROM transactions
               WHERE to_account_id = $1 AND transaction_type = $2
               ORDER BY created_at DESC
               LIMIT 1"#
        ))
        .bind(recipient)
        .bind(TransactionType::Transfer.as_str())
        .fetch_optional(&mut *conn)
        .await?;

        row.map(|r| row_to_transaction(&r)).transpose()
    }

    /// Transition a transaction out of PENDING.
    ///
    /// The UPDATE only matches while the row is still PENDING; zero rows
    /// affected means another resolution won the race (or the record was
    /// already terminal) and the caller gets `InvalidStateTransition`.
    /// Sets `processed_at` exactly once.
    pub async fn transition(
        conn: &mut PgConnection,
        transaction_id: TransactionId,
        new_status: TransactionStatus,
    ) -> Result<(), EngineError> {
        if !TransactionStatus::Pending.can_transition_to(new_status) {
            return Err(EngineError::InvalidStateTransition {
                transaction_id,
                requested: new_status,
            });
        }

        let result = sqlx::query(
            r#"UPDATE transactions
               SET transaction_status = $1, processed_at = NOW(), updated_at = NOW()
               WHERE transaction_id = $2 AND transaction_status = $3"#,
        )
        .bind(new_status.as_str())
        .bind(transaction_id)
        .bind(TransactionStatus::Pending.as_str())
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(EngineError::InvalidStateTransition {
                transaction_id,
                requested: new_status,
            });
        }
        Ok(())
    }

    /// Transaction history for an account (as source or destination),
    /// newest first
    pub async fn find_by_account(
        pool: &PgPool,
        account_id: AccountId,
        limit: i64,
    ) -> Result<Vec<Transaction>, EngineError> {
        let rows = sqlx::query(&format!(
            r#"SELECT {TRANSACTION_COLUMNS} FROM transactions
               WHERE from_account_id = $1 OR to_account_id = $1
               ORDER BY created_at DESC
               LIMIT $2"#
        ))
        .bind(account_id)
        .bind(limit)
        .fetch_all(pool)
        .await?;

        rows.iter().map(row_to_transaction).collect()
    }
}

/// Convert a database row into a [`Transaction`]
fn row_to_transaction(row: &PgRow) -> Result<Transaction, EngineError> {
    let status_str: String = row.get("transaction_status");
    let status = TransactionStatus::parse(&status_str).ok_or_else(|| {
        EngineError::Persistence(format!("Invalid transaction status: {status_str}"))
    })?;

    let type_str: String = row.get("transaction_type");
    let transaction_type = TransactionType::parse(&type_str)
        .ok_or_else(|| EngineError::Persistence(format!("Invalid transaction type: {type_str}")))?;

    Ok(Transaction {
        transaction_id: row.get("transaction_id"),
        created_at: row.get("created_at"),
        from_account_id: row.get("from_account_id"),
        to_account_id: row.get("to_account_id"),
        transaction_type,
        amount: row.get("amount"),
        currency: row.get("currency"),
        fee_amount: row.get("fee_amount"),
        exchange_rate: row.get("exchange_rate"),
        description: row.get("description"),
        reference_number: row.get("reference_number"),
        status,
        processed_at: row.get("processed_at"),
        updated_at: row.get("updated_at"),
    })
}
