//! Transfer engine: the only writer of balances and ledger records.
//!
//! Three entry points: immediate transfer, deposit, and escrowed transfer
//! with later accept/decline resolution. Each runs as one database transaction:
//! balance mutation and ledger insertion commit together or not at all.
//! Caller identity is always an explicit parameter; the engine reads no
//! ambient request context.

pub mod error;

#[cfg(test)]
mod integration_tests;

use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::account::{AccountRepository, AccountStatus};
use crate::core_types::{AccountId, TransactionId, generate_interac_reference};
use crate::ledger::{Transaction, TransactionRepository, TransactionStatus};
use error::EngineError;

/// Outcome of an engine operation, echoed back to the caller
#[derive(Debug, Clone)]
pub struct TransferReceipt {
    pub transaction_id: TransactionId,
    pub reference_number: String,
    /// Synthetic payment-network reference, present on escrowed transfers only
    pub interac_reference: Option<String>,
    pub status: TransactionStatus,
    pub amount: Decimal,
    pub message: String,
}

pub struct TransferEngine {
    pool: PgPool,
}

impl TransferEngine {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Immediate transfer between two accounts.
    ///
    /// Debits the source, credits the destination and appends a COMPLETED
    /// TRANSFER record in one transaction. Both account rows are locked in
    /// ascending id order before any check, so concurrent transfers over
    /// the same accounts serialize.
    pub async fn transfer(
        &self,
        from_account_id: AccountId,
        to_account_id: AccountId,
        amount: Decimal,
        description: Option<String>,
    ) -> Result<TransferReceipt, EngineError> {
        validate_amount(amount)?;
        if from_account_id == to_account_id {
            return Err(EngineError::SelfTransfer);
        }

        let mut tx = self.pool.begin().await?;

        let (from, to) =
            AccountRepository::lock_pair(&mut *tx, from_account_id, to_account_id).await?;

        require_active(&from)?;
        require_open(&to)?;

        if !from.can_debit(amount) {
            return Err(EngineError::InsufficientFunds {
                available: from.available_balance,
            });
        }

        AccountRepository::apply_balance_delta(&mut *tx, from.account_id, -amount, from.version)
            .await?;
        AccountRepository::apply_balance_delta(&mut *tx, to.account_id, amount, to.version).await?;

        let record = Transaction::completed_transfer(
            from.account_id,
            to.account_id,
            amount,
            &from.currency,
            description,
        );
        TransactionRepository::append(&mut *tx, &record).await?;

        tx.commit().await?;

        tracing::info!(
            transaction_id = %record.transaction_id,
            from = %from.account_number,
            to = %to.account_number,
            %amount,
            "transfer completed"
        );

        Ok(TransferReceipt {
            transaction_id: record.transaction_id,
            reference_number: record.reference_number,
            interac_reference: None,
            status: record.status,
            amount,
            message: "Transfer completed successfully.".to_string(),
        })
    }

    /// Credit an account and append a COMPLETED DEPOSIT record.
    ///
    /// Deposits have no source account and no insufficiency check. Closed
    /// accounts reject all mutation, deposits included.
    pub async fn deposit(
        &self,
        account_id: AccountId,
        amount: Decimal,
        description: Option<String>,
    ) -> Result<TransferReceipt, EngineError> {
        validate_amount(amount)?;

        let mut tx = self.pool.begin().await?;

        let account = AccountRepository::lock_for_update(&mut *tx, account_id)
            .await?
            .ok_or(EngineError::AccountNotFound(account_id))?;
        require_open(&account)?;

        AccountRepository::apply_balance_delta(&mut *tx, account_id, amount, account.version)
            .await?;

        let record =
            Transaction::completed_deposit(account_id, amount, &account.currency, description);
        TransactionRepository::append(&mut *tx, &record).await?;

        tx.commit().await?;

        tracing::info!(
            transaction_id = %record.transaction_id,
            account = %account.account_number,
            %amount,
            "deposit completed"
        );

        Ok(TransferReceipt {
            transaction_id: record.transaction_id,
            reference_number: record.reference_number,
            interac_reference: None,
            status: record.status,
            amount,
            message: "Deposit completed successfully.".to_string(),
        })
    }

    /// Initiate an escrowed transfer addressed by owner identity (email).
    ///
    /// The sender is debited immediately; the held funds leave both
    /// `balance` and `available_balance`, so they cannot be re-spent. A
    /// PENDING record is appended. The recipient is not credited until
    /// they accept via [`resolve`](Self::resolve).
    pub async fn send_money(
        &self,
        sender_email: &str,
        recipient_email: &str,
        amount: Decimal,
        description: Option<String>,
    ) -> Result<TransferReceipt, EngineError> {
        validate_amount(amount)?;
        if sender_email.eq_ignore_ascii_case(recipient_email) {
            return Err(EngineError::SelfTransfer);
        }

        let sender = AccountRepository::find_primary_for_owner(&self.pool, sender_email)
            .await?
            .ok_or_else(|| EngineError::OwnerAccountNotFound(sender_email.to_string()))?;
        let recipient = AccountRepository::find_primary_for_owner(&self.pool, recipient_email)
            .await?
            .ok_or_else(|| EngineError::OwnerAccountNotFound(recipient_email.to_string()))?;

        if sender.account_id == recipient.account_id {
            return Err(EngineError::SelfTransfer);
        }

        let mut tx = self.pool.begin().await?;

        // Re-read under the row lock: the unlocked read above only resolved
        // identity, the balance check must see the serialized state.
        let sender = AccountRepository::lock_for_update(&mut *tx, sender.account_id)
            .await?
            .ok_or(EngineError::AccountNotFound(sender.account_id))?;
        require_active(&sender)?;

        if !sender.can_debit(amount) {
            return Err(EngineError::InsufficientFunds {
                available: sender.available_balance,
            });
        }

        AccountRepository::apply_balance_delta(&mut *tx, sender.account_id, -amount, sender.version)
            .await?;

        let description = description
            .or_else(|| Some(format!("Email transfer to {recipient_email}")));
        let record = Transaction::pending_transfer(
            sender.account_id,
            recipient.account_id,
            amount,
            &sender.currency,
            description,
        );
        TransactionRepository::append(&mut *tx, &record).await?;

        tx.commit().await?;

        tracing::info!(
            transaction_id = %record.transaction_id,
            sender = %sender.account_number,
            recipient = %recipient.account_number,
            %amount,
            "pending transfer initiated"
        );

        Ok(TransferReceipt {
            transaction_id: record.transaction_id,
            reference_number: record.reference_number,
            interac_reference: Some(generate_interac_reference()),
            status: record.status,
            amount,
            message: format!(
                "Transfer initiated successfully. {recipient_email} will be notified to accept the transfer."
            ),
        })
    }

    /// Resolve the most recent PENDING transfer addressed to a recipient.
    ///
    /// Accept credits the recipient and completes the record; decline
    /// refunds the sender and cancels it. Either way exactly one account
    /// row and one transaction row mutate, atomically. The status-guarded
    /// transition makes resolution happen at most once: a concurrent or
    /// repeated call fails with `InvalidStateTransition`.
    pub async fn resolve(
        &self,
        recipient_account_id: AccountId,
        accept: bool,
    ) -> Result<TransferReceipt, EngineError> {
        let recipient = AccountRepository::find_by_id(&self.pool, recipient_account_id)
            .await?
            .ok_or(EngineError::AccountNotFound(recipient_account_id))?;

        let mut tx = self.pool.begin().await?;

        let pending =
            TransactionRepository::find_pending_for_recipient(&mut *tx, recipient.account_id)
                .await?;
        let Some(record) = pending.into_iter().next() else {
            // Distinguish "already resolved" from "nothing was ever sent"
            let latest =
                TransactionRepository::find_latest_for_recipient(&mut *tx, recipient.account_id)
                    .await?;
            return match latest {
                Some(t) if t.status.is_terminal() => Err(EngineError::InvalidStateTransition {
                    transaction_id: t.transaction_id,
                    requested: if accept {
                        TransactionStatus::Completed
                    } else {
                        TransactionStatus::Cancelled
                    },
                }),
                _ => Err(EngineError::NoPendingTransaction),
            };
        };

        if record.to_account_id != Some(recipient.account_id) {
            return Err(EngineError::Unauthorized);
        }

        let new_status = if accept {
            TransactionStatus::Completed
        } else {
            TransactionStatus::Cancelled
        };
        TransactionRepository::transition(&mut *tx, record.transaction_id, new_status).await?;

        if accept {
            let recipient = AccountRepository::lock_for_update(&mut *tx, recipient.account_id)
                .await?
                .ok_or(EngineError::AccountNotFound(recipient.account_id))?;
            require_open(&recipient)?;
            AccountRepository::apply_balance_delta(
                &mut *tx,
                recipient.account_id,
                record.amount,
                recipient.version,
            )
            .await?;
        } else {
            let sender_id = record.from_account_id.ok_or_else(|| {
                EngineError::Persistence("pending transfer has no source account".to_string())
            })?;
            let sender = AccountRepository::lock_for_update(&mut *tx, sender_id)
                .await?
                .ok_or(EngineError::AccountNotFound(sender_id))?;
            require_open(&sender)?;
            AccountRepository::apply_balance_delta(
                &mut *tx,
                sender_id,
                record.amount,
                sender.version,
            )
            .await?;
        }

        tx.commit().await?;

        tracing::info!(
            transaction_id = %record.transaction_id,
            recipient = %recipient.account_number,
            accept,
            amount = %record.amount,
            "pending transfer resolved"
        );

        Ok(TransferReceipt {
            transaction_id: record.transaction_id,
            reference_number: record.reference_number,
            interac_reference: None,
            status: new_status,
            amount: record.amount,
            message: if accept {
                "Funds received successfully.".to_string()
            } else {
                "Transfer declined, funds returned.".to_string()
            },
        })
    }
}

fn validate_amount(amount: Decimal) -> Result<(), EngineError> {
    if amount <= Decimal::ZERO {
        return Err(EngineError::Validation(
            "Amount must be greater than 0".to_string(),
        ));
    }
    Ok(())
}

fn require_active(account: &crate::account::Account) -> Result<(), EngineError> {
    if !account.is_active() {
        return Err(EngineError::AccountNotActive {
            account_id: account.account_id,
            status: account.status,
        });
    }
    Ok(())
}

/// Credits (deposits, refunds, accepted transfers) are allowed into frozen
/// accounts but never into closed ones.
fn require_open(account: &crate::account::Account) -> Result<(), EngineError> {
    if account.is_closed() {
        return Err(EngineError::AccountNotActive {
            account_id: account.account_id,
            status: AccountStatus::Closed,
        });
    }
    Ok(())
}
