//! Error taxonomy for the transfer engine.
//!
//! Business-rule violations are typed and surfaced synchronously; the
//! engine never retries them. `Conflict` is the one kind a caller may
//! safely retry; no partial state survives a failed operation.

use thiserror::Error;

use crate::core_types::{AccountId, TransactionId};
use crate::ledger::TransactionStatus;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),

    #[error("No account found for owner: {0}")]
    OwnerAccountNotFound(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Cannot transfer to the same account")]
    SelfTransfer,

    #[error("Insufficient funds: available balance {available}")]
    InsufficientFunds { available: rust_decimal::Decimal },

    #[error("Account {account_id} is {status} and cannot be used for this operation")]
    AccountNotActive {
        account_id: AccountId,
        status: crate::account::AccountStatus,
    },

    #[error("Transaction {transaction_id} cannot transition to {requested}")]
    InvalidStateTransition {
        transaction_id: TransactionId,
        requested: TransactionStatus,
    },

    #[error("No pending transaction found for this recipient")]
    NoPendingTransaction,

    #[error("This transaction does not belong to the resolving account")]
    Unauthorized,

    #[error("Duplicate reference number: {0}")]
    DuplicateReference(String),

    #[error("Concurrent update on account {0}, retry the operation")]
    Conflict(AccountId),

    #[error("Persistence failure: {0}")]
    Persistence(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl EngineError {
    /// Whether the caller may safely retry the operation as-is.
    ///
    /// Only concurrency losses qualify; business-rule violations will fail
    /// again until the inputs change.
    pub fn is_retryable(&self) -> bool {
        matches!(self, EngineError::Conflict(_))
    }
}

impl From<crate::money::MoneyError> for EngineError {
    fn from(e: crate::money::MoneyError) -> Self {
        EngineError::Validation(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_errors_become_validation() {
        let err: EngineError = crate::money::MoneyError::InvalidAmount.into();
        assert!(matches!(err, EngineError::Validation(_)));

        let err: EngineError = crate::money::MoneyError::PrecisionOverflow {
            provided: 6,
            max: crate::money::MAX_SCALE,
        }
        .into();
        assert!(matches!(err, EngineError::Validation(ref msg) if msg.contains("Precision")));
    }

    #[test]
    fn test_only_conflict_is_retryable() {
        let id = AccountId::generate();
        assert!(EngineError::Conflict(id).is_retryable());
        assert!(!EngineError::SelfTransfer.is_retryable());
        assert!(!EngineError::NoPendingTransaction.is_retryable());
        assert!(
            !EngineError::InsufficientFunds {
                available: rust_decimal::Decimal::ZERO
            }
            .is_retryable()
        );
    }
}
