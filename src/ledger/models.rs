//! Ledger record types and the transaction status state machine

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core_types::{AccountId, TransactionId, generate_reference_number};

/// Kind of money movement, stored as TEXT
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    Deposit,
    Withdrawal,
    Transfer,
    Payment,
    Fee,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Deposit => "DEPOSIT",
            TransactionType::Withdrawal => "WITHDRAWAL",
            TransactionType::Transfer => "TRANSFER",
            TransactionType::Payment => "PAYMENT",
            TransactionType::Fee => "FEE",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "DEPOSIT" => Some(TransactionType::Deposit),
            "WITHDRAWAL" => Some(TransactionType::Withdrawal),
            "TRANSFER" => Some(TransactionType::Transfer),
            "PAYMENT" => Some(TransactionType::Payment),
            "FEE" => Some(TransactionType::Fee),
            _ => None,
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Transaction lifecycle status.
///
/// The only legal transitions are `PENDING -> COMPLETED`,
/// `PENDING -> CANCELLED` and `PENDING -> FAILED`; the three targets are
/// terminal and absorbing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Cancelled,
    Failed,
}

impl TransactionStatus {
    /// Check if this is a terminal state (no more transitions possible)
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TransactionStatus::Completed | TransactionStatus::Cancelled | TransactionStatus::Failed
        )
    }

    /// Whether a transition from `self` to `next` is legal
    pub fn can_transition_to(&self, next: TransactionStatus) -> bool {
        *self == TransactionStatus::Pending && next.is_terminal()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Pending => "PENDING",
            TransactionStatus::Completed => "COMPLETED",
            TransactionStatus::Cancelled => "CANCELLED",
            TransactionStatus::Failed => "FAILED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PENDING" => Some(TransactionStatus::Pending),
            "COMPLETED" => Some(TransactionStatus::Completed),
            "CANCELLED" => Some(TransactionStatus::Cancelled),
            "FAILED" => Some(TransactionStatus::Failed),
            _ => None,
        }
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A ledger record.
///
/// Identity is the composite `(transaction_id, created_at)` so the table
/// partitions by time. A deposit has no source account; a withdrawal has no
/// destination. Amount, accounts and type never change after insert.
#[derive(Debug, Clone, Serialize)]
pub struct Transaction {
    pub transaction_id: TransactionId,
    pub created_at: DateTime<Utc>,
    pub from_account_id: Option<AccountId>,
    pub to_account_id: Option<AccountId>,
    pub transaction_type: TransactionType,
    pub amount: Decimal,
    pub currency: String,
    pub fee_amount: Decimal,
    pub exchange_rate: Decimal,
    pub description: Option<String>,
    pub reference_number: String,
    pub status: TransactionStatus,
    pub processed_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    fn base(
        transaction_type: TransactionType,
        amount: Decimal,
        currency: &str,
        description: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            transaction_id: TransactionId::generate(),
            created_at: now,
            from_account_id: None,
            to_account_id: None,
            transaction_type,
            amount,
            currency: currency.to_string(),
            fee_amount: Decimal::ZERO,
            exchange_rate: Decimal::ONE,
            description,
            reference_number: generate_reference_number(),
            status: TransactionStatus::Pending,
            processed_at: None,
            updated_at: now,
        }
    }

    /// An immediate transfer record, already terminal
    pub fn completed_transfer(
        from: AccountId,
        to: AccountId,
        amount: Decimal,
        currency: &str,
        description: Option<String>,
    ) -> Self {
        let mut tx = Self::base(TransactionType::Transfer, amount, currency, description);
        tx.from_account_id = Some(from);
        tx.to_account_id = Some(to);
        tx.status = TransactionStatus::Completed;
        tx.processed_at = Some(tx.created_at);
        tx
    }

    /// A deposit record (no source account), already terminal
    pub fn completed_deposit(
        to: AccountId,
        amount: Decimal,
        currency: &str,
        description: Option<String>,
    ) -> Self {
        let mut tx = Self::base(TransactionType::Deposit, amount, currency, description);
        tx.to_account_id = Some(to);
        tx.status = TransactionStatus::Completed;
        tx.processed_at = Some(tx.created_at);
        tx
    }

    /// An escrowed transfer awaiting the recipient's decision
    pub fn pending_transfer(
        from: AccountId,
        to: AccountId,
        amount: Decimal,
        currency: &str,
        description: Option<String>,
    ) -> Self {
        let mut tx = Self::base(TransactionType::Transfer, amount, currency, description);
        tx.from_account_id = Some(from);
        tx.to_account_id = Some(to);
        tx
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Transaction[{}] {} {} {} status={}",
            self.transaction_id, self.transaction_type, self.amount, self.currency, self.status
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const ALL_STATUSES: [TransactionStatus; 4] = [
        TransactionStatus::Pending,
        TransactionStatus::Completed,
        TransactionStatus::Cancelled,
        TransactionStatus::Failed,
    ];

    #[test]
    fn test_terminal_states() {
        assert!(!TransactionStatus::Pending.is_terminal());
        assert!(TransactionStatus::Completed.is_terminal());
        assert!(TransactionStatus::Cancelled.is_terminal());
        assert!(TransactionStatus::Failed.is_terminal());
    }

    #[test]
    fn test_only_pending_to_terminal_is_legal() {
        for next in [
            TransactionStatus::Completed,
            TransactionStatus::Cancelled,
            TransactionStatus::Failed,
        ] {
            assert!(TransactionStatus::Pending.can_transition_to(next));
        }

        // terminal states are absorbing, and PENDING -> PENDING is illegal
        for from in ALL_STATUSES {
            for to in ALL_STATUSES {
                if from != TransactionStatus::Pending || to == TransactionStatus::Pending {
                    assert!(!from.can_transition_to(to), "{from} -> {to} must be illegal");
                }
            }
        }
    }

    #[test]
    fn test_status_text_roundtrip() {
        for status in ALL_STATUSES {
            assert_eq!(TransactionStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(TransactionStatus::parse("DONE"), None);
    }

    #[test]
    fn test_completed_transfer_shape() {
        let from = AccountId::generate();
        let to = AccountId::generate();
        let tx = Transaction::completed_transfer(from, to, dec!(50), "CAD", None);

        assert_eq!(tx.from_account_id, Some(from));
        assert_eq!(tx.to_account_id, Some(to));
        assert_eq!(tx.transaction_type, TransactionType::Transfer);
        assert_eq!(tx.status, TransactionStatus::Completed);
        assert_eq!(tx.processed_at, Some(tx.created_at));
        assert!(tx.reference_number.starts_with("TXN"));
    }

    #[test]
    fn test_deposit_has_no_source() {
        let to = AccountId::generate();
        let tx = Transaction::completed_deposit(to, dec!(50), "CAD", None);

        assert_eq!(tx.from_account_id, None);
        assert_eq!(tx.to_account_id, Some(to));
        assert_eq!(tx.transaction_type, TransactionType::Deposit);
    }

    #[test]
    fn test_pending_transfer_not_processed() {
        let tx = Transaction::pending_transfer(
            AccountId::generate(),
            AccountId::generate(),
            dec!(30),
            "CAD",
            Some("rent".to_string()),
        );

        assert_eq!(tx.status, TransactionStatus::Pending);
        assert_eq!(tx.processed_at, None);
        assert_eq!(tx.exchange_rate, Decimal::ONE);
        assert_eq!(tx.fee_amount, Decimal::ZERO);
    }
}
