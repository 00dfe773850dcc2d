//! Data models for the account store

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core_types::{AccountId, UserId};

/// Account lifecycle status, stored as TEXT
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountStatus {
    Active,
    Inactive,
    Suspended,
    Closed,
}

impl AccountStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountStatus::Active => "ACTIVE",
            AccountStatus::Inactive => "INACTIVE",
            AccountStatus::Suspended => "SUSPENDED",
            AccountStatus::Closed => "CLOSED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ACTIVE" => Some(AccountStatus::Active),
            "INACTIVE" => Some(AccountStatus::Inactive),
            "SUSPENDED" => Some(AccountStatus::Suspended),
            "CLOSED" => Some(AccountStatus::Closed),
            _ => None,
        }
    }
}

impl fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Account product type, stored as TEXT
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountType {
    Checking,
    Savings,
    Credit,
}

impl AccountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::Checking => "CHECKING",
            AccountType::Savings => "SAVINGS",
            AccountType::Credit => "CREDIT",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "CHECKING" => Some(AccountType::Checking),
            "SAVINGS" => Some(AccountType::Savings),
            "CREDIT" => Some(AccountType::Credit),
            _ => None,
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A customer account row.
///
/// `balance` is the ledger balance; `available_balance` is balance minus
/// holds and never exceeds it. `version` is the optimistic guard bumped on
/// every mutation.
#[derive(Debug, Clone, Serialize)]
pub struct Account {
    pub account_id: AccountId,
    pub account_number: String,
    pub owner_user_id: UserId,
    pub owner_email: String,
    pub account_type: AccountType,
    pub status: AccountStatus,
    pub balance: Decimal,
    pub available_balance: Decimal,
    pub credit_limit: Decimal,
    pub overdraft_limit: Decimal,
    pub minimum_balance: Decimal,
    pub currency: String,
    pub version: i64,
    pub opened_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    pub fn is_active(&self) -> bool {
        self.status == AccountStatus::Active
    }

    pub fn is_closed(&self) -> bool {
        self.status == AccountStatus::Closed
    }

    /// Lowest balance this account may reach after a committed debit
    pub fn balance_floor(&self) -> Decimal {
        self.minimum_balance - self.overdraft_limit
    }

    /// Whether a debit of `amount` keeps both balance invariants:
    /// available funds cover it and the ledger balance stays above the floor.
    pub fn can_debit(&self, amount: Decimal) -> bool {
        self.available_balance >= amount && self.balance - amount >= self.balance_floor()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn account(balance: Decimal, available: Decimal) -> Account {
        let now = Utc::now();
        Account {
            account_id: AccountId::from(Uuid::new_v4()),
            account_number: "100-000001".to_string(),
            owner_user_id: UserId::from(Uuid::new_v4()),
            owner_email: "alice@example.com".to_string(),
            account_type: AccountType::Checking,
            status: AccountStatus::Active,
            balance,
            available_balance: available,
            credit_limit: Decimal::ZERO,
            overdraft_limit: Decimal::ZERO,
            minimum_balance: Decimal::ZERO,
            currency: "CAD".to_string(),
            version: 0,
            opened_at: now,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_status_text_roundtrip() {
        for status in [
            AccountStatus::Active,
            AccountStatus::Inactive,
            AccountStatus::Suspended,
            AccountStatus::Closed,
        ] {
            assert_eq!(AccountStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(AccountStatus::parse("frozen"), None);
    }

    #[test]
    fn test_type_text_roundtrip() {
        for ty in [
            AccountType::Checking,
            AccountType::Savings,
            AccountType::Credit,
        ] {
            assert_eq!(AccountType::parse(ty.as_str()), Some(ty));
        }
    }

    #[test]
    fn test_can_debit_within_available() {
        let acc = account(dec!(100), dec!(100));
        assert!(acc.can_debit(dec!(100)));
        assert!(!acc.can_debit(dec!(100.01)));
    }

    #[test]
    fn test_can_debit_respects_holds() {
        // 40 held for a pending transfer: ledger balance 100, available 60
        let acc = account(dec!(100), dec!(60));
        assert!(acc.can_debit(dec!(60)));
        assert!(!acc.can_debit(dec!(61)));
    }

    #[test]
    fn test_overdraft_extends_floor() {
        let mut acc = account(dec!(10), dec!(10));
        acc.overdraft_limit = dec!(50);
        // available_balance still gates the debit; overdraft only moves the floor
        assert_eq!(acc.balance_floor(), dec!(-50));
        assert!(!acc.can_debit(dec!(30)));
    }

    #[test]
    fn test_minimum_balance_raises_floor() {
        let mut acc = account(dec!(100), dec!(100));
        acc.minimum_balance = dec!(25);
        assert!(acc.can_debit(dec!(75)));
        assert!(!acc.can_debit(dec!(76)));
    }
}
