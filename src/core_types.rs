//! Core identifier types shared across the ledger.
//!
//! Every persistent entity is keyed by a UUID; the newtypes below keep
//! account ids, transaction ids and user ids from being mixed up at
//! compile time while still binding directly to Postgres `UUID` columns.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Account identifier (primary key of `accounts`)
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(transparent)]
pub struct AccountId(Uuid);

/// Transaction identifier (first half of the composite ledger key)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(transparent)]
pub struct TransactionId(Uuid);

/// Owning user identifier (accounts reference users by id only)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(transparent)]
pub struct UserId(Uuid);

macro_rules! uuid_id {
    ($name:ident) => {
        impl $name {
            /// Generate a fresh random id
            pub fn generate() -> Self {
                Self(Uuid::new_v4())
            }

            /// Get the inner UUID value
            pub fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl From<Uuid> for $name {
            fn from(u: Uuid) -> Self {
                Self(u)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::from_str(s)?))
            }
        }
    };
}

uuid_id!(AccountId);
uuid_id!(TransactionId);
uuid_id!(UserId);

/// Generate a caller-visible reference number for a ledger record.
///
/// `TXN` + epoch millis + short random suffix. The millis prefix keeps the
/// legacy correlation-id format; the suffix makes the unique index on
/// `reference_number` safe under concurrent inserts within the same
/// millisecond.
pub fn generate_reference_number() -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let suffix = Uuid::new_v4().simple().to_string();
    format!("TXN{}{}", millis, &suffix[..6])
}

/// Generate a synthetic Interac reference id for an escrowed transfer.
///
/// There is no real payment-network integration; the id only exists so the
/// caller has something to show the recipient.
pub fn generate_interac_reference() -> String {
    format!("INT-{}", chrono::Utc::now().timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_display_roundtrip() {
        let id = AccountId::generate();
        let parsed: AccountId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_ids_are_unique() {
        assert_ne!(TransactionId::generate(), TransactionId::generate());
    }

    #[test]
    fn test_reference_number_format() {
        let reference = generate_reference_number();
        assert!(reference.starts_with("TXN"));
        // millis (13 digits today) + 6 hex chars
        assert!(reference.len() >= 3 + 13 + 6);
        assert_ne!(generate_reference_number(), generate_reference_number());
    }

    #[test]
    fn test_interac_reference_format() {
        assert!(generate_interac_reference().starts_with("INT-"));
    }
}
