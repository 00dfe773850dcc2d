//! Transaction ledger: append-mostly log of money movement.
//!
//! Records are immutable once written except for the single legal status
//! transition out of PENDING, enforced by a status-guarded conditional
//! update in [`repository::TransactionRepository::transition`].

pub mod models;
pub mod repository;

pub use models::{Transaction, TransactionStatus, TransactionType};
pub use repository::TransactionRepository;
