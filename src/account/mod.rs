//! Account store: persistent balances, one owner per account.
//!
//! All balance mutation funnels through
//! [`repository::AccountRepository::apply_balance_delta`], which runs under
//! a row lock taken by the surrounding database transaction.

pub mod models;
pub mod repository;

pub use models::{Account, AccountStatus, AccountType};
pub use repository::AccountRepository;
