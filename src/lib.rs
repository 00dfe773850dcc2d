//! corebank: account ledger and transfer engine.
//!
//! A PostgreSQL-backed service for moving money between customer accounts:
//! immediate transfers, deposits, and escrowed email transfers that the
//! recipient accepts or declines. All balance mutations go through the
//! [`engine::TransferEngine`], the single writer, under row-level locks so
//! no account ever overdraws and every movement is mirrored by exactly one
//! ledger record.

pub mod account;
pub mod config;
pub mod core_types;
pub mod db;
pub mod engine;
pub mod gateway;
pub mod ledger;
pub mod logging;
pub mod money;

pub use config::AppConfig;
pub use engine::TransferEngine;
pub use engine::error::EngineError;
