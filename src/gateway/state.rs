use std::sync::Arc;

use crate::db::Database;
use crate::engine::TransferEngine;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub engine: Arc<TransferEngine>,
}

impl AppState {
    pub fn new(db: Arc<Database>) -> Self {
        let engine = Arc::new(TransferEngine::new(db.pool().clone()));
        Self { db, engine }
    }
}
