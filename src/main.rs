use std::sync::Arc;

use corebank::config::AppConfig;
use corebank::db::Database;
use corebank::gateway;
use corebank::gateway::state::AppState;
use corebank::logging::init_logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = std::env::args().nth(1).unwrap_or_else(|| "dev".to_string());
    let config = AppConfig::load(&env);

    // keep the guard alive or buffered log lines are lost on shutdown
    let _guard = init_logging(&config);
    tracing::info!("starting corebank ({env})");

    let db = Database::connect(&config.postgres).await?;
    db.init_schema().await?;
    tracing::info!("database ready");

    let state = AppState::new(Arc::new(db));
    gateway::serve(&config.gateway, state).await
}
