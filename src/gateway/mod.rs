//! HTTP gateway: routing, identity extraction and the wire types.
//!
//! The gateway owns no business rules; every operation goes through the
//! [`TransferEngine`](crate::engine::TransferEngine) with the caller's
//! identity passed explicitly.

pub mod handlers;
pub mod identity;
pub mod openapi;
pub mod state;
pub mod types;

use axum::Router;
use axum::middleware;
use axum::routing::{get, post};
use tokio::net::TcpListener;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::GatewayConfig;
use openapi::ApiDoc;
use state::AppState;

pub fn build_router(state: AppState) -> Router {
    // self-service operations need the caller's identity; the rest do not
    let self_service = Router::new()
        .route("/api/v1/transfer/email", post(handlers::send_money))
        .route("/api/v1/transfer/resolve", post(handlers::resolve_transfer))
        .layer(middleware::from_fn(identity::require_identity));

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/health", get(handlers::health))
        .route("/api/v1/transfer", post(handlers::create_transfer))
        .route("/api/v1/deposit", post(handlers::create_deposit))
        .route("/api/v1/account/{account_id}", get(handlers::get_account))
        .route(
            "/api/v1/account/by-number/{account_number}",
            get(handlers::get_account_by_number),
        )
        .route(
            "/api/v1/account/{account_id}/transactions",
            get(handlers::get_account_transactions),
        )
        .merge(self_service)
        .with_state(state)
}

pub async fn serve(config: &GatewayConfig, state: AppState) -> anyhow::Result<()> {
    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("gateway listening on {addr}");
    axum::serve(listener, build_router(state)).await?;
    Ok(())
}
