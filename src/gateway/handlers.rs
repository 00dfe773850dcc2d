//! HTTP handlers.
//!
//! Handlers stay thin: parse and validate the wire payload, call the
//! engine with an explicit caller identity, map the outcome onto the
//! unified response wrapper. No business rules live here.

use axum::Extension;
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use super::identity::AuthenticatedUser;
use super::state::AppState;
use super::types::{
    AccountResponseData, ApiError, ApiResponse, ApiResult, DepositRequest, EmailTransferRequest,
    ok, ResolveRequest, TransactionData, TransferRequest, TransferResponseData,
};
use crate::account::AccountRepository;
use crate::core_types::AccountId;
use crate::engine::error::EngineError;
use crate::ledger::TransactionRepository;
use crate::money::parse_amount;

/// Immediate transfer between two accounts
#[utoipa::path(
    post,
    path = "/api/v1/transfer",
    request_body = TransferRequest,
    responses(
        (status = 200, description = "Transfer completed", body = ApiResponse<TransferResponseData>),
        (status = 400, description = "Invalid amount or self transfer"),
        (status = 404, description = "Account not found"),
        (status = 422, description = "Insufficient funds or account not active"),
    ),
    tag = "transfers"
)]
pub async fn create_transfer(
    State(state): State<AppState>,
    Json(req): Json<TransferRequest>,
) -> ApiResult<TransferResponseData> {
    let amount = parse_amount(&req.amount).map_err(EngineError::from)?;

    let receipt = state
        .engine
        .transfer(
            AccountId::from(req.from_account_id),
            AccountId::from(req.to_account_id),
            amount,
            req.description,
        )
        .await?;
    ok(receipt.into())
}

/// Deposit into an account
#[utoipa::path(
    post,
    path = "/api/v1/deposit",
    request_body = DepositRequest,
    responses(
        (status = 200, description = "Deposit completed", body = ApiResponse<TransferResponseData>),
        (status = 400, description = "Invalid amount"),
        (status = 404, description = "Account not found"),
    ),
    tag = "transfers"
)]
pub async fn create_deposit(
    State(state): State<AppState>,
    Json(req): Json<DepositRequest>,
) -> ApiResult<TransferResponseData> {
    let amount = parse_amount(&req.amount).map_err(EngineError::from)?;

    let receipt = state
        .engine
        .deposit(AccountId::from(req.account_id), amount, req.description)
        .await?;
    ok(receipt.into())
}

/// Initiate an escrowed transfer to a recipient addressed by email.
/// The sender is the authenticated caller.
#[utoipa::path(
    post,
    path = "/api/v1/transfer/email",
    request_body = EmailTransferRequest,
    responses(
        (status = 200, description = "Transfer initiated, awaiting acceptance", body = ApiResponse<TransferResponseData>),
        (status = 400, description = "Invalid amount or self transfer"),
        (status = 401, description = "Missing caller identity"),
        (status = 404, description = "No account for sender or recipient"),
        (status = 422, description = "Insufficient funds"),
    ),
    tag = "transfers"
)]
pub async fn send_money(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(req): Json<EmailTransferRequest>,
) -> ApiResult<TransferResponseData> {
    let amount = parse_amount(&req.amount).map_err(EngineError::from)?;
    if req.recipient_email.trim().is_empty() {
        return ApiError::bad_request("Recipient email is required").into_err();
    }

    let receipt = state
        .engine
        .send_money(&user.email, req.recipient_email.trim(), amount, req.description)
        .await?;
    ok(receipt.into())
}

/// Accept or decline the most recent pending transfer for an account.
/// The account must belong to the authenticated caller.
#[utoipa::path(
    post,
    path = "/api/v1/transfer/resolve",
    request_body = ResolveRequest,
    responses(
        (status = 200, description = "Transfer resolved", body = ApiResponse<TransferResponseData>),
        (status = 403, description = "Account belongs to a different owner"),
        (status = 404, description = "Account or pending transfer not found"),
        (status = 409, description = "Already resolved"),
    ),
    tag = "transfers"
)]
pub async fn resolve_transfer(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(req): Json<ResolveRequest>,
) -> ApiResult<TransferResponseData> {
    let recipient_id = AccountId::from(req.recipient_account_id);

    let account = AccountRepository::find_by_id(state.engine.pool(), recipient_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Account not found: {recipient_id}")))?;
    if !account.owner_email.eq_ignore_ascii_case(&user.email) {
        return ApiError::forbidden("Account belongs to a different owner").into_err();
    }

    let receipt = state.engine.resolve(recipient_id, req.accept).await?;
    ok(receipt.into())
}

/// Get account details
#[utoipa::path(
    get,
    path = "/api/v1/account/{account_id}",
    params(("account_id" = Uuid, Path, description = "Account id")),
    responses(
        (status = 200, description = "Account details", body = ApiResponse<AccountResponseData>),
        (status = 404, description = "Account not found"),
    ),
    tag = "accounts"
)]
pub async fn get_account(
    State(state): State<AppState>,
    Path(account_id): Path<Uuid>,
) -> ApiResult<AccountResponseData> {
    let id = AccountId::from(account_id);
    let account = AccountRepository::find_by_id(state.engine.pool(), id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Account not found: {id}")))?;
    ok((&account).into())
}

/// Get account details by the human-readable account number
#[utoipa::path(
    get,
    path = "/api/v1/account/by-number/{account_number}",
    params(("account_number" = String, Path, description = "Account number")),
    responses(
        (status = 200, description = "Account details", body = ApiResponse<AccountResponseData>),
        (status = 404, description = "Account not found"),
    ),
    tag = "accounts"
)]
pub async fn get_account_by_number(
    State(state): State<AppState>,
    Path(account_number): Path<String>,
) -> ApiResult<AccountResponseData> {
    let account = AccountRepository::find_by_account_number(state.engine.pool(), &account_number)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Account not found: {account_number}")))?;
    ok((&account).into())
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct HistoryParams {
    /// Maximum number of records to return (default 50, max 500)
    pub limit: Option<i64>,
}

/// Transaction history for an account, newest first
#[utoipa::path(
    get,
    path = "/api/v1/account/{account_id}/transactions",
    params(
        ("account_id" = Uuid, Path, description = "Account id"),
        HistoryParams,
    ),
    responses(
        (status = 200, description = "Transaction history", body = ApiResponse<Vec<TransactionData>>),
        (status = 404, description = "Account not found"),
    ),
    tag = "accounts"
)]
pub async fn get_account_transactions(
    State(state): State<AppState>,
    Path(account_id): Path<Uuid>,
    Query(params): Query<HistoryParams>,
) -> ApiResult<Vec<TransactionData>> {
    let id = AccountId::from(account_id);
    let limit = params.limit.unwrap_or(50).clamp(1, 500);

    let account = AccountRepository::find_by_id(state.engine.pool(), id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Account not found: {id}")))?;

    let records =
        TransactionRepository::find_by_account(state.engine.pool(), account.account_id, limit)
            .await?;
    ok(records.iter().map(TransactionData::from).collect())
}

/// Liveness and database health
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service healthy"),
        (status = 503, description = "Database unreachable"),
    ),
    tag = "ops"
)]
pub async fn health(State(state): State<AppState>) -> ApiResult<&'static str> {
    state
        .db
        .health_check()
        .await
        .map_err(|e| ApiError::service_unavailable(format!("Database unreachable: {e}")))?;
    ok("ok")
}
