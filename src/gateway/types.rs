//! API boundary types: unified response wrapper, error mapping and the
//! typed request/response payloads.
//!
//! Requests carry amounts as strings (never JSON floats); every response is
//! wrapped in `ApiResponse { code, msg, data }`.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::account::Account;
use crate::engine::TransferReceipt;
use crate::engine::error::EngineError;
use crate::ledger::Transaction;
use crate::money::format_amount;

// ============================================================================
// Unified API Response Format
// ============================================================================

/// Unified API response wrapper
///
/// - code: 0 = success, non-zero = error code
/// - msg: short message description
/// - data: actual data (success) or null (error)
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    /// Response code: 0 for success, non-zero for errors
    #[schema(example = 0)]
    pub code: i32,
    /// Response message
    #[schema(example = "ok")]
    pub msg: String,
    /// Response data (only present when code == 0)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            code: 0,
            msg: "ok".to_string(),
            data: Some(data),
        }
    }
}

pub type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

/// Wrap a payload in a success response
pub fn ok<T>(data: T) -> ApiResult<T> {
    Ok(Json(ApiResponse::success(data)))
}

// ============================================================================
// Error Codes
// ============================================================================

pub mod error_codes {
    pub const VALIDATION: i32 = 1001;
    pub const INSUFFICIENT_FUNDS: i32 = 1002;
    pub const SELF_TRANSFER: i32 = 1003;
    pub const ACCOUNT_NOT_ACTIVE: i32 = 1004;
    pub const NO_PENDING_TRANSACTION: i32 = 1005;
    pub const UNAUTHENTICATED: i32 = 1401;
    pub const UNAUTHORIZED: i32 = 1403;
    pub const NOT_FOUND: i32 = 1404;
    pub const INVALID_STATE: i32 = 1409;
    pub const DUPLICATE_REFERENCE: i32 = 1410;
    /// Concurrent-update race lost; safe for the caller to retry
    pub const CONFLICT: i32 = 1429;
    pub const INTERNAL: i32 = 1500;
}

// ============================================================================
// API Error
// ============================================================================

/// Error carrying the HTTP status and the wire error code
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: i32,
    pub msg: String,
}

impl ApiError {
    pub fn new(status: StatusCode, code: i32, msg: impl Into<String>) -> Self {
        Self {
            status,
            code,
            msg: msg.into(),
        }
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, error_codes::VALIDATION, msg)
    }

    pub fn unauthenticated(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, error_codes::UNAUTHENTICATED, msg)
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, error_codes::UNAUTHORIZED, msg)
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, error_codes::NOT_FOUND, msg)
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            error_codes::INTERNAL,
            msg,
        )
    }

    pub fn service_unavailable(msg: impl Into<String>) -> Self {
        Self::new(
            StatusCode::SERVICE_UNAVAILABLE,
            error_codes::INTERNAL,
            msg,
        )
    }

    pub fn into_err<T>(self) -> ApiResult<T> {
        Err(self)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiResponse::<()> {
            code: self.code,
            msg: self.msg,
            data: None,
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<EngineError> for ApiError {
    fn from(e: EngineError) -> Self {
        let msg = e.to_string();
        match e {
            EngineError::AccountNotFound(_) | EngineError::OwnerAccountNotFound(_) => {
                Self::new(StatusCode::NOT_FOUND, error_codes::NOT_FOUND, msg)
            }
            EngineError::Validation(_) => {
                Self::new(StatusCode::BAD_REQUEST, error_codes::VALIDATION, msg)
            }
            EngineError::SelfTransfer => {
                Self::new(StatusCode::BAD_REQUEST, error_codes::SELF_TRANSFER, msg)
            }
            EngineError::InsufficientFunds { .. } => Self::new(
                StatusCode::UNPROCESSABLE_ENTITY,
                error_codes::INSUFFICIENT_FUNDS,
                msg,
            ),
            EngineError::AccountNotActive { .. } => Self::new(
                StatusCode::UNPROCESSABLE_ENTITY,
                error_codes::ACCOUNT_NOT_ACTIVE,
                msg,
            ),
            EngineError::NoPendingTransaction => Self::new(
                StatusCode::NOT_FOUND,
                error_codes::NO_PENDING_TRANSACTION,
                msg,
            ),
            EngineError::Unauthorized => {
                Self::new(StatusCode::FORBIDDEN, error_codes::UNAUTHORIZED, msg)
            }
            EngineError::InvalidStateTransition { .. } => {
                Self::new(StatusCode::CONFLICT, error_codes::INVALID_STATE, msg)
            }
            EngineError::DuplicateReference(_) => {
                Self::new(StatusCode::CONFLICT, error_codes::DUPLICATE_REFERENCE, msg)
            }
            EngineError::Conflict(_) => {
                Self::new(StatusCode::CONFLICT, error_codes::CONFLICT, msg)
            }
            EngineError::Persistence(_) | EngineError::Database(_) => {
                tracing::error!("persistence failure: {msg}");
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    error_codes::INTERNAL,
                    "Internal error",
                )
            }
        }
    }
}

// ============================================================================
// Request DTOs
// ============================================================================

/// Immediate transfer between two accounts
#[derive(Debug, Deserialize, ToSchema)]
pub struct TransferRequest {
    pub from_account_id: Uuid,
    pub to_account_id: Uuid,
    /// Decimal amount as string to avoid float precision issues in JSON
    pub amount: String,
    pub description: Option<String>,
}

/// Deposit into an account
#[derive(Debug, Deserialize, ToSchema)]
pub struct DepositRequest {
    pub account_id: Uuid,
    pub amount: String,
    pub description: Option<String>,
}

/// Escrowed transfer addressed by the recipient's email; the sender is the
/// authenticated caller
#[derive(Debug, Deserialize, ToSchema)]
pub struct EmailTransferRequest {
    pub recipient_email: String,
    pub amount: String,
    pub description: Option<String>,
}

/// Accept or decline the most recent pending transfer for an account
#[derive(Debug, Deserialize, ToSchema)]
pub struct ResolveRequest {
    pub recipient_account_id: Uuid,
    pub accept: bool,
}

// ============================================================================
// Response DTOs
// ============================================================================

/// Outcome of a transfer, deposit or resolution
#[derive(Debug, Serialize, ToSchema)]
pub struct TransferResponseData {
    pub transaction_id: String,
    /// Caller-visible correlation id (distinct from the transaction id)
    pub reference_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interac_reference: Option<String>,
    pub status: String,
    pub amount: String,
    pub message: String,
}

impl From<TransferReceipt> for TransferResponseData {
    fn from(r: TransferReceipt) -> Self {
        Self {
            transaction_id: r.transaction_id.to_string(),
            reference_id: r.reference_number,
            interac_reference: r.interac_reference,
            status: r.status.as_str().to_string(),
            amount: format_amount(r.amount),
            message: r.message,
        }
    }
}

/// Account details
#[derive(Debug, Serialize, ToSchema)]
pub struct AccountResponseData {
    pub account_id: String,
    pub account_number: String,
    pub owner_email: String,
    pub account_type: String,
    pub status: String,
    pub balance: String,
    pub available_balance: String,
    pub currency: String,
}

impl From<&Account> for AccountResponseData {
    fn from(a: &Account) -> Self {
        Self {
            account_id: a.account_id.to_string(),
            account_number: a.account_number.clone(),
            owner_email: a.owner_email.clone(),
            account_type: a.account_type.as_str().to_string(),
            status: a.status.as_str().to_string(),
            balance: format_amount(a.balance),
            available_balance: format_amount(a.available_balance),
            currency: a.currency.clone(),
        }
    }
}

/// Ledger record in history responses
#[derive(Debug, Serialize, ToSchema)]
pub struct TransactionData {
    pub transaction_id: String,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_account_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_account_id: Option<String>,
    pub transaction_type: String,
    pub amount: String,
    pub currency: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub reference_number: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processed_at: Option<String>,
}

impl From<&Transaction> for TransactionData {
    fn from(t: &Transaction) -> Self {
        Self {
            transaction_id: t.transaction_id.to_string(),
            created_at: t.created_at.to_rfc3339(),
            from_account_id: t.from_account_id.map(|id| id.to_string()),
            to_account_id: t.to_account_id.map(|id| id.to_string()),
            transaction_type: t.transaction_type.as_str().to_string(),
            amount: format_amount(t.amount),
            currency: t.currency.clone(),
            description: t.description.clone(),
            reference_number: t.reference_number.clone(),
            status: t.status.as_str().to_string(),
            processed_at: t.processed_at.map(|p| p.to_rfc3339()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_engine_error_http_mapping() {
        let cases: Vec<(EngineError, StatusCode, i32)> = vec![
            (
                EngineError::AccountNotFound(crate::core_types::AccountId::generate()),
                StatusCode::NOT_FOUND,
                error_codes::NOT_FOUND,
            ),
            (
                EngineError::SelfTransfer,
                StatusCode::BAD_REQUEST,
                error_codes::SELF_TRANSFER,
            ),
            (
                EngineError::from(crate::money::MoneyError::InvalidAmount),
                StatusCode::BAD_REQUEST,
                error_codes::VALIDATION,
            ),
            (
                EngineError::InsufficientFunds {
                    available: dec!(10),
                },
                StatusCode::UNPROCESSABLE_ENTITY,
                error_codes::INSUFFICIENT_FUNDS,
            ),
            (
                EngineError::Unauthorized,
                StatusCode::FORBIDDEN,
                error_codes::UNAUTHORIZED,
            ),
            (
                EngineError::NoPendingTransaction,
                StatusCode::NOT_FOUND,
                error_codes::NO_PENDING_TRANSACTION,
            ),
            (
                EngineError::Conflict(crate::core_types::AccountId::generate()),
                StatusCode::CONFLICT,
                error_codes::CONFLICT,
            ),
        ];

        for (err, status, code) in cases {
            let api: ApiError = err.into();
            assert_eq!(api.status, status);
            assert_eq!(api.code, code);
        }
    }

    #[test]
    fn test_envelope_wire_shape() {
        let body = serde_json::to_value(ApiResponse::success("created")).unwrap();
        assert_eq!(body["code"], 0);
        assert_eq!(body["msg"], "ok");
        assert_eq!(body["data"], "created");

        let err = ApiError::not_found("missing");
        let body = serde_json::to_value(ApiResponse::<()> {
            code: err.code,
            msg: err.msg,
            data: None,
        })
        .unwrap();
        assert_eq!(body["code"], error_codes::NOT_FOUND);
        // data is omitted entirely on errors, not serialized as null
        assert!(body.get("data").is_none());
    }

    #[test]
    fn test_database_errors_are_not_leaked() {
        let api: ApiError = EngineError::Persistence("row corrupted".to_string()).into();
        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(api.msg, "Internal error");
    }

    #[test]
    fn test_receipt_to_response() {
        let receipt = TransferReceipt {
            transaction_id: crate::core_types::TransactionId::generate(),
            reference_number: "TXN17000000000001ab".to_string(),
            interac_reference: Some("INT-1700000000000".to_string()),
            status: crate::ledger::TransactionStatus::Pending,
            amount: dec!(30),
            message: "ok".to_string(),
        };
        let data: TransferResponseData = receipt.into();
        assert_eq!(data.status, "PENDING");
        assert_eq!(data.amount, "30.00");
        assert!(data.interac_reference.is_some());
    }
}
