//! Caller identity extraction.
//!
//! Authentication happens upstream (reverse proxy / auth service); by the
//! time a request reaches this service the principal's email arrives in the
//! `x-authenticated-user` header. The middleware turns it into a typed
//! extension so handlers never read headers themselves.

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;

use super::types::ApiError;

pub const PRINCIPAL_HEADER: &str = "x-authenticated-user";

/// The authenticated caller, resolved once per request
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub email: String,
}

pub async fn require_identity(mut request: Request, next: Next) -> Result<Response, ApiError> {
    let email = request
        .headers()
        .get(PRINCIPAL_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty() && v.contains('@'))
        .map(str::to_string)
        .ok_or_else(|| ApiError::unauthenticated("Missing or invalid caller identity"))?;

    request
        .extensions_mut()
        .insert(AuthenticatedUser { email });
    Ok(next.run(request).await)
}
