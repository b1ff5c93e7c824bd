//! Authentication middleware: Bearer token extraction, decode, principal
//! resolution, and the inactive-account gate.
//!
//! Any failure in this chain is a 401 (or 400 for a disabled account); the
//! per-route [`crate::middleware::guard::Guard`] downstream only ever sees a
//! resolved, active principal.

use axum::http::header::AUTHORIZATION;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use gatekeeper_core::auth::{principal, token};
use gatekeeper_core::models::User;

use crate::AppState;
use crate::error::AppError;

/// Resolved, active principal stored in request extensions.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Axum middleware: extracts `Authorization: Bearer <token>`, decodes it,
/// resolves the principal, rejects disabled accounts, and injects
/// [`CurrentUser`] into request extensions.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Missing authorization header".into()))?;

    let bearer = header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Unauthorized("Invalid authorization scheme".into()))?;

    let subject = token::decode(&state.signing, bearer)?;

    let user = principal::resolve(&state.pool, subject).await?;
    let user = principal::require_active(user)?;

    request.extensions_mut().insert(CurrentUser(user));

    Ok(next.run(request).await)
}
