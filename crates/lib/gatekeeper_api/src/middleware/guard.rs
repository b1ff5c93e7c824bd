//! Per-route authorization guards.
//!
//! A [`Guard`] pairs the required-role set a route is declared with and the
//! route's stable operation identity. Guards are built once at router
//! construction; declaring a route with an empty role set fails there instead
//! of at request time.

use std::future::Future;
use std::pin::Pin;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use gatekeeper_core::auth::AuthError;
use gatekeeper_core::auth::authorize::{OperationId, RequiredRoles, authorize};

use crate::AppState;
use crate::error::AppError;
use crate::middleware::auth::CurrentUser;

type GuardFuture = Pin<Box<dyn Future<Output = Result<Response, AppError>> + Send>>;

/// Authorization guard attached to a protected route.
#[derive(Debug, Clone)]
pub struct Guard {
    allowed: RequiredRoles,
    operation: OperationId,
}

impl Guard {
    /// Declare a guard for an operation. Fails for an empty role set.
    pub fn require<I, S>(allowed: I, operation: OperationId) -> Result<Self, AuthError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Ok(Self {
            allowed: RequiredRoles::new(allowed)?,
            operation,
        })
    }

    /// Run the authorization decision for one request.
    ///
    /// Expects [`CurrentUser`] to have been injected by
    /// [`crate::middleware::auth::require_auth`] upstream; its absence means
    /// the route was wired without the auth layer and is treated as 401.
    pub async fn enforce(
        self,
        State(state): State<AppState>,
        request: Request,
        next: Next,
    ) -> Result<Response, AppError> {
        let CurrentUser(user) = request
            .extensions()
            .get::<CurrentUser>()
            .cloned()
            .ok_or_else(|| AppError::Unauthorized("Could not validate credentials".into()))?;

        authorize(&state.pool, &user, &self.allowed, &self.operation).await?;

        Ok(next.run(request).await)
    }

    /// Adapt the guard into a function usable with
    /// `axum::middleware::from_fn_with_state`.
    pub fn middleware(
        self,
    ) -> impl Fn(State<AppState>, Request, Next) -> GuardFuture + Clone + Send + 'static {
        move |state: State<AppState>, request: Request, next: Next| {
            Box::pin(self.clone().enforce(state, request, next))
        }
    }
}
