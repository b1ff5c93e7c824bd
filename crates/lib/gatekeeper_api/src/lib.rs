//! # gatekeeper_api
//!
//! HTTP API library for Gatekeeper: router wiring, request handlers, and the
//! authentication/authorization middleware stack.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;

use axum::Router;
use axum::routing::{delete, get, patch, post};
use sqlx::PgPool;
use tower_http::cors::{Any, CorsLayer};

use gatekeeper_core::auth::AuthError;
use gatekeeper_core::auth::authorize::OperationId;
use gatekeeper_core::auth::token::SigningConfig;
use gatekeeper_core::models::{ROLE_ADMIN, ROLE_SUPERADMIN, ROLE_USER};

use crate::config::ApiConfig;
use crate::handlers::{auth, health, permissions, roles, users};
use crate::middleware::guard::Guard;

/// Operation identities the route guards are declared with. Fine-grained
/// permissions grant a route by carrying the same name.
pub mod ops {
    use gatekeeper_core::auth::authorize::OperationId;

    pub const READ_USERS: OperationId = OperationId::from_static("read_users");
    pub const READ_USERS_ME: OperationId = OperationId::from_static("read_users_me");
    pub const GET_USER: OperationId = OperationId::from_static("get_user");
    pub const UPDATE_USER: OperationId = OperationId::from_static("update_user");
    pub const DELETE_USER: OperationId = OperationId::from_static("delete_user");
    pub const READ_ROLES: OperationId = OperationId::from_static("read_roles");
    pub const CREATE_ROLE: OperationId = OperationId::from_static("create_role");
    pub const READ_PERMISSIONS: OperationId = OperationId::from_static("read_permissions");
    pub const CREATE_PERMISSION: OperationId = OperationId::from_static("create_permission");
    pub const CREATE_PERMISSION_ROLE: OperationId =
        OperationId::from_static("create_permission_role");
}

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// PostgreSQL connection pool.
    pub pool: PgPool,
    /// API configuration.
    pub config: ApiConfig,
    /// Token signing material, constructed once at startup.
    pub signing: SigningConfig,
}

/// Run embedded database migrations.
///
/// Delegates to `gatekeeper_core::migrate::migrate()` which owns the
/// migration files.
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    gatekeeper_core::migrate::migrate(pool).await
}

/// Builds the Axum router with all routes and shared state.
///
/// Fails if any route guard is declared with an empty required-role set, so a
/// misconfigured operation is caught at startup rather than allowed through.
pub fn router(state: AppState) -> Result<Router, AuthError> {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Public routes (no auth required)
    let public = Router::new()
        .route("/v1/health", get(health::health))
        .route("/v1/auth/login", post(auth::login_handler))
        .route("/v1/auth/signup", post(auth::signup_handler));

    const ANY_ROLE: [&str; 3] = [ROLE_USER, ROLE_ADMIN, ROLE_SUPERADMIN];
    const SUPERADMIN: [&str; 1] = [ROLE_SUPERADMIN];

    let guarded = |allowed: &[&str], operation: OperationId| -> Result<_, AuthError> {
        let guard = Guard::require(allowed.iter().copied(), operation)?;
        Ok(axum::middleware::from_fn_with_state(
            state.clone(),
            guard.middleware(),
        ))
    };

    // Protected routes: outer auth layer resolves the principal, the per-route
    // guard makes the allow/deny decision.
    let protected = Router::new()
        .route(
            "/v1/users/",
            get(users::read_users).route_layer(guarded(&SUPERADMIN, ops::READ_USERS)?),
        )
        .route(
            "/v1/users/me/",
            get(users::read_users_me).route_layer(guarded(&ANY_ROLE, ops::READ_USERS_ME)?),
        )
        .route(
            "/v1/users/{id}",
            post(users::get_user)
                .route_layer(guarded(&SUPERADMIN, ops::GET_USER)?)
                .merge(
                    patch(users::update_user)
                        .route_layer(guarded(&ANY_ROLE, ops::UPDATE_USER)?),
                )
                .merge(
                    delete(users::delete_user)
                        .route_layer(guarded(&SUPERADMIN, ops::DELETE_USER)?),
                ),
        )
        .route(
            "/v1/roles/",
            get(roles::read_roles)
                .route_layer(guarded(&SUPERADMIN, ops::READ_ROLES)?)
                .merge(
                    post(roles::create_role).route_layer(guarded(&SUPERADMIN, ops::CREATE_ROLE)?),
                ),
        )
        .route(
            "/v1/permissions/",
            get(permissions::read_permissions)
                .route_layer(guarded(&SUPERADMIN, ops::READ_PERMISSIONS)?)
                .merge(
                    post(permissions::create_permission)
                        .route_layer(guarded(&SUPERADMIN, ops::CREATE_PERMISSION)?),
                ),
        )
        .route(
            "/v1/permission-roles/",
            post(permissions::create_permission_role)
                .route_layer(guarded(&SUPERADMIN, ops::CREATE_PERMISSION_ROLE)?),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_auth,
        ));

    Ok(Router::new()
        .merge(public)
        .merge(protected)
        .layer(cors)
        .with_state(state))
}
