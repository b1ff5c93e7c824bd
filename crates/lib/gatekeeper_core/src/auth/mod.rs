//! Authentication and authorization logic.
//!
//! Provides credential verification, bearer token issuance/validation,
//! principal resolution, and the per-request authorization decision engine.

pub mod authorize;
pub mod password;
pub mod principal;
pub mod queries;
pub mod token;

use thiserror::Error;

/// Authentication/authorization failure taxonomy.
///
/// The HTTP layer maps these onto status codes; messages stay generic so a
/// denial never reveals which credential field, role, or permission was wrong.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Bad username/password at login. Never hints at which field was wrong.
    #[error("Incorrect username or password")]
    InvalidCredentials,

    /// Malformed, expired, or signature-mismatched bearer token.
    #[error("Could not validate credentials")]
    InvalidToken,

    /// Token referenced a non-existent user. Surfaced identically to
    /// `InvalidToken` so callers cannot probe for account existence.
    #[error("Could not validate credentials")]
    PrincipalNotFound,

    /// Resolved user has `disabled` set.
    #[error("Inactive user")]
    InactiveAccount,

    /// Authenticated, active principal lacks the required role/permission.
    #[error("The user does not have a role that is authorized to access this resource")]
    Forbidden,

    /// Unique-constraint violation (e.g. duplicate signup email).
    #[error("Integrity error, validate user data")]
    Conflict,

    /// A role name that does not exist in the roles table.
    #[error("Unknown role: {0}")]
    UnknownRole(String),

    /// A route guard was declared with an empty required-role set.
    #[error("Invalid guard configuration: {0}")]
    InvalidGuard(String),

    #[error("Database error: {0}")]
    Db(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}
