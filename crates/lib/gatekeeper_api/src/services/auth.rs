//! Authentication service: login/signup flows delegating to `gatekeeper_core`.

use std::future::Future;

use sqlx::PgPool;
use tracing::info;

use gatekeeper_core::auth::token::SigningConfig;
use gatekeeper_core::auth::{AuthError, password, queries, token};
use gatekeeper_core::models::{ROLE_SUPERADMIN, ROLE_USER, User, UserPublic};

use crate::error::{AppError, AppResult};
use crate::models::Token;

/// Authenticate with email + password and issue an access token.
pub async fn login(
    pool: &PgPool,
    signing: &SigningConfig,
    username: &str,
    password_plain: &str,
) -> AppResult<Token> {
    let user = queries::find_user_by_email(pool, username).await?;
    login_from(user, signing, password_plain)
}

/// Credential check and token issuance for an already-looked-up account.
///
/// Unknown email and wrong password are indistinguishable to the caller.
/// The `disabled` flag is deliberately not consulted here: a disabled user
/// can still log in, but every subsequent protected request is rejected at
/// principal resolution.
fn login_from(
    user: Option<User>,
    signing: &SigningConfig,
    password_plain: &str,
) -> AppResult<Token> {
    let user = user.ok_or(AuthError::InvalidCredentials)?;

    if !password::verify_password(password_plain, &user.password_hash)? {
        return Err(AppError::from(AuthError::InvalidCredentials));
    }

    let access_token = token::issue(signing, user.id, None)?;
    Ok(Token {
        access_token,
        token_type: "bearer".to_string(),
    })
}

/// Register a new account with the lowest-privilege role.
pub async fn signup(pool: &PgPool, email: &str, password_plain: &str) -> AppResult<UserPublic> {
    validate_email(email)?;

    if queries::email_exists(pool, email).await? {
        return Err(AppError::from(AuthError::Conflict));
    }

    let user = register_with(email, password_plain, ROLE_USER, |hash, roles| async move {
        queries::create_user(pool, email, &hash, &roles).await
    })
    .await?;

    info!(user_id = %user.id, "user signed up");
    Ok(user)
}

/// Create a superadmin account (server bootstrap command).
pub async fn create_admin(
    pool: &PgPool,
    email: &str,
    password_plain: &str,
) -> AppResult<UserPublic> {
    let user = register_with(email, password_plain, ROLE_SUPERADMIN, |hash, roles| async move {
        queries::create_user(pool, email, &hash, &roles).await
    })
    .await?;

    info!(user_id = %user.id, "created admin user");
    Ok(user)
}

/// Validate, hash, and hand off to `create` for storage.
///
/// Generic over the storage step so the registration logic (email shape,
/// password hashing, role assignment, public projection) is testable without
/// a database, mirroring how the authorization engine is parameterized over
/// its permission lookup.
async fn register_with<C, Fut>(
    email: &str,
    password_plain: &str,
    role: &str,
    create: C,
) -> AppResult<UserPublic>
where
    C: FnOnce(String, Vec<String>) -> Fut,
    Fut: Future<Output = Result<User, AuthError>>,
{
    validate_email(email)?;

    let password_hash = password::hash_password(password_plain)?;
    let user = create(password_hash, vec![role.to_string()]).await?;
    Ok(UserPublic::from(&user))
}

/// Minimal email shape check: non-empty local part, dotted domain.
fn validate_email(email: &str) -> AppResult<()> {
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.')
        }
        None => false,
    };
    if !valid {
        return Err(AppError::Unprocessable("Invalid email address".into()));
    }
    Ok(())
}
