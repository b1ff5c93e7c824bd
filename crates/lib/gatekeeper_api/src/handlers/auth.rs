//! Authentication request handlers.

use axum::extract::State;
use axum::{Form, Json};

use gatekeeper_core::models::UserPublic;

use crate::AppState;
use crate::error::AppResult;
use crate::models::{CreateUser, LoginForm, Token};
use crate::services::auth;

/// `POST /v1/auth/login`: OAuth2-style form login, returns a bearer token.
pub async fn login_handler(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> AppResult<Json<Token>> {
    let token = auth::login(&state.pool, &state.signing, &form.username, &form.password).await?;
    Ok(Json(token))
}

/// `POST /v1/auth/signup`: create an account with the default role.
pub async fn signup_handler(
    State(state): State<AppState>,
    Json(body): Json<CreateUser>,
) -> AppResult<Json<UserPublic>> {
    let user = auth::signup(&state.pool, &body.email, &body.password).await?;
    Ok(Json(user))
}
