//! User request handlers.

use axum::extract::{Path, Query, State};
use axum::{Extension, Json};
use uuid::Uuid;

use gatekeeper_core::auth::queries;
use gatekeeper_core::models::UserPublic;

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::CurrentUser;
use crate::models::{MAX_PAGE_SIZE, Pagination, UpdateUser};

/// `GET /v1/users/`: list users (superadmin).
pub async fn read_users(
    State(state): State<AppState>,
    Query(page): Query<Pagination>,
) -> AppResult<Json<Vec<UserPublic>>> {
    if page.limit > MAX_PAGE_SIZE || page.limit < 0 || page.offset < 0 {
        return Err(AppError::Unprocessable(format!(
            "limit must be between 0 and {MAX_PAGE_SIZE}"
        )));
    }
    let users = queries::list_users(&state.pool, page.offset, page.limit).await?;
    Ok(Json(users.iter().map(UserPublic::from).collect()))
}

/// `GET /v1/users/me/`: the requesting principal.
pub async fn read_users_me(
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Json<UserPublic> {
    Json(UserPublic::from(&user))
}

/// `POST /v1/users/{id}`: fetch one user (superadmin).
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<UserPublic>> {
    let user = queries::find_user_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("user not found".into()))?;
    Ok(Json(UserPublic::from(&user)))
}

/// `PATCH /v1/users/{id}`: update email and/or roles.
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateUser>,
) -> AppResult<Json<UserPublic>> {
    queries::find_user_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("user not found".into()))?;

    queries::update_user_email(&state.pool, id, body.email.as_deref()).await?;
    if let Some(roles) = &body.roles {
        queries::set_user_roles(&state.pool, id, roles).await?;
    }

    let user = queries::find_user_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("user not found".into()))?;
    Ok(Json(UserPublic::from(&user)))
}

/// `DELETE /v1/users/{id}`: remove a user (superadmin).
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    if !queries::delete_user(&state.pool, id).await? {
        return Err(AppError::NotFound("user not found".into()));
    }
    Ok(Json(serde_json::json!({ "ok": true })))
}
