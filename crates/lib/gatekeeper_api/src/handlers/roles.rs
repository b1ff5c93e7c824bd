//! Role CRUD handlers (administrative mutation of the role/permission graph).

use axum::Json;
use axum::extract::{Query, State};

use gatekeeper_core::auth::queries;
use gatekeeper_core::models::Role;

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::models::{CreateRole, MAX_PAGE_SIZE, Pagination};

/// `GET /v1/roles/`: list roles (superadmin).
pub async fn read_roles(
    State(state): State<AppState>,
    Query(page): Query<Pagination>,
) -> AppResult<Json<Vec<Role>>> {
    if page.limit > MAX_PAGE_SIZE || page.limit < 0 || page.offset < 0 {
        return Err(AppError::Unprocessable(format!(
            "limit must be between 0 and {MAX_PAGE_SIZE}"
        )));
    }
    let roles = queries::list_roles(&state.pool, page.offset, page.limit).await?;
    Ok(Json(roles))
}

/// `POST /v1/roles/`: create a role (superadmin).
pub async fn create_role(
    State(state): State<AppState>,
    Json(body): Json<CreateRole>,
) -> AppResult<Json<Role>> {
    let role = queries::create_role(&state.pool, &body.name).await?;
    Ok(Json(role))
}
