//! Permission CRUD handlers, including the permission-role link.

use axum::Json;
use axum::extract::{Query, State};

use gatekeeper_core::auth::queries;
use gatekeeper_core::models::Permission;

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::models::{CreatePermission, MAX_PAGE_SIZE, Pagination, PermissionRoleLink};

/// `GET /v1/permissions/`: list permissions (superadmin).
pub async fn read_permissions(
    State(state): State<AppState>,
    Query(page): Query<Pagination>,
) -> AppResult<Json<Vec<Permission>>> {
    if page.limit > MAX_PAGE_SIZE || page.limit < 0 || page.offset < 0 {
        return Err(AppError::Unprocessable(format!(
            "limit must be between 0 and {MAX_PAGE_SIZE}"
        )));
    }
    let permissions = queries::list_permissions(&state.pool, page.offset, page.limit).await?;
    Ok(Json(permissions))
}

/// `POST /v1/permissions/`: create a permission (superadmin).
///
/// The permission's name must equal the operation identity of the route it is
/// meant to grant (e.g. `delete_user`).
pub async fn create_permission(
    State(state): State<AppState>,
    Json(body): Json<CreatePermission>,
) -> AppResult<Json<Permission>> {
    let permission = queries::create_permission(&state.pool, &body.name).await?;
    Ok(Json(permission))
}

/// `POST /v1/permission-roles/`: attach a permission to a role (superadmin).
pub async fn create_permission_role(
    State(state): State<AppState>,
    Json(body): Json<PermissionRoleLink>,
) -> AppResult<Json<PermissionRoleLink>> {
    queries::link_permission_role(&state.pool, body.permission_id, body.role_id).await?;
    Ok(Json(body))
}
