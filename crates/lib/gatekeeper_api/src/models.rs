//! API request/response models.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// `POST /v1/auth/login` success body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    pub token_type: String,
}

/// OAuth2-style login form (`username` carries the email).
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Signup payload.
#[derive(Debug, Deserialize)]
pub struct CreateUser {
    pub email: String,
    pub password: String,
}

/// Partial user update. Omitted fields are left untouched.
#[derive(Debug, Deserialize)]
pub struct UpdateUser {
    pub email: Option<String>,
    pub roles: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct CreateRole {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct CreatePermission {
    pub name: String,
}

/// Link payload attaching a permission to a role.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PermissionRoleLink {
    pub permission_id: Uuid,
    pub role_id: Uuid,
}

/// Offset/limit pagination, limit capped at 100.
#[derive(Debug, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub offset: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

pub const MAX_PAGE_SIZE: i64 = 100;

fn default_limit() -> i64 {
    MAX_PAGE_SIZE
}

#[derive(Debug, Serialize)]
pub struct Health {
    pub message: String,
}
