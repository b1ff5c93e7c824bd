//! RBAC domain models.
//!
//! Roles and permissions are first-class relational entities (a many-to-many
//! graph), not a closed enum: the fine-grained permission-match strategy in
//! [`crate::auth::authorize`] walks role → permission edges at decision time.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lowest-privilege role, granted to every signup by default.
pub const ROLE_USER: &str = "user";
/// Mid-tier administrative role.
pub const ROLE_ADMIN: &str = "admin";
/// Highest-privilege role.
pub const ROLE_SUPERADMIN: &str = "superadmin";

/// A named privilege tier. Role names are compared case-sensitively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: Uuid,
    pub name: String,
}

/// A named capability. A permission grants an operation when its name equals
/// the operation's identity (e.g. `delete_user`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    pub id: Uuid,
    pub name: String,
}

/// Identity record with hydrated roles.
///
/// `roles` is deduplicated on load; re-resolving the same principal yields a
/// set-equal role list.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub disabled: bool,
    pub roles: Vec<Role>,
}

impl User {
    /// Whether the user holds a role with the given name.
    pub fn has_role(&self, name: &str) -> bool {
        self.roles.iter().any(|r| r.name == name)
    }
}

/// Public projection of a user (no password hash).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserPublic {
    pub id: Uuid,
    pub email: String,
    pub roles: Vec<String>,
}

impl From<&User> for UserPublic {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            roles: user.roles.iter().map(|r| r.name.clone()).collect(),
        }
    }
}
