//! Principal resolution: mapping a validated token subject to a user record.
//!
//! Resolution and activity-gating are separate steps chained by the caller so
//! each is independently testable: `resolve` never looks at `disabled`, and
//! `require_active` never touches storage.

use sqlx::PgPool;
use uuid::Uuid;

use super::{AuthError, queries};
use crate::models::{Role, User};

/// Load the user a token subject refers to, with roles hydrated.
///
/// Fails with [`AuthError::PrincipalNotFound`] when the subject no longer
/// exists; the HTTP layer surfaces that identically to an invalid token.
pub async fn resolve(pool: &PgPool, subject: Uuid) -> Result<User, AuthError> {
    let mut user = queries::find_user_by_id(pool, subject)
        .await?
        .ok_or(AuthError::PrincipalNotFound)?;
    user.roles = normalize_roles(user.roles);
    Ok(user)
}

/// Reject principals whose account has been disabled.
pub fn require_active(user: User) -> Result<User, AuthError> {
    if user.disabled {
        return Err(AuthError::InactiveAccount);
    }
    Ok(user)
}

/// Deduplicate a role list by role id, preserving first-seen order.
///
/// Idempotent: normalizing an already-normalized list is a no-op, so
/// re-resolving a principal always yields a set-equal role list.
pub fn normalize_roles(roles: Vec<Role>) -> Vec<Role> {
    let mut seen = std::collections::HashSet::new();
    roles
        .into_iter()
        .filter(|role| seen.insert(role.id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ROLE_USER;

    fn user(disabled: bool) -> User {
        User {
            id: Uuid::new_v4(),
            email: "a@example.com".into(),
            password_hash: String::new(),
            disabled,
            roles: vec![Role {
                id: Uuid::new_v4(),
                name: ROLE_USER.into(),
            }],
        }
    }

    #[test]
    fn active_user_passes_the_gate() {
        assert!(require_active(user(false)).is_ok());
    }

    #[test]
    fn disabled_user_is_rejected() {
        assert!(matches!(
            require_active(user(true)),
            Err(AuthError::InactiveAccount)
        ));
    }

    #[test]
    fn normalize_drops_duplicates_and_is_idempotent() {
        let admin = Role {
            id: Uuid::new_v4(),
            name: "admin".into(),
        };
        let user_role = Role {
            id: Uuid::new_v4(),
            name: "user".into(),
        };
        let roles = vec![admin.clone(), user_role.clone(), admin.clone()];

        let once = normalize_roles(roles);
        assert_eq!(once, vec![admin.clone(), user_role.clone()]);

        let twice = normalize_roles(once.clone());
        assert_eq!(twice, once);
    }
}
