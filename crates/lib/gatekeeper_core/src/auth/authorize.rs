//! Authorization decision engine.
//!
//! Two independent strategies, either of which allows:
//!
//! 1. role-set match: the principal holds one of the roles the operation was
//!    declared with;
//! 2. fine-grained match: any permission attached to any of the principal's
//!    roles is named exactly like the operation.
//!
//! Every call recomputes from current role/permission data: there is no
//! decision cache, so privilege changes take effect on the very next request
//! even for tokens issued earlier.

use std::borrow::Cow;
use std::collections::BTreeSet;
use std::future::Future;

use sqlx::PgPool;
use tracing::warn;
use uuid::Uuid;

use super::{AuthError, queries};
use crate::models::{Permission, User};

/// Stable identity of a protected operation (e.g. `delete_user`).
///
/// Attached to routes at registration time so the engine matches against an
/// explicit value instead of introspecting the routing framework.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OperationId(Cow<'static, str>);

impl OperationId {
    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for OperationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Non-empty set of role names an operation is declared with.
///
/// An operation declared with no required roles is a programming error in the
/// caller; construction rejects it so the mistake surfaces when routes are
/// registered, not as a silent allow/deny at request time.
#[derive(Debug, Clone)]
pub struct RequiredRoles(BTreeSet<String>);

impl RequiredRoles {
    pub fn new<I, S>(roles: I) -> Result<Self, AuthError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let set: BTreeSet<String> = roles.into_iter().map(Into::into).collect();
        if set.is_empty() {
            return Err(AuthError::InvalidGuard(
                "required-role set must not be empty".into(),
            ));
        }
        Ok(Self(set))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

/// Coarse strategy: non-empty intersection between the principal's roles and
/// the operation's required roles. A roleless principal always fails here.
fn role_set_match(user: &User, required: &RequiredRoles) -> bool {
    user.roles.iter().any(|role| required.contains(&role.name))
}

/// Authorize `user` for `operation`, fetching per-role permissions through
/// `permissions_for_role`.
///
/// Generic over the lookup so the decision logic is testable without a
/// database; [`authorize`] is the sqlx-backed entry point. A lookup failure
/// for one role is logged and counted as "no match" for that role rather than
/// aborting the whole decision.
pub async fn authorize_with<F, Fut>(
    user: &User,
    required: &RequiredRoles,
    operation: &OperationId,
    mut permissions_for_role: F,
) -> Result<(), AuthError>
where
    F: FnMut(Uuid) -> Fut,
    Fut: Future<Output = Result<Vec<Permission>, AuthError>>,
{
    if role_set_match(user, required) {
        return Ok(());
    }

    // OR across the principal's roles, OR across each role's permissions:
    // one matching permission on one role is sufficient.
    for role in &user.roles {
        match permissions_for_role(role.id).await {
            Ok(permissions) => {
                if permissions.iter().any(|p| p.name == operation.as_str()) {
                    return Ok(());
                }
            }
            Err(e) => {
                warn!(
                    role = %role.name,
                    operation = %operation,
                    error = %e,
                    "permission lookup failed, treating role as granting nothing"
                );
            }
        }
    }

    Err(AuthError::Forbidden)
}

/// Authorize against the role/permission graph in the database.
pub async fn authorize(
    pool: &PgPool,
    user: &User,
    required: &RequiredRoles,
    operation: &OperationId,
) -> Result<(), AuthError> {
    authorize_with(user, required, operation, |role_id| {
        queries::permissions_for_role(pool, role_id)
    })
    .await
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::models::{ROLE_ADMIN, ROLE_SUPERADMIN, ROLE_USER, Role};

    fn role(name: &str) -> Role {
        Role {
            id: Uuid::new_v4(),
            name: name.to_string(),
        }
    }

    fn user_with_roles(roles: Vec<Role>) -> User {
        User {
            id: Uuid::new_v4(),
            email: "a@example.com".into(),
            password_hash: String::new(),
            disabled: false,
            roles,
        }
    }

    fn graph(
        entries: &[(Uuid, &str)],
    ) -> impl FnMut(Uuid) -> std::future::Ready<Result<Vec<Permission>, AuthError>> + use<> {
        let mut by_role: HashMap<Uuid, Vec<Permission>> = HashMap::new();
        for (role_id, name) in entries {
            by_role.entry(*role_id).or_default().push(Permission {
                id: Uuid::new_v4(),
                name: name.to_string(),
            });
        }
        move |role_id| std::future::ready(Ok(by_role.get(&role_id).cloned().unwrap_or_default()))
    }

    #[test]
    fn empty_required_roles_is_a_configuration_error() {
        let empty: Vec<String> = Vec::new();
        assert!(matches!(
            RequiredRoles::new(empty),
            Err(AuthError::InvalidGuard(_))
        ));
    }

    #[tokio::test]
    async fn role_intersection_allows() {
        let user = user_with_roles(vec![role(ROLE_ADMIN)]);
        let required = RequiredRoles::new([ROLE_ADMIN, ROLE_SUPERADMIN]).unwrap();
        let op = OperationId::from_static("read_users");
        assert!(authorize_with(&user, &required, &op, graph(&[]))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn disjoint_roles_without_permission_deny() {
        let user = user_with_roles(vec![role(ROLE_USER)]);
        let required = RequiredRoles::new([ROLE_SUPERADMIN]).unwrap();
        let op = OperationId::from_static("read_users");
        assert!(matches!(
            authorize_with(&user, &required, &op, graph(&[])).await,
            Err(AuthError::Forbidden)
        ));
    }

    #[tokio::test]
    async fn roleless_principal_is_always_denied() {
        let user = user_with_roles(Vec::new());
        let required = RequiredRoles::new([ROLE_USER, ROLE_ADMIN, ROLE_SUPERADMIN]).unwrap();
        let op = OperationId::from_static("read_users_me");
        assert!(matches!(
            authorize_with(&user, &required, &op, graph(&[])).await,
            Err(AuthError::Forbidden)
        ));
    }

    #[tokio::test]
    async fn named_permission_allows_without_role_match() {
        let reader = role("auditor");
        let user = user_with_roles(vec![reader.clone()]);
        let required = RequiredRoles::new([ROLE_SUPERADMIN]).unwrap();
        let op = OperationId::from_static("delete_user");
        let lookup = graph(&[(reader.id, "delete_user")]);
        assert!(authorize_with(&user, &required, &op, lookup).await.is_ok());
    }

    #[tokio::test]
    async fn permission_on_any_role_is_sufficient() {
        let first = role("auditor");
        let second = role("janitor");
        let user = user_with_roles(vec![first.clone(), second.clone()]);
        let required = RequiredRoles::new([ROLE_SUPERADMIN]).unwrap();
        let op = OperationId::from_static("delete_user");
        let lookup = graph(&[(first.id, "read_users"), (second.id, "delete_user")]);
        assert!(authorize_with(&user, &required, &op, lookup).await.is_ok());
    }

    #[tokio::test]
    async fn permission_name_must_match_exactly() {
        let reader = role("auditor");
        let user = user_with_roles(vec![reader.clone()]);
        let required = RequiredRoles::new([ROLE_SUPERADMIN]).unwrap();
        let op = OperationId::from_static("delete_user");
        let lookup = graph(&[(reader.id, "delete_users")]);
        assert!(matches!(
            authorize_with(&user, &required, &op, lookup).await,
            Err(AuthError::Forbidden)
        ));
    }

    #[tokio::test]
    async fn lookup_failure_counts_as_no_match_for_that_role() {
        let broken = role("auditor");
        let granting = role("janitor");
        let user = user_with_roles(vec![broken.clone(), granting.clone()]);
        let required = RequiredRoles::new([ROLE_SUPERADMIN]).unwrap();
        let op = OperationId::from_static("delete_user");

        let granting_id = granting.id;
        let lookup = move |role_id: Uuid| {
            std::future::ready(if role_id == granting_id {
                Ok(vec![Permission {
                    id: Uuid::new_v4(),
                    name: "delete_user".into(),
                }])
            } else {
                Err(AuthError::Internal("lookup exploded".into()))
            })
        };

        // The broken role is skipped; the granting role still allows.
        assert!(authorize_with(&user, &required, &op, lookup).await.is_ok());
    }
}
