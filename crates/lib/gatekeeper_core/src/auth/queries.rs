//! RBAC database queries.
//!
//! The authorization path only ever reads; mutations here back the
//! administrative CRUD surface and signup.

use sqlx::PgPool;
use uuid::Uuid;

use super::AuthError;
use crate::models::{Permission, Role, User};
use crate::uuid::uuidv7;

/// Map database errors, surfacing unique-constraint violations as conflicts.
fn map_db(e: sqlx::Error) -> AuthError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => AuthError::Conflict,
        _ => AuthError::Db(e),
    }
}

async fn roles_for_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Role>, AuthError> {
    let rows = sqlx::query_as::<_, (Uuid, String)>(
        "SELECT DISTINCT r.id, r.name FROM roles r \
         JOIN user_roles ur ON ur.role_id = r.id \
         WHERE ur.user_id = $1",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
    .map_err(map_db)?;
    Ok(rows.into_iter().map(|(id, name)| Role { id, name }).collect())
}

async fn hydrate(pool: &PgPool, row: (Uuid, String, String, bool)) -> Result<User, AuthError> {
    let (id, email, password_hash, disabled) = row;
    let roles = roles_for_user(pool, id).await?;
    Ok(User {
        id,
        email,
        password_hash,
        disabled,
        roles,
    })
}

/// Fetch a user by email, roles hydrated.
pub async fn find_user_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, AuthError> {
    let row = sqlx::query_as::<_, (Uuid, String, String, bool)>(
        "SELECT id, email, password_hash, disabled FROM users WHERE email = $1",
    )
    .bind(email)
    .fetch_optional(pool)
    .await
    .map_err(map_db)?;
    match row {
        Some(row) => Ok(Some(hydrate(pool, row).await?)),
        None => Ok(None),
    }
}

/// Fetch a user by id, roles hydrated.
pub async fn find_user_by_id(pool: &PgPool, id: Uuid) -> Result<Option<User>, AuthError> {
    let row = sqlx::query_as::<_, (Uuid, String, String, bool)>(
        "SELECT id, email, password_hash, disabled FROM users WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(map_db)?;
    match row {
        Some(row) => Ok(Some(hydrate(pool, row).await?)),
        None => Ok(None),
    }
}

/// Whether an email is already registered.
pub async fn email_exists(pool: &PgPool, email: &str) -> Result<bool, AuthError> {
    sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
        .bind(email)
        .fetch_one(pool)
        .await
        .map_err(map_db)
}

/// Create a user with the given role names, returning the hydrated record.
///
/// Every role name must exist in the roles table; an unknown name fails the
/// whole call with [`AuthError::UnknownRole`].
pub async fn create_user(
    pool: &PgPool,
    email: &str,
    password_hash: &str,
    role_names: &[String],
) -> Result<User, AuthError> {
    let id = uuidv7();
    sqlx::query("INSERT INTO users (id, email, password_hash) VALUES ($1, $2, $3)")
        .bind(id)
        .bind(email)
        .bind(password_hash)
        .execute(pool)
        .await
        .map_err(map_db)?;

    set_user_roles(pool, id, role_names).await?;

    find_user_by_id(pool, id)
        .await?
        .ok_or_else(|| AuthError::Internal("created user vanished".into()))
}

/// Replace a user's role set with the given role names.
///
/// All names are resolved up front; an unknown name fails the call before
/// any rows are touched.
pub async fn set_user_roles(
    pool: &PgPool,
    user_id: Uuid,
    role_names: &[String],
) -> Result<(), AuthError> {
    for name in role_names {
        find_role_by_name(pool, name)
            .await?
            .ok_or_else(|| AuthError::UnknownRole(name.clone()))?;
    }
    sqlx::query("DELETE FROM user_roles WHERE user_id = $1")
        .bind(user_id)
        .execute(pool)
        .await
        .map_err(map_db)?;
    sqlx::query(
        "INSERT INTO user_roles (user_id, role_id) \
         SELECT $1, id FROM roles WHERE name = ANY($2) \
         ON CONFLICT DO NOTHING",
    )
    .bind(user_id)
    .bind(role_names)
    .execute(pool)
    .await
    .map_err(map_db)?;
    Ok(())
}

/// List users with roles hydrated, ordered by creation (v7 ids).
pub async fn list_users(pool: &PgPool, offset: i64, limit: i64) -> Result<Vec<User>, AuthError> {
    let rows = sqlx::query_as::<_, (Uuid, String, String, bool)>(
        "SELECT id, email, password_hash, disabled FROM users \
         ORDER BY id OFFSET $1 LIMIT $2",
    )
    .bind(offset)
    .bind(limit)
    .fetch_all(pool)
    .await
    .map_err(map_db)?;

    let mut users = Vec::with_capacity(rows.len());
    for row in rows {
        users.push(hydrate(pool, row).await?);
    }
    Ok(users)
}

/// Update a user's email. `None` leaves the field untouched.
pub async fn update_user_email(
    pool: &PgPool,
    user_id: Uuid,
    email: Option<&str>,
) -> Result<(), AuthError> {
    if let Some(email) = email {
        sqlx::query("UPDATE users SET email = $2, modified = now() WHERE id = $1")
            .bind(user_id)
            .bind(email)
            .execute(pool)
            .await
            .map_err(map_db)?;
    }
    Ok(())
}

/// Delete a user. Returns whether a row was removed.
pub async fn delete_user(pool: &PgPool, user_id: Uuid) -> Result<bool, AuthError> {
    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(user_id)
        .execute(pool)
        .await
        .map_err(map_db)?;
    Ok(result.rows_affected() > 0)
}

/// Permissions attached to a role: the fine-grained lookup the authorization
/// engine performs once per principal role on every decision.
pub async fn permissions_for_role(
    pool: &PgPool,
    role_id: Uuid,
) -> Result<Vec<Permission>, AuthError> {
    let rows = sqlx::query_as::<_, (Uuid, String)>(
        "SELECT p.id, p.name FROM permissions p \
         JOIN role_permissions rp ON rp.permission_id = p.id \
         WHERE rp.role_id = $1",
    )
    .bind(role_id)
    .fetch_all(pool)
    .await
    .map_err(map_db)?;
    Ok(rows
        .into_iter()
        .map(|(id, name)| Permission { id, name })
        .collect())
}

/// Fetch a role by name. Names are unique, so at most one row matches.
pub async fn find_role_by_name(pool: &PgPool, name: &str) -> Result<Option<Role>, AuthError> {
    let row = sqlx::query_as::<_, (Uuid, String)>("SELECT id, name FROM roles WHERE name = $1")
        .bind(name)
        .fetch_optional(pool)
        .await
        .map_err(map_db)?;
    Ok(row.map(|(id, name)| Role { id, name }))
}

/// List all roles.
pub async fn list_roles(pool: &PgPool, offset: i64, limit: i64) -> Result<Vec<Role>, AuthError> {
    let rows = sqlx::query_as::<_, (Uuid, String)>(
        "SELECT id, name FROM roles ORDER BY name OFFSET $1 LIMIT $2",
    )
    .bind(offset)
    .bind(limit)
    .fetch_all(pool)
    .await
    .map_err(map_db)?;
    Ok(rows.into_iter().map(|(id, name)| Role { id, name }).collect())
}

/// Create a role.
pub async fn create_role(pool: &PgPool, name: &str) -> Result<Role, AuthError> {
    let id = sqlx::query_scalar::<_, Uuid>(
        "INSERT INTO roles (name) VALUES ($1) RETURNING id",
    )
    .bind(name)
    .fetch_one(pool)
    .await
    .map_err(map_db)?;
    Ok(Role {
        id,
        name: name.to_string(),
    })
}

/// List all permissions.
pub async fn list_permissions(
    pool: &PgPool,
    offset: i64,
    limit: i64,
) -> Result<Vec<Permission>, AuthError> {
    let rows = sqlx::query_as::<_, (Uuid, String)>(
        "SELECT id, name FROM permissions ORDER BY id OFFSET $1 LIMIT $2",
    )
    .bind(offset)
    .bind(limit)
    .fetch_all(pool)
    .await
    .map_err(map_db)?;
    Ok(rows
        .into_iter()
        .map(|(id, name)| Permission { id, name })
        .collect())
}

/// Create a permission.
pub async fn create_permission(pool: &PgPool, name: &str) -> Result<Permission, AuthError> {
    let id = uuidv7();
    sqlx::query("INSERT INTO permissions (id, name) VALUES ($1, $2)")
        .bind(id)
        .bind(name)
        .execute(pool)
        .await
        .map_err(map_db)?;
    Ok(Permission {
        id,
        name: name.to_string(),
    })
}

/// Attach a permission to a role.
pub async fn link_permission_role(
    pool: &PgPool,
    permission_id: Uuid,
    role_id: Uuid,
) -> Result<(), AuthError> {
    sqlx::query(
        "INSERT INTO role_permissions (role_id, permission_id) VALUES ($1, $2) \
         ON CONFLICT DO NOTHING",
    )
    .bind(role_id)
    .bind(permission_id)
    .execute(pool)
    .await
    .map_err(map_db)?;
    Ok(())
}
