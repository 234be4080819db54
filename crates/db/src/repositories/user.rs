use chrono::{DateTime, Utc};
use eyre::Result;
use sqlx::PgConnection;
use uuid::Uuid;

use crate::models::DbUser;

const USER_COLUMNS: &str =
    "id, name, email, password_hash, role, failed_login_attempts, locked_until, created_at";

pub async fn create_user(
    conn: &mut PgConnection,
    name: &str,
    email: &str,
    password_hash: &str,
    role: &str,
) -> Result<DbUser> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    tracing::debug!("Creating user: id={}, name={}, role={}", id, name, role);

    let user = sqlx::query_as::<_, DbUser>(&format!(
        r#"
        INSERT INTO users (id, name, email, password_hash, role, failed_login_attempts, created_at)
        VALUES ($1, $2, $3, $4, $5, 0, $6)
        RETURNING {USER_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(name)
    .bind(email)
    .bind(password_hash)
    .bind(role)
    .bind(now)
    .fetch_one(&mut *conn)
    .await?;

    tracing::debug!("User created successfully: id={}", id);
    Ok(user)
}

/// Looks a user up by login handle and holds a row lock on it until the
/// surrounding transaction ends.
pub async fn get_user_by_name_for_update(
    conn: &mut PgConnection,
    name: &str,
) -> Result<Option<DbUser>> {
    tracing::debug!("Getting user by name for update: {}", name);

    let user = sqlx::query_as::<_, DbUser>(&format!(
        r#"
        SELECT {USER_COLUMNS}
        FROM users
        WHERE name = $1
        LIMIT 1
        FOR UPDATE
        "#
    ))
    .bind(name)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(user)
}

pub async fn get_user_by_id(conn: &mut PgConnection, id: Uuid) -> Result<Option<DbUser>> {
    tracing::debug!("Getting user by id: {}", id);

    let user = sqlx::query_as::<_, DbUser>(&format!(
        r#"
        SELECT {USER_COLUMNS}
        FROM users
        WHERE id = $1
        "#
    ))
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(user)
}

pub async fn list_users(conn: &mut PgConnection) -> Result<Vec<DbUser>> {
    let users = sqlx::query_as::<_, DbUser>(&format!(
        r#"
        SELECT {USER_COLUMNS}
        FROM users
        ORDER BY created_at
        "#
    ))
    .fetch_all(&mut *conn)
    .await?;

    Ok(users)
}

pub async fn count_users(conn: &mut PgConnection) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
        .fetch_one(&mut *conn)
        .await?;

    Ok(count)
}

/// Takes a lock that conflicts with itself and with writers, so two
/// provisioning transactions run one after the other while logins keep going.
pub async fn lock_users_table(conn: &mut PgConnection) -> Result<()> {
    sqlx::query("LOCK TABLE users IN SHARE ROW EXCLUSIVE MODE")
        .execute(&mut *conn)
        .await?;

    Ok(())
}

pub async fn update_login_state(
    conn: &mut PgConnection,
    id: Uuid,
    failed_login_attempts: i32,
    locked_until: Option<DateTime<Utc>>,
) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE users
        SET failed_login_attempts = $2, locked_until = $3
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(failed_login_attempts)
    .bind(locked_until)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

pub async fn update_password_hash(
    conn: &mut PgConnection,
    id: Uuid,
    password_hash: &str,
) -> Result<()> {
    sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
        .bind(id)
        .bind(password_hash)
        .execute(&mut *conn)
        .await?;

    Ok(())
}
