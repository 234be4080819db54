use chrono::{DateTime, Utc};
use eyre::{eyre, Result};
use sqlx::PgConnection;
use uuid::Uuid;

use crate::models::DbSession;

pub async fn create_session(
    conn: &mut PgConnection,
    user_id: Uuid,
    token: &str,
    expires_at: DateTime<Utc>,
) -> Result<DbSession> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    tracing::debug!("Creating session: id={}, user_id={}", id, user_id);

    let session = sqlx::query_as::<_, DbSession>(
        r#"
        INSERT INTO sessions (id, user_id, token, expires_at, created_at)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, user_id, token, expires_at, created_at
        "#,
    )
    .bind(id)
    .bind(user_id)
    .bind(token)
    .bind(expires_at)
    .bind(now)
    .fetch_one(&mut *conn)
    .await?;

    Ok(session)
}

pub async fn get_session_by_token(
    conn: &mut PgConnection,
    token: &str,
) -> Result<Option<DbSession>> {
    let session = sqlx::query_as::<_, DbSession>(
        r#"
        SELECT id, user_id, token, expires_at, created_at
        FROM sessions
        WHERE token = $1
        "#,
    )
    .bind(token)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(session)
}

pub async fn get_session_by_user_id(
    conn: &mut PgConnection,
    user_id: Uuid,
) -> Result<Option<DbSession>> {
    let session = sqlx::query_as::<_, DbSession>(
        r#"
        SELECT id, user_id, token, expires_at, created_at
        FROM sessions
        WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(session)
}

pub async fn update_session_token(
    conn: &mut PgConnection,
    id: Uuid,
    token: &str,
    expires_at: DateTime<Utc>,
) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE sessions
        SET token = $2, expires_at = $3
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(token)
    .bind(expires_at)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(eyre!("Session {} not found", id));
    }

    Ok(())
}

pub async fn delete_session(conn: &mut PgConnection, id: Uuid) -> Result<()> {
    sqlx::query("DELETE FROM sessions WHERE id = $1")
        .bind(id)
        .execute(&mut *conn)
        .await?;

    Ok(())
}

pub async fn delete_expired_sessions(conn: &mut PgConnection, now: DateTime<Utc>) -> Result<u64> {
    let result = sqlx::query("DELETE FROM sessions WHERE expires_at < $1")
        .bind(now)
        .execute(&mut *conn)
        .await?;

    Ok(result.rows_affected())
}
