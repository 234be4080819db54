use chrono::{DateTime, Utc};
use folio_core::{
    errors::{FolioError, FolioResult},
    models::{session::Session, user::User},
};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub failed_login_attempts: i32,
    pub locked_until: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbSession {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<DbUser> for User {
    type Error = FolioError;

    fn try_from(row: DbUser) -> FolioResult<Self> {
        let role = row.role.parse().map_err(|_| {
            FolioError::Database(eyre::eyre!(
                "User {} has unknown role '{}'",
                row.id,
                row.role
            ))
        })?;

        Ok(User {
            id: row.id,
            name: row.name,
            email: row.email,
            password_hash: row.password_hash,
            role,
            failed_login_attempts: u32::try_from(row.failed_login_attempts).unwrap_or(0),
            locked_until: row.locked_until,
            created_at: row.created_at,
        })
    }
}

impl From<DbSession> for Session {
    fn from(row: DbSession) -> Self {
        Session {
            id: row.id,
            user_id: row.user_id,
            token: row.token,
            expires_at: row.expires_at,
            created_at: row.created_at,
        }
    }
}
