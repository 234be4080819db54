//! PostgreSQL-backed credential store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use folio_core::{
    errors::{FolioError, FolioResult},
    models::{
        session::Session,
        user::{NewUser, User},
    },
    store::{CredentialStore, CredentialTransaction},
};
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::{repositories, DbPool};

#[derive(Clone)]
pub struct PgCredentialStore {
    pool: DbPool,
}

impl PgCredentialStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn begin(&self) -> FolioResult<Box<dyn CredentialTransaction>> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| FolioError::Database(e.into()))?;
        Ok(Box::new(PgCredentialTransaction { tx }))
    }
}

/// One database transaction. Dropping it without `commit` rolls back.
pub struct PgCredentialTransaction {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl CredentialTransaction for PgCredentialTransaction {
    async fn find_user_by_name(&mut self, name: &str) -> FolioResult<Option<User>> {
        repositories::user::get_user_by_name_for_update(&mut *self.tx, name)
            .await?
            .map(User::try_from)
            .transpose()
    }

    async fn find_user_by_id(&mut self, id: Uuid) -> FolioResult<Option<User>> {
        repositories::user::get_user_by_id(&mut *self.tx, id)
            .await?
            .map(User::try_from)
            .transpose()
    }

    async fn lock_users(&mut self) -> FolioResult<()> {
        Ok(repositories::user::lock_users_table(&mut *self.tx).await?)
    }

    async fn count_users(&mut self) -> FolioResult<i64> {
        Ok(repositories::user::count_users(&mut *self.tx).await?)
    }

    async fn insert_user(&mut self, user: &NewUser) -> FolioResult<User> {
        let row = repositories::user::create_user(
            &mut *self.tx,
            &user.name,
            &user.email,
            &user.password_hash,
            user.role.as_str(),
        )
        .await?;
        User::try_from(row)
    }

    async fn list_users(&mut self) -> FolioResult<Vec<User>> {
        repositories::user::list_users(&mut *self.tx)
            .await?
            .into_iter()
            .map(User::try_from)
            .collect()
    }

    async fn update_password_hash(&mut self, user_id: Uuid, password_hash: &str) -> FolioResult<()> {
        Ok(repositories::user::update_password_hash(&mut *self.tx, user_id, password_hash).await?)
    }

    async fn update_login_state(
        &mut self,
        user_id: Uuid,
        failed_login_attempts: u32,
        locked_until: Option<DateTime<Utc>>,
    ) -> FolioResult<()> {
        let attempts = i32::try_from(failed_login_attempts).unwrap_or(i32::MAX);
        Ok(
            repositories::user::update_login_state(&mut *self.tx, user_id, attempts, locked_until)
                .await?,
        )
    }

    async fn find_session_by_token(&mut self, token: &str) -> FolioResult<Option<Session>> {
        Ok(repositories::session::get_session_by_token(&mut *self.tx, token)
            .await?
            .map(Session::from))
    }

    async fn find_session_by_user(&mut self, user_id: Uuid) -> FolioResult<Option<Session>> {
        Ok(repositories::session::get_session_by_user_id(&mut *self.tx, user_id)
            .await?
            .map(Session::from))
    }

    async fn insert_session(
        &mut self,
        user_id: Uuid,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> FolioResult<Session> {
        let row =
            repositories::session::create_session(&mut *self.tx, user_id, token, expires_at).await?;
        Ok(Session::from(row))
    }

    async fn update_session_token(
        &mut self,
        session_id: Uuid,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> FolioResult<()> {
        Ok(
            repositories::session::update_session_token(&mut *self.tx, session_id, token, expires_at)
                .await?,
        )
    }

    async fn delete_session(&mut self, session_id: Uuid) -> FolioResult<()> {
        Ok(repositories::session::delete_session(&mut *self.tx, session_id).await?)
    }

    async fn delete_expired_sessions(&mut self, now: DateTime<Utc>) -> FolioResult<u64> {
        Ok(repositories::session::delete_expired_sessions(&mut *self.tx, now).await?)
    }

    async fn commit(self: Box<Self>) -> FolioResult<()> {
        self.tx
            .commit()
            .await
            .map_err(|e| FolioError::Database(e.into()))
    }
}
