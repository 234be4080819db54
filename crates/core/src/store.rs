//! The credential store seam.
//!
//! Every authentication operation runs inside one [`CredentialTransaction`].
//! Reads and writes made through a transaction become visible to others only
//! after [`CredentialTransaction::commit`]; dropping it rolls everything back.
//! Implementations must serialize transactions that touch the same user row,
//! which is what keeps the failed-login counter from racing.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::errors::FolioResult;
use crate::models::{
    session::Session,
    user::{NewUser, User},
};

#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn begin(&self) -> FolioResult<Box<dyn CredentialTransaction>>;
}

#[async_trait]
pub trait CredentialTransaction: Send {
    /// Point lookup by login handle. The row stays locked until the
    /// transaction ends.
    async fn find_user_by_name(&mut self, name: &str) -> FolioResult<Option<User>>;

    async fn find_user_by_id(&mut self, id: Uuid) -> FolioResult<Option<User>>;

    /// Blocks concurrent provisioning until the transaction ends so that
    /// lookup-before-insert stays race free.
    async fn lock_users(&mut self) -> FolioResult<()>;

    async fn count_users(&mut self) -> FolioResult<i64>;

    async fn insert_user(&mut self, user: &NewUser) -> FolioResult<User>;

    async fn list_users(&mut self) -> FolioResult<Vec<User>>;

    async fn update_password_hash(&mut self, user_id: Uuid, password_hash: &str)
    -> FolioResult<()>;

    async fn update_login_state(
        &mut self,
        user_id: Uuid,
        failed_login_attempts: u32,
        locked_until: Option<DateTime<Utc>>,
    ) -> FolioResult<()>;

    async fn find_session_by_token(&mut self, token: &str) -> FolioResult<Option<Session>>;

    async fn find_session_by_user(&mut self, user_id: Uuid) -> FolioResult<Option<Session>>;

    async fn insert_session(
        &mut self,
        user_id: Uuid,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> FolioResult<Session>;

    /// Rotates an existing session in place.
    async fn update_session_token(
        &mut self,
        session_id: Uuid,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> FolioResult<()>;

    async fn delete_session(&mut self, session_id: Uuid) -> FolioResult<()>;

    /// Removes every session with `expires_at < now`, returning how many.
    async fn delete_expired_sessions(&mut self, now: DateTime<Utc>) -> FolioResult<u64>;

    async fn commit(self: Box<Self>) -> FolioResult<()>;
}
