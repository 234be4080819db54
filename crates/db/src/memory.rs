//! In-process credential store.
//!
//! Used by tests and local development. A transaction holds the store's lock
//! for its whole lifetime and works on a private copy of the tables, which is
//! written back only on commit. That gives the same all-or-nothing and
//! serialized behaviour the PostgreSQL store gets from row locks.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use eyre::eyre;
use folio_core::{
    errors::FolioResult,
    models::{
        session::Session,
        user::{NewUser, User},
    },
    store::{CredentialStore, CredentialTransaction},
};
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

#[derive(Debug, Clone, Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    sessions: HashMap<Uuid, Session>,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryCredentialStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a fully formed user row, bypassing provisioning rules.
    pub async fn seed_user(&self, user: User) {
        self.tables.lock().await.users.insert(user.id, user);
    }

    pub async fn user_by_name(&self, name: &str) -> Option<User> {
        self.tables
            .lock()
            .await
            .users
            .values()
            .find(|u| u.name == name)
            .cloned()
    }

    pub async fn remove_user(&self, id: Uuid) {
        self.tables.lock().await.users.remove(&id);
    }

    pub async fn sessions(&self) -> Vec<Session> {
        self.tables.lock().await.sessions.values().cloned().collect()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn begin(&self) -> FolioResult<Box<dyn CredentialTransaction>> {
        let guard = self.tables.clone().lock_owned().await;
        let working = guard.clone();
        Ok(Box::new(MemoryTransaction { guard, working }))
    }
}

struct MemoryTransaction {
    guard: OwnedMutexGuard<Tables>,
    working: Tables,
}

#[async_trait]
impl CredentialTransaction for MemoryTransaction {
    async fn find_user_by_name(&mut self, name: &str) -> FolioResult<Option<User>> {
        Ok(self
            .working
            .users
            .values()
            .find(|u| u.name == name)
            .cloned())
    }

    async fn find_user_by_id(&mut self, id: Uuid) -> FolioResult<Option<User>> {
        Ok(self.working.users.get(&id).cloned())
    }

    async fn lock_users(&mut self) -> FolioResult<()> {
        // the whole store is already held by this transaction
        Ok(())
    }

    async fn count_users(&mut self) -> FolioResult<i64> {
        Ok(self.working.users.len() as i64)
    }

    async fn insert_user(&mut self, user: &NewUser) -> FolioResult<User> {
        let user = User {
            id: Uuid::new_v4(),
            name: user.name.clone(),
            email: user.email.clone(),
            password_hash: user.password_hash.clone(),
            role: user.role,
            failed_login_attempts: 0,
            locked_until: None,
            created_at: Utc::now(),
        };
        self.working.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn list_users(&mut self) -> FolioResult<Vec<User>> {
        let mut users: Vec<User> = self.working.users.values().cloned().collect();
        users.sort_by_key(|u| u.created_at);
        Ok(users)
    }

    async fn update_password_hash(&mut self, user_id: Uuid, password_hash: &str) -> FolioResult<()> {
        let user = self
            .working
            .users
            .get_mut(&user_id)
            .ok_or_else(|| eyre!("User {} not found", user_id))?;
        user.password_hash = password_hash.to_string();
        Ok(())
    }

    async fn update_login_state(
        &mut self,
        user_id: Uuid,
        failed_login_attempts: u32,
        locked_until: Option<DateTime<Utc>>,
    ) -> FolioResult<()> {
        let user = self
            .working
            .users
            .get_mut(&user_id)
            .ok_or_else(|| eyre!("User {} not found", user_id))?;
        user.failed_login_attempts = failed_login_attempts;
        user.locked_until = locked_until;
        Ok(())
    }

    async fn find_session_by_token(&mut self, token: &str) -> FolioResult<Option<Session>> {
        Ok(self
            .working
            .sessions
            .values()
            .find(|s| s.token == token)
            .cloned())
    }

    async fn find_session_by_user(&mut self, user_id: Uuid) -> FolioResult<Option<Session>> {
        Ok(self
            .working
            .sessions
            .values()
            .find(|s| s.user_id == user_id)
            .cloned())
    }

    async fn insert_session(
        &mut self,
        user_id: Uuid,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> FolioResult<Session> {
        if self.working.sessions.values().any(|s| s.user_id == user_id) {
            return Err(eyre!("User {} already has a session", user_id).into());
        }
        let session = Session {
            id: Uuid::new_v4(),
            user_id,
            token: token.to_string(),
            expires_at,
            created_at: Utc::now(),
        };
        self.working.sessions.insert(session.id, session.clone());
        Ok(session)
    }

    async fn update_session_token(
        &mut self,
        session_id: Uuid,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> FolioResult<()> {
        let session = self
            .working
            .sessions
            .get_mut(&session_id)
            .ok_or_else(|| eyre!("Session {} not found", session_id))?;
        session.token = token.to_string();
        session.expires_at = expires_at;
        Ok(())
    }

    async fn delete_session(&mut self, session_id: Uuid) -> FolioResult<()> {
        self.working.sessions.remove(&session_id);
        Ok(())
    }

    async fn delete_expired_sessions(&mut self, now: DateTime<Utc>) -> FolioResult<u64> {
        let before = self.working.sessions.len();
        self.working.sessions.retain(|_, s| !s.is_expired(now));
        Ok((before - self.working.sessions.len()) as u64)
    }

    async fn commit(self: Box<Self>) -> FolioResult<()> {
        let MemoryTransaction { mut guard, working } = *self;
        *guard = working;
        Ok(())
    }
}
