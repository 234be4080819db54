//! Login, session verification, the admin gate, logout and provisioning.
//!
//! Each public operation runs in exactly one credential-store transaction.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use folio_core::{
    clock::Clock,
    errors::{FolioError, FolioResult},
    models::{
        session::{AuthenticatedUser, LoginResponse, LogoutResponse, Session, VerifyTokenResponse},
        user::{minutes_between, CreateUserRequest, CreateUserResponse, NewUser, Role, User},
    },
    store::{CredentialStore, CredentialTransaction},
    validation,
};
use tracing::{debug, info, warn};

use super::{maintenance, password::PasswordHasher, token::generate_token};

/// Lockout and session lifetime rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthPolicy {
    /// Consecutive failures that lock an account.
    pub max_failed_attempts: u32,
    pub lockout: Duration,
    pub session_ttl: Duration,
}

impl Default for AuthPolicy {
    fn default() -> Self {
        Self {
            max_failed_attempts: 5,
            lockout: Duration::minutes(15),
            session_ttl: Duration::days(7),
        }
    }
}

/// What a presented token resolved to.
enum SessionLookup {
    Missing,
    /// Found past its expiry; the row has been deleted in this transaction.
    Expired,
    /// The owning user no longer exists.
    Orphaned,
    Live { session: Session, user: User },
}

pub struct AuthService {
    store: Arc<dyn CredentialStore>,
    hasher: PasswordHasher,
    clock: Arc<dyn Clock>,
    policy: AuthPolicy,
}

impl AuthService {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        hasher: PasswordHasher,
        clock: Arc<dyn Clock>,
        policy: AuthPolicy,
    ) -> Self {
        Self {
            store,
            hasher,
            clock,
            policy,
        }
    }

    /// Exchanges a username and password for a session token.
    ///
    /// Unknown usernames and wrong passwords both cost one password
    /// verification and both fail with [`FolioError::InvalidCredentials`].
    /// A locked account fails fast with [`FolioError::AccountLocked`], as does
    /// the attempt that triggers the lock. A successful login clears the
    /// failure counter and replaces any existing session of the user.
    pub async fn login(&self, username: &str, password: &str) -> FolioResult<LoginResponse> {
        let now = self.clock.now();
        let mut tx = self.store.begin().await?;

        let user = tx.find_user_by_name(username).await?;

        if let Some(minutes) = user.as_ref().and_then(|u| u.lock_remaining_minutes(now)) {
            warn!(minutes, "Login refused: account locked");
            return Err(FolioError::AccountLocked { minutes });
        }

        let user = match user {
            Some(user) => {
                let verified = self.hasher.verify(password, &user.password_hash).await?;
                if !verified {
                    return self.record_failure(tx, &user, now).await;
                }
                user
            }
            None => {
                self.hasher.verify_dummy(password).await?;
                debug!("Login failed: no such user");
                return Err(FolioError::InvalidCredentials);
            }
        };

        if user.failed_login_attempts != 0 || user.locked_until.is_some() {
            tx.update_login_state(user.id, 0, None).await?;
        }

        let token = generate_token();
        let expires_at = now + self.policy.session_ttl;

        match tx.find_session_by_user(user.id).await? {
            Some(existing) => {
                tx.update_session_token(existing.id, &token, expires_at)
                    .await?
            }
            None => {
                tx.insert_session(user.id, &token, expires_at).await?;
            }
        }

        tx.commit().await?;

        info!(user_id = %user.id, "Login succeeded");
        Ok(LoginResponse {
            token,
            user_id: user.id,
        })
    }

    async fn record_failure<T>(
        &self,
        mut tx: Box<dyn CredentialTransaction>,
        user: &User,
        now: DateTime<Utc>,
    ) -> FolioResult<T> {
        let attempts = user.failed_login_attempts.saturating_add(1);
        let locked_until =
            (attempts >= self.policy.max_failed_attempts).then(|| now + self.policy.lockout);

        tx.update_login_state(user.id, attempts, locked_until).await?;
        tx.commit().await?;

        match locked_until {
            Some(until) => {
                warn!(user_id = %user.id, attempts, "Account locked after repeated failures");
                Err(FolioError::AccountLocked {
                    minutes: minutes_between(now, until),
                })
            }
            None => {
                warn!(user_id = %user.id, attempts, "Login failed: invalid credentials");
                Err(FolioError::InvalidCredentials)
            }
        }
    }

    /// Resolves a token to its user. Every dead token reads as `valid: false`.
    pub async fn verify_token(&self, token: &str) -> FolioResult<VerifyTokenResponse> {
        let mut tx = self.store.begin().await?;
        let lookup = self.resolve_session(tx.as_mut(), token).await?;
        tx.commit().await?;

        Ok(match lookup {
            SessionLookup::Live { user, .. } => {
                VerifyTokenResponse::valid(user.id, user.name, user.role)
            }
            _ => VerifyTokenResponse::invalid(),
        })
    }

    /// The access-control gate in front of every content mutation: requires a
    /// live session whose user is an admin.
    pub async fn require_auth(&self, token: Option<&str>) -> FolioResult<AuthenticatedUser> {
        let token = present(token)?;

        let mut tx = self.store.begin().await?;
        let result = self.authorize(tx.as_mut(), token).await;
        // keep the lazy deletion of an expired session even when rejecting
        tx.commit().await?;

        result
    }

    /// Deletes the session behind `token`, if any. Always succeeds.
    pub async fn logout(&self, token: &str) -> FolioResult<LogoutResponse> {
        let mut tx = self.store.begin().await?;

        if let Some(session) = tx.find_session_by_token(token).await? {
            tx.delete_session(session.id).await?;
            info!(user_id = %session.user_id, "Logged out");
        }

        tx.commit().await?;
        Ok(LogoutResponse { success: true })
    }

    /// Creates an account. The very first account needs no token and defaults
    /// to the admin role; after that an admin session is required.
    pub async fn create_user(
        &self,
        request: CreateUserRequest,
        token: Option<&str>,
    ) -> FolioResult<CreateUserResponse> {
        let name = validation::validate_username(&request.name)?;
        let email = validation::validate_email(&request.email)?;
        validation::validate_password(&request.password)?;

        let mut tx = self.store.begin().await?;
        tx.lock_users().await?;

        let bootstrap = tx.count_users().await? == 0;
        if !bootstrap {
            let caller = match present(token) {
                Ok(token) => self.authorize(tx.as_mut(), token).await,
                Err(e) => Err(e),
            };
            if let Err(e) = caller {
                tx.commit().await?;
                return Err(e);
            }
        }

        if tx.find_user_by_name(&name).await?.is_some() {
            return Err(FolioError::AlreadyExists(format!(
                "User '{}' already exists",
                name
            )));
        }

        let role = request
            .role
            .unwrap_or(if bootstrap { Role::Admin } else { Role::User });
        let password_hash = self.hasher.hash(&request.password).await?;

        let user = tx
            .insert_user(&NewUser {
                name,
                email,
                password_hash,
                role,
            })
            .await?;
        tx.commit().await?;

        info!(user_id = %user.id, role = %user.role, bootstrap, "User created");
        Ok(CreateUserResponse { user_id: user.id })
    }

    /// Opens and immediately releases a transaction.
    pub async fn check_store(&self) -> FolioResult<()> {
        let tx = self.store.begin().await?;
        drop(tx);
        Ok(())
    }

    /// Deletes every expired session. Request handling never calls this.
    pub async fn purge_expired_sessions(&self) -> FolioResult<u64> {
        maintenance::purge_expired_sessions(self.store.as_ref(), self.clock.as_ref()).await
    }

    async fn authorize(
        &self,
        tx: &mut dyn CredentialTransaction,
        token: &str,
    ) -> FolioResult<AuthenticatedUser> {
        match self.resolve_session(tx, token).await? {
            SessionLookup::Missing => Err(FolioError::AuthenticationRequired(
                "Invalid token".to_string(),
            )),
            SessionLookup::Expired => Err(FolioError::AuthenticationRequired(
                "Token expired".to_string(),
            )),
            SessionLookup::Orphaned => Err(FolioError::AuthenticationRequired(
                "User not found".to_string(),
            )),
            SessionLookup::Live { session, user } => {
                if !user.role.is_admin() {
                    warn!(user_id = %user.id, "Admin role required");
                    return Err(FolioError::AuthorizationDenied(
                        "Admin role required".to_string(),
                    ));
                }
                Ok(AuthenticatedUser {
                    user_id: user.id,
                    username: user.name,
                    role: user.role,
                    session_id: session.id,
                })
            }
        }
    }

    async fn resolve_session(
        &self,
        tx: &mut dyn CredentialTransaction,
        token: &str,
    ) -> FolioResult<SessionLookup> {
        let Some(session) = tx.find_session_by_token(token).await? else {
            return Ok(SessionLookup::Missing);
        };

        if session.is_expired(self.clock.now()) {
            tx.delete_session(session.id).await?;
            debug!(session_id = %session.id, "Deleted expired session");
            return Ok(SessionLookup::Expired);
        }

        match tx.find_user_by_id(session.user_id).await? {
            Some(user) => Ok(SessionLookup::Live { session, user }),
            None => Ok(SessionLookup::Orphaned),
        }
    }
}

fn present(token: Option<&str>) -> FolioResult<&str> {
    token.filter(|t| !t.is_empty()).ok_or_else(|| {
        FolioError::AuthenticationRequired("No token provided".to_string())
    })
}
