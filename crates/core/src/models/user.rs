use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::FolioError;

/// Account role. Only `Admin` may mutate content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = FolioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "user" => Ok(Role::User),
            other => Err(FolioError::Validation(format!("Unknown role: {}", other))),
        }
    }
}

/// A stored account. `password_hash` is always a PHC digest.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub failed_login_attempts: u32,
    pub locked_until: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Whole minutes left on an active lock, rounded up. `None` when the
    /// account is not locked at `now`.
    pub fn lock_remaining_minutes(&self, now: DateTime<Utc>) -> Option<i64> {
        let until = self.locked_until?;
        if until <= now {
            return None;
        }
        Some(minutes_between(now, until))
    }
}

/// Minutes from `from` to `until`, rounded up and never below one.
pub fn minutes_between(from: DateTime<Utc>, until: DateTime<Utc>) -> i64 {
    let seconds = (until - from).num_seconds();
    ((seconds + 59) / 60).max(1)
}

/// Fields required to insert an account.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub role: Option<Role>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserResponse {
    pub user_id: Uuid,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use pretty_assertions::assert_eq;

    fn user_locked_until(locked_until: Option<DateTime<Utc>>) -> User {
        User {
            id: Uuid::new_v4(),
            name: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password_hash: "$argon2id$v=19$m=8,t=1,p=1$c2FsdHNhbHQ$aGFzaA".to_string(),
            role: Role::Admin,
            failed_login_attempts: 5,
            locked_until,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn remaining_minutes_round_up() {
        let now = Utc::now();
        let user = user_locked_until(Some(now + Duration::seconds(61)));
        assert_eq!(user.lock_remaining_minutes(now), Some(2));

        let user = user_locked_until(Some(now + Duration::seconds(1)));
        assert_eq!(user.lock_remaining_minutes(now), Some(1));

        let user = user_locked_until(Some(now + Duration::minutes(15)));
        assert_eq!(user.lock_remaining_minutes(now), Some(15));
    }

    #[test]
    fn elapsed_or_absent_lock_is_not_active() {
        let now = Utc::now();
        assert_eq!(user_locked_until(None).lock_remaining_minutes(now), None);
        assert_eq!(user_locked_until(Some(now)).lock_remaining_minutes(now), None);
        assert_eq!(
            user_locked_until(Some(now - Duration::minutes(1))).lock_remaining_minutes(now),
            None
        );
    }

    #[test]
    fn role_parses_from_stored_text() {
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!("user".parse::<Role>().unwrap(), Role::User);
        assert!("root".parse::<Role>().is_err());
    }
}
