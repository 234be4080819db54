//! Password hashing with Argon2id.
//!
//! Digests are stored in PHC string format, which carries the algorithm,
//! version, parameters and salt, so verification always runs with the cost the
//! digest was created with. Hashing and verifying are CPU bound and run on the
//! blocking pool.

use std::sync::Arc;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use folio_core::errors::{FolioError, FolioResult};

use super::token::generate_token;

/// Argon2 work factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashParams {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for HashParams {
    fn default() -> Self {
        Self {
            memory_kib: Params::DEFAULT_M_COST,
            iterations: 2,
            parallelism: 1,
        }
    }
}

/// Salted adaptive hasher with a fixed work factor.
///
/// Also owns a dummy digest: a hash of a random secret that belongs to no
/// account. Login verifies against it when the username is unknown, so that
/// path costs exactly one verification like every other.
#[derive(Clone)]
pub struct PasswordHasher {
    params: Params,
    dummy_hash: Arc<str>,
}

impl PasswordHasher {
    pub fn new(config: HashParams) -> FolioResult<Self> {
        let params = Params::new(config.memory_kib, config.iterations, config.parallelism, None)
            .map_err(|e| {
                FolioError::Validation(format!("Invalid password hashing parameters: {}", e))
            })?;

        let dummy_hash = hash_with(&params, &generate_token())?;

        Ok(Self {
            params,
            dummy_hash: Arc::from(dummy_hash),
        })
    }

    /// Hashes a password with a fresh salt.
    pub async fn hash(&self, password: &str) -> FolioResult<String> {
        let params = self.params.clone();
        let password = password.to_string();

        tokio::task::spawn_blocking(move || hash_with(&params, &password))
            .await
            .map_err(|e| FolioError::Internal(Box::new(e)))?
    }

    /// Checks a password against a stored digest. A digest that is not a PHC
    /// string never matches.
    pub async fn verify(&self, password: &str, digest: &str) -> FolioResult<bool> {
        let password = password.to_string();
        let digest = digest.to_string();

        tokio::task::spawn_blocking(move || verify_with(&password, &digest))
            .await
            .map_err(|e| FolioError::Internal(Box::new(e)))
    }

    /// Runs a full verification against the dummy digest. The result is
    /// meaningless; only the cost matters.
    pub async fn verify_dummy(&self, password: &str) -> FolioResult<()> {
        let dummy = Arc::clone(&self.dummy_hash);
        self.verify(password, &dummy).await?;
        Ok(())
    }

    /// Whether `digest` is an Argon2 PHC string carrying an actual hash.
    /// Anything else, including plaintext that happens to start with `$`, is
    /// a legacy record.
    pub fn is_hash(digest: &str) -> bool {
        match PasswordHash::new(digest) {
            Ok(parsed) => {
                parsed.hash.is_some() && Algorithm::try_from(parsed.algorithm).is_ok()
            }
            Err(_) => false,
        }
    }
}

fn argon2(params: &Params) -> Argon2<'static> {
    Argon2::new(Algorithm::Argon2id, Version::V0x13, params.clone())
}

fn hash_with(params: &Params, password: &str) -> FolioResult<String> {
    let salt = SaltString::generate(&mut OsRng);

    let hash = argon2(params)
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| FolioError::Internal(format!("Error hashing password: {}", e).into()))?;

    Ok(hash.to_string())
}

fn verify_with(password: &str, digest: &str) -> bool {
    let parsed = match PasswordHash::new(digest) {
        Ok(parsed) => parsed,
        Err(_) => return false,
    };
    // parameters come from the digest itself
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}
