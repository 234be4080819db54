//! Operator tasks that run outside request handling.

use folio_core::{clock::Clock, errors::FolioResult, store::CredentialStore};
use tracing::info;

use super::password::PasswordHasher;

/// Deletes every session that expired before now.
pub async fn purge_expired_sessions(
    store: &dyn CredentialStore,
    clock: &dyn Clock,
) -> FolioResult<u64> {
    let mut tx = store.begin().await?;
    let deleted = tx.delete_expired_sessions(clock.now()).await?;
    tx.commit().await?;

    info!(deleted, "Purged expired sessions");
    Ok(deleted)
}

/// Replaces every stored password that is not a PHC digest with its hash.
///
/// Accounts imported from the old plaintext table are unusable until this has
/// run, since verification never compares plaintext.
pub async fn migrate_legacy_passwords(
    store: &dyn CredentialStore,
    hasher: &PasswordHasher,
) -> FolioResult<u64> {
    let mut tx = store.begin().await?;
    let mut migrated = 0;

    for user in tx.list_users().await? {
        if PasswordHasher::is_hash(&user.password_hash) {
            continue;
        }
        let digest = hasher.hash(&user.password_hash).await?;
        tx.update_password_hash(user.id, &digest).await?;
        migrated += 1;
    }

    tx.commit().await?;

    info!(migrated, "Migrated legacy plaintext passwords");
    Ok(migrated)
}
