//! Username uniqueness via per-name lock records.
//!
//! The lock key is the normalized (trimmed, lowercased) username, so
//! "Anna" and " anna " contend for the same name.  A claim is atomic under
//! the key lock; re-claiming by the current owner succeeds so registration
//! retries are harmless.

use serde::{Deserialize, Serialize};
use tracing::debug;

use gambit_shared::types::PlayerId;

use crate::coordinator::Coordinator;
use crate::entities::RecordKind;
use crate::error::CoreError;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct NameLockRecord {
    pub owner: Option<PlayerId>,
}

/// Normalized form used as the lock key.
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

impl Coordinator {
    /// Atomically claim `name` for `claimant`.  Returns `true` when the
    /// claim succeeded (including the idempotent re-claim by the same
    /// owner), `false` when another player holds the name.
    pub async fn claim_name(&self, name: &str, claimant: PlayerId) -> Result<bool, CoreError> {
        let key = normalize_name(name);
        self.entities
            .mutate::<NameLockRecord, _, _>(RecordKind::NameLock, &key, |lock| {
                match lock.owner {
                    Some(owner) if owner != claimant => {
                        debug!(name = %key, %owner, "name already claimed");
                        Ok(false)
                    }
                    _ => {
                        lock.owner = Some(claimant);
                        Ok(true)
                    }
                }
            })
            .await
    }

    /// Owner of a claimed name, for login.
    pub async fn resolve_name(&self, name: &str) -> Result<Option<PlayerId>, CoreError> {
        let key = normalize_name(name);
        let lock: Option<NameLockRecord> = self.entities.read(RecordKind::NameLock, &key).await?;
        Ok(lock.and_then(|l| l.owner))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalization_folds_case_and_whitespace() {
        assert_eq!(normalize_name("  Anna "), "anna");
        assert_eq!(normalize_name("BOBBY"), "bobby");
    }
}
