//! Per-key serialized access to the record store.
//!
//! Each `(kind, key)` pair owns a [`tokio::sync::Mutex`]; a mutation locks
//! the key, loads the current state, runs the closure, and persists the
//! result.  If the closure fails, nothing is written.  Locks for different
//! keys are independent, so sessions never contend with each other.

use std::collections::HashMap;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::Mutex;

use gambit_store::RecordStore;

use crate::error::CoreError;

/// Entity namespaces in the record store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Player,
    Game,
    NameLock,
    Party,
    History,
    Mailbox,
    Matchmaker,
}

impl RecordKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Player => "player",
            Self::Game => "game",
            Self::NameLock => "name_lock",
            Self::Party => "party",
            Self::History => "history",
            Self::Mailbox => "mailbox",
            Self::Matchmaker => "matchmaker",
        }
    }

    /// Error for a missing record of this kind.  History and mailbox rows
    /// are keyed by player id, so their absence reads as a missing player.
    fn missing(self) -> CoreError {
        match self {
            Self::Game => CoreError::GameNotFound,
            Self::Party => CoreError::PartyNotFound,
            _ => CoreError::PlayerNotFound,
        }
    }
}

type KeyLocks = HashMap<(RecordKind, String), Arc<Mutex<()>>>;

/// Store handle plus the per-key lock registry.
#[derive(Clone)]
pub struct Entities {
    store: RecordStore,
    locks: Arc<Mutex<KeyLocks>>,
}

impl Entities {
    pub fn new(store: RecordStore) -> Self {
        Self {
            store,
            locks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    async fn lock_for(&self, kind: RecordKind, key: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        locks
            .entry((kind, key.to_string()))
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Drop lock entries nobody currently holds.  Called periodically so the
    /// registry does not grow with every key ever touched.
    pub async fn purge_idle_locks(&self) {
        let mut locks = self.locks.lock().await;
        let before = locks.len();
        locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        tracing::debug!(purged = before - locks.len(), kept = locks.len(), "purged idle key locks");
    }

    /// Read a record without taking its key lock.  Reads see whatever state
    /// was last persisted; linearizability only matters for read-modify-write.
    pub async fn read<T: DeserializeOwned>(
        &self,
        kind: RecordKind,
        key: &str,
    ) -> Result<Option<T>, CoreError> {
        Ok(self.store.get(kind.as_str(), key).await?)
    }

    /// Read a record that must exist.
    pub async fn read_required<T: DeserializeOwned>(
        &self,
        kind: RecordKind,
        key: &str,
    ) -> Result<T, CoreError> {
        self.read(kind, key).await?.ok_or_else(|| kind.missing())
    }

    pub async fn exists(&self, kind: RecordKind, key: &str) -> Result<bool, CoreError> {
        Ok(self.store.exists(kind.as_str(), key).await?)
    }

    /// All records of one kind.
    pub async fn list<T: DeserializeOwned>(&self, kind: RecordKind) -> Result<Vec<T>, CoreError> {
        Ok(self.store.list(kind.as_str()).await?)
    }

    /// Persist a brand-new record under its key lock.
    pub async fn create<T: Serialize>(
        &self,
        kind: RecordKind,
        key: &str,
        value: &T,
    ) -> Result<(), CoreError> {
        let lock = self.lock_for(kind, key).await;
        let _guard = lock.lock().await;
        Ok(self.store.put(kind.as_str(), key, value).await?)
    }

    /// Atomic read-modify-write for records with a natural empty state
    /// (queues, mailboxes, locks, ledgers): absent records start from
    /// `T::default()`.  The closure's error aborts without persisting.
    pub async fn mutate<T, R, F>(&self, kind: RecordKind, key: &str, f: F) -> Result<R, CoreError>
    where
        T: Serialize + DeserializeOwned + Default,
        F: FnOnce(&mut T) -> Result<R, CoreError>,
    {
        let lock = self.lock_for(kind, key).await;
        let _guard = lock.lock().await;

        let mut state: T = self
            .store
            .get(kind.as_str(), key)
            .await?
            .unwrap_or_default();
        let out = f(&mut state)?;
        self.store.put(kind.as_str(), key, &state).await?;
        Ok(out)
    }

    /// Atomic read-modify-write for records that must already exist
    /// (players, games).
    pub async fn update<T, R, F>(&self, kind: RecordKind, key: &str, f: F) -> Result<R, CoreError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce(&mut T) -> Result<R, CoreError>,
    {
        let lock = self.lock_for(kind, key).await;
        let _guard = lock.lock().await;

        let mut state: T = self
            .store
            .get(kind.as_str(), key)
            .await?
            .ok_or_else(|| kind.missing())?;
        let out = f(&mut state)?;
        self.store.put(kind.as_str(), key, &state).await?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Default, Serialize, Deserialize)]
    struct Counter {
        value: u64,
    }

    fn entities() -> Entities {
        Entities::new(RecordStore::open_in_memory().unwrap())
    }

    #[tokio::test]
    async fn mutate_starts_from_default() {
        let entities = entities();
        let value = entities
            .mutate::<Counter, _, _>(RecordKind::Mailbox, "k", |c| {
                c.value += 1;
                Ok(c.value)
            })
            .await
            .unwrap();
        assert_eq!(value, 1);
    }

    #[tokio::test]
    async fn update_requires_existing_record() {
        let entities = entities();
        let err = entities
            .update::<Counter, _, _>(RecordKind::Game, "missing", |_| Ok(()))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::GameNotFound));
    }

    #[tokio::test]
    async fn failed_closure_persists_nothing() {
        let entities = entities();
        entities
            .create(RecordKind::Game, "g", &Counter { value: 7 })
            .await
            .unwrap();

        let err = entities
            .update::<Counter, (), _>(RecordKind::Game, "g", |c| {
                c.value = 999;
                Err(CoreError::GameOver)
            })
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::GameOver));

        let after: Counter = entities
            .read_required(RecordKind::Game, "g")
            .await
            .unwrap();
        assert_eq!(after.value, 7);
    }

    #[tokio::test]
    async fn concurrent_mutations_on_one_key_serialize() {
        let entities = entities();
        let tasks: Vec<_> = (0..50)
            .map(|_| {
                let entities = entities.clone();
                tokio::spawn(async move {
                    entities
                        .mutate::<Counter, _, _>(RecordKind::Matchmaker, "queue", |c| {
                            let seen = c.value;
                            c.value = seen + 1;
                            Ok(())
                        })
                        .await
                        .unwrap();
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap();
        }

        let counter: Counter = entities
            .read_required(RecordKind::Matchmaker, "queue")
            .await
            .unwrap();
        assert_eq!(counter.value, 50);
    }

    #[tokio::test]
    async fn purge_keeps_registry_bounded() {
        let entities = entities();
        for i in 0..10 {
            entities
                .mutate::<Counter, _, _>(RecordKind::Player, &format!("p{i}"), |c| {
                    c.value += 1;
                    Ok(())
                })
                .await
                .unwrap();
        }
        entities.purge_idle_locks().await;
        let locks = entities.locks.lock().await;
        assert!(locks.is_empty());
    }
}
