//! Async, typed facade over [`Database`].
//!
//! rusqlite is synchronous; all record operations are short single-row
//! statements, so the store serializes them behind one async mutex rather
//! than maintaining a connection pool.  Cross-call atomicity per entity key
//! is the caller's concern (see `gambit-core`'s per-key locks).

use std::path::Path;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::Mutex;

use crate::database::Database;
use crate::error::Result;

/// Cloneable handle to the durable record store.
#[derive(Clone)]
pub struct RecordStore {
    db: Arc<Mutex<Database>>,
}

impl RecordStore {
    /// Open (or create) the store at the given path.
    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self::wrap(Database::open_at(path)?))
    }

    /// Open a non-durable in-memory store.
    pub fn open_in_memory() -> Result<Self> {
        Ok(Self::wrap(Database::open_in_memory()?))
    }

    fn wrap(db: Database) -> Self {
        Self {
            db: Arc::new(Mutex::new(db)),
        }
    }

    /// Fetch and deserialize the record at `(kind, key)`.
    pub async fn get<T: DeserializeOwned>(&self, kind: &str, key: &str) -> Result<Option<T>> {
        let db = self.db.lock().await;
        match db.get_record(kind, key)? {
            Some(state) => Ok(Some(serde_json::from_str(&state)?)),
            None => Ok(None),
        }
    }

    /// Serialize and persist the record at `(kind, key)`.
    pub async fn put<T: Serialize>(&self, kind: &str, key: &str, value: &T) -> Result<()> {
        let state = serde_json::to_string(value)?;
        let db = self.db.lock().await;
        db.put_record(kind, key, &state)
    }

    /// Whether a record exists at `(kind, key)`.
    pub async fn exists(&self, kind: &str, key: &str) -> Result<bool> {
        let db = self.db.lock().await;
        db.record_exists(kind, key)
    }

    /// Deserialize every record of one kind.
    pub async fn list<T: DeserializeOwned>(&self, kind: &str) -> Result<Vec<T>> {
        let db = self.db.lock().await;
        let rows = db.list_records(kind)?;
        drop(db);

        let mut values = Vec::with_capacity(rows.len());
        for (_, state) in rows {
            values.push(serde_json::from_str(&state)?);
        }
        Ok(values)
    }

    /// Delete the record at `(kind, key)`.  Returns `true` if it existed.
    pub async fn delete(&self, kind: &str, key: &str) -> Result<bool> {
        let db = self.db.lock().await;
        db.delete_record(kind, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
    struct Sample {
        name: String,
        score: u32,
    }

    #[tokio::test]
    async fn typed_round_trip() {
        let store = RecordStore::open_in_memory().unwrap();
        let value = Sample {
            name: "anna".into(),
            score: 3,
        };

        store.put("sample", "s1", &value).await.unwrap();
        let loaded: Option<Sample> = store.get("sample", "s1").await.unwrap();
        assert_eq!(loaded, Some(value));

        let missing: Option<Sample> = store.get("sample", "nope").await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn list_returns_all_of_kind() {
        let store = RecordStore::open_in_memory().unwrap();
        for i in 0..3 {
            store
                .put(
                    "sample",
                    &format!("s{i}"),
                    &Sample {
                        name: format!("p{i}"),
                        score: i,
                    },
                )
                .await
                .unwrap();
        }
        store
            .put("other", "x", &Sample { name: "q".into(), score: 9 })
            .await
            .unwrap();

        let all: Vec<Sample> = store.list("sample").await.unwrap();
        assert_eq!(all.len(), 3);
    }

    #[tokio::test]
    async fn clones_share_state() {
        let store = RecordStore::open_in_memory().unwrap();
        let clone = store.clone();
        clone
            .put("sample", "s1", &Sample { name: "a".into(), score: 1 })
            .await
            .unwrap();
        assert!(store.exists("sample", "s1").await.unwrap());
    }
}
