use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use serde_json::Value;

use crate::db::models::Attributes;
use crate::error::BackendError;

use super::CounterStore;

/// In-process backend for local runs and tests.
///
/// Each increment runs entirely under the map lock, which gives the same
/// per-record atomicity a real store provides.
#[derive(Default)]
pub struct MemoryCounterStore {
    records: Mutex<HashMap<String, Attributes>>,
    offline: AtomicBool,
}

impl MemoryCounterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// While offline every call fails with [`BackendError::Unreachable`].
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Overwrite a record verbatim, bypassing the counter primitive.
    pub fn put_raw(&self, key: &str, attributes: Attributes) -> Result<(), BackendError> {
        self.lock()?.insert(key.to_string(), attributes);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.records.lock().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, Attributes>>, BackendError> {
        self.records
            .lock()
            .map_err(|_| BackendError::Unreachable("memory store lock poisoned".into()))
    }

    fn check_online(&self) -> Result<(), BackendError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(BackendError::Unreachable("memory store is offline".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl CounterStore for MemoryCounterStore {
    async fn increment(&self, key: &str, field: &str) -> Result<(), BackendError> {
        self.check_online()?;

        let mut records = self.lock()?;
        let record = records.entry(key.to_string()).or_default();
        let current = match record.get(field) {
            None => 0,
            Some(value) => value.as_u64().ok_or_else(|| {
                BackendError::Rejected(format!("{field} is not numeric: {value}"))
            })?,
        };
        record.insert(field.to_string(), Value::from(current + 1));

        Ok(())
    }

    async fn fetch(&self, key: &str) -> Result<Option<Attributes>, BackendError> {
        self.check_online()?;

        Ok(self.lock()?.get(key).cloned())
    }

    async fn ping(&self) -> Result<(), BackendError> {
        self.check_online()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn increment_creates_record_and_field() {
        let store = MemoryCounterStore::new();
        assert!(store.fetch("2024-03-01").await.unwrap().is_none());

        store.increment("2024-03-01", "good").await.unwrap();
        store.increment("2024-03-01", "good").await.unwrap();
        store.increment("2024-03-01", "bad").await.unwrap();

        let record = store.fetch("2024-03-01").await.unwrap().unwrap();
        assert_eq!(record.get("good"), Some(&json!(2)));
        assert_eq!(record.get("bad"), Some(&json!(1)));
        assert_eq!(record.get("very_good"), None);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn offline_store_fails_every_call() {
        let store = MemoryCounterStore::new();
        store.set_offline(true);

        assert!(matches!(
            store.increment("2024-03-01", "good").await,
            Err(BackendError::Unreachable(_))
        ));
        assert!(store.fetch("2024-03-01").await.is_err());
        assert!(store.ping().await.is_err());
        assert!(store.is_empty());

        store.set_offline(false);
        assert!(store.ping().await.is_ok());
    }

    #[tokio::test]
    async fn increment_refuses_non_numeric_field() {
        let store = MemoryCounterStore::new();
        let record = json!({"good": "lots"}).as_object().cloned().unwrap();
        store.put_raw("2024-03-01", record).unwrap();

        assert!(matches!(
            store.increment("2024-03-01", "good").await,
            Err(BackendError::Rejected(_))
        ));
    }
}
