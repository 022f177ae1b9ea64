use dashmap::DashMap;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

/// Step-local state for one wizard session.
///
/// Each step keeps its state under its own id. Clones share the same underlying
/// map, so a value written by a running step is visible to every holder of the
/// session.
#[derive(Clone, Debug)]
pub struct Context {
    data: Arc<DashMap<String, Value>>,
}

impl Context {
    pub fn new() -> Self {
        Self {
            data: Arc::new(DashMap::new()),
        }
    }

    pub async fn set(&self, key: impl Into<String>, value: impl serde::Serialize) {
        self.set_sync(key, value);
    }

    pub fn set_sync(&self, key: impl Into<String>, value: impl serde::Serialize) {
        let key = key.into();
        match serde_json::to_value(value) {
            Ok(value) => {
                self.data.insert(key, value);
            }
            Err(e) => warn!(key = %key, error = %e, "Failed to serialize context value"),
        }
    }

    pub async fn get<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.get_sync(key)
    }

    pub fn get_sync<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.data
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    pub async fn remove(&self, key: &str) -> Option<Value> {
        self.data.remove(key).map(|(_, v)| v)
    }

    pub async fn clear(&self) {
        self.data.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Write an in-flight value under `key` and get a guard that puts the
    /// previous entry back when dropped, unless the guard is disarmed first.
    ///
    /// Steps that await an operation hold the guard across the await, so a
    /// dropped request never leaves the in-flight value behind.
    pub fn set_scoped(&self, key: impl Into<String>, value: impl serde::Serialize) -> ScopedEntry {
        let key = key.into();
        let previous = self.data.get(&key).map(|v| v.value().clone());
        self.set_sync(key.clone(), value);
        ScopedEntry {
            context: self.clone(),
            key,
            previous,
            armed: true,
        }
    }

    /// Copy of every entry, for reporting.
    pub fn snapshot(&self) -> HashMap<String, Value> {
        self.data
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

/// Guard returned by [`Context::set_scoped`].
#[must_use = "dropping the guard restores the previous entry immediately"]
pub struct ScopedEntry {
    context: Context,
    key: String,
    previous: Option<Value>,
    armed: bool,
}

impl ScopedEntry {
    /// Keep whatever is stored under the key from now on.
    pub fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for ScopedEntry {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        warn!(key = %self.key, "in-flight entry abandoned, restoring previous value");
        match self.previous.take() {
            Some(value) => {
                self.context.data.insert(self.key.clone(), value);
            }
            None => {
                self.context.data.remove(&self.key);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(tag = "state", rename_all = "snake_case")]
    enum Local {
        Idle,
        Busy { progress: u8 },
    }

    #[tokio::test]
    async fn clones_share_the_same_state() {
        let context = Context::new();
        let other = context.clone();

        context.set("upload", Local::Busy { progress: 40 }).await;

        let seen: Local = other.get("upload").await.unwrap();
        assert_eq!(seen, Local::Busy { progress: 40 });
    }

    #[tokio::test]
    async fn get_with_wrong_type_is_none() {
        let context = Context::new();
        context.set("upload", Local::Idle).await;

        assert!(context.get::<u32>("upload").await.is_none());
        assert!(context.contains("upload"));
    }

    #[tokio::test]
    async fn scoped_entry_restores_unless_disarmed() {
        let context = Context::new();
        context.set("upload", Local::Idle).await;

        {
            let _guard = context.set_scoped("upload", Local::Busy { progress: 10 });
            assert_eq!(context.get_sync::<Local>("upload"), Some(Local::Busy { progress: 10 }));
        }
        assert_eq!(context.get_sync::<Local>("upload"), Some(Local::Idle));

        let guard = context.set_scoped("upload", Local::Busy { progress: 90 });
        context.set("upload", Local::Busy { progress: 100 }).await;
        guard.disarm();
        assert_eq!(context.get_sync::<Local>("upload"), Some(Local::Busy { progress: 100 }));

        drop(context.set_scoped("form", Local::Idle));
        assert!(!context.contains("form"));
    }

    #[tokio::test]
    async fn clear_drops_everything() {
        let context = Context::new();
        context.set("a", 1).await;
        context.set("b", "two").await;
        assert_eq!(context.snapshot().len(), 2);

        context.clear().await;
        assert!(context.is_empty());
    }
}
