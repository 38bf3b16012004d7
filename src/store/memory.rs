use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::{RwLock, broadcast};

use super::{CHANGE_FEED_CAPACITY, DocumentStore, StoreError, StorePath, tree};

/// Process-local store used for development and tests.
pub struct MemoryStore {
    root: RwLock<Value>,
    changes: broadcast::Sender<StorePath>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_data(Value::Object(Map::new()))
    }

    /// Start from an existing tree, e.g. seed data.
    pub fn with_data(root: Value) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_FEED_CAPACITY);
        Self {
            root: RwLock::new(root),
            changes,
        }
    }

    /// Copy of the whole tree.
    pub async fn snapshot(&self) -> Value {
        self.root.read().await.clone()
    }

    fn notify(&self, path: &StorePath) {
        // No receivers is the normal case outside of open streams.
        let _ = self.changes.send(path.clone());
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, path: &StorePath) -> Result<Option<Value>, StoreError> {
        let root = self.root.read().await;
        Ok(tree::get(&root, path.segments()).cloned())
    }

    async fn set(&self, path: &StorePath, value: Value) -> Result<(), StoreError> {
        {
            let mut root = self.root.write().await;
            tree::set(&mut root, path.segments(), value);
        }
        self.notify(path);
        Ok(())
    }

    async fn update(&self, path: &StorePath, patch: Map<String, Value>) -> Result<(), StoreError> {
        {
            let mut root = self.root.write().await;
            tree::update(&mut root, path.segments(), patch);
        }
        self.notify(path);
        Ok(())
    }

    async fn remove(&self, path: &StorePath) -> Result<bool, StoreError> {
        let removed = {
            let mut root = self.root.write().await;
            tree::remove(&mut root, path.segments())
        };
        if removed {
            self.notify(path);
        }
        Ok(removed)
    }

    fn subscribe(&self) -> broadcast::Receiver<StorePath> {
        self.changes.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn writes_are_visible_and_broadcast() {
        let store = MemoryStore::new();
        let mut feed = store.subscribe();
        let path = StorePath::parse("notifications/u1/n1").unwrap();

        store.set(&path, json!({ "read": false })).await.unwrap();
        assert_eq!(feed.recv().await.unwrap(), path);
        assert_eq!(
            store.get(&path).await.unwrap(),
            Some(json!({ "read": false }))
        );

        assert!(store.remove(&path).await.unwrap());
        assert!(!store.remove(&path).await.unwrap());
        assert!(store.get(&StorePath::parse("notifications").unwrap()).await.unwrap().is_none());
    }
}
