use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::{Scope, Store};
use crate::error::StoreError;

/// In-process store. Clones share the same map, so a test can keep a handle
/// and inspect what the service persisted, or hand the same data to a
/// second service to simulate a restart.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<(Scope, String), String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Store for MemoryStore {
    fn get(&self, scope: Scope, key: &str) -> Result<Option<String>, StoreError> {
        let entries = self
            .entries
            .lock()
            .map_err(|e| StoreError::QueryFailed(e.to_string()))?;
        Ok(entries.get(&(scope, key.to_string())).cloned())
    }

    fn set(&mut self, scope: Scope, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| StoreError::QueryFailed(e.to_string()))?;
        entries.insert((scope, key.to_string()), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scopes_are_separate() {
        let mut store = MemoryStore::new();
        store.set(Scope::Local, "k", "local").unwrap();
        store.set(Scope::Synced, "k", "synced").unwrap();
        assert_eq!(store.get(Scope::Local, "k").unwrap().as_deref(), Some("local"));
        assert_eq!(store.get(Scope::Synced, "k").unwrap().as_deref(), Some("synced"));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn clones_share_entries() {
        let mut store = MemoryStore::new();
        let view = store.clone();
        store.set(Scope::Local, "k", "v").unwrap();
        assert_eq!(view.get(Scope::Local, "k").unwrap().as_deref(), Some("v"));
    }
}
