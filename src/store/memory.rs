use std::collections::HashMap;

use super::{decode_session, Listener, Listeners, SessionStore, StoreError, StoreEvent, SubscriptionId};
use crate::engine::session::Session;

/// In-process key-value store holding encoded session records.
#[derive(Debug)]
pub struct MemoryStore {
    key: String,
    records: HashMap<String, Vec<u8>>,
    listeners: Listeners,
}

impl MemoryStore {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            records: HashMap::new(),
            listeners: Listeners::default(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Stores raw bytes under the session key, bypassing encoding.
    pub fn put_raw(&mut self, raw: impl Into<Vec<u8>>) {
        self.records.insert(self.key.clone(), raw.into());
    }

    pub fn raw(&self) -> Option<&[u8]> {
        self.records.get(&self.key).map(Vec::as_slice)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(super::DEFAULT_SESSION_KEY)
    }
}

impl SessionStore for MemoryStore {
    fn load(&self) -> Option<Session> {
        let raw = self.records.get(&self.key)?;
        decode_session(&self.key, raw)
    }

    fn save(&mut self, session: &Session) -> Result<(), StoreError> {
        let raw = serde_json::to_vec(session)?;
        self.records.insert(self.key.clone(), raw);
        self.listeners.notify(&StoreEvent::Saved(session));
        Ok(())
    }

    fn clear(&mut self) -> Result<(), StoreError> {
        self.records.remove(&self.key);
        self.listeners.notify(&StoreEvent::Cleared);
        Ok(())
    }

    fn subscribe(&mut self, listener: Listener) -> SubscriptionId {
        self.listeners.add(listener)
    }

    fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.listeners.remove(id)
    }
}
