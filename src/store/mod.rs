//! Persistence boundary for the player's session.
//!
//! Stores keep one record per session key and notify subscribers after each
//! write, so displays such as the score bar follow changes without re-reading
//! the record on a timer.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use tracing::warn;

use crate::engine::session::{Session, SESSION_VERSION};

pub const DEFAULT_SESSION_KEY: &str = "cryptoEscape_session";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode session: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("failed to replace session file: {0}")]
    Persist(#[from] tempfile::PersistError),
}

/// What just happened to the stored record.
#[derive(Debug, Clone, Copy)]
pub enum StoreEvent<'a> {
    Saved(&'a Session),
    Cleared,
}

pub type Listener = Box<dyn FnMut(&StoreEvent<'_>)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

pub trait SessionStore {
    /// Last saved session, or `None` when nothing usable is stored.
    /// Corrupt records are treated as absent.
    fn load(&self) -> Option<Session>;

    /// Replaces the stored record. Writes land in call order.
    fn save(&mut self, session: &Session) -> Result<(), StoreError>;

    fn clear(&mut self) -> Result<(), StoreError>;

    fn subscribe(&mut self, listener: Listener) -> SubscriptionId;

    fn unsubscribe(&mut self, id: SubscriptionId) -> bool;
}

impl<S: SessionStore + ?Sized> SessionStore for Box<S> {
    fn load(&self) -> Option<Session> {
        (**self).load()
    }

    fn save(&mut self, session: &Session) -> Result<(), StoreError> {
        (**self).save(session)
    }

    fn clear(&mut self) -> Result<(), StoreError> {
        (**self).clear()
    }

    fn subscribe(&mut self, listener: Listener) -> SubscriptionId {
        (**self).subscribe(listener)
    }

    fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        (**self).unsubscribe(id)
    }
}

/// Subscriber list shared by the store implementations.
#[derive(Default)]
pub struct Listeners {
    next_id: u64,
    entries: Vec<(SubscriptionId, Listener)>,
}

impl Listeners {
    pub fn add(&mut self, listener: Listener) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, listener));
        id
    }

    pub fn remove(&mut self, id: SubscriptionId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry, _)| *entry != id);
        self.entries.len() != before
    }

    pub fn notify(&mut self, event: &StoreEvent<'_>) {
        for (_, listener) in self.entries.iter_mut() {
            listener(event);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::fmt::Debug for Listeners {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Listeners")
            .field("count", &self.entries.len())
            .finish()
    }
}

/// Parses a stored record, returning `None` for anything malformed or
/// written by a different record version.
pub(crate) fn decode_session(key: &str, raw: &[u8]) -> Option<Session> {
    match serde_json::from_slice::<Session>(raw) {
        Ok(session) if session.version == SESSION_VERSION => Some(session),
        Ok(session) => {
            warn!(key, version = session.version, "ignoring session with unknown version");
            None
        }
        Err(err) => {
            warn!(key, error = %err, "ignoring corrupt session record");
            None
        }
    }
}
