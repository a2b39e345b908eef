use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, warn};

use super::{decode_session, Listener, Listeners, SessionStore, StoreError, StoreEvent, SubscriptionId};
use crate::engine::session::Session;

/// Keeps the session as `<dir>/<key>.json`.
///
/// Each save writes a temp file in the same directory and renames it over
/// the record, so a crash mid-write leaves the previous snapshot intact.
#[derive(Debug)]
pub struct FileStore {
    dir: PathBuf,
    path: PathBuf,
    listeners: Listeners,
}

impl FileStore {
    pub fn open(dir: impl Into<PathBuf>, key: &str) -> Result<Self, StoreError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        let path = dir.join(format!("{}.json", key));
        Ok(Self {
            dir,
            path,
            listeners: Listeners::default(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileStore {
    fn load(&self) -> Option<Session> {
        let raw = match std::fs::read(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return None,
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "session file unreadable");
                return None;
            }
        };
        decode_session(&self.path.to_string_lossy(), &raw)
    }

    fn save(&mut self, session: &Session) -> Result<(), StoreError> {
        let raw = serde_json::to_vec_pretty(session)?;
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(&raw)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path)?;
        debug!(path = %self.path.display(), score = session.score, "session saved");
        self.listeners.notify(&StoreEvent::Saved(session));
        Ok(())
    }

    fn clear(&mut self) -> Result<(), StoreError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => return Err(err.into()),
        }
        debug!(path = %self.path.display(), "session cleared");
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
