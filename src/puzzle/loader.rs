use std::path::Path;

use tracing::debug;

use super::catalog::Catalog;
use super::types::Room;
use crate::error::CatalogError;

pub fn load_room(path: &Path) -> Result<Room, CatalogError> {
    let content = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| CatalogError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Loads every `room_*.toml` in `dir`, ordered by file name so room_01,
/// room_02, room_03 come out in progression order.
pub fn load_catalog(dir: &Path) -> Result<Catalog, CatalogError> {
    let pattern = format!(
        "{}/room_*.toml",
        glob::Pattern::escape(&dir.to_string_lossy())
    );
    let mut paths = Vec::new();
    for entry in glob::glob(&pattern)? {
        let path = entry.map_err(|err| CatalogError::Io {
            path: err.path().to_path_buf(),
            source: err.into_error(),
        })?;
        paths.push(path);
    }
    paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    let mut rooms = Vec::with_capacity(paths.len());
    for path in paths {
        let room = load_room(&path)?;
        debug!(room = %room.meta.id, path = %path.display(), "loaded room");
        rooms.push(room);
    }

    Catalog::new(rooms)
}
