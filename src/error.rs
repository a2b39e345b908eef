use std::path::PathBuf;

/// Errors reported to the front end by engine commands and catalog lookups.
/// None of them are fatal; the session is left untouched when one is returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("{what} not found: {id}")]
    NotFound { what: &'static str, id: String },

    #[error("puzzle {0} is not in the current room")]
    InvalidSelection(String),

    #[error("no puzzle is selected")]
    NoActivePuzzle,

    #[error("room {0} still has unsolved puzzles")]
    RoomNotCleared(String),
}

impl EngineError {
    pub(crate) fn room(id: impl Into<String>) -> Self {
        EngineError::NotFound {
            what: "room",
            id: id.into(),
        }
    }

    pub(crate) fn puzzle(id: impl Into<String>) -> Self {
        EngineError::NotFound {
            what: "puzzle",
            id: id.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid room file pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("catalog has no rooms")]
    Empty,

    #[error("room {0} has no puzzles")]
    EmptyRoom(String),

    #[error("puzzle {0} has an empty solution")]
    EmptySolution(String),

    #[error("puzzle {0} has no hints")]
    NoHints(String),

    #[error("puzzle id {0} is used more than once")]
    DuplicatePuzzle(String),
}
