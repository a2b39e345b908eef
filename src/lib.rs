//! Progression and answer-checking engine for a room-based cryptography
//! puzzle game.
//!
//! Rooms are loaded from TOML into a [`Catalog`]; a [`ProgressionEngine`]
//! walks one player through them, checking answers, revealing hints and
//! keeping score, and writes the session to a [`SessionStore`] after each
//! change.

pub mod config;
pub mod engine;
pub mod error;
pub mod puzzle;
pub mod store;
pub mod verifier;

pub use config::GameConfig;
pub use engine::{AdvanceOutcome, ProgressionEngine, Session, SubmitOutcome, Timing};
pub use error::{CatalogError, EngineError};
pub use puzzle::{Catalog, Challenge, Puzzle, PuzzleKind, Room};
pub use store::{FileStore, MemoryStore, SessionStore, StoreEvent};
