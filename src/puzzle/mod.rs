pub mod catalog;
pub mod loader;
pub mod types;

pub use catalog::Catalog;
pub use loader::{load_catalog, load_room};
pub use types::{Challenge, Puzzle, PuzzleKind, Room, RoomMeta, Theme};
