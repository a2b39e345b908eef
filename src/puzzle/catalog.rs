use std::collections::HashSet;

use super::types::{Puzzle, Room};
use crate::error::{CatalogError, EngineError};

/// The fixed, ordered list of rooms. Room order is progression order.
#[derive(Debug, Clone)]
pub struct Catalog {
    rooms: Vec<Room>,
}

impl Catalog {
    pub fn new(rooms: Vec<Room>) -> Result<Self, CatalogError> {
        if rooms.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut seen = HashSet::new();
        for room in &rooms {
            if room.puzzles.is_empty() {
                return Err(CatalogError::EmptyRoom(room.meta.id.clone()));
            }
            for puzzle in &room.puzzles {
                if puzzle.solution.trim().is_empty() {
                    return Err(CatalogError::EmptySolution(puzzle.id.clone()));
                }
                if puzzle.hints.is_empty() {
                    return Err(CatalogError::NoHints(puzzle.id.clone()));
                }
                // The solved set spans the whole session, so ids must be
                // unique across rooms and not just within one.
                if !seen.insert(puzzle.id.as_str()) {
                    return Err(CatalogError::DuplicatePuzzle(puzzle.id.clone()));
                }
            }
        }

        Ok(Catalog { rooms })
    }

    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    pub fn last_index(&self) -> usize {
        self.rooms.len() - 1
    }

    pub fn puzzle_count(&self) -> usize {
        self.rooms.iter().map(|r| r.puzzles.len()).sum()
    }

    pub fn room(&self, index: usize) -> Result<&Room, EngineError> {
        self.rooms
            .get(index)
            .ok_or_else(|| EngineError::room(index.to_string()))
    }

    pub fn room_by_id(&self, id: &str) -> Result<&Room, EngineError> {
        self.rooms
            .iter()
            .find(|r| r.meta.id == id)
            .ok_or_else(|| EngineError::room(id))
    }

    pub fn puzzle(&self, room_index: usize, puzzle_id: &str) -> Result<&Puzzle, EngineError> {
        self.room(room_index)?
            .puzzle(puzzle_id)
            .ok_or_else(|| EngineError::puzzle(puzzle_id))
    }

    /// Finds a puzzle anywhere in the catalog along with its room index.
    pub fn locate(&self, puzzle_id: &str) -> Result<(usize, &Puzzle), EngineError> {
        self.rooms
            .iter()
            .enumerate()
            .find_map(|(index, room)| room.puzzle(puzzle_id).map(|p| (index, p)))
            .ok_or_else(|| EngineError::puzzle(puzzle_id))
    }
}
