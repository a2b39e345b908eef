use serde::{Deserialize, Serialize};

use crate::puzzle::Puzzle;

/// Position in the active puzzle's hint list. `None` until the first hint
/// is requested.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HintCursor(Option<usize>);

impl HintCursor {
    pub fn index(&self) -> Option<usize> {
        self.0
    }

    pub fn is_showing(&self) -> bool {
        self.0.is_some()
    }

    /// Drops any cursor that does not fit `puzzle`'s hint list.
    pub fn clamp_to(self, puzzle: &Puzzle) -> Self {
        match self.0 {
            Some(i) if i < puzzle.hints.len() => self,
            _ => HintCursor(None),
        }
    }
}

/// Reveals the next hint. The first call shows hint 0; later calls step
/// forward and wrap back to 0 after the last one.
pub fn reveal(puzzle: &Puzzle, cursor: HintCursor) -> (&str, HintCursor) {
    let total = puzzle.hints.len();
    let next = match cursor.0 {
        None => 0,
        Some(i) if total == 0 => i,
        Some(i) => (i + 1) % total,
    };
    let text = puzzle.hints.get(next).map(String::as_str).unwrap_or("");
    (text, HintCursor(Some(next)))
}
