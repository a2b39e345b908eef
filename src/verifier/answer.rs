use crate::puzzle::Puzzle;

/// Trims surrounding whitespace and folds case.
///
/// The same rule applies to every puzzle kind: the player decodes the
/// challenge by hand and submits plaintext, so hex or binary answers are
/// compared case-insensitively too.
pub fn canonicalize(answer: &str) -> String {
    answer.trim().to_lowercase()
}

/// Returns true when `candidate` matches the puzzle's solution after
/// canonicalizing both sides.
pub fn check(puzzle: &Puzzle, candidate: &str) -> bool {
    canonicalize(candidate) == canonicalize(&puzzle.solution)
}
