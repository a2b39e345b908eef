use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use super::hints::{self, HintCursor};
use super::session::Session;
use super::transient::{ClearAction, ClearTimer, Feedback, FeedbackKind};
use crate::error::EngineError;
use crate::puzzle::{Catalog, Puzzle, Room};
use crate::store::SessionStore;
use crate::verifier;

/// Points for the first correct answer to a puzzle.
pub const PUZZLE_REWARD: u32 = 100;

/// Delays before transient feedback is cleared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    pub solved_clear: Duration,
    pub feedback_clear: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            solved_clear: Duration::from_secs(2),
            feedback_clear: Duration::from_secs(3),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PuzzleStatus {
    Locked,
    Active,
    Solved,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomStatus {
    Pending,
    Current,
    Cleared,
}

/// A puzzle in the current room with its derived flags.
#[derive(Debug, Clone, Copy)]
pub struct PuzzleView<'a> {
    pub puzzle: &'a Puzzle,
    pub solved: bool,
    pub active: bool,
}

impl PuzzleView<'_> {
    pub fn status(&self) -> PuzzleStatus {
        if self.active {
            PuzzleStatus::Active
        } else if self.solved {
            PuzzleStatus::Solved
        } else {
            PuzzleStatus::Locked
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Solved {
        puzzle_id: String,
        /// Zero when the puzzle had already been solved.
        awarded: u32,
        score: u32,
    },
    Incorrect {
        puzzle_id: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceOutcome {
    Advanced { room_index: usize },
    GameComplete,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HintReveal {
    pub index: usize,
    pub total: usize,
    pub text: String,
}

/// Drives a single player's run through the catalog.
///
/// Every command either applies completely or returns an error without
/// touching the session. Session changes are written to the store right
/// away; a failing store is logged and play continues.
pub struct ProgressionEngine<S> {
    catalog: Catalog,
    store: S,
    session: Session,
    timing: Timing,
    feedback: Option<Feedback>,
    timer: ClearTimer,
}

impl<S: SessionStore> ProgressionEngine<S> {
    /// Starts from a fresh session without reading the store.
    pub fn new(catalog: Catalog, store: S, timing: Timing) -> Self {
        Self {
            catalog,
            store,
            session: Session::default(),
            timing,
            feedback: None,
            timer: ClearTimer::default(),
        }
    }

    /// Picks up the stored session, or starts fresh if there is none or it
    /// no longer fits the catalog.
    pub fn resume(catalog: Catalog, store: S, timing: Timing) -> Self {
        let session = store
            .load()
            .and_then(|s| restore(&catalog, s))
            .unwrap_or_default();
        info!(
            room = session.current_room_index,
            score = session.score,
            solved = session.solved_puzzle_ids.len(),
            "session resumed"
        );
        Self {
            catalog,
            store,
            session,
            timing,
            feedback: None,
            timer: ClearTimer::default(),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn is_started(&self) -> bool {
        self.session.started
    }

    pub fn score(&self) -> u32 {
        self.session.score
    }

    pub fn current_room_index(&self) -> usize {
        self.session.current_room_index
    }

    pub fn current_room(&self) -> &Room {
        &self.catalog.rooms()[self.session.current_room_index]
    }

    pub fn is_last_room(&self) -> bool {
        self.session.current_room_index == self.catalog.last_index()
    }

    pub fn room_status(&self, index: usize) -> Result<RoomStatus, EngineError> {
        let room = self.catalog.room(index)?;
        let current = self.session.current_room_index;
        Ok(if index > current {
            RoomStatus::Pending
        } else if self.is_cleared(room) {
            RoomStatus::Cleared
        } else if index == current {
            RoomStatus::Current
        } else {
            RoomStatus::Pending
        })
    }

    pub fn puzzles(&self) -> Vec<PuzzleView<'_>> {
        let active = self.session.active_puzzle_id.as_deref();
        self.current_room()
            .puzzles
            .iter()
            .map(|puzzle| PuzzleView {
                puzzle,
                solved: self.session.is_solved(&puzzle.id),
                active: active == Some(puzzle.id.as_str()),
            })
            .collect()
    }

    pub fn active_puzzle(&self) -> Option<&Puzzle> {
        let id = self.session.active_puzzle_id.as_deref()?;
        self.current_room().puzzle(id)
    }

    /// The hint currently on display for the active puzzle, if any.
    pub fn current_hint(&self) -> Option<HintReveal> {
        let puzzle = self.active_puzzle()?;
        let index = self.session.hint_cursor.index()?;
        Some(HintReveal {
            index,
            total: puzzle.hints.len(),
            text: puzzle.hints.get(index)?.clone(),
        })
    }

    pub fn feedback(&self) -> Option<&Feedback> {
        self.feedback.as_ref()
    }

    pub fn pending_clear(&self) -> Option<Instant> {
        self.timer.deadline()
    }

    pub fn can_advance_room(&self) -> bool {
        self.is_cleared(self.current_room())
    }

    /// True once the last room has every puzzle solved.
    pub fn is_game_complete(&self) -> bool {
        self.is_last_room() && self.can_advance_room()
    }

    /// Solved puzzles across the catalog, and the total.
    pub fn progress(&self) -> (usize, usize) {
        let solved = self
            .catalog
            .rooms()
            .iter()
            .flat_map(|r| r.puzzles.iter())
            .filter(|p| self.session.is_solved(&p.id))
            .count();
        (solved, self.catalog.puzzle_count())
    }

    fn is_cleared(&self, room: &Room) -> bool {
        room.puzzles.iter().all(|p| self.session.is_solved(&p.id))
    }

    pub fn start_game(&mut self) {
        if self.session.started {
            return;
        }
        self.session.started = true;
        info!("game started");
        self.persist();
    }

    pub fn select_puzzle(&mut self, puzzle_id: &str) -> Result<(), EngineError> {
        if !self.current_room().contains(puzzle_id) {
            return Err(EngineError::InvalidSelection(puzzle_id.to_string()));
        }

        self.timer.cancel();
        self.feedback = None;
        self.session.active_puzzle_id = Some(puzzle_id.to_string());
        self.session.hint_cursor = HintCursor::default();
        debug!(puzzle = puzzle_id, "puzzle selected");
        self.persist();
        Ok(())
    }

    pub fn submit_solution(&mut self, candidate: &str) -> Result<SubmitOutcome, EngineError> {
        let puzzle = self.active_puzzle().ok_or(EngineError::NoActivePuzzle)?;
        let puzzle_id = puzzle.id.clone();
        let correct = verifier::check(puzzle, candidate);

        self.timer.cancel();

        if !correct {
            debug!(puzzle = %puzzle_id, "incorrect answer");
            self.feedback = Some(Feedback::new(
                FeedbackKind::Incorrect,
                "Incorrect solution. Try again.",
            ));
            self.timer
                .schedule(ClearAction::Feedback, self.timing.feedback_clear);
            return Ok(SubmitOutcome::Incorrect { puzzle_id });
        }

        let awarded = if self.session.solved_puzzle_ids.insert(puzzle_id.clone()) {
            self.session.score = self.session.score.saturating_add(PUZZLE_REWARD);
            PUZZLE_REWARD
        } else {
            0
        };
        info!(puzzle = %puzzle_id, awarded, score = self.session.score, "puzzle solved");

        self.feedback = Some(if self.can_advance_room() {
            Feedback::new(
                FeedbackKind::RoomCleared,
                "Correct! Puzzle solved. Every lock in this room is open.",
            )
        } else {
            Feedback::new(FeedbackKind::Solved, "Correct! Puzzle solved.")
        });
        self.timer
            .schedule(ClearAction::Selection, self.timing.solved_clear);
        if awarded > 0 {
            self.persist();
        }

        Ok(SubmitOutcome::Solved {
            puzzle_id,
            awarded,
            score: self.session.score,
        })
    }

    pub fn request_hint(&mut self) -> Result<HintReveal, EngineError> {
        let puzzle = self.active_puzzle().ok_or(EngineError::NoActivePuzzle)?;
        let (text, cursor) = hints::reveal(puzzle, self.session.hint_cursor);
        let reveal = HintReveal {
            index: cursor.index().unwrap_or(0),
            total: puzzle.hints.len(),
            text: text.to_string(),
        };

        self.session.hint_cursor = cursor;
        debug!(hint = reveal.index, of = reveal.total, "hint revealed");
        self.persist();
        Ok(reveal)
    }

    pub fn advance_room(&mut self) -> Result<AdvanceOutcome, EngineError> {
        if self.is_last_room() {
            self.timer.cancel();
            self.feedback = Some(Feedback::new(
                FeedbackKind::GameComplete,
                "Congratulations! You've completed all rooms!",
            ));
            info!(score = self.session.score, "game complete");
            return Ok(AdvanceOutcome::GameComplete);
        }

        if !self.can_advance_room() {
            return Err(EngineError::RoomNotCleared(
                self.current_room().id().to_string(),
            ));
        }

        self.timer.cancel();
        self.session.current_room_index += 1;
        self.session.active_puzzle_id = None;
        self.session.hint_cursor = HintCursor::default();
        self.feedback = None;

        let room_index = self.session.current_room_index;
        info!(room = room_index, name = self.current_room().name(), "entered room");
        self.persist();
        Ok(AdvanceOutcome::Advanced { room_index })
    }

    pub fn reset_game(&mut self) {
        self.timer.cancel();
        self.feedback = None;
        self.session = Session::default();
        if let Err(err) = self.store.clear() {
            warn!(error = %err, "failed to clear stored session");
        }
        info!("game reset");
    }

    /// Applies a scheduled clear if it is due. Returns true when something
    /// visible changed.
    pub fn expire_transients(&mut self, now: Instant) -> bool {
        match self.timer.fire(now) {
            Some(ClearAction::Feedback) => {
                self.feedback = None;
                true
            }
            Some(ClearAction::Selection) => {
                self.feedback = None;
                self.session.active_puzzle_id = None;
                self.session.hint_cursor = HintCursor::default();
                self.persist();
                true
            }
            None => false,
        }
    }

    fn persist(&mut self) {
        if let Err(err) = self.store.save(&self.session) {
            warn!(error = %err, "failed to save session");
        }
    }
}

/// Checks a loaded session against the catalog. Records whose numbers
/// disagree with the solved set are rejected; a selection or hint cursor
/// that no longer points at real content is dropped.
fn restore(catalog: &Catalog, mut session: Session) -> Option<Session> {
    let Ok(room) = catalog.room(session.current_room_index) else {
        warn!(
            room = session.current_room_index,
            rooms = catalog.len(),
            "stored room index out of range, starting fresh"
        );
        return None;
    };

    let unfinished = catalog.rooms()[..session.current_room_index]
        .iter()
        .find(|r| !r.puzzles.iter().all(|p| session.is_solved(&p.id)));
    if let Some(unfinished) = unfinished {
        warn!(
            room = unfinished.id(),
            "stored session is past a room it never cleared, starting fresh"
        );
        return None;
    }

    let known = catalog
        .rooms()
        .iter()
        .flat_map(|r| r.puzzles.iter())
        .filter(|p| session.is_solved(&p.id))
        .count();
    let expected = u32::try_from(known)
        .ok()
        .and_then(|n| n.checked_mul(PUZZLE_REWARD));
    if expected != Some(session.score) {
        warn!(
            score = session.score,
            solved = known,
            "stored score does not match solved puzzles, starting fresh"
        );
        return None;
    }

    match session.active_puzzle_id.as_deref().map(|id| room.puzzle(id)) {
        Some(Some(puzzle)) => {
            session.hint_cursor = session.hint_cursor.clamp_to(puzzle);
        }
        Some(None) => {
            warn!("stored active puzzle not in current room, dropping selection");
            session.active_puzzle_id = None;
            session.hint_cursor = HintCursor::default();
        }
        None => session.hint_cursor = HintCursor::default(),
    }

    Some(session)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::puzzle::{Challenge, PuzzleKind, RoomMeta, Theme};
    use crate::store::MemoryStore;

    fn puzzle(id: &str, solution: &str) -> Puzzle {
        Puzzle {
            id: id.into(),
            name: id.into(),
            description: String::new(),
            kind: PuzzleKind::Reverse,
            challenge: Challenge::Text(solution.chars().rev().collect()),
            hints: vec!["first".into(), "second".into()],
            solution: solution.into(),
        }
    }

    fn room(id: &str, puzzles: Vec<Puzzle>) -> Room {
        Room {
            meta: RoomMeta {
                id: id.into(),
                room_number: 0,
                name: id.into(),
                description: String::new(),
                theme: Theme::Cybersecurity,
            },
            puzzles,
        }
    }

    fn engine() -> ProgressionEngine<MemoryStore> {
        let catalog = Catalog::new(vec![
            room("room0", vec![puzzle("p1", "hello"), puzzle("p2", "world")]),
            room("room1", vec![puzzle("p3", "done")]),
        ])
        .unwrap();
        ProgressionEngine::new(catalog, MemoryStore::default(), Timing::default())
    }

    #[test]
    fn start_is_idempotent() {
        let mut engine = engine();
        assert!(!engine.is_started());
        engine.start_game();
        engine.start_game();
        assert!(engine.is_started());
        assert!(engine.store().load().unwrap().started);
    }

    #[test]
    fn statuses_follow_selection_and_solves() {
        let mut engine = engine();
        engine.select_puzzle("p1").unwrap();
        engine.submit_solution("hello").unwrap();
        engine.select_puzzle("p2").unwrap();

        let statuses: Vec<_> = engine.puzzles().iter().map(|v| v.status()).collect();
        assert_eq!(statuses, vec![PuzzleStatus::Solved, PuzzleStatus::Active]);

        assert_eq!(engine.room_status(0).unwrap(), RoomStatus::Current);
        assert_eq!(engine.room_status(1).unwrap(), RoomStatus::Pending);
        assert!(engine.room_status(2).is_err());

        engine.submit_solution("world").unwrap();
        assert_eq!(engine.room_status(0).unwrap(), RoomStatus::Cleared);
    }

    #[test]
    fn incorrect_answer_leaves_session_alone() {
        let mut engine = engine();
        engine.select_puzzle("p1").unwrap();
        let before = engine.session().clone();

        let outcome = engine.submit_solution("goodbye").unwrap();
        assert_eq!(outcome, SubmitOutcome::Incorrect { puzzle_id: "p1".into() });
        assert_eq!(engine.session(), &before);
        assert_eq!(engine.feedback().unwrap().kind, FeedbackKind::Incorrect);
    }

    #[test]
    fn advancing_an_unfinished_room_is_refused() {
        let mut engine = engine();
        assert_eq!(
            engine.advance_room(),
            Err(EngineError::RoomNotCleared("room0".into()))
        );
        assert_eq!(engine.current_room_index(), 0);
    }

    #[test]
    fn solved_selection_clears_after_delay() {
        let mut engine = engine();
        engine.select_puzzle("p1").unwrap();
        engine.request_hint().unwrap();
        engine.submit_solution("hello").unwrap();

        let due = engine.pending_clear().unwrap();
        assert!(!engine.expire_transients(due - Duration::from_millis(1)));
        assert!(engine.active_puzzle().is_some());

        assert!(engine.expire_transients(due));
        assert!(engine.active_puzzle().is_none());
        assert!(engine.feedback().is_none());
        assert!(engine.current_hint().is_none());
        assert_eq!(engine.store().load().unwrap().active_puzzle_id, None);
    }

    #[test]
    fn new_selection_cancels_stale_clear() {
        let mut engine = engine();
        engine.select_puzzle("p1").unwrap();
        engine.submit_solution("hello").unwrap();
        engine.select_puzzle("p2").unwrap();

        assert!(engine.pending_clear().is_none());
        assert!(!engine.expire_transients(Instant::now() + Duration::from_secs(60)));
        assert_eq!(engine.active_puzzle().map(|p| p.id.as_str()), Some("p2"));
    }

    #[test]
    fn restore_drops_dangling_selection() {
        let catalog = engine().catalog().clone();
        let session = Session {
            active_puzzle_id: Some("p3".into()),
            ..Session::default()
        };
        let restored = restore(&catalog, session).unwrap();
        assert_eq!(restored.active_puzzle_id, None);

        let session = Session {
            current_room_index: 9,
            ..Session::default()
        };
        assert!(restore(&catalog, session).is_none());
    }

    #[test]
    fn restore_rejects_score_out_of_line_with_solves() {
        let catalog = engine().catalog().clone();
        let mut session = Session {
            score: 100,
            ..Session::default()
        };
        assert!(restore(&catalog, session.clone()).is_none());

        session.solved_puzzle_ids.insert("p1".into());
        assert!(restore(&catalog, session).is_some());
    }

    #[test]
    fn skipped_room_is_not_reported_cleared() {
        let mut engine = engine();
        engine.session.current_room_index = 1;

        assert_eq!(engine.room_status(0).unwrap(), RoomStatus::Pending);
        assert_eq!(engine.room_status(1).unwrap(), RoomStatus::Current);
    }

    #[test]
    fn score_saturates_instead_of_overflowing() {
        let mut engine = engine();
        engine.session.score = u32::MAX - 10;
        engine.select_puzzle("p1").unwrap();
        engine.submit_solution("hello").unwrap();
        assert_eq!(engine.score(), u32::MAX);
    }
}
