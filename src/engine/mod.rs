pub mod hints;
pub mod progression;
pub mod session;
pub mod transient;

pub use hints::{reveal, HintCursor};
pub use progression::{
    AdvanceOutcome, HintReveal, ProgressionEngine, PuzzleStatus, PuzzleView, RoomStatus,
    SubmitOutcome, Timing, PUZZLE_REWARD,
};
pub use session::Session;
pub use transient::{Feedback, FeedbackKind};
