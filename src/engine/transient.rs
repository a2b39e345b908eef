use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackKind {
    Solved,
    Incorrect,
    RoomCleared,
    GameComplete,
}

/// Short-lived message shown after a player action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feedback {
    pub kind: FeedbackKind,
    pub message: String,
}

impl Feedback {
    pub fn new(kind: FeedbackKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// What a pending timer clears when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearAction {
    Feedback,
    /// Deselect the puzzle and clear feedback and hint state.
    Selection,
}

#[derive(Debug, Clone, Copy)]
struct Pending {
    due: Instant,
    action: ClearAction,
}

/// At most one pending clear. Scheduling or cancelling replaces whatever
/// an earlier interaction left behind, so a stale clear never fires.
#[derive(Debug, Default)]
pub struct ClearTimer {
    pending: Option<Pending>,
}

impl ClearTimer {
    pub fn schedule(&mut self, action: ClearAction, delay: Duration) {
        self.schedule_at(action, Instant::now() + delay);
    }

    pub fn schedule_at(&mut self, action: ClearAction, due: Instant) {
        self.pending = Some(Pending { due, action });
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.map(|p| p.due)
    }

    /// Takes the pending action if it is due at `now`.
    pub fn fire(&mut self, now: Instant) -> Option<ClearAction> {
        match self.pending {
            Some(p) if p.due <= now => {
                self.pending = None;
                Some(p.action)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_once_when_due() {
        let start = Instant::now();
        let mut timer = ClearTimer::default();
        timer.schedule_at(ClearAction::Feedback, start + Duration::from_secs(3));

        assert_eq!(timer.fire(start), None);
        assert_eq!(
            timer.fire(start + Duration::from_secs(3)),
            Some(ClearAction::Feedback)
        );
        assert_eq!(timer.fire(start + Duration::from_secs(10)), None);
    }

    #[test]
    fn rescheduling_replaces_the_earlier_clear() {
        let start = Instant::now();
        let mut timer = ClearTimer::default();
        timer.schedule_at(ClearAction::Selection, start + Duration::from_secs(2));
        timer.schedule_at(ClearAction::Feedback, start + Duration::from_secs(5));

        assert_eq!(timer.fire(start + Duration::from_secs(2)), None);
        assert_eq!(
            timer.fire(start + Duration::from_secs(5)),
            Some(ClearAction::Feedback)
        );
    }

    #[test]
    fn cancel_drops_pending_clear() {
        let mut timer = ClearTimer::default();
        timer.schedule(ClearAction::Selection, Duration::ZERO);
        timer.cancel();
        assert!(timer.deadline().is_none());
        assert_eq!(timer.fire(Instant::now()), None);
    }
}
