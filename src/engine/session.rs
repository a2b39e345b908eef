use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::hints::HintCursor;

pub const SESSION_VERSION: u32 = 1;

/// Per-player progression state. Only the engine mutates it; the store
/// persists a full snapshot after every change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    #[serde(default = "current_version")]
    pub version: u32,
    pub score: u32,
    pub solved_puzzle_ids: BTreeSet<String>,
    pub current_room_index: usize,
    #[serde(default)]
    pub started: bool,
    #[serde(default)]
    pub active_puzzle_id: Option<String>,
    #[serde(default, rename = "hintIndex")]
    pub hint_cursor: HintCursor,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            version: SESSION_VERSION,
            score: 0,
            solved_puzzle_ids: BTreeSet::new(),
            current_room_index: 0,
            started: false,
            active_puzzle_id: None,
            hint_cursor: HintCursor::default(),
        }
    }
}

fn current_version() -> u32 {
    SESSION_VERSION
}

impl Session {
    pub fn is_solved(&self, puzzle_id: &str) -> bool {
        self.solved_puzzle_ids.contains(puzzle_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn persists_with_camel_case_keys() {
        let mut session = Session::default();
        session.score = 200;
        session.solved_puzzle_ids.insert("puzzle1".into());
        session.current_room_index = 1;

        let json = serde_json::to_value(&session).unwrap();
        assert_eq!(json["score"], 200);
        assert_eq!(json["solvedPuzzleIds"], serde_json::json!(["puzzle1"]));
        assert_eq!(json["currentRoomIndex"], 1);
        assert_eq!(json["hintIndex"], serde_json::Value::Null);
    }

    #[test]
    fn optional_fields_may_be_absent() {
        let json = r#"{"version":1,"score":100,"solvedPuzzleIds":["a"],"currentRoomIndex":0,"started":true}"#;
        let session: Session = serde_json::from_str(json).unwrap();
        assert_eq!(session.score, 100);
        assert!(session.is_solved("a"));
        assert_eq!(session.active_puzzle_id, None);
        assert!(session.hint_cursor.index().is_none());
    }

    #[test]
    fn minimal_record_loads() {
        let json = r#"{"score":300,"solvedPuzzleIds":["a","b","c"],"currentRoomIndex":1}"#;
        let session: Session = serde_json::from_str(json).unwrap();
        assert_eq!(session.version, SESSION_VERSION);
        assert_eq!(session.score, 300);
        assert!(!session.started);
    }
}
