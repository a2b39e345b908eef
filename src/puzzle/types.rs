use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Room {
    pub meta: RoomMeta,
    #[serde(rename = "puzzle", default)]
    pub puzzles: Vec<Puzzle>,
}

impl Room {
    pub fn id(&self) -> &str {
        &self.meta.id
    }

    pub fn name(&self) -> &str {
        &self.meta.name
    }

    pub fn puzzle(&self, puzzle_id: &str) -> Option<&Puzzle> {
        self.puzzles.iter().find(|p| p.id == puzzle_id)
    }

    pub fn contains(&self, puzzle_id: &str) -> bool {
        self.puzzle(puzzle_id).is_some()
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct RoomMeta {
    pub id: String,
    pub room_number: u32,
    pub name: String,
    pub description: String,
    pub theme: Theme,
}

/// Display-only flavour of a room.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Cryptography,
    Cybersecurity,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Puzzle {
    pub id: String,
    pub name: String,
    pub description: String,
    pub kind: PuzzleKind,
    pub challenge: Challenge,
    pub hints: Vec<String>,
    pub solution: String,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PuzzleKind {
    Caesar,
    Hash,
    Xor,
    Binary,
    Steganography,
    Reverse,
    Substitution,
    Hex,
    Rot13,
    Base64,
}

impl PuzzleKind {
    pub fn label(&self) -> &'static str {
        match self {
            PuzzleKind::Caesar => "caesar",
            PuzzleKind::Hash => "hash",
            PuzzleKind::Xor => "xor",
            PuzzleKind::Binary => "binary",
            PuzzleKind::Steganography => "steganography",
            PuzzleKind::Reverse => "reverse",
            PuzzleKind::Substitution => "substitution",
            PuzzleKind::Hex => "hex",
            PuzzleKind::Rot13 => "rot13",
            PuzzleKind::Base64 => "base64",
        }
    }
}

/// What the player is shown. In room files a plain string is a text
/// challenge and an `{ input, output }` table is a transform challenge.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum Challenge {
    Text(String),
    Transform { input: String, output: String },
}

impl Challenge {
    pub fn display(&self) -> String {
        match self {
            Challenge::Text(text) => text.clone(),
            Challenge::Transform { input, output } => {
                format!("input: {}  →  output: {}", input, output)
            }
        }
    }
}
