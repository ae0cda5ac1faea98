use std::fmt;

use serde::{Deserialize, Serialize};

/// Service-assigned note identifier.
///
/// Kept exactly as the service sent it (number or string) so it can be echoed
/// back on completion.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NoteId {
    Number(u64),
    Text(String),
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", n),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<u64> for NoteId {
    fn from(n: u64) -> Self {
        Self::Number(n)
    }
}

impl From<&str> for NoteId {
    /// Numeric strings become `Number` ids, matching how the service issues them.
    fn from(s: &str) -> Self {
        match s.parse::<u64>() {
            Ok(n) => Self::Number(n),
            Err(_) => Self::Text(s.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    pub content: String,
    #[serde(default)]
    pub is_completed: bool,
}

impl Note {
    pub fn new(id: impl Into<NoteId>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            is_completed: false,
        }
    }

    pub fn completed(mut self) -> Self {
        self.is_completed = true;
        self
    }
}

/// Number of notes still open, which is what a calendar cell shows.
pub fn open_count(notes: &[Note]) -> usize {
    notes.iter().filter(|n| !n.is_completed).count()
}
