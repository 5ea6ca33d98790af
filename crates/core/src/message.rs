//! Turn and Transcript domain types.
//!
//! These are the value objects at the heart of a chat session: the user
//! submits text → a user turn is appended → the completion backend replies
//! (or fails) → an assistant turn is appended. The transcript is strictly
//! chronological and append-only; the only other mutation is a wholesale
//! clear.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Who authored a transcript turn.
///
/// `System` never appears in a transcript — it exists only on the wire
/// request sent to the completion API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The end user
    User,
    /// The AI companion
    Assistant,
    /// System instructions (persona blob) — wire-only
    System,
}

/// A single turn in a session transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    /// Unique turn ID
    pub id: String,

    /// Who authored this turn
    pub role: Role,

    /// The text content
    pub content: String,

    /// Timestamp
    pub timestamp: DateTime<Utc>,
}

impl Turn {
    /// Create a new user turn.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role: Role::User,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    /// Create a new assistant turn.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role: Role::Assistant,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

/// An ordered, append-only sequence of turns for one session.
///
/// Lifetime equals the session lifetime; there is no cross-session
/// persistence. Clearing is wholesale (explicit user action or persona
/// switch, depending on configuration).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    /// Ordered turns
    pub turns: Vec<Turn>,

    /// When this transcript was created
    pub created_at: DateTime<Utc>,

    /// When the last turn was appended
    pub updated_at: DateTime<Utc>,
}

impl Transcript {
    /// Create a new empty transcript.
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            turns: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Append a turn. Ordering is insertion order; nothing is ever
    /// reordered or deduplicated.
    pub fn push(&mut self, turn: Turn) {
        self.updated_at = Utc::now();
        self.turns.push(turn);
    }

    /// Wholesale reset.
    pub fn clear(&mut self) {
        self.updated_at = Utc::now();
        self.turns.clear();
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Turn> {
        self.turns.iter()
    }

    /// Render the transcript as a flat text document with alternating
    /// `USER:` / `AI:` labeled lines, one blank line between turns.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        for turn in &self.turns {
            let label = match turn.role {
                Role::User => "USER:",
                Role::Assistant | Role::System => "AI:",
            };
            out.push_str(label);
            out.push(' ');
            out.push_str(&turn.content);
            out.push_str("\n\n");
        }
        out
    }
}

impl Default for Transcript {
    fn default() -> Self {
        Self::new()
    }
}
