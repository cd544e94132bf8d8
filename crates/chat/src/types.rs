//! Conversation domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::formatter::DetailSection;

/// One user turn as it arrives. Immutable after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Utterance {
    /// Session this utterance belongs to
    pub session_id: String,

    /// Raw question text
    pub text: String,

    /// Arrival timestamp
    pub received_at: DateTime<Utc>,
}

impl Utterance {
    pub fn new(session_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            text: text.into(),
            received_at: Utc::now(),
        }
    }
}

/// Reference to one passage used in an answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PassageRef {
    /// Source document id
    pub document_id: String,

    /// Similarity score at retrieval time
    pub score: f32,
}

/// Audit reference to the context an answer was grounded in.
///
/// A reference, not a copy: passage texts stay in the index, only ids and
/// scores are recorded with the turn.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContextRef {
    /// Passages included in the context block, in inclusion order
    pub passages: Vec<PassageRef>,

    /// Selected property record, if one was pinned
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property_id: Option<String>,

    /// Whether the property text was cut to fit the budget
    #[serde(default)]
    pub property_truncated: bool,

    /// True when retrieval was unavailable and the turn was answered
    /// without document context
    #[serde(default)]
    pub degraded: bool,
}

/// One completed conversation turn. Append-only; never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    /// Session id
    pub session_id: String,

    /// When the question arrived
    pub asked_at: DateTime<Utc>,

    /// The user's question
    pub question: String,

    /// The generated answer, raw (detail markers included)
    pub answer: String,

    /// Context the answer was grounded in
    pub context: ContextRef,
}

/// Ordered turns sharing a session id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationSession {
    pub session_id: String,
    pub turns: Vec<Turn>,
}

impl ConversationSession {
    pub fn empty(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            turns: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// The newest `n` turns, oldest first.
    pub fn recent(&self, n: usize) -> &[Turn] {
        let start = self.turns.len().saturating_sub(n);
        &self.turns[start..]
    }
}

/// The display-facing result of one pipeline turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatAnswer {
    /// Primary answer text
    pub main: String,

    /// Labeled supplementary sections
    pub details: Vec<DetailSection>,

    /// Context reference recorded with the turn
    pub context: ContextRef,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn turn(session_id: &str, question: &str) -> Turn {
        Turn {
            session_id: session_id.to_string(),
            asked_at: Utc::now(),
            question: question.to_string(),
            answer: "answer".to_string(),
            context: ContextRef::default(),
        }
    }

    #[test]
    fn test_recent_returns_newest_oldest_first() {
        let mut session = ConversationSession::empty("s");
        session.turns.push(turn("s", "q1"));
        session.turns.push(turn("s", "q2"));
        session.turns.push(turn("s", "q3"));

        let recent = session.recent(2);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].question, "q2");
        assert_eq!(recent[1].question, "q3");
    }

    #[test]
    fn test_recent_with_short_history() {
        let mut session = ConversationSession::empty("s");
        session.turns.push(turn("s", "q1"));
        assert_eq!(session.recent(10).len(), 1);
    }

    #[test]
    fn test_turn_roundtrip() {
        let t = turn("s", "近くの公園は？");
        let json = serde_json::to_string(&t).unwrap();
        let parsed: Turn = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.question, "近くの公園は？");
        assert_eq!(parsed.session_id, "s");
    }
}
