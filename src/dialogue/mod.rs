//! Rule-based study tutor: keyword intent matching, topic follow-ups and quizzes.
//!
//! Everything in here is synchronous and host-agnostic. A turn takes the current
//! [`SessionContext`] plus the user's text and yields the next context and a reply;
//! delays and delivery belong to whoever hosts the [`session::TutorSession`].

pub mod classifier;
pub mod responses;
pub mod session;
pub mod tracker;

use std::fmt;

use crate::quiz::QuizItem;

/// Subject-matter bucket that decides which canned table answers a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Topic {
    Cardiovascular,
    Pathology,
    Pharmacology,
    Ethics,
    Schedule,
    Deadlines,
    #[default]
    None,
}

impl Topic {
    pub const ALL: [Topic; 7] = [
        Topic::Cardiovascular,
        Topic::Pathology,
        Topic::Pharmacology,
        Topic::Ethics,
        Topic::Schedule,
        Topic::Deadlines,
        Topic::None,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Topic::Cardiovascular => "cardiovascular",
            Topic::Pathology => "pathology",
            Topic::Pharmacology => "pharmacology",
            Topic::Ethics => "ethics",
            Topic::Schedule => "schedule",
            Topic::Deadlines => "deadlines",
            Topic::None => "none",
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-widget conversational state. Starts empty and is replaced wholesale every turn.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionContext {
    pub last_topic: Topic,
    pub follow_up_mode: bool,
    pub quiz_mode: bool,
    /// Question waiting for an answer. `None` while the next one is being prepared.
    pub pending_quiz: Option<QuizItem>,
    /// Hints surfaced to the user, never read back by the engine.
    pub suggested_topics: Vec<String>,
}

impl SessionContext {
    pub fn quiz_question(&self) -> Option<&str> {
        self.pending_quiz.as_ref().map(|item| item.question.as_str())
    }

    pub fn quiz_answer(&self) -> Option<&str> {
        self.pending_quiz.as_ref().map(|item| item.answer.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Bot,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptEntry {
    pub sender: Sender,
    pub text: String,
}

/// Append-only chat log rendered by the host.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
}

impl Transcript {
    pub fn push(&mut self, sender: Sender, text: impl Into<String>) {
        self.entries.push(TranscriptEntry {
            sender,
            text: text.into(),
        });
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&TranscriptEntry> {
        self.entries.last()
    }
}
