use std::time::Duration;

use log::debug;
use rand::Rng;

use crate::dialogue::tracker::{self, ReplyKind};
use crate::dialogue::{Sender, SessionContext, Transcript};
use crate::settings::TimingSettings;

/// A bot line produced by a turn but not shown yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingReply {
    generation: u64,
    pub text: String,
}

/// A quiz question to be drawn once the quiz delay has passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledQuestion {
    generation: u64,
}

#[derive(Debug, Clone)]
pub struct Submission {
    pub reply: PendingReply,
    pub kind: ReplyKind,
    pub next_question: Option<ScheduledQuestion>,
}

/// One open tutor widget: its context, its transcript, and a generation counter.
///
/// Delayed output is stamped with the generation it was produced under. After a
/// [`reset`](TutorSession::reset) those stamps no longer match and the output is dropped.
#[derive(Debug, Clone, Default)]
pub struct TutorSession {
    context: SessionContext,
    transcript: Transcript,
    generation: u64,
}

impl TutorSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn context(&self) -> &SessionContext {
        &self.context
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Runs one user turn. Blank input is ignored and yields `None`.
    pub fn submit<R: Rng + ?Sized>(&mut self, input: &str, rng: &mut R) -> Option<Submission> {
        let input = input.trim();
        if input.is_empty() {
            return None;
        }

        self.transcript.push(Sender::User, input);
        let turn = tracker::next_turn(&self.context, input, rng);
        self.context = turn.context;

        let next_question = turn.next_question.then_some(ScheduledQuestion {
            generation: self.generation,
        });
        Some(Submission {
            reply: PendingReply {
                generation: self.generation,
                text: turn.reply,
            },
            kind: turn.kind,
            next_question,
        })
    }

    /// Appends a pending reply to the transcript unless the session was reset since.
    pub fn deliver(&mut self, reply: PendingReply) -> Option<String> {
        if reply.generation != self.generation {
            debug!("Dropping reply from an earlier session");
            return None;
        }
        self.transcript.push(Sender::Bot, reply.text.clone());
        Some(reply.text)
    }

    /// Draws the scheduled quiz question and appends it, if the quiz is still on.
    pub fn ask_scheduled<R: Rng + ?Sized>(
        &mut self,
        scheduled: ScheduledQuestion,
        rng: &mut R,
    ) -> Option<String> {
        if scheduled.generation != self.generation {
            debug!("Dropping quiz question from an earlier session");
            return None;
        }
        let (context, line) = tracker::ask_question(&self.context, rng)?;
        self.context = context;
        self.transcript.push(Sender::Bot, line.clone());
        Some(line)
    }

    /// Starts over as if the widget had been freshly opened.
    pub fn reset(&mut self) {
        self.generation += 1;
        self.context = SessionContext::default();
        self.transcript = Transcript::default();
    }
}

/// Random pause that imitates someone typing.
pub fn typing_delay<R: Rng + ?Sized>(timing: &TimingSettings, rng: &mut R) -> Duration {
    let min = timing.typing_delay_min.as_millis() as u64;
    let max = timing.typing_delay_max.as_millis() as u64;
    Duration::from_millis(rng.gen_range(min..=max))
}
