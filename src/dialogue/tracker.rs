//! Turn dispatcher. Picks one of three branches from the session flags and runs it.

use log::debug;
use rand::Rng;

use crate::dialogue::classifier::{self, Intent};
use crate::dialogue::responses::{self, ResponseMode};
use crate::dialogue::{SessionContext, Topic};
use crate::quiz::{self, bank};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Branch {
    QuizAnswer,
    FollowUp,
    FreshClassification,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyKind {
    TopicIntroduced(Topic),
    Unclassified,
    FollowUp(Topic),
    FollowUpClosed(Topic),
    QuizStarted(Topic),
    QuizGraded { correct: bool },
    QuizStopped,
    NoQuizRunning,
}

/// Result of one user turn.
#[derive(Debug, Clone)]
pub struct Turn {
    pub context: SessionContext,
    pub reply: String,
    pub kind: ReplyKind,
    /// A new quiz question should be asked once the reply has been shown.
    pub next_question: bool,
}

impl Turn {
    fn new(context: SessionContext, reply: impl Into<String>, kind: ReplyKind) -> Self {
        Self {
            context,
            reply: reply.into(),
            kind,
            next_question: false,
        }
    }

    fn with_next_question(mut self) -> Self {
        self.next_question = true;
        self
    }
}

/// Quiz answers are checked first, then follow-ups. Follow-ups never run while a quiz
/// is on, and a quiz request or exit always goes through classification.
pub fn select_branch(context: &SessionContext, input: &str) -> Branch {
    if context.quiz_mode {
        return if context.pending_quiz.is_some() {
            Branch::QuizAnswer
        } else {
            Branch::FreshClassification
        };
    }
    match classifier::classify(input) {
        Intent::QuizRequest(_) | Intent::QuizExit => Branch::FreshClassification,
        _ if context.follow_up_mode && context.last_topic != Topic::None => Branch::FollowUp,
        _ => Branch::FreshClassification,
    }
}

pub fn next_turn<R: Rng + ?Sized>(context: &SessionContext, input: &str, rng: &mut R) -> Turn {
    let branch = select_branch(context, input);
    debug!(
        "Dispatching turn via {:?} (topic: {}, quiz: {})",
        branch, context.last_topic, context.quiz_mode
    );
    match branch {
        Branch::QuizAnswer => check_answer(context, input),
        Branch::FollowUp => follow_up(context, input, rng),
        Branch::FreshClassification => fresh(context, input, rng),
    }
}

/// Draws the next question for a running quiz. Returns `None` when no quiz is active.
pub fn ask_question<R: Rng + ?Sized>(
    context: &SessionContext,
    rng: &mut R,
) -> Option<(SessionContext, String)> {
    if !context.quiz_mode {
        return None;
    }
    let item = bank::random_question(context.last_topic, rng);
    let line = responses::question_line(&item.question);
    let mut next = context.clone();
    next.pending_quiz = Some(item);
    Some((next, line))
}

fn check_answer(context: &SessionContext, input: &str) -> Turn {
    if classifier::classify(input) == Intent::QuizExit {
        return stop_quiz(context);
    }

    let mut next = context.clone();
    let Some(item) = next.pending_quiz.take() else {
        return stop_quiz(context);
    };
    let correct = quiz::grade(input, &item.answer);
    debug!("Graded answer for {:?}: correct = {}", item.question, correct);

    Turn::new(
        next,
        responses::graded(correct, &item.answer),
        ReplyKind::QuizGraded { correct },
    )
    .with_next_question()
}

fn follow_up<R: Rng + ?Sized>(context: &SessionContext, input: &str, rng: &mut R) -> Turn {
    let topic = context.last_topic;

    if classifier::is_closing(input) {
        let mut next = context.clone();
        next.follow_up_mode = false;
        return Turn::new(
            next,
            responses::respond(topic, input, ResponseMode::Closing),
            ReplyKind::FollowUpClosed(topic),
        );
    }

    if let Some(answer) = responses::follow_up_answer(topic, input) {
        return Turn::new(context.clone(), answer, ReplyKind::FollowUp(topic));
    }

    match classifier::match_topic(input) {
        Some(other) if other != topic => {
            debug!("Switching topic from {} to {}", topic, other);
            fresh(context, input, rng)
        }
        _ => Turn::new(
            context.clone(),
            responses::respond(topic, input, ResponseMode::FollowUp),
            ReplyKind::FollowUp(topic),
        ),
    }
}

fn fresh<R: Rng + ?Sized>(context: &SessionContext, input: &str, rng: &mut R) -> Turn {
    match classifier::classify(input) {
        Intent::QuizExit if context.quiz_mode => stop_quiz(context),
        Intent::QuizExit => Turn::new(
            context.clone(),
            responses::NO_QUIZ_RUNNING,
            ReplyKind::NoQuizRunning,
        ),
        Intent::QuizRequest(topic) => {
            let mut next = enter_topic(context, topic);
            next.follow_up_mode = false;
            next.quiz_mode = true;
            next.pending_quiz = None;
            Turn::new(
                next,
                responses::respond(topic, input, ResponseMode::QuizIntro),
                ReplyKind::QuizStarted(topic),
            )
            .with_next_question()
        }
        Intent::Topic(topic) => Turn::new(
            enter_topic(context, topic),
            responses::respond(topic, input, ResponseMode::Introduce),
            ReplyKind::TopicIntroduced(topic),
        ),
        Intent::Unclassified => Turn::new(
            context.clone(),
            responses::filler(rng),
            ReplyKind::Unclassified,
        ),
    }
}

fn enter_topic(context: &SessionContext, topic: Topic) -> SessionContext {
    let mut next = context.clone();
    next.last_topic = topic;
    next.follow_up_mode = true;
    next.suggested_topics = responses::suggestions(topic);
    next
}

fn stop_quiz(context: &SessionContext) -> Turn {
    let mut next = context.clone();
    next.quiz_mode = false;
    next.follow_up_mode = false;
    next.pending_quiz = None;
    Turn::new(next, responses::QUIZ_STOPPED, ReplyKind::QuizStopped)
}
