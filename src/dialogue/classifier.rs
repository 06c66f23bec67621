use once_cell::sync::Lazy;
use regex::Regex;

use crate::dialogue::Topic;
use crate::quiz::bank::QUIZ_TOPICS;

/// Phrases that turn any message into a quiz request. Plain substring checks.
const QUIZ_TRIGGERS: &[&str] = &["quiz", "test me", "question"];

/// Bank used when a quiz request names no subject.
pub const DEFAULT_QUIZ_TOPIC: Topic = Topic::Cardiovascular;

/// Topic rules in priority order; the first match wins.
static TOPIC_RULES: Lazy<Vec<(Topic, Regex)>> = Lazy::new(|| {
    [
        (
            Topic::Cardiovascular,
            r"\b(cardio\w*|cardiac|heart|anatom\w*|valves?|arter(y|ies)|aorta)\b",
        ),
        (
            Topic::Pathology,
            r"\b(patholog\w*|labs?|biops(y|ies)|histolog\w*|tumou?rs?)\b",
        ),
        (
            Topic::Pharmacology,
            r"\b(pharma\w*|drugs?|medications?|dos(e|es|age|ing))\b",
        ),
        (
            Topic::Ethics,
            r"\b(ethic\w*|consent|confidentiality|autonomy)\b",
        ),
        (
            Topic::Schedule,
            r"\b(schedule|today|timetable|class(es)?|lectures?)\b",
        ),
        (
            Topic::Deadlines,
            r"\b(deadlines?|assignments?|due|homework|submissions?)\b",
        ),
    ]
    .into_iter()
    .map(|(topic, pattern)| (topic, Regex::new(pattern).expect("valid topic pattern")))
    .collect()
});

static QUIZ_EXIT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(stop|end|exit|quit|cancel)\s+(the\s+)?quiz\b|\bno more questions\b")
        .expect("valid quiz exit pattern")
});

// "no" only counts as a sign-off when it opens the message
static CLOSING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\W*(no|nope)\b|\b(thanks|thank)\b").expect("valid closing pattern")
});

/// What a single message asks for, before any session state is considered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    /// Wants to leave a running quiz.
    QuizExit,
    /// Wants a quiz; carries the bank to draw from.
    QuizRequest(Topic),
    Topic(Topic),
    Unclassified,
}

impl Intent {
    pub fn topic(&self) -> Option<Topic> {
        match self {
            Intent::QuizRequest(topic) | Intent::Topic(topic) => Some(*topic),
            Intent::QuizExit | Intent::Unclassified => None,
        }
    }

    pub fn is_quiz_request(&self) -> bool {
        matches!(self, Intent::QuizRequest(_))
    }
}

/// Classifies free text. Never fails: anything unknown is [`Intent::Unclassified`].
pub fn classify(input: &str) -> Intent {
    let text = input.to_lowercase();

    if QUIZ_EXIT.is_match(&text) {
        return Intent::QuizExit;
    }

    if QUIZ_TRIGGERS.iter().any(|trigger| text.contains(trigger)) {
        let topic = QUIZ_TOPICS
            .iter()
            .copied()
            .find(|topic| rule_matches(*topic, &text))
            .unwrap_or(DEFAULT_QUIZ_TOPIC);
        return Intent::QuizRequest(topic);
    }

    match match_topic(&text) {
        Some(topic) => Intent::Topic(topic),
        None => Intent::Unclassified,
    }
}

/// First topic whose keywords appear in `text`, following rule priority.
pub fn match_topic(text: &str) -> Option<Topic> {
    let text = text.to_lowercase();
    TOPIC_RULES
        .iter()
        .find(|(_, pattern)| pattern.is_match(&text))
        .map(|(topic, _)| *topic)
}

/// True for a leading "no"/"nope", or "thanks"/"thank you" anywhere.
pub fn is_closing(input: &str) -> bool {
    CLOSING.is_match(&input.to_lowercase())
}

fn rule_matches(topic: Topic, text: &str) -> bool {
    TOPIC_RULES
        .iter()
        .any(|(rule_topic, pattern)| *rule_topic == topic && pattern.is_match(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognises_each_topic() {
        let cases = [
            ("Tell me about the heart", Topic::Cardiovascular),
            ("I'm revising anatomy", Topic::Cardiovascular),
            ("what's in the pathology module?", Topic::Pathology),
            ("Where do I see my lab results", Topic::Pathology),
            ("pharmacology is hard", Topic::Pharmacology),
            ("How does this drug work", Topic::Pharmacology),
            ("medical ethics", Topic::Ethics),
            ("What's on today?", Topic::Schedule),
            ("show my schedule", Topic::Schedule),
            ("When is the next deadline", Topic::Deadlines),
            ("I have an assignment", Topic::Deadlines),
        ];
        for (input, expected) in cases {
            assert_eq!(classify(input), Intent::Topic(expected), "{input}");
        }
    }

    #[test]
    fn earlier_rules_take_priority() {
        assert_eq!(
            classify("heart drugs today"),
            Intent::Topic(Topic::Cardiovascular)
        );
        assert_eq!(
            classify("assignment on ethics"),
            Intent::Topic(Topic::Ethics)
        );
    }

    #[test]
    fn keywords_match_whole_words_only() {
        assert_eq!(classify("Where is the syllabus?"), Intent::Unclassified);
        assert_eq!(classify("I feel overdue"), Intent::Unclassified);
    }

    #[test]
    fn quiz_triggers_pick_a_bank() {
        assert_eq!(
            classify("Can you quiz me on pharmacology?"),
            Intent::QuizRequest(Topic::Pharmacology)
        );
        assert_eq!(
            classify("test me on ethics"),
            Intent::QuizRequest(Topic::Ethics)
        );
        assert_eq!(
            classify("ask me a question about pathology"),
            Intent::QuizRequest(Topic::Pathology)
        );
    }

    #[test]
    fn quiz_without_a_subject_defaults_to_cardiovascular() {
        assert_eq!(
            classify("quiz me"),
            Intent::QuizRequest(Topic::Cardiovascular)
        );
        assert_eq!(
            classify("quiz me on my schedule"),
            Intent::QuizRequest(Topic::Cardiovascular)
        );
    }

    #[test]
    fn quiz_trigger_beats_topic_rules() {
        assert!(classify("I have a question about deadlines").is_quiz_request());
    }

    #[test]
    fn exit_phrases_are_not_quiz_requests() {
        for input in ["stop quiz", "Please end the quiz", "no more questions"] {
            assert_eq!(classify(input), Intent::QuizExit, "{input}");
        }
    }

    #[test]
    fn unknown_text_is_unclassified() {
        assert_eq!(classify("hello there"), Intent::Unclassified);
        assert_eq!(classify("hello there").topic(), None);
    }

    #[test]
    fn closing_words() {
        assert!(is_closing("no thanks"));
        assert!(is_closing("Thank you!"));
        assert!(!is_closing("I don't know"));
        assert!(!is_closing("tell me about the SA node"));
    }

    #[test]
    fn no_in_the_middle_of_a_question_is_not_a_sign_off() {
        assert!(!is_closing("is there no lab this afternoon?"));
        assert!(is_closing("No, that's all"));
        assert!(is_closing("ok thanks"));
    }
}
