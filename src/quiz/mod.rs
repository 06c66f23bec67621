pub mod bank;

/// One quiz card: the question shown to the student and the answer it is graded against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizItem {
    pub question: String,
    pub answer: String,
}

impl QuizItem {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }
}

fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Loose answer check: the answers match if either one contains the other
/// after trimming and lower-casing. An empty side never matches.
pub fn grade(user_answer: &str, expected: &str) -> bool {
    let user_answer = normalize(user_answer);
    let expected = normalize(expected);
    if user_answer.is_empty() || expected.is_empty() {
        return false;
    }
    user_answer.contains(&expected) || expected.contains(&user_answer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_answer_embedded_in_a_sentence() {
        assert!(grade("I think it's the mitral valve", "Mitral valve"));
    }

    #[test]
    fn accepts_partial_answer() {
        assert!(grade("  ACE  ", "ACE inhibitors"));
    }

    #[test]
    fn rejects_unrelated_answer() {
        assert!(!grade("tricuspid", "Mitral valve"));
    }

    #[test]
    fn grading_is_symmetric() {
        let pairs = [
            ("mitral valve", "Mitral"),
            ("aorta", "pulmonary artery"),
            ("Beneficence", "the principle of beneficence"),
            ("", "anything"),
        ];
        for (a, b) in pairs {
            assert_eq!(grade(a, b), grade(b, a), "{a:?} vs {b:?}");
        }
    }

    #[test]
    fn any_non_empty_answer_matches_itself() {
        for x in ["a", "Sinoatrial node", "  Warfarin "] {
            assert!(grade(x, x));
        }
    }

    #[test]
    fn blank_answers_never_match() {
        assert!(!grade("   ", "Mitral valve"));
        assert!(!grade("", ""));
    }
}
