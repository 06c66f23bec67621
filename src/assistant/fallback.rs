//! Offline answers for the course assistant, used once the completion service is given up on.

use rand::Rng;

struct Bucket {
    keywords: &'static [&'static str],
    replies: &'static [&'static str],
}

// First bucket with a matching keyword wins.
const BUCKETS: &[Bucket] = &[
    Bucket {
        keywords: &["hello", "hi", "hey", "good morning", "good afternoon"],
        replies: &[
            "Hi there! How can I help with your courses today?",
            "Hello! Ask me about your courses, grades, assignments or schedule.",
        ],
    },
    Bucket {
        keywords: &["assignment", "homework", "deadline", "due", "submit"],
        replies: &[
            "Your upcoming assignments and their due dates are listed on the Assessments page.",
            "Assignments are submitted from the course page. Check the due date shown next to each one.",
            "If you need an extension, contact your course coordinator before the deadline.",
        ],
    },
    Bucket {
        keywords: &["grade", "grades", "score", "mark", "marks", "gpa", "result"],
        replies: &[
            "Your grades appear in the Grades tab of each course once they're released.",
            "Marks are usually published within two weeks of the submission deadline.",
        ],
    },
    Bucket {
        keywords: &["schedule", "calendar", "timetable", "today", "tomorrow", "class"],
        replies: &[
            "Your full timetable is on the Calendar page, including lectures and labs.",
            "Check the Calendar for today's classes. Events are colour-coded by course.",
        ],
    },
    Bucket {
        keywords: &["course", "courses", "module", "enrol", "enroll", "syllabus"],
        replies: &[
            "You can browse all of your enrolled courses from the dashboard.",
            "Each course page has the syllabus, materials and announcements.",
        ],
    },
    Bucket {
        keywords: &["help", "how do i", "support"],
        replies: &[
            "I can help with courses, grades, assignments and your schedule. What do you need?",
            "For account problems, the help desk link is at the bottom of every page.",
        ],
    },
    Bucket {
        keywords: &["thanks", "thank", "bye"],
        replies: &["You're welcome! Good luck with your studies.", "Happy to help!"],
    },
];

const DEFAULT_REPLIES: &[&str] = &[
    "I'm not sure about that one. Could you ask about your courses, grades, assignments or schedule?",
    "Good question! I can best help with course information, grades, deadlines and your timetable.",
    "I don't have an answer for that right now. Your instructor or the help desk may know more.",
];

/// Answers from local keyword buckets. Single words match whole words only; phrases
/// containing a space match anywhere in the text.
pub fn respond<R: Rng + ?Sized>(input: &str, rng: &mut R) -> &'static str {
    let replies = bucket_for(input).unwrap_or(DEFAULT_REPLIES);
    replies[rng.gen_range(0..replies.len())]
}

fn bucket_for(input: &str) -> Option<&'static [&'static str]> {
    let text = input.to_lowercase();
    let words: Vec<&str> = text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .collect();

    BUCKETS
        .iter()
        .find(|bucket| {
            bucket.keywords.iter().any(|keyword| {
                if keyword.contains(' ') {
                    text.contains(keyword)
                } else {
                    words.contains(keyword)
                }
            })
        })
        .map(|bucket| bucket.replies)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn picks_the_matching_bucket() {
        let mut rng = StdRng::seed_from_u64(0);
        let reply = respond("When is my assignment due?", &mut rng);
        assert!(BUCKETS[1].replies.contains(&reply));
    }

    #[test]
    fn short_keywords_need_a_whole_word() {
        // "this" must not count as a greeting
        assert_eq!(bucket_for("what is this"), None);
        assert_eq!(bucket_for("Hi!"), Some(BUCKETS[0].replies));
    }

    #[test]
    fn phrases_match_across_words() {
        assert_eq!(bucket_for("how do i reset my password"), Some(BUCKETS[5].replies));
    }

    #[test]
    fn unknown_input_uses_the_default_pool() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..20 {
            assert!(DEFAULT_REPLIES.contains(&respond("quantum entanglement", &mut rng)));
        }
    }
}
