use rand::Rng;

use crate::dialogue::Topic;
use crate::quiz::QuizItem;

const CARDIOVASCULAR: &[(&str, &str)] = &[
    (
        "Which valve separates the left atrium from the left ventricle?",
        "Mitral valve",
    ),
    (
        "Which structure is the natural pacemaker of the heart?",
        "Sinoatrial node",
    ),
    (
        "Which vessel carries deoxygenated blood from the right ventricle to the lungs?",
        "Pulmonary artery",
    ),
    (
        "Which chamber of the heart has the thickest muscular wall?",
        "Left ventricle",
    ),
    (
        "Which coronary artery is most often called the 'widow maker' when occluded?",
        "Left anterior descending",
    ),
];

const PATHOLOGY: &[(&str, &str)] = &[
    (
        "What type of necrosis is typical of a myocardial infarction?",
        "Coagulative necrosis",
    ),
    (
        "Which cell is the hallmark of acute inflammation?",
        "Neutrophil",
    ),
    (
        "What is the term for a benign tumour of glandular epithelium?",
        "Adenoma",
    ),
    (
        "Which lab marker is most specific for myocardial injury?",
        "Troponin",
    ),
];

const PHARMACOLOGY: &[(&str, &str)] = &[
    (
        "Which drug class ends in '-pril' and blocks conversion of angiotensin I?",
        "ACE inhibitors",
    ),
    (
        "What is the antidote for a heparin overdose?",
        "Protamine sulfate",
    ),
    (
        "Which vitamin reverses the effect of warfarin?",
        "Vitamin K",
    ),
    (
        "What do we call the time it takes for plasma concentration of a drug to fall by half?",
        "Half-life",
    ),
    (
        "Which receptor do beta blockers such as metoprolol mainly target?",
        "Beta-1",
    ),
];

const ETHICS: &[(&str, &str)] = &[
    (
        "Which principle describes a patient's right to make their own decisions?",
        "Autonomy",
    ),
    (
        "Which principle obliges a clinician to act in the patient's best interest?",
        "Beneficence",
    ),
    (
        "Which principle is summarised as 'first, do no harm'?",
        "Non-maleficence",
    ),
    (
        "What must a patient give before a procedure, after being told its risks and benefits?",
        "Informed consent",
    ),
];

const DEFAULT: &[(&str, &str)] = &[
    (
        "What is the normal resting heart rate range for an adult, in beats per minute?",
        "60-100",
    ),
    (
        "Which organ produces insulin?",
        "Pancreas",
    ),
    (
        "What is the largest organ of the human body?",
        "Skin",
    ),
];

/// The question list drawn from for `topic`. Topics without their own bank use the default list.
pub fn questions_for(topic: Topic) -> &'static [(&'static str, &'static str)] {
    match topic {
        Topic::Cardiovascular => CARDIOVASCULAR,
        Topic::Pathology => PATHOLOGY,
        Topic::Pharmacology => PHARMACOLOGY,
        Topic::Ethics => ETHICS,
        Topic::Schedule | Topic::Deadlines | Topic::None => DEFAULT,
    }
}

/// Topics that own a question bank, in the order a quiz request is matched against them.
pub const QUIZ_TOPICS: [Topic; 4] = [
    Topic::Cardiovascular,
    Topic::Pathology,
    Topic::Pharmacology,
    Topic::Ethics,
];

/// Picks any question for `topic`. Repeats are allowed.
pub fn random_question<R: Rng + ?Sized>(topic: Topic, rng: &mut R) -> QuizItem {
    let questions = questions_for(topic);
    let index = rng.gen_range(0..questions.len());
    let (question, answer) = questions[index];
    QuizItem::new(question, answer)
}
