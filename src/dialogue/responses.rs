//! Canned reply tables. Deterministic lookups except for the filler pool.

use rand::Rng;

use crate::dialogue::Topic;

/// Everything the tutor can say about one topic.
pub struct TopicScript {
    /// Reply to a fresh classification.
    pub introduction: &'static str,
    pub suggestions: &'static [&'static str],
    /// Ordered sub-keyword table consulted in follow-up mode; first hit wins.
    pub follow_ups: &'static [(&'static [&'static str], &'static str)],
    /// Shown when a follow-up names no known sub-keyword.
    pub menu: &'static str,
    pub closing: &'static str,
    pub quiz_intro: &'static str,
}

const CARDIOVASCULAR: TopicScript = TopicScript {
    introduction: "The cardiovascular block covers cardiac anatomy, the conduction system and \
        circulation. What would you like to dig into: valves, chambers, conduction or circulation?",
    suggestions: &["Heart valves", "Cardiac chambers", "Conduction system", "Circulation"],
    follow_ups: &[
        (
            &["valve"],
            "The heart has four valves. The tricuspid and mitral (AV) valves sit between atria and \
             ventricles; the pulmonary and aortic (semilunar) valves guard the outflow tracts. \
             They close passively when pressure reverses, which produces the S1 and S2 sounds.",
        ),
        (
            &["chamber", "atri", "ventric"],
            "Two atria receive blood and two ventricles pump it out. The left ventricle works \
             against systemic pressure, so its wall is about three times thicker than the right.",
        ),
        (
            &["conduction", "node", "ecg", "rhythm"],
            "Impulses start in the SA node, pause at the AV node, then travel down the bundle of \
             His and Purkinje fibres. On an ECG the P wave is atrial depolarisation and the QRS \
             complex is ventricular depolarisation.",
        ),
        (
            &["circulation", "blood flow", "pulmonary", "systemic"],
            "Pulmonary circulation takes deoxygenated blood from the right ventricle to the lungs; \
             systemic circulation carries oxygenated blood from the left ventricle to the body.",
        ),
    ],
    menu: "I can go deeper into valves, chambers, the conduction system or circulation. \
        Which one?",
    closing: "No problem. Good luck with your cardiovascular revision!",
    quiz_intro: "Let's test your cardiovascular knowledge! Here comes a question...",
};

const PATHOLOGY: TopicScript = TopicScript {
    introduction: "Pathology this term focuses on cell injury, inflammation, neoplasia and \
        interpreting lab results. Which area should we look at?",
    suggestions: &["Inflammation", "Neoplasia", "Cell injury", "Lab values"],
    follow_ups: &[
        (
            &["inflam"],
            "Acute inflammation is neutrophil-driven and shows redness, heat, swelling, pain and \
             loss of function. Chronic inflammation brings in macrophages, lymphocytes and \
             fibrosis.",
        ),
        (
            &["neoplas", "tumor", "tumour", "cancer"],
            "Neoplasia is uncontrolled, autonomous cell growth. Benign tumours stay local and \
             well differentiated; malignant ones invade and metastasise.",
        ),
        (
            &["necrosis", "injury", "cell death", "apoptosis"],
            "Reversible injury shows cell swelling. Once membranes fail it becomes necrosis, \
             which is inflammatory, unlike apoptosis, which is programmed and tidy.",
        ),
        (
            &["lab", "result", "value", "marker"],
            "When reading lab results, compare against the reference range and look at trends. \
             Troponin for myocardial injury and CRP for inflammation are the classics.",
        ),
    ],
    menu: "We can cover inflammation, neoplasia, cell injury or lab values. Pick one!",
    closing: "Alright! Come back any time you want to go over pathology.",
    quiz_intro: "Pathology quiz time! Here comes a question...",
};

const PHARMACOLOGY: TopicScript = TopicScript {
    introduction: "Pharmacology covers pharmacokinetics, pharmacodynamics, adverse effects and \
        drug interactions. Where shall we start?",
    suggestions: &[
        "Pharmacokinetics",
        "Pharmacodynamics",
        "Side effects",
        "Drug interactions",
    ],
    follow_ups: &[
        (
            &["kinetic", "absorption", "half-life", "half life", "metabolism"],
            "Pharmacokinetics is what the body does to the drug: absorption, distribution, \
             metabolism and excretion. Half-life tells you how long it takes plasma \
             concentration to halve.",
        ),
        (
            &["dynamic", "receptor", "agonist", "antagonist"],
            "Pharmacodynamics is what the drug does to the body. Agonists activate receptors, \
             antagonists block them, and potency differs from efficacy.",
        ),
        (
            &["side effect", "adverse", "toxic"],
            "Adverse drug reactions are either dose-related (type A, predictable) or bizarre \
             (type B, idiosyncratic such as anaphylaxis).",
        ),
        (
            &["interaction"],
            "Many interactions run through CYP450 enzymes: inducers lower levels of other drugs, \
             inhibitors raise them. Warfarin is the textbook victim.",
        ),
    ],
    menu: "Ask me about pharmacokinetics, pharmacodynamics, side effects or interactions.",
    closing: "Sure thing. Happy studying, and remember to check those dosages!",
    quiz_intro: "Let's see how well you know your drugs! Here comes a pharmacology question...",
};

const ETHICS: TopicScript = TopicScript {
    introduction: "Medical ethics is built on autonomy, beneficence, non-maleficence and \
        justice, plus consent and confidentiality. What would you like to explore?",
    suggestions: &["Informed consent", "Confidentiality", "Autonomy", "Four principles"],
    follow_ups: &[
        (
            &["consent"],
            "Valid consent must be informed, voluntary and given by someone with capacity. It \
             can be withdrawn at any time.",
        ),
        (
            &["confidential", "privacy", "disclos"],
            "Confidentiality can only be broken with consent, when required by law, or when \
             there is a serious risk to others.",
        ),
        (
            &["autonomy", "capacity", "refus"],
            "A competent adult may refuse treatment even if the decision seems unwise. Capacity \
             is decision-specific and assumed unless shown otherwise.",
        ),
        (
            &["principle", "beneficence", "justice", "maleficence"],
            "The four principles are autonomy, beneficence (do good), non-maleficence (avoid \
             harm) and justice (fair distribution).",
        ),
    ],
    menu: "We can discuss consent, confidentiality, autonomy or the four principles.",
    closing: "Okay! Ethics comes up in every OSCE, so it's worth revisiting.",
    quiz_intro: "Ethics quiz! Here comes a question...",
};

const SCHEDULE: TopicScript = TopicScript {
    introduction: "Today you have Cardiology lecture at 9:00, Pathology lab at 13:00 and a \
        Pharmacology seminar at 15:30. Want details on any of them?",
    suggestions: &["Morning lecture", "Afternoon lab", "Tomorrow", "Exams"],
    follow_ups: &[
        (
            &["morning", "lecture", "cardio"],
            "The 9:00 Cardiology lecture is in Hall B and covers heart failure. Slides are \
             posted in the course page.",
        ),
        (
            &["afternoon", "lab", "practical"],
            "The 13:00 Pathology lab runs in Lab 2 for two hours. Bring your lab coat and \
             logbook.",
        ),
        (
            &["seminar", "pharma"],
            "The 15:30 Pharmacology seminar is small-group; read the case on anticoagulants first.",
        ),
        (
            &["tomorrow"],
            "Tomorrow is lighter: an Ethics tutorial at 10:00 and self-study in the afternoon.",
        ),
        (
            &["exam", "test"],
            "The next block exam is in three weeks. The calendar tab lists every assessment date.",
        ),
    ],
    menu: "I can tell you about the morning lecture, the afternoon lab, the seminar, \
        tomorrow's plan or exams.",
    closing: "You're all set then. Have a productive day!",
    quiz_intro: "Let's warm up with a general question...",
};

const DEADLINES: TopicScript = TopicScript {
    introduction: "You have a Pathology case report due Friday and a Pharmacology problem set \
        due next Wednesday. Need help with either?",
    suggestions: &["Case report", "Problem set", "Extensions", "How to submit"],
    follow_ups: &[
        (
            &["case report", "patholog"],
            "The Pathology case report is due Friday at 23:59. It should be 1500 words with at \
             least five references.",
        ),
        (
            &["problem set", "pharma"],
            "The Pharmacology problem set is due next Wednesday at noon and has twelve questions \
             on dosing calculations.",
        ),
        (
            &["late", "extension", "extend"],
            "Extensions go through the course coordinator before the deadline. Late work loses \
             5% per day.",
        ),
        (
            &["submit", "upload", "turn in"],
            "Submit through the assignment page of the course. You'll get a confirmation email \
             once it's received.",
        ),
    ],
    menu: "I can help with the case report, the problem set, extensions or submitting work.",
    closing: "Great, good luck with your submissions!",
    quiz_intro: "Let's warm up with a general question...",
};

const GENERAL: TopicScript = TopicScript {
    introduction: "I can help with cardiovascular, pathology, pharmacology and ethics topics, \
        your schedule and your deadlines. I can also quiz you!",
    suggestions: &["Cardiovascular", "Pathology", "Pharmacology", "Ethics", "Quiz me"],
    follow_ups: &[],
    menu: "Try asking about a subject, your schedule, your deadlines, or say \"quiz me\".",
    closing: "Okay! I'm here whenever you need me.",
    quiz_intro: "Here comes a question...",
};

const FILLERS: &[&str] = &[
    "I'm not sure I follow. Could you ask about a subject, your schedule or your deadlines?",
    "Interesting! Could you rephrase that? I know about cardiovascular, pathology, \
     pharmacology and ethics.",
    "I didn't quite catch that. You can also say \"quiz me\" to practise.",
    "Hmm, I don't have an answer for that yet. Want to talk about your schedule or deadlines?",
];

pub const QUIZ_STOPPED: &str = "Quiz stopped. Nice work! Ask me anything else whenever you like.";
pub const NO_QUIZ_RUNNING: &str =
    "There's no quiz running right now. Say \"quiz me\" if you'd like one.";

pub fn script(topic: Topic) -> &'static TopicScript {
    match topic {
        Topic::Cardiovascular => &CARDIOVASCULAR,
        Topic::Pathology => &PATHOLOGY,
        Topic::Pharmacology => &PHARMACOLOGY,
        Topic::Ethics => &ETHICS,
        Topic::Schedule => &SCHEDULE,
        Topic::Deadlines => &DEADLINES,
        Topic::None => &GENERAL,
    }
}

/// Which line of a topic's script to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseMode {
    Introduce,
    FollowUp,
    Closing,
    QuizIntro,
}

/// Paragraph for the first sub-keyword of `topic` that appears in `input`.
pub fn follow_up_answer(topic: Topic, input: &str) -> Option<&'static str> {
    let text = input.to_lowercase();
    script(topic)
        .follow_ups
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|keyword| text.contains(keyword)))
        .map(|(_, answer)| *answer)
}

pub fn respond(topic: Topic, input: &str, mode: ResponseMode) -> &'static str {
    let script = script(topic);
    match mode {
        ResponseMode::Introduce => script.introduction,
        ResponseMode::FollowUp => follow_up_answer(topic, input).unwrap_or(script.menu),
        ResponseMode::Closing => script.closing,
        ResponseMode::QuizIntro => script.quiz_intro,
    }
}

pub fn suggestions(topic: Topic) -> Vec<String> {
    script(topic)
        .suggestions
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// One of the generic prompts for input nothing else understood.
pub fn filler<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    FILLERS[rng.gen_range(0..FILLERS.len())]
}

pub fn graded(correct: bool, expected: &str) -> String {
    if correct {
        "Correct! Well done. Get ready for the next one...".to_string()
    } else {
        format!("Not quite. The answer is: {expected}. Let's try another one...")
    }
}

pub fn question_line(question: &str) -> String {
    format!("Question: {question}")
}
