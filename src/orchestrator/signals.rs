//! Utterance signals: small phrase and shape heuristics.
//!
//! Phrases match on word boundaries after normalisation (lowercase,
//! apostrophes dropped, punctuation turned into spaces), so `"Let's
//! continue!"` matches `lets continue` but `"nextdoor"` does not match `next`.

use std::sync::LazyLock;

use regex::Regex;

/// Tokens an ideation answer needs before it is committed without asking.
pub const MIN_IDEATION_TOKENS: usize = 3;

/// Tokens unstructured journey or deliverable text needs to count as content.
pub const MIN_CONTENT_TOKENS: usize = 5;

/// Longest utterance still read as a bare "go on" rather than an answer.
pub const MAX_SIGNAL_TOKENS: usize = 6;

pub const PROGRESS_SIGNALS: &[&str] = &[
    "lets continue",
    "continue",
    "next step",
    "next",
    "move on",
    "moving on",
    "keep going",
    "go ahead",
    "go on",
    "proceed",
    "whats next",
    "lets go",
    "done",
];

pub const CONFUSION_SIGNALS: &[&str] = &[
    "confused",
    "confusing",
    "dont understand",
    "dont know",
    "not sure",
    "no idea",
    "what do you mean",
    "unclear",
    "im lost",
    "stuck",
    "help",
];

const AFFIRMATIONS: &[&str] = &[
    "yes",
    "yeah",
    "yep",
    "yup",
    "sure",
    "ok",
    "okay",
    "correct",
    "right",
    "sounds good",
    "looks good",
    "that works",
    "perfect",
    "great",
    "confirm",
];

const NEGATIONS: &[&str] = &[
    "no",
    "nope",
    "nah",
    "not quite",
    "not really",
    "wrong",
    "change it",
    "try again",
];

const QUESTION_OPENERS: &[&str] = &[
    "what", "how", "why", "who", "whom", "where", "when", "which", "can", "could", "should",
    "would", "to what", "in what", "in which",
];

/// Which vocabulary a content check uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Domain {
    Journey,
    Deliverables,
}

impl Domain {
    fn keywords(self) -> &'static [&'static str] {
        match self {
            Self::Journey => &[
                "phase", "activit", "research", "explor", "investigat", "discover", "build",
                "creat", "design", "prototyp", "interview", "survey", "field", "lab", "workshop",
                "present", "reflect", "video", "book", "article", "website", "expert", "student",
            ],
            Self::Deliverables => &[
                "milestone", "week", "checkpoint", "due", "rubric", "criteri", "assess", "evidence",
                "audience", "method", "exhibit", "publish", "showcase", "present", "communit",
                "share", "famil", "parent",
            ],
        }
    }
}

/// Lists, numbered lines, `Label: text` lines, or `Week N` markers.
static STRUCTURE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?mi)^\s*(?:\d+[.)]|[-*•+])\s+\S|^[^:\n]{1,60}:\s*\S|\bweek\s*\d+")
        .expect("structure pattern is valid")
});

fn normalize(text: &str) -> String {
    let cleaned: String = text
        .chars()
        .filter(|c| *c != '\'' && *c != '’')
        .map(|c| if c.is_alphanumeric() { c.to_ascii_lowercase() } else { ' ' })
        .collect();
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn contains_phrase(normalized: &str, phrases: &[&str]) -> bool {
    let padded = format!(" {normalized} ");
    phrases
        .iter()
        .any(|phrase| padded.contains(&format!(" {phrase} ")))
}

fn starts_with_phrase(normalized: &str, phrases: &[&str]) -> bool {
    phrases.iter().any(|phrase| {
        normalized == *phrase
            || normalized
                .strip_prefix(phrase)
                .is_some_and(|rest| rest.starts_with(' '))
    })
}

pub fn token_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// "Let's continue", "next step", and the like.
pub fn is_progress_signal(text: &str) -> bool {
    contains_phrase(&normalize(text), PROGRESS_SIGNALS)
}

/// "I'm confused", "don't understand", and the like.
pub fn is_confusion_signal(text: &str) -> bool {
    contains_phrase(&normalize(text), CONFUSION_SIGNALS)
}

/// A reply that opens with a yes.
pub fn is_affirmation(text: &str) -> bool {
    starts_with_phrase(&normalize(text), AFFIRMATIONS)
}

/// A reply that opens with a no. "No idea" is confusion, not refusal.
pub fn is_negation(text: &str) -> bool {
    !is_confusion_signal(text) && starts_with_phrase(&normalize(text), NEGATIONS)
}

pub fn looks_like_question(text: &str) -> bool {
    let text = text.trim();
    if text.ends_with('?') {
        return true;
    }
    starts_with_phrase(&normalize(text), QUESTION_OPENERS)
        && token_count(text) >= MIN_IDEATION_TOKENS
}

/// Whether any word starts with one of the domain's keyword stems.
pub fn has_domain_keywords(text: &str, domain: Domain) -> bool {
    let normalized = normalize(text);
    normalized
        .split(' ')
        .any(|word| domain.keywords().iter().any(|stem| word.starts_with(stem)))
}

pub fn has_structure(text: &str) -> bool {
    STRUCTURE.is_match(text)
}

/// Enough explicit content to extract from without asking first.
pub fn has_sufficient_content(text: &str, domain: Domain) -> bool {
    has_structure(text)
        || (token_count(text) >= MIN_CONTENT_TOKENS && has_domain_keywords(text, domain))
}
