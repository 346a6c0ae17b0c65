//! Journey entities: the value records the extractor produces and the workflow stores.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One stage of the student's learning journey, authored by the educator.
///
/// Not to be confused with [`Stage`](super::Stage), which is a position in
/// the design workflow itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Phase {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl Phase {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: description.into(),
        }
    }
}

/// Something students do during a phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: Uuid,

    /// The phase this activity belongs to. Must reference an existing phase.
    pub phase_id: Uuid,

    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl Activity {
    pub fn new(phase_id: Uuid, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            phase_id,
            name: name.into(),
            description: description.into(),
        }
    }
}

/// Material or people students draw on. Optional, unconstrained.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: ResourceKind,
}

impl Resource {
    pub fn new(name: impl Into<String>, kind: ResourceKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            kind,
        }
    }
}

/// What kind of thing a resource is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Video,
    Book,
    Article,
    Website,
    Tool,
    Person,
    #[default]
    #[serde(other)]
    Other,
}

impl ResourceKind {
    /// Keywords that identify each kind, checked in order.
    const KEYWORDS: &[(Self, &[&str])] = &[
        (Self::Video, &["video", "youtube", "film", "documentary", "clip", "ted"]),
        (Self::Book, &["book", "textbook", "novel", "ebook"]),
        (
            Self::Article,
            &["article", "paper", "journal", "report", "reading", "essay"],
        ),
        (Self::Website, &["website", "site", "web", "online", "www"]),
        (
            Self::Tool,
            &["tool", "software", "app", "kit", "materials", "equipment"],
        ),
        (
            Self::Person,
            &[
                "person", "people", "expert", "speaker", "guest", "mentor", "partner",
                "scientist", "interview",
            ],
        ),
    ];

    /// Detect a kind from free text by whole-word keyword match.
    ///
    /// URLs count as websites. Anything unrecognised is [`ResourceKind::Other`].
    pub fn detect(text: &str) -> Self {
        let lower = text.to_lowercase();
        let words: Vec<&str> = lower
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .collect();

        if words.iter().any(|w| w.starts_with("http")) {
            return Self::Website;
        }

        for (kind, keywords) in Self::KEYWORDS {
            let hit = words.iter().any(|word| {
                keywords
                    .iter()
                    .any(|k| *word == *k || word.strip_suffix('s') == Some(*k))
            });
            if hit {
                return *kind;
            }
        }
        Self::Other
    }

    /// Parse an explicit type label such as `Video` or `books`.
    pub fn from_label(label: &str) -> Option<Self> {
        match Self::detect(label) {
            Self::Other if !label.trim().eq_ignore_ascii_case("other") => None,
            kind => Some(kind),
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Video => "video",
            Self::Book => "book",
            Self::Article => "article",
            Self::Website => "website",
            Self::Tool => "tool",
            Self::Person => "person",
            Self::Other => "other",
        })
    }
}

/// A checkpoint on the way to the final product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Milestone {
    pub id: Uuid,
    pub name: String,

    /// Optional link to the phase this milestone closes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase_id: Option<Uuid>,

    /// When it is due, as the educator phrased it (e.g. `Week 3`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_label: Option<String>,
}

impl Milestone {
    pub fn new(name: impl Into<String>, due_label: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            phase_id: None,
            due_label,
        }
    }
}

/// One row of the assessment rubric.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RubricCriterion {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl RubricCriterion {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: description.into(),
        }
    }
}

/// Who the finished work reaches, and how.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Impact {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audience: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
}

impl Impact {
    /// True when neither field carries any text.
    pub fn is_empty(&self) -> bool {
        let blank = |f: &Option<String>| f.as_deref().is_none_or(|s| s.trim().is_empty());
        blank(&self.audience) && blank(&self.method)
    }
}
