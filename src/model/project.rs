//! Project records: the unit of work in Pathway.

use std::fmt;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Stage;

/// One educator's project design.
///
/// The workflow snapshot is stored alongside it but not inside it;
/// this record carries what precedes the workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: Uuid,
    pub title: String,
    pub created_at: Timestamp,
    pub ideation: Ideation,

    /// A candidate value awaiting an explicit yes/no from the educator.
    pub pending: Option<Pending>,
}

impl Project {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            created_at: Timestamp::now(),
            ideation: Ideation::default(),
            pending: None,
        }
    }

    /// First eight characters of the id, for display.
    pub fn short_id(&self) -> String {
        self.id.to_string()[..8].to_string()
    }
}

/// The framing answered before the journey is mapped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Ideation {
    pub big_idea: Option<String>,
    pub essential_question: Option<String>,
    pub challenge: Option<String>,
}

/// One answerable field of [`Ideation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum IdeationField {
    BigIdea,
    EssentialQuestion,
    Challenge,
}

impl Ideation {
    /// The first field still unanswered, in asking order.
    pub fn next_field(&self) -> Option<IdeationField> {
        if self.big_idea.is_none() {
            Some(IdeationField::BigIdea)
        } else if self.essential_question.is_none() {
            Some(IdeationField::EssentialQuestion)
        } else if self.challenge.is_none() {
            Some(IdeationField::Challenge)
        } else {
            None
        }
    }

    pub fn set(&mut self, field: IdeationField, value: impl Into<String>) {
        let slot = match field {
            IdeationField::BigIdea => &mut self.big_idea,
            IdeationField::EssentialQuestion => &mut self.essential_question,
            IdeationField::Challenge => &mut self.challenge,
        };
        *slot = Some(value.into());
    }
}

impl IdeationField {
    /// The question put to the educator for this field.
    pub fn prompt(self) -> &'static str {
        match self {
            Self::BigIdea => {
                "What's the Big Idea? Describe the enduring concept or theme this project explores."
            }
            Self::EssentialQuestion => {
                "What Essential Question will drive your students' inquiry?"
            }
            Self::Challenge => "What challenge will students take on to answer that question?",
        }
    }
}

/// Where the conversation stands: an ideation field or a workflow stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FlowStage {
    Ideation(IdeationField),
    Workflow(Stage),
}

impl FlowStage {
    /// Whether a typed answer here becomes data.
    pub fn accepts_text(self) -> bool {
        match self {
            Self::Ideation(_) => true,
            Self::Workflow(stage) => stage.extracts(),
        }
    }
}

impl fmt::Display for FlowStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ideation(field) => write!(f, "{field}"),
            Self::Workflow(stage) => write!(f, "{stage}"),
        }
    }
}

/// A candidate offered at `stage`. It only answers a yes/no asked there.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pending {
    pub stage: FlowStage,
    pub candidate: String,
}

impl Pending {
    pub fn new(stage: FlowStage, candidate: impl Into<String>) -> Self {
        Self {
            stage,
            candidate: candidate.into(),
        }
    }
}

impl fmt::Display for IdeationField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::BigIdea => "Big Idea",
            Self::EssentialQuestion => "Essential Question",
            Self::Challenge => "Challenge",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ideation_fields_are_asked_in_order() {
        let mut ideation = Ideation::default();
        assert_eq!(ideation.next_field(), Some(IdeationField::BigIdea));

        ideation.set(IdeationField::BigIdea, "Water connects every community");
        assert_eq!(ideation.next_field(), Some(IdeationField::EssentialQuestion));

        ideation.set(IdeationField::EssentialQuestion, "How do we protect our water?");
        ideation.set(IdeationField::Challenge, "Design a local water campaign");
        assert_eq!(ideation.next_field(), None);
    }

    #[test]
    fn pending_remembers_where_it_was_offered() {
        let pending = Pending::new(FlowStage::Workflow(Stage::JourneyReview), "Add a field trip");
        let json = serde_json::to_string(&pending).unwrap();
        assert_eq!(
            json,
            r#"{"stage":{"workflow":"JOURNEY_REVIEW"},"candidate":"Add a field trip"}"#
        );
        assert_eq!(serde_json::from_str::<Pending>(&json).unwrap(), pending);
    }

    #[test]
    fn short_id_is_uuid_prefix() {
        let project = Project::new("Water Watchers");
        assert_eq!(project.short_id().len(), 8);
        assert!(project.id.to_string().starts_with(&project.short_id()));
    }
}
