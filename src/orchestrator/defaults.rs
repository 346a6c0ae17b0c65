//! Minimal default plans offered when the educator has nothing to add.
//!
//! Every proposal is plain text in the shape the extractor for its stage
//! reads, so accepting one goes through the same path as typed input.

use crate::model::{Ideation, IdeationField, JourneyData, Stage};

/// A default for an unanswered ideation field, built on earlier answers.
pub fn ideation(field: IdeationField, ideation: &Ideation) -> String {
    match field {
        IdeationField::BigIdea => {
            "Communities are shaped by the choices their members make.".to_string()
        }
        IdeationField::EssentialQuestion => match ideation.big_idea.as_deref() {
            Some(idea) => format!("How might we act on the idea that {}?", as_clause(idea)),
            None => "How can we make a difference in our community?".to_string(),
        },
        IdeationField::Challenge => match ideation.essential_question.as_deref() {
            Some(question) => format!(
                "Design and present a proposal to a real audience that answers: {}",
                question.trim()
            ),
            None => "Design and present a proposal that improves something in our community."
                .to_string(),
        },
    }
}

/// A default plan for a workflow stage.
pub fn workflow(stage: Stage, data: &JourneyData) -> String {
    match stage {
        Stage::Phases => "1. Discover - explore the problem and what is already known\n\
                          2. Create - design and build a response\n\
                          3. Share - present the work to an authentic audience"
            .to_string(),
        Stage::Activities => {
            if data.phases.is_empty() {
                return workflow(Stage::Phases, data);
            }
            data.phases
                .iter()
                .map(|phase| format!("{}: Kickoff discussion, Guided practice", phase.name))
                .collect::<Vec<_>>()
                .join("\n")
        }
        Stage::Resources => "- Video: an introduction to the topic\n\
                             - Book: a core reference text\n\
                             - Person: a local expert to interview"
            .to_string(),
        Stage::Milestones => "Week 2: Research summary\n\
                              Week 4: Prototype check-in\n\
                              Week 6: Final presentation"
            .to_string(),
        Stage::Rubric => "Research: Uses relevant evidence from several sources\n\
                          Collaboration: Contributes to and supports the team\n\
                          Communication: Presents ideas clearly to the audience"
            .to_string(),
        Stage::Impact => "Audience: Families and community members\n\
                          Method: A public exhibition of student work"
            .to_string(),
        Stage::Overview | Stage::JourneyReview | Stage::PublishReview => {
            "Continue as it stands. You can come back and edit any stage later.".to_string()
        }
        Stage::Complete => "The design is complete. Export it or revisit any stage.".to_string(),
    }
}

/// `"Water is life."` becomes `"water is life"`.
fn as_clause(sentence: &str) -> String {
    let trimmed = sentence.trim().trim_end_matches(['.', '!']);
    let mut chars = trimmed.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}
