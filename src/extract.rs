//! Free-text extraction: turning what the educator typed into journey entities.
//!
//! Each workflow stage that collects data has its own line-oriented strategy.
//! Every strategy degrades instead of rejecting: text with no recognisable
//! structure still becomes at least one entity, however long it is.
//! All patterns are compiled by the `regex` crate, which matches in linear
//! time, so pathological input cannot stall extraction.

mod activities;
mod impact;
mod lines;
mod milestones;
mod phases;
mod resources;
mod rubric;

use serde::{Deserialize, Serialize};

use crate::model::{
    Activity, Impact, JourneyData, Milestone, Phase, Resource, RubricCriterion, Stage,
};

pub use activities::extract_activities;
pub use impact::extract_impact;
pub use milestones::extract_milestones;
pub use phases::extract_phases;
pub use resources::extract_resources;
pub use rubric::extract_criteria;

/// What one piece of input yielded, tagged by entity kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    Phases(Vec<Phase>),
    Activities(Vec<Activity>),
    Resources(Vec<Resource>),
    Milestones(Vec<Milestone>),
    Criteria(Vec<RubricCriterion>),
    Impact(Impact),

    /// Commentary entered at a stage that collects no entities.
    Note(String),
}

impl Extraction {
    /// Number of entities (or notes) produced.
    pub fn len(&self) -> usize {
        match self {
            Self::Phases(v) => v.len(),
            Self::Activities(v) => v.len(),
            Self::Resources(v) => v.len(),
            Self::Milestones(v) => v.len(),
            Self::Criteria(v) => v.len(),
            Self::Impact(impact) => usize::from(!impact.is_empty()),
            Self::Note(_) => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// What to do with an activity whose phase label matches no phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnmatchedActivity {
    /// Attach it to the first phase so no content is lost.
    #[default]
    FirstPhase,

    /// Fail the whole input and ask the educator to name a phase.
    Reject,
}

/// Why input could not be turned into entities.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtractError {
    #[error("Add your learning phases before listing activities.")]
    NoPhases,

    #[error("Couldn't match \"{label}\" to a phase. Use one of: {}", .known.join(", "))]
    UnknownPhase { label: String, known: Vec<String> },

    #[error("Which phase is \"{activity}\" part of? Start the line with a phase name, e.g. \"{}: {activity}\"", .known.first().map_or("Phase", String::as_str))]
    MissingPhaseLabel {
        activity: String,
        known: Vec<String>,
    },
}

/// Runs the strategy for `stage` over `text`.
///
/// `data` supplies context some strategies need: existing phases for
/// activity attribution and the current impact plan for impact edits.
pub fn extract(
    stage: Stage,
    text: &str,
    data: &JourneyData,
    unmatched: UnmatchedActivity,
) -> Result<Extraction, ExtractError> {
    let extraction = match stage {
        Stage::Phases => Extraction::Phases(extract_phases(text)),
        Stage::Activities => {
            Extraction::Activities(extract_activities(text, &data.phases, unmatched)?)
        }
        Stage::Resources => Extraction::Resources(extract_resources(text)),
        Stage::Milestones => Extraction::Milestones(extract_milestones(text)),
        Stage::Rubric => Extraction::Criteria(extract_criteria(text)),
        Stage::Impact => Extraction::Impact(extract_impact(text, &data.deliverables.impact)),
        Stage::Overview | Stage::JourneyReview | Stage::PublishReview | Stage::Complete => {
            Extraction::Note(text.trim().to_string())
        }
    };
    Ok(extraction)
}
