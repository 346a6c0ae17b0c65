//! Workflow stages: where the educator stands in the design process.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A position in the design workflow.
///
/// Linear: each stage has exactly one successor until [`Stage::Complete`].
/// Declaration order is workflow order, so `Ord` compares progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Stage {
    #[serde(rename = "JOURNEY_OVERVIEW", alias = "OVERVIEW")]
    Overview,
    #[serde(rename = "JOURNEY_PHASES", alias = "PHASES")]
    Phases,
    #[serde(rename = "JOURNEY_ACTIVITIES", alias = "ACTIVITIES")]
    Activities,
    #[serde(rename = "JOURNEY_RESOURCES", alias = "RESOURCES")]
    Resources,
    #[serde(rename = "JOURNEY_REVIEW")]
    JourneyReview,
    #[serde(rename = "DELIVERABLE_MILESTONES", alias = "MILESTONES")]
    Milestones,
    #[serde(rename = "DELIVERABLE_RUBRIC", alias = "RUBRIC")]
    Rubric,
    #[serde(rename = "DELIVERABLE_IMPACT", alias = "IMPACT")]
    Impact,
    #[serde(rename = "PUBLISH_REVIEW")]
    PublishReview,
    #[serde(rename = "COMPLETE")]
    Complete,
}

/// Coarse progress bucket for UI progress bars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Segment {
    Journey,
    Deliver,
    Complete,
}

impl Stage {
    /// Every stage, in workflow order.
    pub const ALL: [Self; 10] = [
        Self::Overview,
        Self::Phases,
        Self::Activities,
        Self::Resources,
        Self::JourneyReview,
        Self::Milestones,
        Self::Rubric,
        Self::Impact,
        Self::PublishReview,
        Self::Complete,
    ];

    /// The stage a new workflow starts in.
    pub const INITIAL: Self = Self::Overview;

    /// Zero-based position in [`Stage::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }

    /// The following stage, or `None` from [`Stage::Complete`].
    pub fn next(self) -> Option<Self> {
        Self::ALL.get(self.index() + 1).copied()
    }

    /// Whether the educator may skip this stage without satisfying a gate.
    pub fn is_optional(self) -> bool {
        matches!(
            self,
            Self::Overview | Self::Resources | Self::Milestones | Self::Rubric | Self::Impact
        )
    }

    /// Whether free text entered here is parsed into entities.
    pub fn extracts(self) -> bool {
        matches!(
            self,
            Self::Phases
                | Self::Activities
                | Self::Resources
                | Self::Milestones
                | Self::Rubric
                | Self::Impact
        )
    }

    pub fn segment(self) -> Segment {
        match self {
            Self::Overview
            | Self::Phases
            | Self::Activities
            | Self::Resources
            | Self::JourneyReview => Segment::Journey,
            Self::Milestones | Self::Rubric | Self::Impact | Self::PublishReview => {
                Segment::Deliver
            }
            Self::Complete => Segment::Complete,
        }
    }

    /// The wire name used in snapshots.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Overview => "JOURNEY_OVERVIEW",
            Self::Phases => "JOURNEY_PHASES",
            Self::Activities => "JOURNEY_ACTIVITIES",
            Self::Resources => "JOURNEY_RESOURCES",
            Self::JourneyReview => "JOURNEY_REVIEW",
            Self::Milestones => "DELIVERABLE_MILESTONES",
            Self::Rubric => "DELIVERABLE_RUBRIC",
            Self::Impact => "DELIVERABLE_IMPACT",
            Self::PublishReview => "PUBLISH_REVIEW",
            Self::Complete => "COMPLETE",
        }
    }

    /// Short name: the wire name without its group prefix.
    fn short_name(self) -> &'static str {
        let name = self.as_str();
        name.strip_prefix("JOURNEY_")
            .or_else(|| name.strip_prefix("DELIVERABLE_"))
            .filter(|rest| *rest != "REVIEW")
            .unwrap_or(name)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Overview => "Journey overview",
            Self::Phases => "Learning phases",
            Self::Activities => "Activities",
            Self::Resources => "Resources",
            Self::JourneyReview => "Journey review",
            Self::Milestones => "Milestones",
            Self::Rubric => "Rubric",
            Self::Impact => "Impact plan",
            Self::PublishReview => "Publish review",
            Self::Complete => "Complete",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown stage '{0}'")]
pub struct ParseStageError(pub String);

impl FromStr for Stage {
    type Err = ParseStageError;

    /// Accepts wire names (`JOURNEY_PHASES`), short names (`phases`), and
    /// kebab-case (`journey-review`), case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_uppercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|stage| stage.as_str() == wanted || stage.short_name() == wanted)
            .ok_or_else(|| ParseStageError(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stages_are_linear_and_end_at_complete() {
        let mut stage = Stage::INITIAL;
        let mut visited = vec![stage];
        while let Some(next) = stage.next() {
            assert!(next > stage);
            stage = next;
            visited.push(stage);
        }
        assert_eq!(stage, Stage::Complete);
        assert_eq!(visited, Stage::ALL);
    }

    #[test]
    fn optional_stages() {
        let optional: Vec<Stage> = Stage::ALL.into_iter().filter(|s| s.is_optional()).collect();
        assert_eq!(
            optional,
            vec![
                Stage::Overview,
                Stage::Resources,
                Stage::Milestones,
                Stage::Rubric,
                Stage::Impact,
            ]
        );
    }

    #[test]
    fn parses_wire_short_and_kebab_names() {
        assert_eq!("JOURNEY_PHASES".parse::<Stage>().unwrap(), Stage::Phases);
        assert_eq!("phases".parse::<Stage>().unwrap(), Stage::Phases);
        assert_eq!("journey-review".parse::<Stage>().unwrap(), Stage::JourneyReview);
        assert_eq!("rubric".parse::<Stage>().unwrap(), Stage::Rubric);
        assert_eq!("complete".parse::<Stage>().unwrap(), Stage::Complete);
        assert!("launch".parse::<Stage>().is_err());
    }

    #[test]
    fn serde_uses_wire_names_and_accepts_short_aliases() {
        let json = serde_json::to_string(&Stage::Milestones).unwrap();
        assert_eq!(json, "\"DELIVERABLE_MILESTONES\"");

        let stage: Stage = serde_json::from_str("\"ACTIVITIES\"").unwrap();
        assert_eq!(stage, Stage::Activities);
    }

    #[test]
    fn segments_bucket_stages() {
        assert_eq!(Stage::Resources.segment(), Segment::Journey);
        assert_eq!(Stage::JourneyReview.segment(), Segment::Journey);
        assert_eq!(Stage::Rubric.segment(), Segment::Deliver);
        assert_eq!(Stage::PublishReview.segment(), Segment::Deliver);
        assert_eq!(Stage::Complete.segment(), Segment::Complete);
    }
}
