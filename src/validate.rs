//! Stage gates: what must be true before the workflow leaves a stage.
//!
//! Each gate is a pure predicate over the journey data. A failed gate is an
//! expected outcome, reported as a [`Gate`] whose message can be shown to
//! the educator verbatim.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::extract::UnmatchedActivity;
use crate::model::{JourneyData, Stage};

/// Phases required before leaving [`Stage::Phases`].
pub const MIN_PHASES: usize = 2;

/// Milestones required in strict mode, unless configured otherwise.
pub const DEFAULT_MIN_MILESTONES: usize = 1;

/// Rubric criteria required in strict mode, unless configured otherwise.
pub const DEFAULT_MIN_RUBRIC_CRITERIA: usize = 2;

/// Rubric size suggested to educators. Advisory only; never enforced.
pub const RECOMMENDED_RUBRIC_CRITERIA: usize = 3;

/// How demanding the gates are.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Policy {
    /// Enforce the deliverable gates (milestones, rubric, impact).
    pub strict_deliverables: bool,
    pub min_milestones: usize,
    pub min_rubric_criteria: usize,

    /// How activities with an unrecognised phase label are attributed.
    pub unmatched_activity: UnmatchedActivity,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            strict_deliverables: false,
            min_milestones: DEFAULT_MIN_MILESTONES,
            min_rubric_criteria: DEFAULT_MIN_RUBRIC_CRITERIA,
            unmatched_activity: UnmatchedActivity::default(),
        }
    }
}

impl Policy {
    /// The default policy with deliverable gates enforced.
    pub fn strict() -> Self {
        Self {
            strict_deliverables: true,
            ..Self::default()
        }
    }
}

/// A failed gate and what the educator needs to add.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Gate {
    #[error("Add at least {required} phases (you have {found}).")]
    TooFewPhases { required: usize, found: usize },

    #[error("Add at least one activity for each phase. Still empty: {}", .phases.join(", "))]
    MissingActivities { phases: Vec<String> },

    #[error("Add at least {} (you have {found}).", count(.required, "milestone", "milestones"))]
    TooFewMilestones { required: usize, found: usize },

    #[error("Add at least {} (you have {found}).", count(.required, "rubric criterion", "rubric criteria"))]
    TooFewCriteria { required: usize, found: usize },

    #[error("Describe who will see the students' work or how they will share it, or skip this step.")]
    MissingImpact,
}

fn count(n: &usize, one: &str, many: &str) -> String {
    if *n == 1 {
        format!("{n} {one}")
    } else {
        format!("{n} {many}")
    }
}

/// Checks the gate for leaving `stage`.
///
/// `skipped` holds stages the educator skipped explicitly; the strict impact
/// gate does not apply to a skipped impact stage.
pub fn check(
    stage: Stage,
    data: &JourneyData,
    policy: &Policy,
    skipped: &BTreeSet<Stage>,
) -> Result<(), Gate> {
    match stage {
        Stage::Phases => {
            let found = data.phases.len();
            if found < MIN_PHASES {
                return Err(Gate::TooFewPhases {
                    required: MIN_PHASES,
                    found,
                });
            }
        }
        Stage::Activities => {
            let missing = data.phases_without_activities();
            if !missing.is_empty() {
                return Err(Gate::MissingActivities {
                    phases: missing.into_iter().map(|p| p.name.clone()).collect(),
                });
            }
        }
        Stage::Milestones if policy.strict_deliverables => {
            let found = data.deliverables.milestones.len();
            if found < policy.min_milestones {
                return Err(Gate::TooFewMilestones {
                    required: policy.min_milestones,
                    found,
                });
            }
        }
        Stage::Rubric if policy.strict_deliverables => {
            let found = data.deliverables.rubric.criteria.len();
            if found < policy.min_rubric_criteria {
                return Err(Gate::TooFewCriteria {
                    required: policy.min_rubric_criteria,
                    found,
                });
            }
        }
        Stage::Impact if policy.strict_deliverables => {
            if data.deliverables.impact.is_empty() && !skipped.contains(&Stage::Impact) {
                return Err(Gate::MissingImpact);
            }
        }
        Stage::Overview
        | Stage::Resources
        | Stage::JourneyReview
        | Stage::Milestones
        | Stage::Rubric
        | Stage::Impact
        | Stage::PublishReview
        | Stage::Complete => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::model::{Activity, Impact, Milestone, Phase, RubricCriterion};

    fn no_skips() -> BTreeSet<Stage> {
        BTreeSet::new()
    }

    fn with_phases(n: usize) -> JourneyData {
        JourneyData {
            phases: (1..=n).map(|i| Phase::new(format!("Phase {i}"), "")).collect(),
            ..JourneyData::default()
        }
    }

    #[test]
    fn phases_gate_needs_two() {
        let policy = Policy::default();
        for n in 0..2 {
            let err = check(Stage::Phases, &with_phases(n), &policy, &no_skips()).unwrap_err();
            assert_eq!(
                err,
                Gate::TooFewPhases {
                    required: 2,
                    found: n
                }
            );
        }
        for n in 2..5 {
            assert!(check(Stage::Phases, &with_phases(n), &policy, &no_skips()).is_ok());
        }
    }

    #[test]
    fn activities_gate_names_the_empty_phases() {
        let mut data = with_phases(2);
        data.activities
            .push(Activity::new(data.phases[0].id, "Interview", ""));

        let err = check(Stage::Activities, &data, &Policy::default(), &no_skips()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Add at least one activity for each phase. Still empty: Phase 2"
        );

        data.activities
            .push(Activity::new(data.phases[1].id, "Prototype", ""));
        assert!(check(Stage::Activities, &data, &Policy::default(), &no_skips()).is_ok());
    }

    #[test]
    fn deliverable_gates_are_open_unless_strict() {
        let data = JourneyData::default();
        let lenient = Policy::default();
        for stage in [Stage::Resources, Stage::Milestones, Stage::Rubric, Stage::Impact] {
            assert!(check(stage, &data, &lenient, &no_skips()).is_ok(), "{stage:?}");
        }
    }

    #[test]
    fn strict_deliverable_thresholds_come_from_policy() {
        let mut data = JourneyData::default();
        let strict = Policy::strict();

        let err = check(Stage::Milestones, &data, &strict, &no_skips()).unwrap_err();
        assert_eq!(err.to_string(), "Add at least 1 milestone (you have 0).");
        data.deliverables
            .milestones
            .push(Milestone::new("Pitch", None));
        assert!(check(Stage::Milestones, &data, &strict, &no_skips()).is_ok());

        data.deliverables
            .rubric
            .criteria
            .push(RubricCriterion::new("Research", ""));
        let err = check(Stage::Rubric, &data, &strict, &no_skips()).unwrap_err();
        assert_eq!(err.to_string(), "Add at least 2 rubric criteria (you have 1).");

        let three = Policy {
            min_rubric_criteria: 3,
            ..Policy::strict()
        };
        data.deliverables
            .rubric
            .criteria
            .push(RubricCriterion::new("Craft", ""));
        assert!(check(Stage::Rubric, &data, &strict, &no_skips()).is_ok());
        assert!(check(Stage::Rubric, &data, &three, &no_skips()).is_err());
    }

    #[test]
    fn strict_impact_gate_respects_skip() {
        let mut data = JourneyData::default();
        let strict = Policy::strict();

        assert_eq!(
            check(Stage::Impact, &data, &strict, &no_skips()),
            Err(Gate::MissingImpact)
        );

        let skipped = BTreeSet::from([Stage::Impact]);
        assert!(check(Stage::Impact, &data, &strict, &skipped).is_ok());

        data.deliverables.impact = Impact {
            audience: Some("Parents".into()),
            method: None,
        };
        assert!(check(Stage::Impact, &data, &strict, &no_skips()).is_ok());
    }

    #[test]
    fn review_stages_always_pass() {
        let data = JourneyData::default();
        for stage in [
            Stage::Overview,
            Stage::JourneyReview,
            Stage::PublishReview,
            Stage::Complete,
        ] {
            assert!(check(stage, &data, &Policy::strict(), &no_skips()).is_ok());
        }
    }
}
