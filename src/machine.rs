//! The workflow state machine.
//!
//! A [`Workflow`] owns one project's journey data and its position in the
//! design process. Every operation is synchronous and either applies fully
//! or leaves the workflow untouched: preconditions are checked before
//! anything is mutated, and failures come back as a [`Rejection`] whose
//! message can be shown to the educator as-is.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::extract::{self, ExtractError, Extraction};
use crate::model::{JourneyData, JourneyPatch, Segment, Stage};
use crate::snapshot::{CURRENT_VERSION, Snapshot, SnapshotError};
use crate::validate::{self, Gate, Policy, RECOMMENDED_RUBRIC_CRITERIA};

/// Why an operation was refused. The workflow is unchanged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    #[error(transparent)]
    Gate(#[from] Gate),

    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error("The project design is already complete.")]
    Complete,

    #[error("{0} hasn't been reached yet, so it can't be revisited.")]
    NotVisited(Stage),

    #[error("{0} is required and can't be skipped.")]
    NotSkippable(Stage),

    #[error("Please provide some input.")]
    EmptyInput,

    #[error("Activity \"{activity}\" refers to a phase that doesn't exist.")]
    DanglingActivity { activity: String },
}

/// Which parts of the journey survive a [`Workflow::reset`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Preserve {
    pub phases: bool,

    /// Only honoured together with `phases`; activities never outlive them.
    pub activities: bool,
    pub resources: bool,
    pub deliverables: bool,
    pub reflections: bool,
}

impl Preserve {
    /// Discard everything.
    pub const NOTHING: Self = Self {
        phases: false,
        activities: false,
        resources: false,
        deliverables: false,
        reflections: false,
    };

    /// Keep the phase structure and the reflection log, redo everything
    /// downstream.
    pub const PHASES: Self = Self {
        phases: true,
        reflections: true,
        ..Self::NOTHING
    };

    /// `true` is [`Preserve::PHASES`], `false` keeps nothing.
    pub const fn phases_if(keep: bool) -> Self {
        if keep { Self::PHASES } else { Self::NOTHING }
    }
}

/// Result of a successful [`Workflow::process_input`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InputOutcome {
    /// Entities (or notes) taken from the input.
    pub extracted: usize,

    /// Whether the current stage's gate would now pass.
    pub ready_for_next: bool,
}

/// Position in the workflow, for progress bars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Progress {
    /// Zero-based index of the current stage.
    pub current: usize,

    /// Stages before completion. `current == total` only when complete.
    pub total: usize,
    pub percentage: u8,
    pub segment: Segment,
}

/// One project's design workflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workflow {
    stage: Stage,
    furthest: Stage,
    skipped: BTreeSet<Stage>,
    data: JourneyData,
    policy: Policy,
}

impl Default for Workflow {
    fn default() -> Self {
        Self::new(Policy::default())
    }
}

impl Workflow {
    /// A fresh workflow at the initial stage with empty data.
    pub fn new(policy: Policy) -> Self {
        Self {
            stage: Stage::INITIAL,
            furthest: Stage::INITIAL,
            skipped: BTreeSet::new(),
            data: JourneyData::default(),
            policy,
        }
    }

    /// Rebuilds a workflow from a snapshot.
    pub fn from_snapshot(snapshot: Snapshot, policy: Policy) -> Result<Self, SnapshotError> {
        let mut workflow = Self::new(policy);
        workflow.import_state(snapshot)?;
        Ok(workflow)
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// The furthest stage reached so far.
    pub fn furthest(&self) -> Stage {
        self.furthest
    }

    pub fn skipped(&self) -> &BTreeSet<Stage> {
        &self.skipped
    }

    pub fn data(&self) -> &JourneyData {
        &self.data
    }

    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    // ── Transitions ──

    /// Checks the current stage's gate and, if it passes, moves to the next stage.
    pub fn advance(&mut self) -> Result<Stage, Rejection> {
        let next = self.stage.next().ok_or(Rejection::Complete)?;
        self.gate()?;
        self.skipped.remove(&self.stage);
        Ok(self.move_to(next))
    }

    /// Whether the current stage may be skipped.
    pub fn can_skip(&self) -> bool {
        self.stage.is_optional()
    }

    /// Moves past an optional stage without checking its gate.
    pub fn skip(&mut self) -> Result<Stage, Rejection> {
        let next = self.stage.next().ok_or(Rejection::Complete)?;
        if !self.can_skip() {
            return Err(Rejection::NotSkippable(self.stage));
        }
        self.skipped.insert(self.stage);
        tracing::debug!(stage = self.stage.as_str(), "skipped");
        Ok(self.move_to(next))
    }

    /// Jumps to an already-visited stage to revise it. Data is kept.
    pub fn edit(&mut self, target: Stage) -> Result<Stage, Rejection> {
        if target > self.furthest {
            return Err(Rejection::NotVisited(target));
        }
        tracing::debug!(
            from = self.stage.as_str(),
            to = target.as_str(),
            "editing earlier stage"
        );
        self.stage = target;
        Ok(target)
    }

    /// Returns to the initial stage, keeping only what `keep` names.
    pub fn reset(&mut self, keep: Preserve) {
        let old = std::mem::take(&mut self.data);
        self.data = JourneyData {
            phases: if keep.phases { old.phases } else { Vec::new() },
            activities: if keep.phases && keep.activities {
                old.activities
            } else {
                Vec::new()
            },
            resources: if keep.resources { old.resources } else { Vec::new() },
            deliverables: if keep.deliverables {
                old.deliverables
            } else {
                Default::default()
            },
            reflections: if keep.reflections {
                old.reflections
            } else {
                Vec::new()
            },
        };
        self.stage = Stage::INITIAL;
        self.furthest = Stage::INITIAL;
        self.skipped.clear();
        tracing::info!(?keep, "workflow reset");
    }

    fn move_to(&mut self, next: Stage) -> Stage {
        tracing::debug!(from = self.stage.as_str(), to = next.as_str(), "advanced");
        self.stage = next;
        self.furthest = self.furthest.max(next);
        next
    }

    // ── Data ──

    /// The current stage's gate, evaluated against the live data.
    pub fn gate(&self) -> Result<(), Gate> {
        validate::check(self.stage, &self.data, &self.policy, &self.skipped)
    }

    /// Whether [`Workflow::advance`] would succeed right now.
    pub fn is_ready(&self) -> bool {
        self.stage != Stage::Complete && self.gate().is_ok()
    }

    /// Shallow-merges `patch` into the journey data.
    ///
    /// Arrays are replaced wholesale. Replacing phases without supplying
    /// activities drops activities whose phase is gone. A patch whose
    /// activities reference a missing phase is rejected entirely.
    pub fn update_data(&mut self, patch: JourneyPatch) -> Result<(), Rejection> {
        if let Some(activities) = &patch.activities {
            let phases = patch.phases.as_ref().unwrap_or(&self.data.phases);
            if let Some(orphan) = activities
                .iter()
                .find(|a| !phases.iter().any(|p| p.id == a.phase_id))
            {
                return Err(Rejection::DanglingActivity {
                    activity: orphan.name.clone(),
                });
            }
        }

        let JourneyPatch {
            phases,
            activities,
            resources,
            deliverables,
            reflections,
        } = patch;

        if let Some(phases) = phases {
            self.data.phases = phases;
        }
        if let Some(activities) = activities {
            self.data.activities = activities;
        }
        let pruned = self.data.prune_orphaned_activities();
        if pruned > 0 {
            tracing::debug!(pruned, "dropped activities of removed phases");
        }
        if let Some(resources) = resources {
            self.data.resources = resources;
        }
        if let Some(deliverables) = deliverables {
            let target = &mut self.data.deliverables;
            if let Some(milestones) = deliverables.milestones {
                target.milestones = milestones;
            }
            if let Some(rubric) = deliverables.rubric {
                target.rubric = rubric;
            }
            if let Some(impact) = deliverables.impact {
                target.impact = impact;
            }
        }
        if let Some(reflections) = reflections {
            self.data.reflections = reflections;
        }
        Ok(())
    }

    /// Appends free-text commentary. Never validated or parsed.
    pub fn add_reflection(&mut self, text: impl Into<String>) {
        self.data.reflections.push(text.into());
    }

    /// Extracts entities for the current stage from `raw` and merges them in.
    ///
    /// Entities matching an existing one by name are updated in place
    /// rather than duplicated.
    pub fn process_input(&mut self, raw: &str) -> Result<InputOutcome, Rejection> {
        let text = raw.trim();
        if text.is_empty() {
            return Err(Rejection::EmptyInput);
        }

        let extraction = extract::extract(
            self.stage,
            text,
            &self.data,
            self.policy.unmatched_activity,
        )?;
        let extracted = extraction.len();
        self.apply(extraction);

        tracing::debug!(stage = self.stage.as_str(), extracted, "input processed");
        Ok(InputOutcome {
            extracted,
            ready_for_next: self.is_ready(),
        })
    }

    fn apply(&mut self, extraction: Extraction) {
        let data = &mut self.data;
        match extraction {
            Extraction::Phases(phases) => merge_by(
                &mut data.phases,
                phases,
                |p| p.name.to_lowercase(),
                |old, new| {
                    if !new.description.is_empty() {
                        old.description = new.description;
                    }
                },
            ),
            Extraction::Activities(activities) => merge_by(
                &mut data.activities,
                activities,
                |a| (a.phase_id, a.name.to_lowercase()),
                |old, new| {
                    if !new.description.is_empty() {
                        old.description = new.description;
                    }
                },
            ),
            Extraction::Resources(resources) => merge_by(
                &mut data.resources,
                resources,
                |r| r.name.to_lowercase(),
                |old, new| old.kind = new.kind,
            ),
            Extraction::Milestones(milestones) => merge_by(
                &mut data.deliverables.milestones,
                milestones,
                |m| m.name.to_lowercase(),
                |old, new| {
                    if new.due_label.is_some() {
                        old.due_label = new.due_label;
                    }
                },
            ),
            Extraction::Criteria(criteria) => merge_by(
                &mut data.deliverables.rubric.criteria,
                criteria,
                |c| c.name.to_lowercase(),
                |old, new| {
                    if !new.description.is_empty() {
                        old.description = new.description;
                    }
                },
            ),
            Extraction::Impact(impact) => data.deliverables.impact = impact,
            Extraction::Note(note) => data.reflections.push(note),
        }
    }

    // ── Presentation ──

    pub fn progress(&self) -> Progress {
        let total = Stage::ALL.len() - 1;
        let current = self.stage.index();
        let percentage = u8::try_from((current * 100 + total / 2) / total).unwrap_or(100);
        Progress {
            current,
            total,
            percentage,
            segment: self.stage.segment(),
        }
    }

    /// What to ask the educator at the current stage. Distinct per stage.
    pub fn transition_message(&self) -> String {
        match self.stage {
            Stage::Overview => "Let's map the learning journey. We'll outline the phases students \
                 move through, then the activities and resources in each."
                .to_string(),
            Stage::Phases => "List the phases of the learning journey, one per line \
                 (e.g. \"1. Discover - explore the problem\"). You'll need at least two."
                .to_string(),
            Stage::Activities => "For each phase, list its activities as \
                 \"Phase name: activity, activity\"."
                .to_string(),
            Stage::Resources => "Which resources will students use? Add one per line, \
                 or skip this step."
                .to_string(),
            Stage::JourneyReview => "Review the journey. Continue when it looks right, \
                 or go back and edit any stage."
                .to_string(),
            Stage::Milestones => "Add milestones to keep the project on track, e.g. \
                 \"Week 2: Research summary\". Optional."
                .to_string(),
            Stage::Rubric => format!(
                "Define your rubric as \"Criterion: what success looks like\". \
                 {RECOMMENDED_RUBRIC_CRITERIA} criteria work well."
            ),
            Stage::Impact => "Who is the authentic audience, and how will students share \
                 their work? Use \"Audience:\" and \"Method:\" lines."
                .to_string(),
            Stage::PublishReview => "Everything is in place. Review the full design and \
                 continue to publish."
                .to_string(),
            Stage::Complete => "Your project design is complete and ready to publish.".to_string(),
        }
    }

    // ── Snapshots ──

    /// Captures the full state for persistence.
    pub fn export_state(&self) -> Snapshot {
        Snapshot {
            version: CURRENT_VERSION.to_string(),
            state: self.stage,
            data: self.data.clone(),
            furthest: Some(self.furthest),
            skipped: self.skipped.clone(),
        }
    }

    /// Replaces stage and data with the snapshot's.
    ///
    /// Snapshots of another version are refused and leave the workflow as it
    /// was; decode raw input with [`crate::snapshot::decode`] to migrate it
    /// first. Activities pointing at missing phases are dropped.
    pub fn import_state(&mut self, snapshot: Snapshot) -> Result<(), SnapshotError> {
        if snapshot.version != CURRENT_VERSION {
            return Err(SnapshotError::UnsupportedVersion(snapshot.version));
        }

        let mut data = snapshot.data;
        let dropped = data.prune_orphaned_activities();
        if dropped > 0 {
            tracing::warn!(dropped, "snapshot had activities for unknown phases");
        }

        self.stage = snapshot.state;
        self.furthest = snapshot.furthest.unwrap_or(snapshot.state).max(snapshot.state);
        self.skipped = snapshot.skipped;
        self.data = data;
        tracing::info!(stage = self.stage.as_str(), "workflow state imported");
        Ok(())
    }
}

/// Merges `incoming` into `existing`, updating items whose key already exists.
fn merge_by<T, K, F, U>(existing: &mut Vec<T>, incoming: Vec<T>, key: F, mut update: U)
where
    K: PartialEq,
    F: Fn(&T) -> K,
    U: FnMut(&mut T, T),
{
    for item in incoming {
        let k = key(&item);
        match existing.iter_mut().find(|e| key(e) == k) {
            Some(found) => update(found, item),
            None => existing.push(item),
        }
    }
}
