//! The journey aggregate and the partial updates applied to it.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::entity::{Activity, Impact, Milestone, Phase, Resource, RubricCriterion};

/// Everything captured about a project's learning journey and deliverables.
///
/// Owned exclusively by the workflow; everyone else sees it by reference
/// or through a snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JourneyData {
    pub phases: Vec<Phase>,
    pub activities: Vec<Activity>,
    pub resources: Vec<Resource>,
    pub deliverables: Deliverables,

    /// Append-only free-text commentary. Never parsed; only a full reset
    /// clears it.
    pub reflections: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Deliverables {
    pub milestones: Vec<Milestone>,
    pub rubric: Rubric,
    pub impact: Impact,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Rubric {
    pub criteria: Vec<RubricCriterion>,
}

impl JourneyData {
    /// Finds a phase by id.
    pub fn phase(&self, id: Uuid) -> Option<&Phase> {
        self.phases.iter().find(|p| p.id == id)
    }

    /// Activities attached to the given phase.
    pub fn activities_for(&self, phase_id: Uuid) -> impl Iterator<Item = &Activity> {
        self.activities.iter().filter(move |a| a.phase_id == phase_id)
    }

    /// Phases that have no activity yet, in authored order.
    pub fn phases_without_activities(&self) -> Vec<&Phase> {
        self.phases
            .iter()
            .filter(|p| self.activities_for(p.id).next().is_none())
            .collect()
    }

    /// Drops activities whose phase no longer exists. Returns how many were dropped.
    pub fn prune_orphaned_activities(&mut self) -> usize {
        let before = self.activities.len();
        let phases = &self.phases;
        self.activities
            .retain(|a| phases.iter().any(|p| p.id == a.phase_id));
        before - self.activities.len()
    }
}

/// A partial `JourneyData` for shallow merging.
///
/// Every `Some` field replaces the live value wholesale; arrays are full
/// arrays, never deltas. `deliverables` merges one level deeper so a caller
/// can replace the rubric without restating the milestones.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JourneyPatch {
    pub phases: Option<Vec<Phase>>,
    pub activities: Option<Vec<Activity>>,
    pub resources: Option<Vec<Resource>>,
    pub deliverables: Option<DeliverablesPatch>,
    pub reflections: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeliverablesPatch {
    pub milestones: Option<Vec<Milestone>>,
    pub rubric: Option<Rubric>,
    pub impact: Option<Impact>,
}
