//! Core data model for Pathway.
//!
//! These types describe one project's design: the learning journey
//! (phases, activities, resources), its deliverables (milestones, rubric,
//! impact), the workflow stages the educator moves through, and the
//! project record that wraps it all.

mod entity;
mod journey;
mod project;
mod stage;

pub use entity::{Activity, Impact, Milestone, Phase, Resource, ResourceKind, RubricCriterion};
pub use journey::{Deliverables, DeliverablesPatch, JourneyData, JourneyPatch, Rubric};
pub use project::{FlowStage, Ideation, IdeationField, Pending, Project};
pub use stage::{ParseStageError, Segment, Stage};
