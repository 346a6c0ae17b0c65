//! Pathway: a stage-gated workflow engine for designing project-based learning.
//!
//! The engine walks an educator from a big idea through a learning journey
//! (phases, activities, resources) to deliverables (milestones, rubric,
//! impact). Free text is turned into structure by [`extract`], checked by
//! [`validate`], and held by the [`machine::Workflow`] state machine, which
//! can be exported and resumed through [`snapshot`]. The [`orchestrator`]
//! decides what an utterance means, and [`session`] applies that decision.

pub mod cli;
pub mod config;
pub mod extract;
pub mod machine;
pub mod model;
pub mod orchestrator;
pub mod session;
pub mod snapshot;
pub mod storage;
pub mod validate;
