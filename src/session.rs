//! One project's conversation: orchestrator decisions applied to the workflow.

use crate::machine::Workflow;
use crate::model::{FlowStage, Pending, Project};
use crate::orchestrator::{self, Decision, FlowInput};
use crate::snapshot::{SnapshotError, SnapshotStore};
use crate::validate::Policy;

/// A project record paired with its workflow.
#[derive(Debug, Clone)]
pub struct Session {
    project: Project,
    workflow: Workflow,
}

/// The result of one utterance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub decision: Decision,

    /// Where the conversation stands after the turn.
    pub stage: FlowStage,

    /// Why a commit did not go through, if it didn't.
    pub notice: Option<String>,

    /// What to show the educator next.
    pub prompt: String,
}

impl Session {
    pub fn new(project: Project, workflow: Workflow) -> Self {
        Self { project, workflow }
    }

    /// Resumes `project` from its latest snapshot, or starts fresh.
    pub fn open<S>(project: Project, store: &S, policy: Policy) -> Result<Self, S::Error>
    where
        S: SnapshotStore,
        S::Error: From<SnapshotError>,
    {
        let workflow = match store.load(project.id)? {
            Some(snapshot) => Workflow::from_snapshot(snapshot, policy)?,
            None => Workflow::new(policy),
        };
        Ok(Self::new(project, workflow))
    }

    /// Persists the workflow state.
    pub fn save<S: SnapshotStore>(&self, store: &S) -> Result<(), S::Error> {
        store.save(self.project.id, &self.workflow.export_state())
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    pub fn workflow(&self) -> &Workflow {
        &self.workflow
    }

    pub fn workflow_mut(&mut self) -> &mut Workflow {
        &mut self.workflow
    }

    /// Ideation comes first; the workflow takes over once it is answered.
    pub fn flow_stage(&self) -> FlowStage {
        match self.project.ideation.next_field() {
            Some(field) => FlowStage::Ideation(field),
            None => FlowStage::Workflow(self.workflow.stage()),
        }
    }

    /// The question for the current stage.
    pub fn prompt(&self) -> String {
        match self.flow_stage() {
            FlowStage::Ideation(field) => field.prompt().to_string(),
            FlowStage::Workflow(_) => self.workflow.transition_message(),
        }
    }

    /// Classifies `utterance` and applies the decision.
    ///
    /// A candidate held for another stage is dropped first: the workflow may
    /// have moved since it was offered.
    pub fn respond(&mut self, utterance: &str) -> Turn {
        let stage = self.flow_stage();
        if let Some(pending) = &self.project.pending
            && pending.stage != stage
        {
            tracing::debug!(offered = %pending.stage, now = %stage, "dropping stale candidate");
            self.project.pending = None;
        }

        let decision = orchestrator::classify(&FlowInput {
            stage,
            ideation: &self.project.ideation,
            journey: self.workflow.data(),
            pending: self.project.pending.as_ref(),
            gate_open: self.workflow.is_ready(),
            utterance,
        });

        let mut notice = None;
        let prompt = match &decision {
            Decision::CommitAndAdvance { value } => {
                self.project.pending = None;
                notice = self.commit(stage, value.as_deref()).err();
                self.prompt()
            }
            Decision::AwaitConfirmation { candidate } => {
                self.project.pending = Some(Pending::new(stage, candidate.clone()));
                format!("Just to check, should I use this for {stage}?\n\n{candidate}\n\n(yes/no)")
            }
            Decision::ProposeMinimal { proposal, reason } => {
                if stage.accepts_text() {
                    self.project.pending = Some(Pending::new(stage, proposal.clone()));
                    format!("{}\n\n{proposal}\n\nUse this? (yes/no)", reason.lead())
                } else {
                    self.project.pending = None;
                    format!("{proposal}\n\n{}", self.prompt())
                }
            }
        };

        Turn {
            decision,
            stage: self.flow_stage(),
            notice,
            prompt,
        }
    }

    fn commit(&mut self, stage: FlowStage, value: Option<&str>) -> Result<(), String> {
        match stage {
            FlowStage::Ideation(field) => {
                if let Some(value) = value {
                    self.project.ideation.set(field, value);
                }
                Ok(())
            }
            FlowStage::Workflow(_) => {
                if let Some(value) = value {
                    self.workflow
                        .process_input(value)
                        .map_err(|e| e.to_string())?;
                }
                self.workflow.advance().map(drop).map_err(|e| e.to_string())
            }
        }
    }
}
