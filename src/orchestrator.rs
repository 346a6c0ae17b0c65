//! Flow orchestration: deciding what an utterance means before anything changes.
//!
//! [`classify`] looks at where the educator is, what has been captured so
//! far, and the latest utterance, and returns a [`Decision`]. It never
//! mutates anything; the session applies the decision.

pub mod defaults;
pub mod signals;

use crate::model::{FlowStage, Ideation, IdeationField, JourneyData, Pending, Segment, Stage};

use signals::{Domain, MAX_SIGNAL_TOKENS, MIN_IDEATION_TOKENS};

/// Everything [`classify`] looks at.
#[derive(Debug, Clone, Copy)]
pub struct FlowInput<'a> {
    pub stage: FlowStage,
    pub ideation: &'a Ideation,
    pub journey: &'a JourneyData,

    /// A candidate awaiting yes/no from an earlier turn. Ignored unless it
    /// was offered at `stage`.
    pub pending: Option<&'a Pending>,

    /// Whether the current workflow gate already passes.
    pub gate_open: bool,
    pub utterance: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Persist `value` (if any) and move forward.
    CommitAndAdvance { value: Option<String> },

    /// Hold `candidate` and ask the educator to confirm it.
    AwaitConfirmation { candidate: String },

    /// Offer a default instead of blocking.
    ProposeMinimal {
        proposal: String,
        reason: MinimalReason,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MinimalReason {
    Empty,
    ProgressSignal,
    Confusion,
    Declined,
}

impl MinimalReason {
    /// Lead-in shown before the proposal.
    pub fn lead(self) -> &'static str {
        match self {
            Self::Empty | Self::ProgressSignal => "Here's a simple starting point:",
            Self::Confusion => "No problem. Here's an example to react to:",
            Self::Declined => "Okay. How about this instead?",
        }
    }
}

pub fn classify(input: &FlowInput<'_>) -> Decision {
    let text = input.utterance.trim();
    if text.is_empty() {
        return minimal(input, MinimalReason::Empty);
    }

    if let Some(pending) = input.pending
        && pending.stage == input.stage
    {
        if signals::is_affirmation(text) {
            return Decision::CommitAndAdvance {
                value: Some(pending.candidate.clone()),
            };
        }
        if signals::is_negation(text) {
            return minimal(input, MinimalReason::Declined);
        }
    }

    let decision = match input.stage {
        FlowStage::Ideation(field) => classify_ideation(input, field, text),
        FlowStage::Workflow(stage) if stage.extracts() => classify_content(input, stage, text),
        FlowStage::Workflow(_) => classify_review(input, text),
    };
    tracing::debug!(stage = %input.stage, ?decision, "classified utterance");
    decision
}

fn classify_ideation(input: &FlowInput<'_>, field: IdeationField, text: &str) -> Decision {
    if signals::is_confusion_signal(text) {
        return minimal(input, MinimalReason::Confusion);
    }
    if is_bare_go_ahead(text) {
        return minimal(input, MinimalReason::ProgressSignal);
    }

    let direct = match field {
        IdeationField::EssentialQuestion => false,
        IdeationField::BigIdea | IdeationField::Challenge => {
            signals::token_count(text) >= MIN_IDEATION_TOKENS && !signals::looks_like_question(text)
        }
    };
    if direct {
        Decision::CommitAndAdvance {
            value: Some(text.to_string()),
        }
    } else {
        Decision::AwaitConfirmation {
            candidate: text.to_string(),
        }
    }
}

fn classify_content(input: &FlowInput<'_>, stage: Stage, text: &str) -> Decision {
    if signals::is_confusion_signal(text) && !signals::has_structure(text) {
        return minimal(input, MinimalReason::Confusion);
    }

    let domain = match stage.segment() {
        Segment::Journey => Domain::Journey,
        Segment::Deliver | Segment::Complete => Domain::Deliverables,
    };
    if signals::has_sufficient_content(text, domain) {
        return Decision::CommitAndAdvance {
            value: Some(text.to_string()),
        };
    }

    if is_bare_go_ahead(text) {
        if input.gate_open {
            return Decision::CommitAndAdvance { value: None };
        }
        return minimal(input, MinimalReason::ProgressSignal);
    }

    Decision::AwaitConfirmation {
        candidate: text.to_string(),
    }
}

fn classify_review(input: &FlowInput<'_>, text: &str) -> Decision {
    if signals::is_confusion_signal(text) {
        return minimal(input, MinimalReason::Confusion);
    }
    if is_bare_go_ahead(text) {
        return Decision::CommitAndAdvance { value: None };
    }
    Decision::AwaitConfirmation {
        candidate: text.to_string(),
    }
}

/// "Next", "yes", "let's continue": a short nudge with nothing else in it.
fn is_bare_go_ahead(text: &str) -> bool {
    signals::token_count(text) <= MAX_SIGNAL_TOKENS
        && (signals::is_progress_signal(text) || signals::is_affirmation(text))
}

fn minimal(input: &FlowInput<'_>, reason: MinimalReason) -> Decision {
    let proposal = match input.stage {
        FlowStage::Ideation(field) => defaults::ideation(field, input.ideation),
        FlowStage::Workflow(stage) => defaults::workflow(stage, input.journey),
    };
    Decision::ProposeMinimal { proposal, reason }
}
