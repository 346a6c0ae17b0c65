//! Output formatting for CLI display.

use std::fmt::Write;

use crate::model::{Ideation, IdeationField, JourneyData, Stage};
use crate::session::Session;
use crate::storage::SnapshotRecord;

/// Everything `status` shows, as one block of text.
pub(super) fn format_status(session: &Session) -> String {
    let project = session.project();
    let workflow = session.workflow();
    let progress = workflow.progress();

    let mut out = String::new();
    let _ = writeln!(out, "{} ({})", project.title, project.short_id());
    let _ = writeln!(
        out,
        "Stage: {} [{}/{}, {}%]",
        workflow.stage(),
        progress.current,
        progress.total,
        progress.percentage
    );
    if !workflow.skipped().is_empty() {
        let skipped: Vec<String> = workflow.skipped().iter().map(Stage::to_string).collect();
        let _ = writeln!(out, "Skipped: {}", skipped.join(", "));
    }

    out.push('\n');
    out.push_str(&format_ideation(&project.ideation));
    out.push('\n');
    out.push_str(&format_journey(workflow.data()));

    out.push('\n');
    if workflow.stage() == Stage::Complete {
        let _ = writeln!(out, "Design complete.");
    } else {
        match workflow.gate() {
            Ok(()) => {
                let _ = writeln!(out, "Next: ready to advance.");
            }
            Err(gate) => {
                let _ = writeln!(out, "Next: {gate}");
            }
        }
    }
    if let Some(pending) = &project.pending
        && pending.stage == session.flow_stage()
    {
        let _ = writeln!(out, "Awaiting yes/no on: {}", pending.candidate);
    }
    out
}

fn format_ideation(ideation: &Ideation) -> String {
    let mut out = String::new();
    for (field, value) in [
        (IdeationField::BigIdea, &ideation.big_idea),
        (IdeationField::EssentialQuestion, &ideation.essential_question),
        (IdeationField::Challenge, &ideation.challenge),
    ] {
        let _ = writeln!(out, "{field}: {}", value.as_deref().unwrap_or("-"));
    }
    out
}

/// Phases with their activities, then resources and deliverables.
pub(super) fn format_journey(data: &JourneyData) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Phases:");
    if data.phases.is_empty() {
        let _ = writeln!(out, "  (none)");
    }
    for (i, phase) in data.phases.iter().enumerate() {
        if phase.description.is_empty() {
            let _ = writeln!(out, "  {}. {}", i + 1, phase.name);
        } else {
            let _ = writeln!(out, "  {}. {} - {}", i + 1, phase.name, phase.description);
        }
        for activity in data.activities_for(phase.id) {
            let _ = writeln!(out, "     - {}", activity.name);
        }
    }

    if !data.resources.is_empty() {
        let _ = writeln!(out, "Resources:");
        for resource in &data.resources {
            let _ = writeln!(out, "  - {} ({})", resource.name, resource.kind);
        }
    }

    let deliverables = &data.deliverables;
    if !deliverables.milestones.is_empty() {
        let _ = writeln!(out, "Milestones:");
        for milestone in &deliverables.milestones {
            match &milestone.due_label {
                Some(due) => {
                    let _ = writeln!(out, "  - {due}: {}", milestone.name);
                }
                None => {
                    let _ = writeln!(out, "  - {}", milestone.name);
                }
            }
        }
    }
    if !deliverables.rubric.criteria.is_empty() {
        let _ = writeln!(out, "Rubric:");
        for criterion in &deliverables.rubric.criteria {
            if criterion.description.is_empty() {
                let _ = writeln!(out, "  - {}", criterion.name);
            } else {
                let _ = writeln!(out, "  - {}: {}", criterion.name, criterion.description);
            }
        }
    }
    if !deliverables.impact.is_empty() {
        let impact = &deliverables.impact;
        let _ = writeln!(out, "Impact:");
        if let Some(audience) = &impact.audience {
            let _ = writeln!(out, "  Audience: {audience}");
        }
        if let Some(method) = &impact.method {
            let _ = writeln!(out, "  Method: {method}");
        }
    }
    if !data.reflections.is_empty() {
        let _ = writeln!(out, "Reflections: {}", data.reflections.len());
    }
    out
}

pub(super) fn format_history(records: &[SnapshotRecord]) -> String {
    if records.is_empty() {
        return "No snapshots\n".to_string();
    }
    let mut out = String::new();
    for r in records {
        let _ = writeln!(
            out,
            "{:>4}  {}  {:<22}  {}",
            r.seq,
            r.saved_at.strftime("%Y-%m-%d %H:%M:%S"),
            r.state.as_str(),
            &r.digest[..12.min(r.digest.len())]
        );
    }
    out
}
