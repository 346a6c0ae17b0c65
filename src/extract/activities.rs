//! Activity extraction: `Phase: item, item` groupings.

use std::sync::LazyLock;

use regex::Regex;

use crate::model::{Activity, Phase};

use super::lines::{content_lines, heading, split_items, split_label, strip_marker};
use super::{ExtractError, UnmatchedActivity};

/// `Phase 2` style labels, resolved by position.
static PHASE_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^phase\s*(\d+)$").expect("phase number pattern is valid"));

/// Extracts activities and attributes each one to a phase.
///
/// `Research: Interview experts, Survey community` yields two activities for
/// the phase named `Research` (matched case-insensitively). A `Research:` line
/// on its own opens a block: following lines belong to that phase until the
/// next label. A line with no label and no open block is one activity as a
/// whole; with a single phase it belongs there, otherwise `unmatched` decides.
pub fn extract_activities(
    text: &str,
    phases: &[Phase],
    unmatched: UnmatchedActivity,
) -> Result<Vec<Activity>, ExtractError> {
    let Some(first) = phases.first() else {
        return Err(ExtractError::NoPhases);
    };

    let mut activities = Vec::new();
    let mut block: Option<&Phase> = None;

    for line in content_lines(text) {
        let line = strip_marker(line);

        if let Some(label) = heading(line) {
            block = Some(resolve(label, phases, unmatched)?);
            continue;
        }

        // Inside a block, `Visit: the museum` is an item unless `Visit` names a phase.
        if let Some((label, items)) = split_label(line) {
            let phase = match block {
                Some(_) => find_phase(label, phases),
                None => Some(resolve(label, phases, unmatched)?),
            };
            if let Some(phase) = phase {
                activities.extend(split_items(items).map(|item| Activity::new(phase.id, item, "")));
                continue;
            }
        }

        let phase = match block {
            Some(phase) => phase,
            None if phases.len() == 1 || unmatched == UnmatchedActivity::FirstPhase => first,
            None => {
                return Err(ExtractError::MissingPhaseLabel {
                    activity: line.to_string(),
                    known: names(phases),
                });
            }
        };
        activities.push(Activity::new(phase.id, line, ""));
    }

    Ok(activities)
}

/// Resolves a label to a phase, applying the unmatched policy.
fn resolve<'a>(
    label: &str,
    phases: &'a [Phase],
    unmatched: UnmatchedActivity,
) -> Result<&'a Phase, ExtractError> {
    if let Some(phase) = find_phase(label, phases) {
        return Ok(phase);
    }
    match unmatched {
        UnmatchedActivity::FirstPhase => {
            tracing::debug!(label, "no phase matches label; attributing to first phase");
            Ok(&phases[0])
        }
        UnmatchedActivity::Reject => Err(ExtractError::UnknownPhase {
            label: label.to_string(),
            known: names(phases),
        }),
    }
}

/// Exact case-insensitive name, then `Phase N`, then whole-word containment
/// either way (`Design` finds `Design Phase`). Containment that fits more than
/// one phase finds none.
pub(crate) fn find_phase<'a>(label: &str, phases: &'a [Phase]) -> Option<&'a Phase> {
    let wanted = label.trim().to_lowercase();
    if wanted.is_empty() {
        return None;
    }

    if let Some(phase) = phases.iter().find(|p| p.name.to_lowercase() == wanted) {
        return Some(phase);
    }

    if let Some(n) = PHASE_NUMBER
        .captures(&wanted)
        .and_then(|c| c[1].parse::<usize>().ok())
        && let Some(phase) = n.checked_sub(1).and_then(|i| phases.get(i))
    {
        return Some(phase);
    }

    let wanted = words(&wanted);
    let mut found = phases.iter().filter(|p| {
        let name = words(&p.name);
        is_subset(&wanted, &name) || is_subset(&name, &wanted)
    });
    match (found.next(), found.next()) {
        (Some(phase), None) => Some(phase),
        _ => None,
    }
}

fn words(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

fn is_subset(part: &[String], whole: &[String]) -> bool {
    !part.is_empty() && part.iter().all(|w| whole.contains(w))
}

fn names(phases: &[Phase]) -> Vec<String> {
    phases.iter().map(|p| p.name.clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_phases() -> Vec<Phase> {
        vec![
            Phase::new("Research", "learn the background"),
            Phase::new("Design Phase", "build solutions"),
        ]
    }

    #[test]
    fn grouping_line_yields_one_activity_per_item() {
        let phases = vec![Phase::new("Research", "")];
        let activities = extract_activities(
            "Research: Interview experts, Survey community",
            &phases,
            UnmatchedActivity::FirstPhase,
        )
        .unwrap();

        assert_eq!(activities.len(), 2);
        assert!(activities.iter().all(|a| a.phase_id == phases[0].id));
        assert_eq!(activities[0].name, "Interview experts");
        assert_eq!(activities[1].name, "Survey community");
    }

    #[test]
    fn matches_phase_names_case_insensitively_and_loosely() {
        let phases = sample_phases();
        let activities = extract_activities(
            "research: Read articles\nDESIGN: Sketch\nPhase 2: Prototype",
            &phases,
            UnmatchedActivity::Reject,
        )
        .unwrap();

        assert_eq!(activities[0].phase_id, phases[0].id);
        assert_eq!(activities[1].phase_id, phases[1].id);
        assert_eq!(activities[2].phase_id, phases[1].id);
    }

    #[test]
    fn heading_opens_a_block() {
        let phases = sample_phases();
        let activities = extract_activities(
            "Design Phase:\n- Sketch ideas\n- Build a model\nResearch: Library visit",
            &phases,
            UnmatchedActivity::Reject,
        )
        .unwrap();

        assert_eq!(activities.len(), 3);
        assert_eq!(activities[0].phase_id, phases[1].id);
        assert_eq!(activities[1].phase_id, phases[1].id);
        assert_eq!(activities[2].phase_id, phases[0].id);
    }

    #[test]
    fn unknown_label_falls_back_to_first_phase() {
        let phases = sample_phases();
        let activities = extract_activities(
            "Week one: Kickoff assembly",
            &phases,
            UnmatchedActivity::FirstPhase,
        )
        .unwrap();

        assert_eq!(activities.len(), 1);
        assert_eq!(activities[0].phase_id, phases[0].id);
    }

    #[test]
    fn unknown_label_is_rejected_under_strict_matching() {
        let phases = sample_phases();
        let err = extract_activities(
            "Week one: Kickoff assembly",
            &phases,
            UnmatchedActivity::Reject,
        )
        .unwrap_err();

        assert!(matches!(err, ExtractError::UnknownPhase { ref label, .. } if label == "Week one"));
        assert!(err.to_string().contains("Research, Design Phase"));
    }

    #[test]
    fn unlabeled_line_needs_a_phase_when_ambiguous() {
        let phases = sample_phases();
        let err = extract_activities("Gallery walk", &phases, UnmatchedActivity::Reject)
            .unwrap_err();
        assert!(matches!(err, ExtractError::MissingPhaseLabel { .. }));

        let activities =
            extract_activities("Gallery walk", &phases, UnmatchedActivity::FirstPhase).unwrap();
        assert_eq!(activities[0].phase_id, phases[0].id);
    }

    #[test]
    fn colon_inside_a_block_stays_in_the_block() {
        let phases = sample_phases();
        let activities = extract_activities(
            "Design Phase:\n- Visit: the science museum",
            &phases,
            UnmatchedActivity::FirstPhase,
        )
        .unwrap();

        assert_eq!(activities.len(), 1);
        assert_eq!(activities[0].name, "Visit: the science museum");
        assert_eq!(activities[0].phase_id, phases[1].id);
    }

    #[test]
    fn partial_words_do_not_match_a_phase() {
        let phases = vec![Phase::new("Start Up", ""), Phase::new("Art Show", "")];
        let activities =
            extract_activities("Art: Paint mural", &phases, UnmatchedActivity::Reject).unwrap();
        assert_eq!(activities[0].phase_id, phases[1].id);

        let phases = vec![Phase::new("Start Up", ""), Phase::new("Showcase", "")];
        let err = extract_activities("Art: Paint mural", &phases, UnmatchedActivity::Reject)
            .unwrap_err();
        assert!(matches!(err, ExtractError::UnknownPhase { ref label, .. } if label == "Art"));
    }

    #[test]
    fn label_fitting_several_phases_is_unknown() {
        let phases = vec![Phase::new("Field Work", ""), Phase::new("Field Report", "")];
        let err = extract_activities("Field: Collect samples", &phases, UnmatchedActivity::Reject)
            .unwrap_err();
        assert!(matches!(err, ExtractError::UnknownPhase { .. }));
    }

    #[test]
    fn no_phases_is_an_error() {
        let err = extract_activities("Research: Read", &[], UnmatchedActivity::FirstPhase)
            .unwrap_err();
        assert_eq!(err, ExtractError::NoPhases);
    }
}
