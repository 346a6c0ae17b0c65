//! Milestone extraction: `Week N: ...` checkpoints.

use std::sync::LazyLock;

use regex::Regex;

use crate::model::Milestone;

use super::lines::{content_lines, strip_marker};

static WEEK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^week\s*(\d+)\s*(?::|[-–—]\s)\s*(.+)$").expect("week pattern is valid")
});

/// Extracts one milestone per line.
///
/// `Week 3: Prototype review` is named `Prototype review` and due `Week 3`.
/// Lines without a week prefix become milestones named by the whole line.
pub fn extract_milestones(text: &str) -> Vec<Milestone> {
    content_lines(text)
        .map(strip_marker)
        .map(|line| match WEEK.captures(line) {
            Some(caps) => Milestone::new(caps[2].trim(), Some(format!("Week {}", &caps[1]))),
            None => Milestone::new(line, None),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn week_prefix_sets_name_and_due_label() {
        let milestones = extract_milestones("Week 2: Research summary\nweek4 - Prototype check-in");
        assert_eq!(milestones.len(), 2);
        assert_eq!(milestones[0].name, "Research summary");
        assert_eq!(milestones[0].due_label.as_deref(), Some("Week 2"));
        assert_eq!(milestones[1].name, "Prototype check-in");
        assert_eq!(milestones[1].due_label.as_deref(), Some("Week 4"));
    }

    #[test]
    fn other_lines_are_whole_milestones() {
        let milestones = extract_milestones("- Final exhibition night");
        assert_eq!(milestones[0].name, "Final exhibition night");
        assert_eq!(milestones[0].due_label, None);
        assert_eq!(milestones[0].phase_id, None);
    }
}
