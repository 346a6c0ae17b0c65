//! Phase extraction: numbered lists with optional descriptions.

use std::sync::LazyLock;

use regex::Regex;

use crate::model::Phase;

use super::lines::{append_line, content_lines, split_description, strip_marker};

static NUMBERED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\d+[.)]\s+(.+)$").expect("numbered pattern is valid"));

/// Extracts phases, one per numbered line.
///
/// The text after the first colon or spaced dash becomes the description.
/// Unnumbered lines following a numbered one continue its description;
/// any other unnumbered line becomes a phase named by the whole line.
pub fn extract_phases(text: &str) -> Vec<Phase> {
    let mut phases: Vec<Phase> = Vec::new();
    let mut in_list = false;

    for line in content_lines(text) {
        if let Some(item) = NUMBERED.captures(line).and_then(|c| c.get(1)) {
            let (name, description) = split_description(item.as_str());
            phases.push(Phase::new(name, description));
            in_list = true;
        } else if in_list && let Some(last) = phases.last_mut() {
            append_line(&mut last.description, strip_marker(line));
        } else {
            phases.push(Phase::new(strip_marker(line), ""));
        }
    }

    phases
}
