//! Impact extraction: `Audience:` and `Method:` lines.

use std::sync::LazyLock;

use regex::Regex;

use crate::model::Impact;

use super::lines::{content_lines, strip_marker};

static FIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(audience|method)\s*:\s*(.*)$").expect("impact field pattern is valid")
});

/// Updates `current` from the given text.
///
/// Prefixed lines set their field. Unprefixed lines then fill the audience
/// if it is still unset, and the method otherwise.
pub fn extract_impact(text: &str, current: &Impact) -> Impact {
    let mut impact = current.clone();
    let mut loose = Vec::new();

    for line in content_lines(text).map(strip_marker) {
        match FIELD.captures(line) {
            Some(caps) => {
                let value = caps[2].trim();
                if value.is_empty() {
                    continue;
                }
                if caps[1].eq_ignore_ascii_case("audience") {
                    impact.audience = Some(value.to_string());
                } else {
                    impact.method = Some(value.to_string());
                }
            }
            None => loose.push(line),
        }
    }

    let mut loose = loose.into_iter();
    if impact.audience.is_none()
        && let Some(first) = loose.next()
    {
        impact.audience = Some(first.to_string());
    }
    let rest: Vec<&str> = loose.collect();
    if !rest.is_empty() {
        impact.method = Some(rest.join(" "));
    }

    impact
}
