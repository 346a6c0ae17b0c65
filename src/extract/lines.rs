//! Line helpers shared by the extraction strategies.

use std::sync::LazyLock;

use regex::Regex;

/// A leading bullet (`-`, `*`, `•`, `+`) or list number (`1.`, `2)`).
static MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(?:[-*•+]|\d+[.)])\s+").expect("marker pattern is valid"));

/// Trimmed, non-empty lines.
pub(super) fn content_lines(text: &str) -> impl Iterator<Item = &str> {
    text.lines().map(str::trim).filter(|line| !line.is_empty())
}

/// Removes one leading bullet or list number.
pub(super) fn strip_marker(line: &str) -> &str {
    match MARKER.find(line) {
        Some(m) => line[m.end()..].trim(),
        None => line.trim(),
    }
}

/// Splits `Label: rest` on the first colon.
///
/// Returns `None` unless both sides carry text.
pub(super) fn split_label(line: &str) -> Option<(&str, &str)> {
    let (label, rest) = line.split_once(':')?;
    let (label, rest) = (label.trim(), rest.trim());
    (!label.is_empty() && !rest.is_empty()).then_some((label, rest))
}

/// A `Label:` line with nothing after the colon.
pub(super) fn heading(line: &str) -> Option<&str> {
    let label = line.strip_suffix(':')?.trim();
    (!label.is_empty() && !label.contains(':')).then_some(label)
}

/// Splits a name from its description at the first colon or spaced dash.
///
/// `Discovery Phase - explore the problem` and `Discovery Phase: explore the
/// problem` both give `("Discovery Phase", "explore the problem")`. Hyphenated
/// words are left alone. Without a separator the whole line is the name.
pub(super) fn split_description(line: &str) -> (&str, &str) {
    let colon = line.find(':').map(|i| (i, 1));
    let dash = [" - ", " – ", " — "]
        .iter()
        .filter_map(|sep| line.find(sep).map(|i| (i, sep.len())))
        .min_by_key(|(i, _)| *i);

    let split = match (colon, dash) {
        (Some(c), Some(d)) => Some(if c.0 < d.0 { c } else { d }),
        (c, d) => c.or(d),
    };

    match split {
        Some((at, len)) => {
            let name = line[..at].trim();
            let description = line[at + len..].trim();
            if name.is_empty() {
                (line.trim(), "")
            } else {
                (name, description)
            }
        }
        None => (line.trim(), ""),
    }
}

/// Splits a comma- or semicolon-separated list into trimmed, non-empty items.
pub(super) fn split_items(list: &str) -> impl Iterator<Item = &str> {
    list.split([',', ';'])
        .map(str::trim)
        .filter(|item| !item.is_empty())
}

/// Appends a continuation line to a description, space-separated.
pub(super) fn append_line(description: &mut String, line: &str) {
    if !description.is_empty() {
        description.push(' ');
    }
    description.push_str(line);
}
