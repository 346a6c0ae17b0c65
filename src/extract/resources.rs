//! Resource extraction: one resource per line.

use crate::model::{Resource, ResourceKind};

use super::lines::{content_lines, split_label, strip_marker};

/// Extracts one resource per bulleted, dashed, or plain line.
///
/// A leading type label (`Video: River of Life`) sets the type explicitly;
/// otherwise the type is detected from keywords in the line.
pub fn extract_resources(text: &str) -> Vec<Resource> {
    content_lines(text)
        .map(strip_marker)
        .map(|line| {
            if let Some((label, name)) = split_label(line)
                && let Some(kind) = ResourceKind::from_label(label)
            {
                return Resource::new(name, kind);
            }
            Resource::new(line, ResourceKind::detect(line))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_resource_per_line_with_detected_types() {
        let resources = extract_resources(
            "- Documentary video about river restoration\n\
             * Field guide book to local birds\n\
             - Clipboards and markers",
        );
        assert_eq!(resources.len(), 3);
        assert_eq!(resources[0].kind, ResourceKind::Video);
        assert_eq!(resources[0].name, "Documentary video about river restoration");
        assert_eq!(resources[1].kind, ResourceKind::Book);
        assert_eq!(resources[2].kind, ResourceKind::Other);
    }

    #[test]
    fn type_label_wins_and_is_stripped() {
        let resources = extract_resources("Expert: Dr. Lee, hydrologist");
        assert_eq!(resources[0].kind, ResourceKind::Person);
        assert_eq!(resources[0].name, "Dr. Lee, hydrologist");
    }

    #[test]
    fn unknown_label_keeps_the_whole_line() {
        let resources = extract_resources("Tuesday: library computers");
        assert_eq!(resources[0].name, "Tuesday: library computers");
        assert_eq!(resources[0].kind, ResourceKind::Other);
    }
}
