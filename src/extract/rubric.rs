//! Rubric extraction: `Name: description` criteria.

use crate::model::RubricCriterion;

use super::lines::{content_lines, split_label, strip_marker};

/// Extracts one criterion per line; bare names get an empty description.
pub fn extract_criteria(text: &str) -> Vec<RubricCriterion> {
    content_lines(text)
        .map(strip_marker)
        .map(|line| match split_label(line) {
            Some((name, description)) => RubricCriterion::new(name, description),
            None => RubricCriterion::new(line.trim_end_matches(':').trim(), ""),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_and_bare_criteria() {
        let criteria = extract_criteria(
            "1. Research: Gathers evidence from several sources\n2. Collaboration\n3. Craftsmanship:",
        );
        assert_eq!(criteria.len(), 3);
        assert_eq!(criteria[0].name, "Research");
        assert_eq!(criteria[0].description, "Gathers evidence from several sources");
        assert_eq!(criteria[1].name, "Collaboration");
        assert!(criteria[1].description.is_empty());
        assert_eq!(criteria[2].name, "Craftsmanship");
    }
}
