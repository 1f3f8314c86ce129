//! Pipeline domain types

use serde::{Deserialize, Serialize};

/// A pipeline registered with the service, as seen in a listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineRef {
    pub id: String,
    pub display_name: String,
}

impl PipelineRef {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
        }
    }
}

/// Find the first pipeline whose display name equals `display_name`
///
/// Matching is exact and case-sensitive. When several pipelines share the
/// name, the earliest one in `pipelines` wins.
pub fn find_by_display_name<'a>(
    pipelines: &'a [PipelineRef],
    display_name: &str,
) -> Option<&'a PipelineRef> {
    pipelines.iter().find(|p| p.display_name == display_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_exact_match() {
        let pipelines = vec![
            PipelineRef::new("p1", "instructlab"),
            PipelineRef::new("p2", "InstructLab"),
        ];

        let found = find_by_display_name(&pipelines, "InstructLab").unwrap();
        assert_eq!(found.id, "p2");
    }

    #[test]
    fn test_find_no_match() {
        let pipelines = vec![PipelineRef::new("p1", "training")];
        assert!(find_by_display_name(&pipelines, "train").is_none());
        assert!(find_by_display_name(&[], "training").is_none());
    }

    #[test]
    fn test_find_duplicate_names_first_wins() {
        let pipelines = vec![
            PipelineRef::new("first", "dup"),
            PipelineRef::new("second", "dup"),
        ];

        assert_eq!(find_by_display_name(&pipelines, "dup").unwrap().id, "first");
    }
}
