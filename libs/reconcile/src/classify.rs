//! Current/old partitioning of resource groups.

use rollgate_model::ResourceGroup;
use tracing::{debug, warn};

use crate::ordering::{by_creation_then_name, sort_stable_by};

/// Result of partitioning a role's groups against the recorded revision.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Classification {
    /// The group labelled with the recorded revision, if it exists yet.
    pub current: Option<ResourceGroup>,

    /// Fully available, non-zero old groups, oldest first.
    pub old: Vec<ResourceGroup>,
}

impl Classification {
    /// Returns true if a current group was found.
    pub fn has_current(&self) -> bool {
        self.current.is_some()
    }

    /// The first old group to retire.
    pub fn oldest(&self) -> Option<&ResourceGroup> {
        self.old.first()
    }

    /// Returns true when nothing was classified.
    pub fn is_empty(&self) -> bool {
        self.current.is_none() && self.old.is_empty()
    }
}

/// Partition groups into the current group and retirement candidates.
///
/// A group is current when its `revision_label_key` label equals
/// `recorded_revision`. Any other group is an old candidate only if it is
/// fully available with a non-zero desired count; partially ready groups
/// are mid-rollout and scaled-to-zero groups are already drained.
///
/// If several groups carry the recorded revision the last one in input
/// order wins and each displaced group is logged.
pub fn classify_groups<I>(groups: I, recorded_revision: &str, revision_label_key: &str) -> Classification
where
    I: IntoIterator<Item = ResourceGroup>,
{
    let mut current: Option<ResourceGroup> = None;
    let mut old = Vec::new();

    for group in groups {
        if group.metadata.label(revision_label_key) == Some(recorded_revision) {
            let kept = group.metadata.name.clone();
            if let Some(displaced) = current.replace(group) {
                warn!(
                    %kept,
                    displaced = %displaced.metadata.name,
                    revision = %recorded_revision,
                    "Multiple groups carry the recorded revision, keeping the later one"
                );
            }
        } else if group.is_fully_available() {
            old.push(group);
        } else {
            debug!(
                group = %group.metadata.name,
                desired = group.desired_replicas,
                ready = group.ready_replicas,
                "Skipping old group that is not fully available"
            );
        }
    }

    old.sort_by(by_creation_then_name);

    debug!(
        current = current.as_ref().map(|g| g.metadata.name.as_str()).unwrap_or("<none>"),
        old_count = old.len(),
        revision = %recorded_revision,
        "Classified groups"
    );

    Classification { current, old }
}

/// Treat every group as old, with no availability filter.
///
/// Used for a role the instance no longer defines a template for: every
/// group it left behind is to be retired.
pub fn classify_unmanaged<I>(groups: I) -> Vec<ResourceGroup>
where
    I: IntoIterator<Item = ResourceGroup>,
{
    sort_stable_by(groups.into_iter().collect(), by_creation_then_name)
}

#[cfg(test)]
mod tests {
    use rollgate_model::TEMPLATE_HASH_LABEL_KEY;
    use rollgate_testing::{group, GroupBuilder};

    use super::*;

    fn names(groups: &[ResourceGroup]) -> Vec<&str> {
        groups.iter().map(|g| g.metadata.name.as_str()).collect()
    }

    #[test]
    fn test_empty_input() {
        let c = classify_groups(Vec::new(), "r1", TEMPLATE_HASH_LABEL_KEY);
        assert!(c.is_empty());
        assert_eq!(c, Classification::default());
    }

    #[test]
    fn test_no_current_yet() {
        let c = classify_groups(
            vec![group("g1", 0, "r1", 3, 3)],
            "r2",
            TEMPLATE_HASH_LABEL_KEY,
        );
        assert!(!c.has_current());
        assert_eq!(names(&c.old), vec!["g1"]);
    }

    #[test]
    fn test_partially_ready_old_group_excluded() {
        let c = classify_groups(
            vec![group("g1", 0, "r1", 3, 2), group("g2", 10, "r2", 3, 3)],
            "r2",
            TEMPLATE_HASH_LABEL_KEY,
        );
        assert_eq!(c.current.map(|g| g.metadata.name), Some("g2".to_string()));
        assert!(c.old.is_empty());
    }

    #[test]
    fn test_unlabelled_group_is_old_candidate() {
        let unlabelled = GroupBuilder::new("legacy").replicas(2, 2).build();
        let c = classify_groups(vec![unlabelled], "r2", TEMPLATE_HASH_LABEL_KEY);
        assert_eq!(names(&c.old), vec!["legacy"]);
    }

    #[test]
    fn test_duplicate_current_last_wins() {
        let c = classify_groups(
            vec![group("first", 0, "r2", 3, 3), group("second", 5, "r2", 3, 1)],
            "r2",
            TEMPLATE_HASH_LABEL_KEY,
        );
        assert_eq!(c.current.map(|g| g.metadata.name), Some("second".to_string()));
        assert!(c.old.is_empty());
    }

    #[test]
    fn test_custom_label_key() {
        let mut g = GroupBuilder::new("g1").replicas(1, 1).build();
        g.metadata
            .labels
            .insert("example.com/rev".to_string(), "r9".to_string());

        let c = classify_groups(vec![g], "r9", "example.com/rev");
        assert!(c.has_current());
    }

    #[test]
    fn test_classify_unmanaged_keeps_everything_sorted() {
        let old = classify_unmanaged(vec![
            group("b", 10, "r1", 0, 0),
            group("a", 10, "r1", 3, 1),
            group("c", 0, "r2", 2, 2),
        ]);
        assert_eq!(names(&old), vec!["c", "a", "b"]);
    }
}
