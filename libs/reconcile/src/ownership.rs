//! Pod ownership index.

use std::collections::BTreeMap;

use rollgate_model::{Pod, ResourceGroup};

/// Map each group UID to the pods its controller reference points at.
///
/// Every group with a UID gets an entry, empty if it owns nothing. Groups
/// without a UID cannot be pointed at and are left out. Pods without a
/// controller reference, or controlled by an unlisted UID, are skipped.
/// Inactive pods are kept: a group that still has terminating pods from an
/// older revision must not look empty.
pub fn pods_by_owner(groups: &[ResourceGroup], pods: &[Pod]) -> BTreeMap<String, Vec<Pod>> {
    let mut index: BTreeMap<String, Vec<Pod>> = groups
        .iter()
        .filter(|g| !g.metadata.uid.is_empty())
        .map(|g| (g.metadata.uid.clone(), Vec::new()))
        .collect();

    for pod in pods {
        let Some(owner) = pod.metadata.controller_ref() else {
            continue;
        };
        if let Some(owned) = index.get_mut(&owner.uid) {
            owned.push(pod.clone());
        }
    }

    index
}
