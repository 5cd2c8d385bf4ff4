//! Resource groups, pods and events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::meta::{Object, ObjectMeta, TEMPLATE_HASH_LABEL_KEY};

/// Event reason recorded when a group controller deleted one of its pods.
pub const REASON_SUCCESSFUL_DELETE: &str = "SuccessfulDelete";

/// Kind of workload object backing a resource group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum GroupKind {
    /// Ordered, stably-named workers (core nodes).
    #[default]
    StatefulSet,
    /// Interchangeable workers (replicant nodes).
    ReplicaSet,
}

impl std::fmt::Display for GroupKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GroupKind::StatefulSet => write!(f, "StatefulSet"),
            GroupKind::ReplicaSet => write!(f, "ReplicaSet"),
        }
    }
}

/// One versioned deployment unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceGroup {
    pub metadata: ObjectMeta,

    #[serde(default)]
    pub kind: GroupKind,

    /// Replica count the group is asked to run.
    pub desired_replicas: i32,

    /// Replicas currently reporting ready.
    #[serde(default)]
    pub ready_replicas: i32,
}

impl ResourceGroup {
    /// The template fingerprint this group was created from, if labelled.
    pub fn revision(&self) -> Option<&str> {
        self.metadata.label(TEMPLATE_HASH_LABEL_KEY)
    }

    /// True when the group is scaled to zero.
    pub fn is_scaled_to_zero(&self) -> bool {
        self.desired_replicas == 0
    }

    /// True when every desired replica is ready and at least one is desired.
    pub fn is_fully_available(&self) -> bool {
        self.desired_replicas != 0 && self.ready_replicas == self.desired_replicas
    }
}

impl Object for ResourceGroup {
    fn meta(&self) -> &ObjectMeta {
        &self.metadata
    }
}

/// A single worker instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pod {
    pub metadata: ObjectMeta,
}

impl Object for Pod {
    fn meta(&self) -> &ObjectMeta {
        &self.metadata
    }
}

/// An observation about some object, as recorded by the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub metadata: ObjectMeta,

    /// Machine-readable reason, e.g. `SuccessfulDelete`.
    pub reason: String,

    /// Name of the object the event is about.
    #[serde(default)]
    pub involved_object: String,

    /// When the event was last observed.
    pub last_timestamp: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,
}

impl Event {
    /// True if this event records a successful scale-down eviction.
    pub fn is_successful_delete(&self) -> bool {
        self.reason == REASON_SUCCESSFUL_DELETE
    }
}

impl Object for Event {
    fn meta(&self) -> &ObjectMeta {
        &self.metadata
    }
}
