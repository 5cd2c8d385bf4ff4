//! Instance status, conditions and update strategy.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ModelError;

/// Condition types recorded in the instance status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConditionType {
    Initialized,
    CoreNodesProgressing,
    CoreNodesReady,
    ReplicantNodesProgressing,
    ReplicantNodesReady,
    Available,
    Ready,
}

impl ConditionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConditionType::Initialized => "Initialized",
            ConditionType::CoreNodesProgressing => "CoreNodesProgressing",
            ConditionType::CoreNodesReady => "CoreNodesReady",
            ConditionType::ReplicantNodesProgressing => "ReplicantNodesProgressing",
            ConditionType::ReplicantNodesReady => "ReplicantNodesReady",
            ConditionType::Available => "Available",
            ConditionType::Ready => "Ready",
        }
    }
}

impl std::fmt::Display for ConditionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ConditionType {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Initialized" => Ok(ConditionType::Initialized),
            "CoreNodesProgressing" => Ok(ConditionType::CoreNodesProgressing),
            "CoreNodesReady" => Ok(ConditionType::CoreNodesReady),
            "ReplicantNodesProgressing" => Ok(ConditionType::ReplicantNodesProgressing),
            "ReplicantNodesReady" => Ok(ConditionType::ReplicantNodesReady),
            "Available" => Ok(ConditionType::Available),
            "Ready" => Ok(ConditionType::Ready),
            other => Err(ModelError::UnknownConditionType(other.to_string())),
        }
    }
}

/// Tri-state condition status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ConditionStatus {
    True,
    False,
    #[default]
    Unknown,
}

/// A single status condition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    #[serde(rename = "type")]
    pub condition_type: ConditionType,

    #[serde(default)]
    pub status: ConditionStatus,

    /// When the condition last changed status.
    pub last_transition_time: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub reason: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,
}

impl Condition {
    /// Creates a `True` condition that transitioned at `at`.
    pub fn new(condition_type: ConditionType, at: DateTime<Utc>) -> Self {
        Self {
            condition_type,
            status: ConditionStatus::True,
            last_transition_time: at,
            reason: String::new(),
            message: String::new(),
        }
    }
}

/// Node role within the stateful cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Stateful members backed by stateful sets.
    Core,
    /// Stateless members backed by replica sets.
    Replicant,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Core => write!(f, "core"),
            Role::Replicant => write!(f, "replicant"),
        }
    }
}

/// Recorded revision state for one role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct NodesStatus {
    pub replicas: i32,
    pub ready_replicas: i32,

    /// Fingerprint of the group currently serving.
    pub current_revision: String,

    /// Fingerprint of the group being rolled out.
    pub update_revision: String,

    /// Salt mixed into the fingerprint after a hash collision.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collision_count: Option<i32>,
}

/// Persisted status of the owning instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct InstanceStatus {
    pub conditions: Vec<Condition>,
    pub core_nodes_status: NodesStatus,
    pub replicant_nodes_status: NodesStatus,
}

impl InstanceStatus {
    /// Looks up a condition by type.
    pub fn condition(&self, condition_type: ConditionType) -> Option<&Condition> {
        self.conditions
            .iter()
            .find(|c| c.condition_type == condition_type)
    }

    /// Returns the recorded status for a role.
    pub fn nodes(&self, role: Role) -> &NodesStatus {
        match role {
            Role::Core => &self.core_nodes_status,
            Role::Replicant => &self.replicant_nodes_status,
        }
    }
}

fn default_initial_delay_seconds() -> i32 {
    10
}

fn default_wait_takeover() -> i32 {
    10
}

/// How long to wait before evicting workers from an old group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvacuationStrategy {
    /// Seconds to wait after the last eviction before evicting again.
    #[serde(default = "default_wait_takeover")]
    pub wait_takeover: i32,
}

impl Default for EvacuationStrategy {
    fn default() -> Self {
        Self {
            wait_takeover: default_wait_takeover(),
        }
    }
}

/// Blue-green update strategy settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStrategy {
    /// Seconds to wait after the instance became available before
    /// touching old groups.
    #[serde(default = "default_initial_delay_seconds")]
    pub initial_delay_seconds: i32,

    #[serde(default)]
    pub evacuation_strategy: EvacuationStrategy,
}

impl Default for UpdateStrategy {
    fn default() -> Self {
        Self {
            initial_delay_seconds: default_initial_delay_seconds(),
            evacuation_strategy: EvacuationStrategy::default(),
        }
    }
}

impl UpdateStrategy {
    /// Rejects negative durations.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.initial_delay_seconds < 0 {
            return Err(ModelError::NegativeDuration {
                field: "initialDelaySeconds",
                value: self.initial_delay_seconds,
            });
        }
        if self.evacuation_strategy.wait_takeover < 0 {
            return Err(ModelError::NegativeDuration {
                field: "waitTakeover",
                value: self.evacuation_strategy.wait_takeover,
            });
        }
        Ok(())
    }
}

/// True when the replicant role is configured with at least one replica.
pub fn replicant_enabled(replicant_replicas: Option<i32>) -> bool {
    matches!(replicant_replicas, Some(n) if n > 0)
}
