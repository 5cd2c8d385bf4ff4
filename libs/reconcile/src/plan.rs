//! Cutover planning: classification plus gates, folded into one decision.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rollgate_model::{
    ConditionType, Event, InstanceStatus, Pod, ResourceGroup, Role, UpdateStrategy,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::classify::{classify_groups, classify_unmanaged, Classification};
use crate::events::filter_eviction_events;
use crate::gate::{initial_delay_elapsed_at, takeover_wait_elapsed_at};
use crate::ownership::pods_by_owner;

/// What the outer loop should do next for one role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum CutoverDecision {
    /// The current group is missing, scaled to zero or not fully ready yet.
    AwaitCurrent,
    /// No old groups remain.
    Complete,
    /// The instance has not been available for the initial delay.
    WaitInitialDelay,
    /// An eviction from `group` happened too recently.
    WaitTakeover { group: String },
    /// Evict the next worker from `group`.
    ScaleDownOld { group: String },
}

/// Outcome of both rollout gates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
pub struct GateStatus {
    pub initial_delay_elapsed: bool,
    pub takeover_wait_elapsed: bool,
}

/// Combine a classification with the gate outcomes.
pub fn plan_cutover(classification: &Classification, gates: GateStatus) -> CutoverDecision {
    let Some(current) = &classification.current else {
        return CutoverDecision::AwaitCurrent;
    };
    if !current.is_fully_available() {
        return CutoverDecision::AwaitCurrent;
    }
    let Some(oldest) = classification.oldest() else {
        return CutoverDecision::Complete;
    };
    if !gates.initial_delay_elapsed {
        return CutoverDecision::WaitInitialDelay;
    }
    let group = oldest.metadata.name.clone();
    if !gates.takeover_wait_elapsed {
        return CutoverDecision::WaitTakeover { group };
    }
    CutoverDecision::ScaleDownOld { group }
}

/// Objects listed for one role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RoleSnapshot {
    pub groups: Vec<ResourceGroup>,
    pub pods: Vec<Pod>,
    pub events: Vec<Event>,
}

/// Inputs shared by every role of one instance.
#[derive(Debug, Clone)]
pub struct PlanContext<'a> {
    pub status: &'a InstanceStatus,
    pub strategy: &'a UpdateStrategy,
    pub revision_label_key: &'a str,
    pub now: DateTime<Utc>,
}

/// Everything decided for one role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RolePlan {
    pub role: Role,
    pub current: Option<String>,
    pub old: Vec<String>,
    /// Pod count per group name.
    pub pods: BTreeMap<String, usize>,
    pub gates: GateStatus,
    pub decision: CutoverDecision,
}

/// Run classification, event filtering, both gates and planning for a role.
///
/// An unmanaged role (no template configured) has no current revision:
/// every listed group is old and is retired without waiting on the gates.
/// Groups already scaled to zero are passed over; once only those remain
/// the role is complete.
pub fn evaluate_role(
    ctx: &PlanContext<'_>,
    role: Role,
    snapshot: &RoleSnapshot,
    managed: bool,
) -> RolePlan {
    let classification = if managed {
        let recorded = &ctx.status.nodes(role).current_revision;
        classify_groups(snapshot.groups.iter().cloned(), recorded, ctx.revision_label_key)
    } else {
        Classification {
            current: None,
            old: classify_unmanaged(snapshot.groups.iter().cloned()),
        }
    };

    let target = if managed {
        classification.oldest()
    } else {
        classification.old.iter().find(|g| !g.is_scaled_to_zero())
    };

    let evictions = match target {
        Some(oldest) => filter_eviction_events(
            snapshot
                .events
                .iter()
                .filter(|e| e.involved_object == oldest.metadata.name)
                .cloned(),
        ),
        None => Vec::new(),
    };

    let gates = GateStatus {
        initial_delay_elapsed: initial_delay_elapsed_at(
            ctx.status.condition(ConditionType::Available),
            ctx.strategy.initial_delay_seconds,
            ctx.now,
        ),
        takeover_wait_elapsed: takeover_wait_elapsed_at(
            &evictions,
            ctx.strategy.evacuation_strategy.wait_takeover,
            ctx.now,
        ),
    };

    let decision = if managed {
        plan_cutover(&classification, gates)
    } else {
        match target {
            Some(group) => CutoverDecision::ScaleDownOld {
                group: group.metadata.name.clone(),
            },
            None => CutoverDecision::Complete,
        }
    };

    let owned = pods_by_owner(&snapshot.groups, &snapshot.pods);
    let pods = snapshot
        .groups
        .iter()
        .map(|g| {
            let count = owned.get(&g.metadata.uid).map_or(0, Vec::len);
            (g.metadata.name.clone(), count)
        })
        .collect();

    debug!(%role, ?gates, evictions = evictions.len(), "Evaluated role");
    info!(%role, ?decision, "Cutover decision");

    RolePlan {
        role,
        current: classification.current.map(|g| g.metadata.name),
        old: classification
            .old
            .into_iter()
            .map(|g| g.metadata.name)
            .collect(),
        pods,
        gates,
        decision,
    }
}

#[cfg(test)]
mod tests {
    use rollgate_model::{Condition, GroupKind, NodesStatus, REASON_SUCCESSFUL_DELETE};
    use rollgate_testing::{event, group, pod, ts, GroupBuilder};

    use super::*;

    fn classification(current: Option<ResourceGroup>, old: Vec<ResourceGroup>) -> Classification {
        Classification { current, old }
    }

    const OPEN: GateStatus = GateStatus {
        initial_delay_elapsed: true,
        takeover_wait_elapsed: true,
    };

    #[test]
    fn test_plan_without_current() {
        let c = classification(None, vec![group("g1", 0, "r1", 3, 3)]);
        assert_eq!(plan_cutover(&c, OPEN), CutoverDecision::AwaitCurrent);
    }

    #[test]
    fn test_plan_current_not_ready() {
        let c = classification(Some(group("g2", 10, "r2", 3, 1)), vec![group("g1", 0, "r1", 3, 3)]);
        assert_eq!(plan_cutover(&c, OPEN), CutoverDecision::AwaitCurrent);
    }

    #[test]
    fn test_plan_current_scaled_to_zero() {
        let c = classification(Some(group("g2", 10, "r2", 0, 0)), vec![group("g1", 0, "r1", 3, 3)]);
        assert_eq!(plan_cutover(&c, OPEN), CutoverDecision::AwaitCurrent);
    }

    #[test]
    fn test_plan_complete() {
        let c = classification(Some(group("g2", 10, "r2", 3, 3)), vec![]);
        assert_eq!(plan_cutover(&c, GateStatus::default()), CutoverDecision::Complete);
    }

    #[test]
    fn test_plan_gates_in_order() {
        let c = classification(Some(group("g2", 10, "r2", 3, 3)), vec![group("g1", 0, "r1", 3, 3)]);

        assert_eq!(
            plan_cutover(&c, GateStatus::default()),
            CutoverDecision::WaitInitialDelay
        );
        assert_eq!(
            plan_cutover(
                &c,
                GateStatus {
                    initial_delay_elapsed: true,
                    takeover_wait_elapsed: false
                }
            ),
            CutoverDecision::WaitTakeover {
                group: "g1".to_string()
            }
        );
        assert_eq!(
            plan_cutover(&c, OPEN),
            CutoverDecision::ScaleDownOld {
                group: "g1".to_string()
            }
        );
    }

    fn status(revision: &str) -> InstanceStatus {
        InstanceStatus {
            conditions: vec![Condition::new(ConditionType::Available, ts(0))],
            core_nodes_status: NodesStatus {
                current_revision: revision.to_string(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_evaluate_role_waits_on_recent_eviction() {
        let status = status("r2");
        let strategy = UpdateStrategy::default();
        let ctx = PlanContext {
            status: &status,
            strategy: &strategy,
            revision_label_key: rollgate_model::TEMPLATE_HASH_LABEL_KEY,
            now: ts(100),
        };
        let snapshot = RoleSnapshot {
            groups: vec![group("g1", 0, "r1", 3, 3), group("g2", 10, "r2", 3, 3)],
            pods: vec![pod("g1-0", 0, Some("uid-g1")), pod("g2-0", 10, Some("uid-g2"))],
            events: vec![
                event("e1", REASON_SUCCESSFUL_DELETE, "g1", 95, 95),
                // Recent, but about another group.
                event("e2", REASON_SUCCESSFUL_DELETE, "g2", 99, 99),
            ],
        };

        let plan = evaluate_role(&ctx, Role::Core, &snapshot, true);

        assert_eq!(plan.current.as_deref(), Some("g2"));
        assert_eq!(plan.old, vec!["g1".to_string()]);
        assert!(plan.gates.initial_delay_elapsed);
        assert!(!plan.gates.takeover_wait_elapsed);
        assert_eq!(
            plan.decision,
            CutoverDecision::WaitTakeover {
                group: "g1".to_string()
            }
        );
        assert_eq!(plan.pods.get("g1"), Some(&1));
    }

    #[test]
    fn test_evaluate_unmanaged_role_retires_everything() {
        let status = InstanceStatus::default();
        let strategy = UpdateStrategy::default();
        let ctx = PlanContext {
            status: &status,
            strategy: &strategy,
            revision_label_key: rollgate_model::TEMPLATE_HASH_LABEL_KEY,
            now: ts(0),
        };
        let snapshot = RoleSnapshot {
            groups: vec![group("rs-b", 10, "r1", 2, 1), group("rs-a", 0, "r0", 1, 1)],
            ..Default::default()
        };

        let plan = evaluate_role(&ctx, Role::Replicant, &snapshot, false);

        assert_eq!(plan.current, None);
        assert_eq!(plan.old, vec!["rs-a".to_string(), "rs-b".to_string()]);
        assert_eq!(
            plan.decision,
            CutoverDecision::ScaleDownOld {
                group: "rs-a".to_string()
            }
        );
    }

    #[test]
    fn test_evaluate_unmanaged_role_skips_drained_groups() {
        let status = InstanceStatus::default();
        let strategy = UpdateStrategy::default();
        let ctx = PlanContext {
            status: &status,
            strategy: &strategy,
            revision_label_key: rollgate_model::TEMPLATE_HASH_LABEL_KEY,
            now: ts(0),
        };
        let replica_set = |name: &str, created: i64, desired: i32| {
            GroupBuilder::new(name)
                .kind(GroupKind::ReplicaSet)
                .created(created)
                .replicas(desired, desired)
                .build()
        };

        let snapshot = RoleSnapshot {
            groups: vec![replica_set("rs-drained", 0, 0), replica_set("rs-live", 10, 2)],
            ..Default::default()
        };
        let plan = evaluate_role(&ctx, Role::Replicant, &snapshot, false);
        assert_eq!(plan.old, vec!["rs-drained".to_string(), "rs-live".to_string()]);
        assert_eq!(
            plan.decision,
            CutoverDecision::ScaleDownOld {
                group: "rs-live".to_string()
            }
        );

        let drained = RoleSnapshot {
            groups: vec![replica_set("rs-drained", 0, 0)],
            ..Default::default()
        };
        let plan = evaluate_role(&ctx, Role::Replicant, &drained, false);
        assert_eq!(plan.decision, CutoverDecision::Complete);
    }

    #[test]
    fn test_pod_counts_ignore_groups_without_uid() {
        let status = status("r2");
        let strategy = UpdateStrategy::default();
        let ctx = PlanContext {
            status: &status,
            strategy: &strategy,
            revision_label_key: rollgate_model::TEMPLATE_HASH_LABEL_KEY,
            now: ts(100),
        };
        let mut g1 = group("g1", 0, "r1", 1, 1);
        let mut g2 = group("g2", 10, "r2", 1, 1);
        g1.metadata.uid.clear();
        g2.metadata.uid.clear();
        let snapshot = RoleSnapshot {
            groups: vec![g1, g2],
            pods: vec![pod("p-0", 0, Some(""))],
            ..Default::default()
        };

        let plan = evaluate_role(&ctx, Role::Core, &snapshot, true);

        assert_eq!(plan.pods.get("g1"), Some(&0));
        assert_eq!(plan.pods.get("g2"), Some(&0));
    }

    #[test]
    fn test_decision_serializes_with_action_tag() {
        let json = serde_json::to_value(CutoverDecision::WaitTakeover {
            group: "g1".to_string(),
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({"action": "wait_takeover", "group": "g1"}));
    }
}
