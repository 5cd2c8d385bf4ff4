//! Revision classification and blue-green rollout gates.
//!
//! This library holds the decision logic of a blue-green cutover between
//! resource groups of a stateful workload. Key concepts:
//!
//! - **Current group**: the group labelled with the revision recorded in
//!   the instance status.
//! - **Old groups**: fully available groups of any other revision, retired
//!   oldest first.
//! - **Gates**: an initial delay after the instance became available, and
//!   a takeover wait after the most recent eviction.
//!
//! # Invariants
//!
//! - All operations are pure and work on snapshots listed by the caller
//! - Decisions are deterministic given the same inputs
//! - At most one group is current; scaled-to-zero groups are never old

pub mod classify;
pub mod diff;
pub mod events;
pub mod gate;
pub mod ordering;
pub mod ownership;
pub mod plan;

pub use classify::{classify_groups, classify_unmanaged, Classification};
pub use diff::{extract_template, just_check_template, DiffError};
pub use events::{filter_eviction_events, latest_event};
pub use gate::{
    initial_delay_elapsed, initial_delay_elapsed_at, takeover_wait_elapsed,
    takeover_wait_elapsed_at,
};
pub use ordering::{
    by_creation_then_name, by_last_event_then_creation, by_name_descending_newer_first,
    by_name_descending_older_first, compare_by_keys, less_than, sort_stable_by,
};
pub use ownership::pods_by_owner;
pub use plan::{
    evaluate_role, plan_cutover, CutoverDecision, GateStatus, PlanContext, RolePlan, RoleSnapshot,
};
