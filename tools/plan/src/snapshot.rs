//! Snapshot loading and evaluation.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rollgate_model::{replicant_enabled, InstanceStatus, Role, UpdateStrategy};
use rollgate_reconcile::{evaluate_role, PlanContext, RolePlan, RoleSnapshot};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::Config;

/// Objects captured from a cluster for one instance.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Snapshot {
    pub status: InstanceStatus,
    pub strategy: Option<UpdateStrategy>,
    /// Replica count of the replicant template; absent means no replicants.
    pub replicant_replicas: Option<i32>,
    pub core: RoleSnapshot,
    pub replicant: RoleSnapshot,
}

/// Decisions for every role.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub evaluated_at: DateTime<Utc>,
    pub strategy: UpdateStrategy,
    pub roles: Vec<RolePlan>,
}

impl Snapshot {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::parse(&contents).with_context(|| format!("invalid snapshot: {}", path.display()))
    }

    pub fn parse(contents: &str) -> Result<Self> {
        Ok(serde_json::from_str(contents)?)
    }

    /// The snapshot's strategy with configuration overrides applied.
    pub fn effective_strategy(&self, config: &Config) -> Result<UpdateStrategy> {
        let mut strategy = self.strategy.clone().unwrap_or_default();
        if let Some(secs) = config.initial_delay_seconds {
            strategy.initial_delay_seconds = secs;
        }
        if let Some(secs) = config.wait_takeover_seconds {
            strategy.evacuation_strategy.wait_takeover = secs;
        }
        strategy.validate()?;
        Ok(strategy)
    }

    /// Evaluate both roles as of `now`.
    pub fn evaluate(&self, strategy: UpdateStrategy, revision_label_key: &str, now: DateTime<Utc>) -> Report {
        let ctx = PlanContext {
            status: &self.status,
            strategy: &strategy,
            revision_label_key,
            now,
        };

        let replicants = replicant_enabled(self.replicant_replicas);
        debug!(replicants, "Replicant role configured");

        let mut roles = vec![evaluate_role(&ctx, Role::Core, &self.core, true)];
        if replicants || !self.replicant.groups.is_empty() {
            roles.push(evaluate_role(&ctx, Role::Replicant, &self.replicant, replicants));
        }

        Report {
            evaluated_at: now,
            strategy,
            roles,
        }
    }
}
