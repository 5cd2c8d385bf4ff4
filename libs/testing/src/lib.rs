//! Fixture builders shared by the rollgate test suites.
//!
//! Timestamps are expressed as second offsets from a fixed [`BASE_UNIX`]
//! so tests never depend on the wall clock unless they ask for it.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, TimeZone, Utc};
use rollgate_model::{
    Event, GroupKind, ObjectMeta, OwnerReference, Pod, ResourceGroup, TEMPLATE_HASH_LABEL_KEY,
};
use serde::Serialize;

/// 2023-11-14T22:13:20Z
pub const BASE_UNIX: i64 = 1_700_000_000;

/// The fixed base time shifted by `offset_secs`.
pub fn ts(offset_secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(BASE_UNIX + offset_secs, 0)
        .single()
        .expect("fixture timestamp in range")
}

/// Builder for [`ResourceGroup`] fixtures.
#[derive(Debug, Clone)]
pub struct GroupBuilder {
    group: ResourceGroup,
}

impl GroupBuilder {
    pub fn new(name: &str) -> Self {
        let mut metadata = ObjectMeta::new(name, ts(0));
        metadata.namespace = "default".to_string();
        metadata.uid = format!("uid-{name}");
        Self {
            group: ResourceGroup {
                metadata,
                kind: GroupKind::StatefulSet,
                desired_replicas: 1,
                ready_replicas: 1,
            },
        }
    }

    pub fn created(mut self, offset_secs: i64) -> Self {
        self.group.metadata.creation_timestamp = ts(offset_secs);
        self
    }

    pub fn revision(mut self, revision: &str) -> Self {
        self.group
            .metadata
            .labels
            .insert(TEMPLATE_HASH_LABEL_KEY.to_string(), revision.to_string());
        self
    }

    pub fn replicas(mut self, desired: i32, ready: i32) -> Self {
        self.group.desired_replicas = desired;
        self.group.ready_replicas = ready;
        self
    }

    pub fn kind(mut self, kind: GroupKind) -> Self {
        self.group.kind = kind;
        self
    }

    pub fn build(self) -> ResourceGroup {
        self.group
    }
}

/// Shorthand for a labelled group.
pub fn group(name: &str, created: i64, revision: &str, desired: i32, ready: i32) -> ResourceGroup {
    GroupBuilder::new(name)
        .created(created)
        .revision(revision)
        .replicas(desired, ready)
        .build()
}

/// An event about `involved` with the given timestamps.
pub fn event(name: &str, reason: &str, involved: &str, last: i64, created: i64) -> Event {
    Event {
        metadata: ObjectMeta::new(name, ts(created)),
        reason: reason.to_string(),
        involved_object: involved.to_string(),
        last_timestamp: ts(last),
        message: String::new(),
    }
}

/// A pod controlled by the group with `owner_uid`, if any.
pub fn pod(name: &str, created: i64, owner_uid: Option<&str>) -> Pod {
    let mut metadata = ObjectMeta::new(name, ts(created));
    if let Some(uid) = owner_uid {
        metadata.owner_references.push(OwnerReference {
            kind: "ReplicaSet".to_string(),
            name: uid.trim_start_matches("uid-").to_string(),
            uid: uid.to_string(),
            controller: true,
        });
    }
    Pod { metadata }
}

/// Nested probe definition, boxed to exercise owned indirection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Probe {
    Tcp { port: u16 },
    Http { path: String, port: u16 },
    Exec(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Container {
    pub name: String,
    pub image: String,
    pub args: Vec<String>,
    pub env: BTreeMap<String, String>,
    pub readiness: Option<Box<Probe>>,
}

/// A worker template shaped like a real pod template.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkerTemplate {
    pub labels: HashMap<String, String>,
    pub annotations: HashMap<String, String>,
    pub containers: Vec<Container>,
    pub termination_grace_seconds: Option<i64>,
    pub replicas: i32,
}

/// A representative worker template.
pub fn worker_template() -> WorkerTemplate {
    WorkerTemplate {
        labels: HashMap::from([
            ("app".to_string(), "mq".to_string()),
            ("role".to_string(), "core".to_string()),
        ]),
        annotations: HashMap::new(),
        containers: vec![Container {
            name: "mq".to_string(),
            image: "mq:5.1.0".to_string(),
            args: vec!["--cluster".to_string()],
            env: BTreeMap::from([("MQ_CLUSTER__DISCOVERY".to_string(), "dns".to_string())]),
            readiness: Some(Box::new(Probe::Http {
                path: "/status".to_string(),
                port: 18083,
            })),
        }],
        termination_grace_seconds: Some(30),
        replicas: 3,
    }
}
