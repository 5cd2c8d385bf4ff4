//! Object metadata shared by every snapshot type.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ModelError;

/// Label map type. Ordered so that serialized objects are stable.
pub type Labels = BTreeMap<String, String>;

// =============================================================================
// Well-known label keys
// =============================================================================

/// Label carrying the fingerprint of the template a group was created from.
pub const TEMPLATE_HASH_LABEL_KEY: &str = "apps.rollgate.io/pod-template-hash";

/// Label naming the role (core or replicant) of a group.
pub const ROLE_LABEL_KEY: &str = "apps.rollgate.io/db-role";

/// Maximum length of a label value.
pub const MAX_LABEL_VALUE_LEN: usize = 63;

/// Reference from an object to the object that owns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerReference {
    /// Kind of the owner (e.g. "ReplicaSet").
    pub kind: String,

    /// Name of the owner.
    pub name: String,

    /// UID of the owner.
    pub uid: String,

    /// True if the owner is the managing controller.
    #[serde(default)]
    pub controller: bool,
}

/// Metadata common to every object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMeta {
    pub name: String,

    #[serde(default)]
    pub namespace: String,

    #[serde(default)]
    pub uid: String,

    pub creation_timestamp: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: Labels,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub owner_references: Vec<OwnerReference>,
}

impl ObjectMeta {
    /// Creates metadata with the given name and creation time.
    pub fn new(name: impl Into<String>, creation_timestamp: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            namespace: String::new(),
            uid: String::new(),
            creation_timestamp,
            labels: Labels::new(),
            owner_references: Vec::new(),
        }
    }

    /// Returns the value of the given label, if set.
    pub fn label(&self, key: &str) -> Option<&str> {
        self.labels.get(key).map(String::as_str)
    }

    /// Returns the owner reference flagged as controller, if any.
    ///
    /// When several references claim to be the controller the first wins.
    pub fn controller_ref(&self) -> Option<&OwnerReference> {
        self.owner_references.iter().find(|r| r.controller)
    }
}

/// Anything with object metadata.
pub trait Object {
    fn meta(&self) -> &ObjectMeta;

    fn name(&self) -> &str {
        &self.meta().name
    }

    fn creation_timestamp(&self) -> DateTime<Utc> {
        self.meta().creation_timestamp
    }
}

impl Object for ObjectMeta {
    fn meta(&self) -> &ObjectMeta {
        self
    }
}

impl<T: Object + ?Sized> Object for &T {
    fn meta(&self) -> &ObjectMeta {
        (**self).meta()
    }
}

impl<T: Object + ?Sized> Object for Box<T> {
    fn meta(&self) -> &ObjectMeta {
        (**self).meta()
    }
}

/// Returns a copy of `labels` without `key`.
///
/// An empty `key` returns an unchanged copy.
pub fn clone_and_remove_label(labels: &Labels, key: &str) -> Labels {
    if key.is_empty() {
        return labels.clone();
    }
    let mut out = labels.clone();
    out.remove(key);
    out
}

/// Returns a copy of `labels` with `key` set to `value`.
///
/// An empty `key` returns an unchanged copy.
pub fn clone_and_add_label(labels: &Labels, key: &str, value: &str) -> Labels {
    if key.is_empty() {
        return labels.clone();
    }
    let mut out = labels.clone();
    out.insert(key.to_string(), value.to_string());
    out
}

/// Checks a string against the label value syntax: at most 63 characters,
/// alphanumerics plus `-`, `_` and `.`, starting and ending alphanumeric.
/// The empty string is a valid label value.
pub fn validate_label_value(value: &str) -> Result<(), ModelError> {
    let invalid = |reason| ModelError::InvalidLabelValue {
        value: value.to_string(),
        reason,
    };

    if value.is_empty() {
        return Ok(());
    }
    if value.len() > MAX_LABEL_VALUE_LEN {
        return Err(invalid("longer than 63 characters"));
    }
    if !value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
    {
        return Err(invalid("contains characters outside [A-Za-z0-9._-]"));
    }
    let first = value.chars().next().unwrap_or('-');
    let last = value.chars().last().unwrap_or('-');
    if !first.is_ascii_alphanumeric() || !last.is_ascii_alphanumeric() {
        return Err(invalid("must start and end with an alphanumeric character"));
    }
    Ok(())
}
