//! Template-only views of serialized objects for patch calculation.
//!
//! The external patch calculator compares two serialized objects. Feeding
//! it the output of [`extract_template`] restricts that comparison to the
//! worker template, minus the template-hash label that differs between
//! otherwise identical revisions.

use rollgate_model::TEMPLATE_HASH_LABEL_KEY;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Errors from template extraction.
#[derive(Debug, Error)]
pub enum DiffError {
    /// The input is not a JSON object of the expected shape.
    #[error("invalid object JSON")]
    Parse(#[source] serde_json::Error),

    /// The object has no `spec.template`.
    #[error("object has no spec.template field")]
    MissingTemplate,

    /// `spec.template` exists but is not an object.
    #[error("spec.template is not a JSON object")]
    TemplateNotObject,

    /// The minimal object could not be serialized.
    #[error("failed to serialize minimal object")]
    Serialize(#[source] serde_json::Error),

    /// Another error with added context.
    #[error("{context}")]
    Context {
        context: &'static str,
        #[source]
        source: Box<DiffError>,
    },
}

impl DiffError {
    fn context(self, context: &'static str) -> Self {
        DiffError::Context {
            context,
            source: Box::new(self),
        }
    }

    /// The innermost error, skipping context layers.
    pub fn root(&self) -> &DiffError {
        match self {
            DiffError::Context { source, .. } => source.root(),
            other => other,
        }
    }
}

/// Only `spec.template` is materialized; every other field is skipped.
#[derive(Deserialize)]
struct TemplateView {
    spec: Option<SpecView>,
}

#[derive(Deserialize)]
struct SpecView {
    template: Option<Value>,
}

#[derive(Serialize)]
struct MinimalObject {
    metadata: Map<String, Value>,
    spec: MinimalSpec,
    status: Map<String, Value>,
}

#[derive(Serialize)]
struct MinimalSpec {
    template: Value,
}

fn strip_label(template: &mut Map<String, Value>, key: &str) {
    let Some(Value::Object(metadata)) = template.get_mut("metadata") else {
        return;
    };
    let Some(Value::Object(labels)) = metadata.get_mut("labels") else {
        return;
    };
    labels.remove(key);
    if labels.is_empty() {
        metadata.remove("labels");
    }
}

/// Reduce a serialized object to an empty shell holding only its template.
///
/// The template-hash label is removed from the template's metadata (an
/// emptied label map is dropped entirely).
pub fn extract_template(object: &[u8]) -> Result<Vec<u8>, DiffError> {
    let view: TemplateView = serde_json::from_slice(object).map_err(DiffError::Parse)?;
    let template = view
        .spec
        .and_then(|spec| spec.template)
        .ok_or(DiffError::MissingTemplate)?;

    let Value::Object(mut template) = template else {
        return Err(DiffError::TemplateNotObject);
    };
    strip_label(&mut template, TEMPLATE_HASH_LABEL_KEY);

    let minimal = MinimalObject {
        metadata: Map::new(),
        spec: MinimalSpec {
            template: Value::Object(template),
        },
        status: Map::new(),
    };
    serde_json::to_vec(&minimal).map_err(DiffError::Serialize)
}

/// Extract templates from both sides of a patch calculation.
///
/// Either side failing aborts the pair; nothing is defaulted.
pub fn just_check_template(current: &[u8], modified: &[u8]) -> Result<(Vec<u8>, Vec<u8>), DiffError> {
    let current = extract_template(current)
        .map_err(|e| e.context("could not get pod template field from current byte sequence"))?;
    let modified = extract_template(modified)
        .map_err(|e| e.context("could not get pod template field from modified byte sequence"))?;
    Ok((current, modified))
}
