//! # rollgate-fingerprint
//!
//! Deterministic fingerprints for workload templates.
//!
//! A fingerprint is stored as the template-hash label on every resource
//! group and compared across reconciliation passes, possibly on different
//! machines, so it must only depend on the template's structure:
//!
//! 1. The template is encoded into canonical text ([`canonical`]).
//! 2. The text is hashed with 32-bit FNV-1a ([`Fnv32a`]).
//! 3. An optional collision count is mixed in.
//! 4. The decimal sum is mapped onto a label-safe alphabet ([`safe_encode_string`]).
//!
//! # Invariants
//!
//! - Same (template, collision count) always yields the same fingerprint
//! - Map insertion order and owned indirection never affect the result
//! - The result is a valid label value of at most 10 characters

pub mod canonical;
mod encode;
mod hasher;

use serde::Serialize;
use tracing::warn;

pub use canonical::{to_canonical_string, CanonicalError};
pub use encode::safe_encode_string;
pub use hasher::{Fnv32a, HashState};

/// A template fingerprint, usable as a label value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Get the fingerprint string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Fingerprint {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for Fingerprint {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Fingerprint {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Resets `hasher` and writes the canonical encoding of `value` into it.
///
/// A value whose own `Serialize` impl fails cannot be encoded; the error
/// text is hashed instead so the call stays total, and a warning is logged.
pub fn deep_hash_object<H, T>(hasher: &mut H, value: &T)
where
    H: HashState + ?Sized,
    T: Serialize + ?Sized,
{
    hasher.reset();
    match to_canonical_string(value) {
        Ok(text) => hasher.write(text.as_bytes()),
        Err(e) => {
            warn!(error = %e, "template is not canonically encodable, hashing error text");
            hasher.write(format!("!error({e})").as_bytes());
        }
    }
}

/// Computes the fingerprint of `template`, salted with `collision_count`.
pub fn compute_hash<T: Serialize + ?Sized>(template: &T, collision_count: Option<i32>) -> Fingerprint {
    let mut hasher = Fnv32a::new();
    deep_hash_object(&mut hasher, template);

    if let Some(count) = collision_count {
        // Eight bytes are written; only the low four carry the count.
        let mut buf = [0u8; 8];
        buf[..4].copy_from_slice(&(count as u32).to_le_bytes());
        hasher.write(&buf);
    }

    Fingerprint(safe_encode_string(&hasher.sum32().to_string()))
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[derive(Serialize)]
    struct Template {
        image: String,
        labels: BTreeMap<String, String>,
    }

    fn template(image: &str) -> Template {
        Template {
            image: image.to_string(),
            labels: BTreeMap::from([("app".to_string(), "mq".to_string())]),
        }
    }

    #[test]
    fn test_compute_hash_deterministic() {
        assert_eq!(
            compute_hash(&template("mq:5.1"), None),
            compute_hash(&template("mq:5.1"), None)
        );
    }

    #[test]
    fn test_compute_hash_detects_change() {
        assert_ne!(
            compute_hash(&template("mq:5.1"), None),
            compute_hash(&template("mq:5.2"), None)
        );
    }

    #[test]
    fn test_collision_count_salts_hash() {
        let t = template("mq:5.1");
        let plain = compute_hash(&t, None);
        let one = compute_hash(&t, Some(1));
        let two = compute_hash(&t, Some(2));

        assert_ne!(plain, one);
        assert_ne!(one, two);
        // A zero count still appends eight zero bytes.
        assert_ne!(plain, compute_hash(&t, Some(0)));
    }

    #[test]
    fn test_collision_count_uses_low_four_bytes_only() {
        let t = template("mq:5.1");
        let mut hasher = Fnv32a::new();
        deep_hash_object(&mut hasher, &t);
        hasher.write(&[7, 0, 0, 0, 0, 0, 0, 0]);

        assert_eq!(
            compute_hash(&t, Some(7)).as_str(),
            safe_encode_string(&hasher.sum32().to_string())
        );
    }

    #[test]
    fn test_deep_hash_object_resets() {
        let mut dirty = Fnv32a::new();
        dirty.write(b"leftover");
        deep_hash_object(&mut dirty, &template("mq:5.1"));

        let mut clean = Fnv32a::new();
        deep_hash_object(&mut clean, &template("mq:5.1"));

        assert_eq!(dirty.sum32(), clean.sum32());
    }

    #[test]
    fn test_fingerprint_shape() {
        let fp = compute_hash(&template("mq:5.1"), Some(3));
        assert!(!fp.as_str().is_empty());
        assert!(fp.as_str().len() <= 10);
        assert!(fp
            .as_str()
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
    }
}
