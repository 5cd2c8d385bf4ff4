//! # rollgate-model
//!
//! Typed snapshots of the orchestration objects the rollout core reads.
//!
//! ## Design Principles
//!
//! - Objects are snapshots taken by an external lister; nothing here talks
//!   to the orchestration API
//! - Every object carries an [`ObjectMeta`] so comparators can stay generic
//!   over the [`Object`] trait
//! - Label maps are ordered (`BTreeMap`) and never mutated in place by the
//!   helpers in this crate
//!
//! ## Objects
//!
//! - [`ResourceGroup`]: a versioned set of workers (stateful set or replica set)
//! - [`Pod`]: a single worker, known only by its metadata
//! - [`Event`]: an observation about some involved object
//! - [`InstanceStatus`]: the owning instance's recorded revisions and conditions

mod error;
mod meta;
mod objects;
mod status;

pub use error::ModelError;
pub use meta::*;
pub use objects::*;
pub use status::*;
