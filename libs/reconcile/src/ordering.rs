//! Deterministic orderings.
//!
//! Every comparator here is a total order with an explicit tie-break, so a
//! stable sort over the same snapshot always produces the same sequence.
//! They plug straight into `slice::sort_by`.

use std::cmp::Ordering;

use chrono::Timelike;
use rollgate_model::{Event, Object};

/// Builds a comparator from a primary key and a tie-break key.
pub fn compare_by_keys<T, K1, K2, P, B>(primary: P, tie_break: B) -> impl Fn(&T, &T) -> Ordering
where
    K1: Ord,
    K2: Ord,
    P: Fn(&T) -> K1,
    B: Fn(&T) -> K2,
{
    move |a, b| {
        primary(a)
            .cmp(&primary(b))
            .then_with(|| tie_break(a).cmp(&tie_break(b)))
    }
}

/// Turns a comparator into a less-than predicate.
pub fn less_than<T, F>(cmp: F) -> impl Fn(&T, &T) -> bool
where
    F: Fn(&T, &T) -> Ordering,
{
    move |a, b| cmp(a, b) == Ordering::Less
}

/// Stable sort of `items` under `cmp`, returning the sorted vector.
pub fn sort_stable_by<T, F>(mut items: Vec<T>, cmp: F) -> Vec<T>
where
    F: Fn(&T, &T) -> Ordering,
{
    items.sort_by(|a, b| cmp(a, b));
    items
}

/// Oldest first; equal creation times fall back to name ascending.
pub fn by_creation_then_name<T: Object>(a: &T, b: &T) -> Ordering {
    a.creation_timestamp()
        .cmp(&b.creation_timestamp())
        .then_with(|| a.name().cmp(b.name()))
}

/// Least recently observed first.
///
/// Ties compare only the second-of-minute of the creation time, not the
/// full timestamp.
pub fn by_last_event_then_creation(a: &Event, b: &Event) -> Ordering {
    compare_by_keys(
        |e: &Event| e.last_timestamp,
        |e: &Event| e.metadata.creation_timestamp.second(),
    )(a, b)
}

/// Name descending; equal names are ordered oldest first.
pub fn by_name_descending_older_first<T: Object>(a: &T, b: &T) -> Ordering {
    b.name()
        .cmp(a.name())
        .then_with(|| by_creation_then_name(a, b))
}

/// Name descending; equal names are ordered newest first.
pub fn by_name_descending_newer_first<T: Object>(a: &T, b: &T) -> Ordering {
    b.name()
        .cmp(a.name())
        .then_with(|| by_creation_then_name(b, a))
}
