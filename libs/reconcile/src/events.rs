//! Eviction event selection.

use rollgate_model::Event;

use crate::ordering::by_last_event_then_creation;

/// Keep only successful-eviction events, least recent first.
///
/// The last element is the most recent eviction.
pub fn filter_eviction_events<I>(events: I) -> Vec<Event>
where
    I: IntoIterator<Item = Event>,
{
    let mut evictions: Vec<Event> = events
        .into_iter()
        .filter(Event::is_successful_delete)
        .collect();
    evictions.sort_by(by_last_event_then_creation);
    evictions
}

/// The greatest event under [`by_last_event_then_creation`].
///
/// Among equal events the one latest in input order is returned, which
/// matches the last element of a stably sorted list.
pub fn latest_event(events: &[Event]) -> Option<&Event> {
    events
        .iter()
        .max_by(|a, b| by_last_event_then_creation(a, b))
}
