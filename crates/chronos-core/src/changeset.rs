//! Change sets - ordered timelines of change events
//!
//! Insertion order is the timeline order. A change set is never re-sorted
//! implicitly, so merge order survives into the output.

use serde::{Deserialize, Serialize};

use crate::ChangeEvent;

/// Lower bound used when inverting an aggregate probability
pub const MIN_PROB: f64 = 1e-9;

/// ChangeSet - ordered, growable container of change events
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChangeSet {
    events: Vec<ChangeEvent>,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event
    pub fn add(&mut self, event: ChangeEvent) {
        self.events.push(event);
    }

    /// Insert an event before all others
    pub fn prepend(&mut self, event: ChangeEvent) {
        self.events.insert(0, event);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ChangeEvent> {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn as_slice(&self) -> &[ChangeEvent] {
        &self.events
    }

    pub fn get(&self, index: usize) -> Option<&ChangeEvent> {
        self.events.get(index)
    }

    /// Is there an event with this identifier?
    pub fn contains(&self, eid: &str) -> bool {
        self.events.iter().any(|e| e.eid == eid)
    }

    /// Earliest `t0`, if any
    pub fn earliest_start(&self) -> Option<f64> {
        self.events.iter().map(|e| e.t0).min_by(f64::total_cmp)
    }

    /// Latest `t0 + dt`, if any
    pub fn latest_end(&self) -> Option<f64> {
        self.events.iter().map(ChangeEvent::end).max_by(f64::total_cmp)
    }

    /// Sum of event durations
    pub fn total_duration(&self) -> f64 {
        self.events.iter().map(|e| e.dt).sum()
    }

    /// Probability that every event happens (product of `prob`)
    pub fn aggregate_prob(&self) -> f64 {
        self.events.iter().map(|e| e.prob).product()
    }

    /// Inverse of the aggregate probability, bounded by [`MIN_PROB`]
    pub fn risk(&self) -> f64 {
        1.0 / self.aggregate_prob().max(MIN_PROB)
    }
}

impl From<Vec<ChangeEvent>> for ChangeSet {
    fn from(events: Vec<ChangeEvent>) -> Self {
        ChangeSet { events }
    }
}

impl FromIterator<ChangeEvent> for ChangeSet {
    fn from_iter<I: IntoIterator<Item = ChangeEvent>>(iter: I) -> Self {
        ChangeSet {
            events: iter.into_iter().collect(),
        }
    }
}

impl Extend<ChangeEvent> for ChangeSet {
    fn extend<I: IntoIterator<Item = ChangeEvent>>(&mut self, iter: I) {
        self.events.extend(iter);
    }
}

impl IntoIterator for ChangeSet {
    type Item = ChangeEvent;
    type IntoIter = std::vec::IntoIter<ChangeEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.into_iter()
    }
}

impl<'a> IntoIterator for &'a ChangeSet {
    type Item = &'a ChangeEvent;
    type IntoIter = std::slice::Iter<'a, ChangeEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}
