//! Change event definitions
//!
//! A change event is a single timed change: it starts at `t0`, lasts `dt`
//! simulated time units and happens with probability `prob`. Events are
//! immutable values; transformations return new events.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Open metadata attached to an event
pub type Meta = BTreeMap<String, serde_json::Value>;

/// Metadata key carrying an entity's base priority on its goal event
pub const META_PRIORITY: &str = "priority";

/// ChangeEvent - a single timed change
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChangeEvent {
    /// Event identifier
    pub eid: String,
    /// Start time
    pub t0: f64,
    /// Duration
    pub dt: f64,
    /// Probability of occurrence (0.0 - 1.0)
    pub prob: f64,
    /// Free-form metadata
    #[serde(default)]
    pub meta: Meta,
}

impl ChangeEvent {
    /// Create an instantaneous, certain event
    pub fn new(eid: impl Into<String>, t0: f64) -> Self {
        ChangeEvent {
            eid: eid.into(),
            t0,
            dt: 0.0,
            prob: 1.0,
            meta: Meta::new(),
        }
    }

    /// Set duration
    pub fn with_dt(mut self, dt: f64) -> Self {
        self.dt = dt;
        self
    }

    /// Set probability, clamped into [0, 1]
    pub fn with_prob(mut self, prob: f64) -> Self {
        self.prob = prob.clamp(0.0, 1.0);
        self
    }

    /// Attach one metadata entry
    pub fn with_meta(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.meta.insert(key.into(), value.into());
        self
    }

    /// End time (`t0 + dt`)
    #[inline]
    pub fn end(&self) -> f64 {
        self.t0 + self.dt
    }

    /// Copy of this event moved by `delta` along the time axis
    pub fn shifted(&self, delta: f64) -> Self {
        ChangeEvent {
            t0: self.t0 + delta,
            ..self.clone()
        }
    }

    pub fn meta_value(&self, key: &str) -> Option<&serde_json::Value> {
        self.meta.get(key)
    }
}
