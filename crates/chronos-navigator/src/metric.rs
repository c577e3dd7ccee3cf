//! Scoring of candidate contributions
//!
//! When several entities are eligible at once, the one whose pending
//! contribution scores higher is merged first.

use chronos_core::ChangeSet;
use chronos_ontology::Entity;
use serde::{Deserialize, Serialize};

/// Scores a candidate contribution; higher is preferred
pub trait ScheduleMetric {
    fn score(&self, contribution: &ChangeSet) -> f64;

    fn score_entity(&self, entity: &Entity) -> f64 {
        self.score(entity.timeline())
    }
}

impl<F> ScheduleMetric for F
where
    F: Fn(&ChangeSet) -> f64,
{
    fn score(&self, contribution: &ChangeSet) -> f64 {
        self(contribution)
    }
}

/// Weights of the innovation metric terms
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MetricWeights {
    pub weight_time: f64,
    pub weight_scope: f64,
    pub weight_risk: f64,
}

impl Default for MetricWeights {
    fn default() -> Self {
        MetricWeights {
            weight_time: 1.0,
            weight_scope: 1.0,
            weight_risk: 1.0,
        }
    }
}

/// Innovation metric
///
/// `score = weight_scope * events - weight_time * total_duration
///          - weight_risk * (1 / aggregate_prob)`
///
/// Broad, quick and likely contributions rank first.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct InnovationMetric {
    weights: MetricWeights,
}

impl InnovationMetric {
    pub fn new(weight_time: f64, weight_scope: f64, weight_risk: f64) -> Self {
        InnovationMetric {
            weights: MetricWeights {
                weight_time,
                weight_scope,
                weight_risk,
            },
        }
    }

    pub fn weights(&self) -> MetricWeights {
        self.weights
    }
}

impl From<MetricWeights> for InnovationMetric {
    fn from(weights: MetricWeights) -> Self {
        InnovationMetric { weights }
    }
}

impl ScheduleMetric for InnovationMetric {
    fn score(&self, contribution: &ChangeSet) -> f64 {
        let w = &self.weights;
        let scope = contribution.len() as f64;
        let time = contribution.total_duration();
        let risk = contribution.risk();

        w.weight_scope * scope - w.weight_time * time - w.weight_risk * risk
    }
}
