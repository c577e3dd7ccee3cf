//! Scenario generator - seeded random ontologies for scheduling tests
//!
//! Generates:
//! - Entities spread over a handful of schemas
//! - Multi-event timelines with random offsets, durations and probabilities
//! - Dependency edges that only point from later to earlier entities
//!   (always acyclic unless a cycle is injected on purpose)

use std::collections::HashMap;

use chronos_core::{ChangeEvent, ChangeSet, ChronosResult};
use chronos_navigator::{META_SLACK_ENTITY, NavigatorConfig};
use chronos_ontology::{Entity, Ontology, OntologyConfig, Schema};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;
use tracing::debug;

/// Scenario shape
#[derive(Clone, Debug)]
pub struct ScenarioConfig {
    /// Number of entities
    pub entities: usize,
    /// Probability of an edge between any later/earlier pair
    pub edge_probability: f64,
    /// Maximum events per timeline (at least 1)
    pub max_events: usize,
    /// Maximum event start offset
    pub max_offset: f64,
    /// Base priorities are drawn from `0..=max_priority`
    pub max_priority: i64,
    /// Ontology configuration
    pub ontology: OntologyConfig,
    /// RNG seed
    pub seed: u64,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        ScenarioConfig {
            entities: 16,
            edge_probability: 0.2,
            max_events: 3,
            max_offset: 10.0,
            max_priority: 3,
            ontology: OntologyConfig::default(),
            seed: 42,
        }
    }
}

impl ScenarioConfig {
    /// No dependencies at all
    pub fn independent(entities: usize) -> Self {
        ScenarioConfig {
            entities,
            edge_probability: 0.0,
            ..Self::default()
        }
    }

    /// Many edges, long waits
    pub fn dense(entities: usize) -> Self {
        ScenarioConfig {
            entities,
            edge_probability: 0.6,
            max_events: 5,
            ..Self::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// Schemas every scenario registers: (type id, mean period, default dt)
const SCHEMAS: [(&str, f64, f64); 3] = [
    ("tea-party", 5.0, 0.5),
    ("whale", 10.0, 0.2),
    ("petunia", 15.0, 0.1),
];

/// A generated ontology with the edges that were added
pub struct Scenario {
    pub ontology: Ontology,
    pub edges: Vec<(String, String)>,
}

impl Scenario {
    /// Build a scenario from its configuration
    pub fn generate(config: &ScenarioConfig) -> ChronosResult<Self> {
        let mut rng = StdRng::seed_from_u64(config.seed);
        let mut ontology = Ontology::with_config(config.ontology.clone());

        for (type_id, period, dt) in SCHEMAS {
            ontology.add_schema(
                Schema::new(type_id, period)
                    .with_default_dt(dt)
                    .with_description("scenario schema"),
            )?;
        }

        for i in 0..config.entities {
            let eid = entity_id(i);
            let (type_id, _, _) = SCHEMAS[rng.gen_range(0..SCHEMAS.len())];
            let events = random_events(&mut rng, &eid, config);
            let priority = rng.gen_range(0..=config.max_priority.max(0));

            ontology.spawn(
                &eid,
                type_id,
                "finish",
                move |_: &Entity| Some(ChangeSet::from(events.clone())),
                0.0,
                priority,
            )?;
        }

        let mut edges = Vec::new();
        for depender in 0..config.entities {
            for dependee in 0..depender {
                if rng.gen_bool(config.edge_probability.clamp(0.0, 1.0)) {
                    ontology.add_dependency(&entity_id(depender), &entity_id(dependee))?;
                    edges.push((entity_id(depender), entity_id(dependee)));
                }
            }
        }

        debug!(
            seed = config.seed,
            entities = config.entities,
            edges = edges.len(),
            "scenario generated"
        );
        Ok(Scenario { ontology, edges })
    }

    /// Close a cycle between the first and last entity
    pub fn inject_cycle(&mut self) -> ChronosResult<()> {
        let n = self.ontology.len();
        if n == 0 {
            return Ok(());
        }
        let (first, last) = (entity_id(0), entity_id(n - 1));
        self.ontology.add_dependency(&last, &first)?;
        self.ontology.add_dependency(&first, &last)?;
        self.edges.push((last.clone(), first.clone()));
        self.edges.push((first, last));
        Ok(())
    }
}

pub fn entity_id(index: usize) -> String {
    format!("entity-{index:03}")
}

fn random_events(rng: &mut StdRng, eid: &str, config: &ScenarioConfig) -> Vec<ChangeEvent> {
    let count = rng.gen_range(1..=config.max_events.max(1));
    (0..count)
        .map(|k| {
            ChangeEvent::new(format!("{eid}/step-{k}"), rng.gen_range(0.0..=config.max_offset))
                .with_dt(rng.gen_range(0.0..2.0))
                .with_prob(rng.gen_range(0.5..=1.0))
        })
        .collect()
}

/// Float slack allowed when comparing shifted starts
const EPSILON: f64 = 1e-9;

/// Broken scheduling invariant
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Violation {
    #[error("event '{event}' is not attributable to any entity")]
    Unattributed { event: String },

    #[error("'{depender}' contributes before its dependee '{dependee}' has finished contributing")]
    OutOfOrder { depender: String, dependee: String },

    #[error("'{entity}' starts at {start} before its dependees finish at {ready_at}")]
    StartsEarly {
        entity: String,
        start: f64,
        ready_at: f64,
    },

    #[error("combined timeline has {actual} non-slack events, expected {expected}")]
    LostEvents { expected: usize, actual: usize },
}

/// Check a combined timeline against the ontology it was merged from
pub fn verify_schedule(
    ontology: &Ontology,
    timeline: &ChangeSet,
    config: &NavigatorConfig,
) -> Result<(), Violation> {
    // Which entity contributed each position of the combined timeline
    let mut owner_of_eid: HashMap<&str, &str> = HashMap::new();
    for entity in ontology.entities() {
        for event in entity.timeline() {
            owner_of_eid.insert(event.eid.as_str(), entity.eid());
        }
    }

    let mut owners: Vec<&str> = Vec::with_capacity(timeline.len());
    let slack_prefix = format!("{}::", config.slack_prefix);
    let mut regular = 0;
    for event in timeline {
        let owner = if event.eid.starts_with(&slack_prefix) {
            event
                .meta_value(META_SLACK_ENTITY)
                .and_then(|v| v.as_str())
        } else {
            regular += 1;
            owner_of_eid.get(event.eid.as_str()).copied()
        };
        let owner = owner.ok_or_else(|| Violation::Unattributed {
            event: event.eid.clone(),
        })?;
        owners.push(owner);
    }

    let expected: usize = ontology.entities().iter().map(|e| e.timeline().len()).sum();
    if regular != expected {
        return Err(Violation::LostEvents {
            expected,
            actual: regular,
        });
    }

    let first: HashMap<&str, usize> = owners
        .iter()
        .enumerate()
        .rev()
        .map(|(i, o)| (*o, i))
        .collect();
    let last: HashMap<&str, usize> = owners.iter().enumerate().map(|(i, o)| (*o, i)).collect();

    // Completion time per entity, from the merged (shifted) events
    let mut end_of: HashMap<&str, f64> = HashMap::new();
    let mut start_of: HashMap<&str, f64> = HashMap::new();
    for (event, owner) in timeline.iter().zip(&owners) {
        if event.eid.starts_with(&slack_prefix) {
            continue;
        }
        let end = end_of.entry(owner).or_insert(f64::MIN);
        *end = end.max(event.end());
        let start = start_of.entry(owner).or_insert(f64::MAX);
        *start = start.min(event.t0);
    }

    for entity in ontology.entities() {
        let depender = entity.eid();
        for (dependee, _) in ontology.dependencies_of(depender) {
            if let (Some(&done), Some(&begin)) = (last.get(dependee), first.get(depender)) {
                if done >= begin {
                    return Err(Violation::OutOfOrder {
                        depender: depender.to_string(),
                        dependee: dependee.to_string(),
                    });
                }
            }
            let bounds = (end_of.get(dependee), start_of.get(depender));
            if let (Some(&ready_at), Some(&start)) = bounds {
                if start + config.slack_tolerance + EPSILON < ready_at {
                    return Err(Violation::StartsEarly {
                        entity: depender.to_string(),
                        start,
                        ready_at,
                    });
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_scenario() {
        let config = ScenarioConfig::default().with_seed(7);
        let a = Scenario::generate(&config).unwrap();
        let b = Scenario::generate(&config).unwrap();

        assert_eq!(a.edges, b.edges);
        for (x, y) in a.ontology.entities().iter().zip(b.ontology.entities()) {
            assert_eq!(x.timeline(), y.timeline());
            assert_eq!(x.priority(), y.priority());
        }
    }

    #[test]
    fn test_edges_point_backwards() {
        let scenario = Scenario::generate(&ScenarioConfig::dense(12)).unwrap();
        assert!(!scenario.edges.is_empty());
        for (depender, dependee) in &scenario.edges {
            assert!(dependee < depender);
        }
        assert_eq!(scenario.ontology.edge_count(), scenario.edges.len());
    }

    #[test]
    fn test_independent_has_no_edges() {
        let scenario = Scenario::generate(&ScenarioConfig::independent(10)).unwrap();
        assert!(scenario.edges.is_empty());
        assert_eq!(scenario.ontology.len(), 10);
    }

    #[test]
    fn test_timelines_are_generated() {
        let scenario = Scenario::generate(&ScenarioConfig::default()).unwrap();
        for entity in scenario.ontology.entities() {
            assert!(!entity.timeline().is_empty());
            let prefix = format!("{}/step-", entity.eid());
            assert!(entity.timeline().iter().all(|e| e.eid.starts_with(&prefix)));
        }
    }

    #[test]
    fn test_verify_flags_reordered_timeline() {
        let mut ontology = Ontology::new();
        ontology.add_schema(Schema::new("task", 1.0)).unwrap();
        let a = |_: &Entity| Some(ChangeSet::from(vec![ChangeEvent::new("a", 0.0).with_dt(1.0)]));
        let b = |_: &Entity| Some(ChangeSet::from(vec![ChangeEvent::new("b", 1.0).with_dt(1.0)]));
        ontology.spawn("a", "task", "g", a, 0.0, 0).unwrap();
        ontology.spawn("b", "task", "g", b, 0.0, 0).unwrap();
        ontology.add_dependency("b", "a").unwrap();

        let good = ChangeSet::from(vec![
            ChangeEvent::new("a", 0.0).with_dt(1.0),
            ChangeEvent::new("b", 1.0).with_dt(1.0),
        ]);
        assert_eq!(verify_schedule(&ontology, &good, &NavigatorConfig::default()), Ok(()));

        let reversed = ChangeSet::from(vec![
            ChangeEvent::new("b", 1.0).with_dt(1.0),
            ChangeEvent::new("a", 0.0).with_dt(1.0),
        ]);
        assert!(matches!(
            verify_schedule(&ontology, &reversed, &NavigatorConfig::default()),
            Err(Violation::OutOfOrder { .. })
        ));

        let dropped = ChangeSet::from(vec![ChangeEvent::new("a", 0.0).with_dt(1.0)]);
        assert!(matches!(
            verify_schedule(&ontology, &dropped, &NavigatorConfig::default()),
            Err(Violation::LostEvents { .. })
        ));
    }
}
