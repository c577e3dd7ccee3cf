//! Navigator - merges every entity's timeline into one combined timeline
//!
//! Entities are walked in dependency order. An entity whose timeline would
//! start before all of its dependees have finished is moved forward in
//! time, and a slack event covering the wait is inserted right before its
//! events. The combined timeline keeps merge order, not `t0` order.

use std::collections::HashMap;

use chronos_core::{ChangeEvent, ChangeSet, ChronosResult};
use chronos_ontology::{Entity, Ontology, SharedOntology};
use tracing::{debug, info, trace};

use crate::{schedule_order, InnovationMetric, NavigatorConfig, ScheduleMetric};

/// Metadata key naming the entity a slack event delays
pub const META_SLACK_ENTITY: &str = "entity";
/// Metadata key listing the dependees a slack event waits on
pub const META_SLACK_WAITS_ON: &str = "waits_on";

/// Result of one scheduling pass
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Schedule {
    /// Combined timeline in merge order
    pub timeline: ChangeSet,
    /// Entity ids in merge order
    pub order: Vec<String>,
    /// Number of slack events inserted
    pub slack_count: usize,
    /// Sum of slack durations.
    ///
    /// Each slack interval is anchored at the point of resumption
    /// (`t0 = ready_at`), so slack can extend past `makespan`.
    pub total_slack: f64,
    /// Time at which the last entity is complete (0 when empty)
    pub makespan: f64,
}

impl Schedule {
    /// Slack events of the combined timeline
    pub fn slack_events<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = &'a ChangeEvent> {
        self.timeline.iter().filter(move |e| e.eid.starts_with(prefix))
    }
}

/// Navigator - stateless, dependency-aware scheduler
#[derive(Clone, Debug, Default)]
pub struct Navigator<M = InnovationMetric> {
    metric: M,
    config: NavigatorConfig,
}

impl<M: ScheduleMetric> Navigator<M> {
    /// Create a navigator with default configuration
    pub fn new(metric: M) -> Self {
        Self::with_config(metric, NavigatorConfig::default())
    }

    /// Create a navigator with custom configuration
    pub fn with_config(metric: M, config: NavigatorConfig) -> Self {
        Navigator { metric, config }
    }

    pub fn metric(&self) -> &M {
        &self.metric
    }

    pub fn config(&self) -> &NavigatorConfig {
        &self.config
    }

    /// Order in which entities are merged
    pub fn schedule_order<'a>(&self, ontology: &'a Ontology) -> ChronosResult<Vec<&'a Entity>> {
        schedule_order(ontology, &self.metric)
    }

    /// Combined, dependency-consistent timeline of every entity
    pub fn multi_entity_schedule(&self, ontology: &Ontology) -> ChronosResult<ChangeSet> {
        self.plan(ontology).map(|schedule| schedule.timeline)
    }

    /// Schedule against a shared ontology, holding one read guard for the
    /// whole pass
    pub fn schedule_shared(&self, shared: &SharedOntology) -> ChronosResult<ChangeSet> {
        shared.with_read(|ontology| self.multi_entity_schedule(ontology))
    }

    /// Full scheduling pass with its summary
    pub fn plan(&self, ontology: &Ontology) -> ChronosResult<Schedule> {
        let order = self.schedule_order(ontology)?;
        debug!(
            order = ?order.iter().map(|e| e.eid()).collect::<Vec<_>>(),
            "merge order resolved"
        );

        let tolerance = self.config.slack_tolerance.max(0.0);
        let mut schedule = Schedule::default();
        // Point in time at which each merged entity is complete
        let mut finish: HashMap<&str, f64> = HashMap::new();

        for entity in order {
            let dependees = ontology.dependencies_of(entity.eid());
            let ready_at = dependees
                .iter()
                .filter_map(|(dependee, _)| finish.get(dependee).copied())
                .max_by(f64::total_cmp);

            let timeline = entity.timeline();
            let mut shift = 0.0;
            if let (Some(ready_at), Some(start)) = (ready_at, timeline.earliest_start()) {
                let gap = ready_at - start;
                if gap > tolerance {
                    shift = gap;
                    let waits_on: Vec<&str> = dependees.iter().map(|(d, _)| *d).collect();
                    trace!(entity = %entity.eid(), ready_at, gap, "inserting slack");
                    schedule
                        .timeline
                        .add(self.slack_event(entity.eid(), ready_at, gap, &waits_on));
                    schedule.slack_count += 1;
                    schedule.total_slack += gap;
                }
            }

            schedule
                .timeline
                .extend(timeline.iter().map(|event| event.shifted(shift)));

            let end = timeline.latest_end().map(|end| end + shift);
            if let Some(done) = [ready_at, end].into_iter().flatten().max_by(f64::total_cmp) {
                finish.insert(entity.eid(), done);
                schedule.makespan = schedule.makespan.max(done);
            }
            schedule.order.push(entity.eid().to_string());
        }

        info!(
            entities = schedule.order.len(),
            events = schedule.timeline.len(),
            slack = schedule.slack_count,
            total_slack = schedule.total_slack,
            makespan = schedule.makespan,
            "schedule merged"
        );
        Ok(schedule)
    }

    fn slack_event(&self, entity: &str, ready_at: f64, gap: f64, waits_on: &[&str]) -> ChangeEvent {
        ChangeEvent::new(self.config.slack_eid(entity), ready_at)
            .with_dt(gap)
            .with_prob(1.0)
            .with_meta(META_SLACK_ENTITY, entity)
            .with_meta(META_SLACK_WAITS_ON, waits_on.to_vec())
    }
}
