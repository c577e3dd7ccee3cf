//! Topological ordering and cycle detection over the dependency graph
//!
//! Dependees always precede their dependers. Among entities whose
//! dependees are all placed, the next one is picked by:
//! 1. effective priority, descending
//! 2. metric score of its timeline, descending
//! 3. spawn order, ascending

use std::cmp::Ordering;
use std::collections::HashMap;

use chronos_core::{ChronosError, ChronosResult};
use chronos_ontology::{Entity, Ontology};

use crate::ScheduleMetric;

/// DFS marking state
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Mark {
    Visiting,
    Done,
}

/// One entity on the DFS stack and the index of its next dependency
struct Frame<'a> {
    eid: &'a str,
    dependencies: Vec<(&'a str, &'a str)>,
    next: usize,
}

impl<'a> Frame<'a> {
    fn new(ontology: &'a Ontology, eid: &'a str) -> Self {
        Frame {
            eid,
            dependencies: ontology.dependencies_of(eid),
            next: 0,
        }
    }
}

/// Fail with [`ChronosError::Cycle`] if the dependency graph has a cycle.
///
/// The reported path starts and ends on the same entity. The walk keeps
/// its own stack, so chain length is bounded by memory only.
pub fn detect_cycle(ontology: &Ontology) -> ChronosResult<()> {
    let mut marks: HashMap<&str, Mark> = HashMap::new();
    let mut stack: Vec<Frame<'_>> = Vec::new();

    for entity in ontology.entities() {
        if marks.contains_key(entity.eid()) {
            continue;
        }
        marks.insert(entity.eid(), Mark::Visiting);
        stack.push(Frame::new(ontology, entity.eid()));

        while let Some(frame) = stack.last_mut() {
            let Some(&(dependee, _)) = frame.dependencies.get(frame.next) else {
                marks.insert(frame.eid, Mark::Done);
                stack.pop();
                continue;
            };
            frame.next += 1;

            match marks.get(dependee) {
                Some(Mark::Done) => {}
                Some(Mark::Visiting) => {
                    // Back edge: the cycle is the stack suffix starting at `dependee`
                    let start = stack.iter().position(|f| f.eid == dependee).unwrap_or(0);
                    let mut path: Vec<String> =
                        stack[start..].iter().map(|f| f.eid.to_string()).collect();
                    path.push(dependee.to_string());
                    return Err(ChronosError::Cycle { path });
                }
                None => {
                    marks.insert(dependee, Mark::Visiting);
                    stack.push(Frame::new(ontology, dependee));
                }
            }
        }
    }
    Ok(())
}

/// Ranking data of one entity
#[derive(Clone, Copy, Debug)]
struct Rank {
    priority: i64,
    score: f64,
    index: usize,
}

impl Rank {
    /// `Less` means `self` goes first
    fn cmp_precedence(&self, other: &Rank) -> Ordering {
        other
            .priority
            .cmp(&self.priority)
            .then_with(|| other.score.total_cmp(&self.score))
            .then_with(|| self.index.cmp(&other.index))
    }
}

/// Position in `ready` of the entity that goes next
fn best_slot(ready: &[usize], ranks: &[Rank]) -> Option<usize> {
    ready
        .iter()
        .enumerate()
        .min_by(|(_, &a), (_, &b)| ranks[a].cmp_precedence(&ranks[b]))
        .map(|(slot, _)| slot)
}

/// Dependency-consistent merge order of every entity in the ontology.
///
/// Fails with [`ChronosError::Cycle`] before any ordering work is done.
pub fn schedule_order<'a, M>(ontology: &'a Ontology, metric: &M) -> ChronosResult<Vec<&'a Entity>>
where
    M: ScheduleMetric + ?Sized,
{
    detect_cycle(ontology)?;

    let entities = ontology.entities();
    let position: HashMap<&str, usize> = entities
        .iter()
        .enumerate()
        .map(|(i, e)| (e.eid(), i))
        .collect();

    let ranks: Vec<Rank> = entities
        .iter()
        .enumerate()
        .map(|(index, e)| Rank {
            priority: e.effective_priority(ontology),
            score: metric.score_entity(e),
            index,
        })
        .collect();

    let mut pending: Vec<usize> = entities
        .iter()
        .map(|e| ontology.dependencies_of(e.eid()).len())
        .collect();
    let mut ready: Vec<usize> = (0..entities.len()).filter(|&i| pending[i] == 0).collect();
    let mut order = Vec::with_capacity(entities.len());

    while let Some(slot) = best_slot(&ready, &ranks) {
        let next = ready.swap_remove(slot);
        let entity = &entities[next];
        order.push(entity);

        for (depender, _) in ontology.dependents_of(entity.eid()) {
            if let Some(&i) = position.get(depender) {
                pending[i] -= 1;
                if pending[i] == 0 {
                    ready.push(i);
                }
            }
        }
    }
    Ok(order)
}
