//! Dependency Quickstart
//!
//! Three entities, each with a goal and a one-event timeline. The whale
//! waits for the tea party and the petunias wait for the whale, so the
//! navigator pushes both forward and fills the waits with slack.

use chronos_core::{ChangeEvent, ChangeSet, ChronosResult};
use chronos_navigator::{InnovationMetric, Navigator, DEFAULT_SLACK_PREFIX};
use chronos_ontology::{Entity, Ontology, Schema};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Generator emitting a single event at `t0 = 0`
fn once(name: &'static str, dt: f64) -> impl Fn(&Entity) -> Option<ChangeSet> + Send + Sync {
    move |_: &Entity| Some(ChangeSet::from(vec![ChangeEvent::new(name, 0.0).with_dt(dt)]))
}

fn main() -> ChronosResult<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!("=== Chronos Dependency Quickstart ===\n");

    // 1. Schemas
    println!("1. Schemas");
    let mut onto = Ontology::new();
    onto.add_schema(
        Schema::new("tea-party", 5.0)
            .with_default_dt(0.5)
            .with_description("A tea party with Vogons"),
    )?;
    onto.add_schema(
        Schema::new("whale", 10.0)
            .with_default_dt(0.2)
            .with_description("A spontaneous whale appearance"),
    )?;
    onto.add_schema(
        Schema::new("petunia", 15.0)
            .with_default_dt(0.1)
            .with_description("A petunia uprising"),
    )?;
    for schema in onto.schemas() {
        println!("   {} (period {}): {}", schema.type_id, schema.mean_period, schema.description);
    }

    // 2. Entities
    println!("\n2. Entities");
    onto.spawn(
        "tea_entity",
        "tea-party",
        "tea-party-with-Vogon",
        once("tea-party-with-Vogon", 0.5),
        0.0,
        0,
    )?;
    onto.spawn(
        "whale_entity",
        "whale",
        "spontaneous-whale-appearance",
        once("spontaneous-whale-appearance", 0.2),
        0.0,
        0,
    )?;
    onto.spawn(
        "petunia_entity",
        "petunia",
        "petunia-uprising",
        once("petunia-uprising", 0.1),
        0.0,
        0,
    )?;
    for entity in onto.entities() {
        println!("   {} -> goal {}", entity.eid(), entity.goal().eid);
    }

    // 3. Dependencies
    println!("\n3. Dependencies");
    onto.add_dependency_with_kind("whale_entity", "tea_entity", "supports")?;
    onto.add_dependency_with_kind("petunia_entity", "whale_entity", "supports")?;
    for entity in onto.entities() {
        for (dependee, kind) in entity.dependencies(&onto) {
            println!("   {} {} {}", dependee, kind, entity.eid());
        }
        println!(
            "   {} effective priority: {}",
            entity.eid(),
            entity.effective_priority(&onto)
        );
    }

    // 4. Combined timeline
    let nav = Navigator::new(InnovationMetric::new(1.0, 1.5, 2.0));
    let schedule = nav.plan(&onto)?;
    info!(makespan = schedule.makespan, slack = schedule.slack_count, "planned");

    println!("\n4. Combined Timeline (with dependencies)");
    let slack_prefix = format!("{DEFAULT_SLACK_PREFIX}::");
    for event in &schedule.timeline {
        println!("   {} (t0: {}, dt: {})", event.eid, event.t0, event.dt);
        if event.eid.starts_with(&slack_prefix) {
            println!("     (slack: waiting on a dependency)");
        }
    }
    println!(
        "\n   {} slack events, {:.2} total slack, done at {:.2}",
        schedule.slack_count, schedule.total_slack, schedule.makespan
    );

    Ok(())
}
