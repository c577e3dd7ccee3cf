//! End-to-end Integration Test Suite
//!
//! Runs seeded scenarios through the navigator and verifies:
//! - Every entity event survives the merge
//! - Dependees are merged before their dependers
//! - No depender starts before its dependees finish
//! - Cyclic graphs are rejected as a whole

use chronos_core::ChronosError;
use chronos_navigator::{InnovationMetric, Navigator, NavigatorConfig};
use tracing::warn;

use crate::scenario::{verify_schedule, Scenario, ScenarioConfig, Violation};

// ============================================================================
// INTEGRATION TEST HARNESS
// ============================================================================

/// Configuration for integration runs
#[derive(Debug, Clone)]
pub struct IntegrationTestConfig {
    /// Scenario shape; the seed is advanced per run
    pub scenario: ScenarioConfig,

    /// Number of scenarios to run
    pub runs: usize,

    /// Close a cycle in every scenario
    pub inject_cycles: bool,

    /// Navigator configuration
    pub navigator: NavigatorConfig,
}

impl Default for IntegrationTestConfig {
    fn default() -> Self {
        Self {
            scenario: ScenarioConfig::default(),
            runs: 16,
            inject_cycles: false,
            navigator: NavigatorConfig::default(),
        }
    }
}

impl IntegrationTestConfig {
    /// Minimal test configuration
    pub fn minimal() -> Self {
        Self {
            scenario: ScenarioConfig {
                entities: 4,
                ..ScenarioConfig::default()
            },
            runs: 4,
            ..Self::default()
        }
    }

    /// Standard test configuration
    pub fn standard() -> Self {
        Self::default()
    }

    /// Stress test configuration
    pub fn stress() -> Self {
        Self {
            scenario: ScenarioConfig::dense(64),
            runs: 32,
            ..Self::default()
        }
    }

    /// Every scenario carries a cycle
    pub fn with_cycles(mut self) -> Self {
        self.inject_cycles = true;
        self
    }
}

/// Result of an integration run
#[derive(Debug, Clone, Default)]
pub struct IntegrationTestResult {
    /// Scenarios that produced a schedule
    pub scheduled: usize,

    /// Scenarios rejected because of a cycle
    pub cycles_rejected: usize,

    /// Slack events inserted across all runs
    pub slack_inserted: usize,

    /// Invariant violations, one entry per failing scenario
    pub violations: Vec<Violation>,

    /// Errors other than cycle rejections
    pub errors: Vec<ChronosError>,
}

impl IntegrationTestResult {
    /// Check if the run passed
    pub fn passed(&self) -> bool {
        self.violations.is_empty() && self.errors.is_empty()
    }
}

/// Integration test harness
pub struct IntegrationTestHarness {
    config: IntegrationTestConfig,
    navigator: Navigator<InnovationMetric>,
}

impl IntegrationTestHarness {
    /// Create a new test harness
    pub fn new(config: IntegrationTestConfig) -> Self {
        let navigator =
            Navigator::with_config(InnovationMetric::default(), config.navigator.clone());
        Self { config, navigator }
    }

    /// Run every scenario and collect the outcome
    pub fn run(&mut self) -> IntegrationTestResult {
        let mut result = IntegrationTestResult::default();

        for run in 0..self.config.runs {
            let scenario_config = self
                .config
                .scenario
                .clone()
                .with_seed(self.config.scenario.seed.wrapping_add(run as u64));

            let mut scenario = match Scenario::generate(&scenario_config) {
                Ok(scenario) => scenario,
                Err(err) => {
                    result.errors.push(err);
                    continue;
                }
            };
            if self.config.inject_cycles {
                if let Err(err) = scenario.inject_cycle() {
                    result.errors.push(err);
                    continue;
                }
            }

            match self.navigator.plan(&scenario.ontology) {
                Ok(schedule) => {
                    result.scheduled += 1;
                    result.slack_inserted += schedule.slack_count;
                    let verdict = verify_schedule(
                        &scenario.ontology,
                        &schedule.timeline,
                        self.navigator.config(),
                    );
                    if let Err(violation) = verdict {
                        warn!(run, %violation, "schedule invariant broken");
                        result.violations.push(violation);
                    }
                }
                Err(err) if err.is_cycle() => result.cycles_rejected += 1,
                Err(err) => result.errors.push(err),
            }
        }
        result
    }
}

// ============================================================================
// TEST SCENARIOS
// ============================================================================

/// Acyclic scenarios all schedule cleanly
pub fn test_acyclic_scenarios() -> IntegrationTestResult {
    IntegrationTestHarness::new(IntegrationTestConfig::standard()).run()
}

/// Cyclic scenarios are all rejected
pub fn test_cyclic_scenarios() -> IntegrationTestResult {
    IntegrationTestHarness::new(IntegrationTestConfig::minimal().with_cycles()).run()
}
