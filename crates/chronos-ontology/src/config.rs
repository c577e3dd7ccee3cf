//! Ontology configuration

use serde::{Deserialize, Serialize};

/// What happens to the goal event when a generator replaces a timeline
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalPolicy {
    /// Keep whatever the generator returned, even without the goal event.
    /// The goal stays reachable through `Entity::goal`.
    #[default]
    AsGenerated,
    /// Prepend the goal event whenever a generated timeline lacks it
    AlwaysInclude,
}

/// Ontology configuration
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OntologyConfig {
    #[serde(default)]
    pub goal_policy: GoalPolicy,
}

impl OntologyConfig {
    /// Configuration that never lets a generator drop the goal event
    pub fn strict() -> Self {
        OntologyConfig {
            goal_policy: GoalPolicy::AlwaysInclude,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_keeps_generated_timeline() {
        assert_eq!(OntologyConfig::default().goal_policy, GoalPolicy::AsGenerated);
        assert_eq!(OntologyConfig::strict().goal_policy, GoalPolicy::AlwaysInclude);
    }

    #[test]
    fn test_policy_from_json() {
        let cfg: OntologyConfig =
            serde_json::from_str(r#"{"goal_policy":"always_include"}"#).unwrap();
        assert_eq!(cfg, OntologyConfig::strict());

        let empty: OntologyConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(empty, OntologyConfig::default());
    }
}
