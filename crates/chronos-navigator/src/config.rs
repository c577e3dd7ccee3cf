//! Navigator configuration

use serde::{Deserialize, Serialize};

/// Identifier prefix of inserted wait events
pub const DEFAULT_SLACK_PREFIX: &str = "slack";

/// Navigator configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigatorConfig {
    /// Prefix of slack event identifiers (`<prefix>::<entity>`)
    pub slack_prefix: String,
    /// Gaps at or below this size are ignored: no shift, no slack event
    pub slack_tolerance: f64,
}

impl Default for NavigatorConfig {
    fn default() -> Self {
        NavigatorConfig {
            slack_prefix: DEFAULT_SLACK_PREFIX.to_string(),
            slack_tolerance: 0.0,
        }
    }
}

impl NavigatorConfig {
    /// Absorb floating point noise below `epsilon` instead of emitting
    /// tiny slack events
    pub fn tolerant(epsilon: f64) -> Self {
        NavigatorConfig {
            slack_tolerance: epsilon.max(0.0),
            ..Self::default()
        }
    }

    pub(crate) fn slack_eid(&self, entity: &str) -> String {
        format!("{}::{}", self.slack_prefix, entity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = NavigatorConfig::default();
        assert_eq!(cfg.slack_prefix, "slack");
        assert_eq!(cfg.slack_tolerance, 0.0);
        assert_eq!(cfg.slack_eid("whale"), "slack::whale");
    }

    #[test]
    fn test_tolerant_never_negative() {
        assert_eq!(NavigatorConfig::tolerant(-1.0).slack_tolerance, 0.0);
        assert_eq!(NavigatorConfig::tolerant(1e-6).slack_tolerance, 1e-6);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let cfg: NavigatorConfig = serde_json::from_str(r#"{"slack_prefix":"wait"}"#).unwrap();
        assert_eq!(cfg.slack_prefix, "wait");
        assert_eq!(cfg.slack_tolerance, 0.0);
    }
}
