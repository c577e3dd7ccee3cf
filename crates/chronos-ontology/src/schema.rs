//! Schema - immutable descriptor of an entity type

use chronos_core::{ChronosError, ChronosResult, Meta};
use serde::{Deserialize, Serialize};

/// Entity type descriptor
///
/// Registered once per ontology and shared read-only by every entity of
/// that type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    /// Unique type key
    pub type_id: String,
    /// Expected time between recurring events (> 0)
    pub mean_period: f64,
    /// Default event duration (>= 0)
    #[serde(default)]
    pub default_dt: f64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub meta: Meta,
}

impl Schema {
    pub fn new(type_id: impl Into<String>, mean_period: f64) -> Self {
        Schema {
            type_id: type_id.into(),
            mean_period,
            default_dt: 0.0,
            description: String::new(),
            meta: Meta::new(),
        }
    }

    pub fn with_default_dt(mut self, default_dt: f64) -> Self {
        self.default_dt = default_dt;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_meta(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.meta.insert(key.into(), value.into());
        self
    }

    /// Check the period and duration bounds
    pub fn validate(&self) -> ChronosResult<()> {
        if !self.mean_period.is_finite() || self.mean_period <= 0.0 {
            return Err(self.invalid(format!(
                "mean_period must be a positive number, got {}",
                self.mean_period
            )));
        }
        if !self.default_dt.is_finite() || self.default_dt < 0.0 {
            return Err(self.invalid(format!(
                "default_dt must be non-negative, got {}",
                self.default_dt
            )));
        }
        Ok(())
    }

    fn invalid(&self, reason: String) -> ChronosError {
        ChronosError::InvalidSchema {
            type_id: self.type_id.clone(),
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let schema = Schema::new("tea-party", 5.0)
            .with_default_dt(0.5)
            .with_description("A tea party with Vogons")
            .with_meta("guests", 3);

        assert_eq!(schema.type_id, "tea-party");
        assert_eq!(schema.default_dt, 0.5);
        assert_eq!(schema.meta.get("guests"), Some(&serde_json::json!(3)));
        assert!(schema.validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_period() {
        for period in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let err = Schema::new("bad", period).validate().unwrap_err();
            assert!(matches!(err, ChronosError::InvalidSchema { .. }));
        }
    }

    #[test]
    fn test_rejects_negative_duration() {
        let err = Schema::new("bad", 1.0)
            .with_default_dt(-0.1)
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("default_dt"));
    }
}
