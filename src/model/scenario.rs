//! Scenario artifact - a named experiment + quality configuration
//!
//! Scenarios are plain-text YAML files meant to live under version control
//! next to the experiment they describe, so a readout can be reproduced
//! from the same parameters later.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::inputs::{ExperimentInputs, ModelError, QualityParams};

/// A saved calculator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    /// Scenario name
    pub name: String,

    /// Detailed description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Author name
    pub author: String,

    /// Creation timestamp
    pub created: DateTime<Utc>,

    /// True experiment parameters
    pub inputs: ExperimentInputs,

    /// Data-quality defect configuration
    #[serde(default)]
    pub quality: QualityParams,
}

impl Scenario {
    /// Create a scenario with the given name and parameters
    pub fn new(
        name: impl Into<String>,
        author: impl Into<String>,
        inputs: ExperimentInputs,
        quality: QualityParams,
    ) -> Self {
        Self {
            name: name.into(),
            description: None,
            author: author.into(),
            created: Utc::now(),
            inputs,
            quality,
        }
    }

    /// Template scenario used by `dqi scenario new`
    pub fn template(name: impl Into<String>, author: impl Into<String>) -> Self {
        Self::new(
            name,
            author,
            ExperimentInputs::new(0.10, 0.105, 10_000, 10_000),
            QualityParams::default(),
        )
    }

    /// Validate the embedded parameters
    pub fn validate(&self) -> Result<(), ModelError> {
        self.inputs.validate()?;
        self.quality.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::inputs::ArmQuality;

    #[test]
    fn test_scenario_yaml_roundtrip() {
        let mut scenario = Scenario::new(
            "checkout-test",
            "Author",
            ExperimentInputs::new(0.10, 0.12, 10_000, 12_000),
            QualityParams::asymmetric(
                ArmQuality::new(0.02, 0.01, 0.03, 0.0),
                ArmQuality::new(0.05, 0.03, 0.07, 0.01),
            ),
        );
        scenario.description = Some("New checkout flow".to_string());

        let yaml = serde_yml::to_string(&scenario).unwrap();
        let parsed: Scenario = serde_yml::from_str(&yaml).unwrap();

        assert_eq!(parsed.name, "checkout-test");
        assert_eq!(parsed.inputs.variation_n, 12_000);
        let variation = parsed.quality.variation.unwrap();
        assert!((variation.partial_data - 0.07).abs() < 1e-12);
        assert!(parsed.validate().is_ok());
    }

    #[test]
    fn test_minimal_yaml_defaults() {
        let yaml = r#"
name: minimal
author: Author
created: 2026-01-10T00:00:00Z
inputs:
  control_rate: 0.1
  variation_rate: 0.12
  control_n: 10000
  variation_n: 10000
"#;
        let parsed: Scenario = serde_yml::from_str(yaml).unwrap();
        assert_eq!(parsed.inputs.alpha, 0.05);
        assert_eq!(parsed.quality.timeframe_bias, 0.0);
        assert!(parsed.quality.variation.is_none());
        assert!(parsed.validate().is_ok());
    }

    #[test]
    fn test_template_is_valid() {
        assert!(Scenario::template("t", "a").validate().is_ok());
    }
}
