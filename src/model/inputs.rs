//! Experiment and data-quality parameters with boundary validation
//!
//! All rate-like parameters are validated at the boundary rather than
//! clamped: a value outside its documented range is an error, never a
//! silent correction.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Valid range for the signed timeframe-bias multiplier
pub const TIMEFRAME_BIAS_RANGE: (f64, f64) = (-0.5, 0.5);

/// Model-level parameter error
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("invalid parameter {field}: {value} (expected {expected})")]
    InvalidParameter {
        field: &'static str,
        value: f64,
        expected: &'static str,
    },
}

impl ModelError {
    fn rate(field: &'static str, value: f64) -> Self {
        ModelError::InvalidParameter {
            field,
            value,
            expected: "fraction in [0, 1]",
        }
    }
}

/// Check a rate-like parameter against [0, 1]
fn check_rate(field: &'static str, value: f64) -> Result<(), ModelError> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ModelError::rate(field, value))
    }
}

/// True experiment parameters, immutable per calculation
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ExperimentInputs {
    /// True control conversion rate (fraction)
    pub control_rate: f64,

    /// True variation conversion rate (fraction)
    pub variation_rate: f64,

    /// Control arm sample size (users)
    pub control_n: u64,

    /// Variation arm sample size (users)
    pub variation_n: u64,

    /// Significance level (two-sided), e.g. 0.05
    #[serde(default = "default_alpha")]
    pub alpha: f64,
}

fn default_alpha() -> f64 {
    0.05
}

impl ExperimentInputs {
    pub fn new(control_rate: f64, variation_rate: f64, control_n: u64, variation_n: u64) -> Self {
        Self {
            control_rate,
            variation_rate,
            control_n,
            variation_n,
            alpha: default_alpha(),
        }
    }

    /// True relative lift, `variation/control - 1`
    ///
    /// Zero when the control rate is zero (no meaningful ratio).
    pub fn true_lift(&self) -> f64 {
        if self.control_rate > 0.0 {
            self.variation_rate / self.control_rate - 1.0
        } else {
            0.0
        }
    }

    /// Validate all fields against their documented ranges
    pub fn validate(&self) -> Result<(), ModelError> {
        check_rate("control_rate", self.control_rate)?;
        check_rate("variation_rate", self.variation_rate)?;
        if self.control_n == 0 {
            return Err(ModelError::InvalidParameter {
                field: "control_n",
                value: 0.0,
                expected: "positive sample size",
            });
        }
        if self.variation_n == 0 {
            return Err(ModelError::InvalidParameter {
                field: "variation_n",
                value: 0.0,
                expected: "positive sample size",
            });
        }
        if !self.alpha.is_finite() || self.alpha <= 0.0 || self.alpha >= 1.0 {
            return Err(ModelError::InvalidParameter {
                field: "alpha",
                value: self.alpha,
                expected: "fraction in (0, 1) exclusive",
            });
        }
        Ok(())
    }
}

/// Data-quality defect rates for one experiment arm
///
/// Each field is the fraction of events/users affected by that defect.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArmQuality {
    /// Fraction of events never tracked at all
    pub event_loss: f64,

    /// Fraction of users attributed to the wrong arm
    pub user_id_error: f64,

    /// Fraction of events with unusable/missing properties
    pub partial_data: f64,

    /// Fraction of users assigned to the wrong segment
    pub segmentation_error: f64,
}

impl ArmQuality {
    pub fn new(event_loss: f64, user_id_error: f64, partial_data: f64, segmentation_error: f64) -> Self {
        Self {
            event_loss,
            user_id_error,
            partial_data,
            segmentation_error,
        }
    }

    /// Composite 0..100 quality score (100 = perfect tracking)
    ///
    /// Mean of the defect percentages subtracted from 100, matching the
    /// per-arm quality score shown alongside experiment readouts.
    pub fn quality_score(&self) -> f64 {
        let mean_defect_pct =
            (self.event_loss + self.user_id_error + self.partial_data + self.segmentation_error)
                / 4.0
                * 100.0;
        100.0 - mean_defect_pct
    }

    /// Sum of defect rates, used for arm-asymmetry heuristics
    pub fn defect_total(&self) -> f64 {
        self.event_loss + self.user_id_error + self.partial_data + self.segmentation_error
    }

    fn validate(&self, arm: Arm) -> Result<(), ModelError> {
        let names: [&'static str; 4] = match arm {
            Arm::Control => [
                "control.event_loss",
                "control.user_id_error",
                "control.partial_data",
                "control.segmentation_error",
            ],
            Arm::Variation => [
                "variation.event_loss",
                "variation.user_id_error",
                "variation.partial_data",
                "variation.segmentation_error",
            ],
        };
        let values = [
            self.event_loss,
            self.user_id_error,
            self.partial_data,
            self.segmentation_error,
        ];
        for (name, value) in names.into_iter().zip(values) {
            check_rate(name, value)?;
        }
        Ok(())
    }
}

/// Which experiment arm a parameter set applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Arm {
    Control,
    Variation,
}

/// Full data-quality configuration for an experiment
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct QualityParams {
    /// Control arm defect rates
    #[serde(default)]
    pub control: ArmQuality,

    /// Variation arm defect rates; when absent the control rates apply
    /// symmetrically to both arms
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variation: Option<ArmQuality>,

    /// Signed multiplicative skew on the variation arm's observed rate,
    /// modelling non-identical measurement windows between the arms.
    /// Valid range [-0.5, 0.5].
    #[serde(default)]
    pub timeframe_bias: f64,
}

impl QualityParams {
    /// Symmetric quality configuration (same rates for both arms)
    pub fn symmetric(quality: ArmQuality) -> Self {
        Self {
            control: quality,
            variation: None,
            timeframe_bias: 0.0,
        }
    }

    /// Quality configuration with independent per-arm rates
    pub fn asymmetric(control: ArmQuality, variation: ArmQuality) -> Self {
        Self {
            control,
            variation: Some(variation),
            timeframe_bias: 0.0,
        }
    }

    /// Effective variation-arm quality (mirrors control when not set)
    pub fn variation_arm(&self) -> ArmQuality {
        self.variation.unwrap_or(self.control)
    }

    /// Validate every defect rate and the timeframe-bias range
    pub fn validate(&self) -> Result<(), ModelError> {
        self.control.validate(Arm::Control)?;
        self.variation_arm().validate(Arm::Variation)?;
        let (lo, hi) = TIMEFRAME_BIAS_RANGE;
        if !self.timeframe_bias.is_finite() || self.timeframe_bias < lo || self.timeframe_bias > hi
        {
            return Err(ModelError::InvalidParameter {
                field: "timeframe_bias",
                value: self.timeframe_bias,
                expected: "multiplier in [-0.5, 0.5]",
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_inputs() -> ExperimentInputs {
        ExperimentInputs::new(0.10, 0.12, 10_000, 10_000)
    }

    #[test]
    fn test_valid_inputs_pass() {
        assert!(valid_inputs().validate().is_ok());
    }

    #[test]
    fn test_rate_bounds_are_inclusive() {
        let mut inputs = valid_inputs();
        inputs.control_rate = 0.0;
        inputs.variation_rate = 1.0;
        assert!(inputs.validate().is_ok());
    }

    #[test]
    fn test_rate_just_outside_bounds_rejected() {
        let mut inputs = valid_inputs();
        inputs.control_rate = -0.0001;
        assert!(inputs.validate().is_err());

        let mut inputs = valid_inputs();
        inputs.variation_rate = 1.0001;
        assert!(inputs.validate().is_err());
    }

    #[test]
    fn test_zero_sample_size_rejected() {
        let mut inputs = valid_inputs();
        inputs.control_n = 0;
        assert!(inputs.validate().is_err());

        let mut inputs = valid_inputs();
        inputs.variation_n = 0;
        assert!(inputs.validate().is_err());
    }

    #[test]
    fn test_alpha_open_interval() {
        let mut inputs = valid_inputs();
        inputs.alpha = 0.0;
        assert!(inputs.validate().is_err());
        inputs.alpha = 1.0;
        assert!(inputs.validate().is_err());
        inputs.alpha = 0.01;
        assert!(inputs.validate().is_ok());
    }

    #[test]
    fn test_nan_rejected() {
        let mut inputs = valid_inputs();
        inputs.control_rate = f64::NAN;
        assert!(inputs.validate().is_err());
    }

    #[test]
    fn test_quality_validation_names_arm() {
        let quality = QualityParams::asymmetric(
            ArmQuality::default(),
            ArmQuality::new(0.0, 1.5, 0.0, 0.0),
        );
        let err = quality.validate().unwrap_err();
        assert!(err.to_string().contains("variation.user_id_error"));
    }

    #[test]
    fn test_timeframe_bias_range() {
        let mut quality = QualityParams::default();
        quality.timeframe_bias = 0.5;
        assert!(quality.validate().is_ok());
        quality.timeframe_bias = -0.5;
        assert!(quality.validate().is_ok());
        quality.timeframe_bias = 0.51;
        assert!(quality.validate().is_err());
    }

    #[test]
    fn test_variation_mirrors_control_when_unset() {
        let control = ArmQuality::new(0.1, 0.05, 0.02, 0.0);
        let quality = QualityParams::symmetric(control);
        assert_eq!(quality.variation_arm(), control);
    }

    #[test]
    fn test_quality_score() {
        let perfect = ArmQuality::default();
        assert!((perfect.quality_score() - 100.0).abs() < 1e-12);

        let degraded = ArmQuality::new(0.02, 0.01, 0.03, 0.02);
        // mean defect = 2% -> score 98
        assert!((degraded.quality_score() - 98.0).abs() < 1e-9);
    }

    #[test]
    fn test_true_lift() {
        let inputs = ExperimentInputs::new(0.10, 0.12, 1000, 1000);
        assert!((inputs.true_lift() - 0.2).abs() < 1e-12);

        let zero_base = ExperimentInputs::new(0.0, 0.12, 1000, 1000);
        assert_eq!(zero_base.true_lift(), 0.0);
    }
}
