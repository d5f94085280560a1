//! Qualitative recommendation from the computed impact metrics
//!
//! The mapping is an explicit ordered rule table: the first rule whose
//! predicate holds wins, and a mandatory default makes the function total.
//! Threshold values are calibration constants, not inferred business
//! rules; see DESIGN.md.

use serde::{Deserialize, Serialize};

/// Relative lift error at or below which dilution is flagged
pub const DILUTION_ALERT: f64 = -0.20;

/// Relative lift error at or above which inflation is flagged
pub const INFLATION_ALERT: f64 = 0.20;

/// Relative lift error band considered faithful to the true lift
pub const RELIABLE_LIFT_TOLERANCE: f64 = 0.10;

/// Minimum statistical power for a result to be called reliable
pub const RELIABLE_POWER_FLOOR: f64 = 0.80;

/// Quality-score gap (0..100 points) that flags arm asymmetry
pub const ASYMMETRY_ALERT: f64 = 5.0;

/// Effective-sample fraction below which erosion is flagged
pub const SAMPLE_EROSION_FLOOR: f64 = 0.80;

/// Qualitative analysis conclusion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    /// True effect is being diluted; a real winner may be missed
    HighFalseNegativeRisk,
    /// Observed lift is artificially inflated
    LiftOverstated,
    /// Observed effect is below the detection threshold
    Inconclusive,
    /// Observed lift tracks the true lift with adequate power
    Reliable,
    /// No rule matched; results need manual review
    NeedsInvestigation,
}

impl std::fmt::Display for Recommendation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Recommendation::HighFalseNegativeRisk => {
                write!(f, "high risk of false negative (lift diluted by data quality)")
            }
            Recommendation::LiftOverstated => write!(f, "lift likely overstated"),
            Recommendation::Inconclusive => {
                write!(f, "inconclusive (effect below detection threshold)")
            }
            Recommendation::Reliable => write!(f, "results reliable"),
            Recommendation::NeedsInvestigation => write!(f, "requires investigation"),
        }
    }
}

/// Signals the rule table reads
#[derive(Debug, Clone, Copy)]
pub struct RecommendationSignals {
    /// (observed - true) / |true| relative lift error
    pub relative_lift_error: f64,
    /// |observed variation rate - observed control rate|
    pub observed_delta: f64,
    /// Minimum detectable effect at the effective sample sizes
    pub minimum_detectable_effect: f64,
    /// Statistical power at the observed effect
    pub statistical_power: f64,
}

struct Rule {
    label: Recommendation,
    applies: fn(&RecommendationSignals) -> bool,
}

/// Evaluated top to bottom; first match wins
const RULES: &[Rule] = &[
    Rule {
        label: Recommendation::HighFalseNegativeRisk,
        applies: |s| s.relative_lift_error <= DILUTION_ALERT,
    },
    Rule {
        label: Recommendation::LiftOverstated,
        applies: |s| s.relative_lift_error >= INFLATION_ALERT,
    },
    Rule {
        label: Recommendation::Inconclusive,
        applies: |s| s.observed_delta < s.minimum_detectable_effect,
    },
    Rule {
        label: Recommendation::Reliable,
        applies: |s| {
            s.relative_lift_error.abs() <= RELIABLE_LIFT_TOLERANCE
                && s.statistical_power >= RELIABLE_POWER_FLOOR
        },
    },
];

/// Map impact signals to exactly one recommendation label
pub fn recommend(signals: &RecommendationSignals) -> Recommendation {
    RULES
        .iter()
        .find(|rule| (rule.applies)(signals))
        .map(|rule| rule.label)
        .unwrap_or(Recommendation::NeedsInvestigation)
}

/// Actionable warning attached to a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Advisory {
    /// Control and variation tracking quality differ materially
    QualityAsymmetry,
    /// Data-quality issues removed a large share of the sample
    SampleErosion,
    /// Statistical power is below the recommended floor
    LowPower,
    /// Observed lift departs from the true lift by more than the MDE
    LiftMismatch,
}

impl std::fmt::Display for Advisory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Advisory::QualityAsymmetry => write!(
                f,
                "data quality asymmetry between arms; investigate tracking implementation differences"
            ),
            Advisory::SampleErosion => write!(
                f,
                "significant sample size reduction; consider a larger initial sample or better collection"
            ),
            Advisory::LowPower => write!(
                f,
                "statistical power below 80%; results may miss true effects"
            ),
            Advisory::LiftMismatch => write!(
                f,
                "observed lift differs significantly from the true lift; check tracking implementation"
            ),
        }
    }
}

/// Inputs to the advisory checks
#[derive(Debug, Clone, Copy)]
pub struct AdvisorySignals {
    pub bias_risk_score: f64,
    pub effective_sample_fraction: f64,
    pub statistical_power: f64,
    pub lift_error_abs: f64,
    pub minimum_detectable_effect: f64,
}

/// Deterministic advisory list, in fixed emission order
pub fn advisories(signals: &AdvisorySignals) -> Vec<Advisory> {
    let mut out = Vec::new();
    if signals.bias_risk_score >= ASYMMETRY_ALERT {
        out.push(Advisory::QualityAsymmetry);
    }
    if signals.effective_sample_fraction < SAMPLE_EROSION_FLOOR {
        out.push(Advisory::SampleErosion);
    }
    if signals.statistical_power < RELIABLE_POWER_FLOOR {
        out.push(Advisory::LowPower);
    }
    if signals.lift_error_abs > signals.minimum_detectable_effect {
        out.push(Advisory::LiftMismatch);
    }
    out
}
