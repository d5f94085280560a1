//! `compute_impact` - the single logical entry point of the Impact Model
//!
//! Takes true experiment parameters plus a data-quality configuration and
//! derives the full observed-metrics record. Pure and stateless: every
//! field of the result is a function of the arguments alone.

use serde::{Deserialize, Serialize};

use crate::model::defects::{compose_defects, ComposedRates};
use crate::model::inputs::{ArmQuality, ExperimentInputs, ModelError, QualityParams};
use crate::model::recommend::{
    advisories, recommend, Advisory, AdvisorySignals, Recommendation, RecommendationSignals,
    RELIABLE_POWER_FLOOR,
};
use crate::model::stats::{compute_mde, compute_power, required_sample_size};

/// Power target used for MDE and required-sample-size derivations
pub const TARGET_POWER: f64 = 0.80;

/// Scale (in summed defect-rate percent) mapping arm asymmetry to a
/// decision-risk fraction; 5 points of asymmetry = 1% risk per point
const DECISION_RISK_SCALE: f64 = 5.0;

/// Derived observed metrics for one (inputs, quality) configuration
///
/// Transient by design: recomputed on every call, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImpactResult {
    /// Observed control conversion rate after all defects
    pub observed_control_rate: f64,

    /// Observed variation conversion rate after all defects
    pub observed_variation_rate: f64,

    /// Observed relative lift, `observed_variation/observed_control - 1`
    pub observed_lift: f64,

    /// True relative lift, for comparison series
    pub true_lift: f64,

    /// `(observed_lift - true_lift) / |true_lift|`; zero when the true
    /// lift is zero
    pub relative_lift_error: f64,

    /// Effective control sample size after count-thinning defects
    pub effective_control_n: f64,

    /// Effective variation sample size after count-thinning defects
    pub effective_variation_n: f64,

    /// Two-proportion z-test power at the observed effect
    pub statistical_power: f64,

    /// Minimum detectable absolute rate difference at 80% power
    pub minimum_detectable_effect: f64,

    /// Per-arm sample size needed to detect the observed effect at 80%
    /// power; `None` when the observed effect is zero
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_sample_size: Option<u64>,

    /// Control arm composite quality score (0..100)
    pub control_quality_score: f64,

    /// Variation arm composite quality score (0..100)
    pub variation_quality_score: f64,

    /// |control score - variation score|; asymmetry is the main driver of
    /// systematic experiment bias
    pub bias_risk_score: f64,

    /// Risk (0..1) that cleaner variation tracking inflates the lift
    pub false_positive_risk: f64,

    /// Risk (0..1) that dirtier variation tracking hides a real lift
    pub false_negative_risk: f64,

    /// Qualitative conclusion from the ordered rule table
    pub recommendation: Recommendation,

    /// Actionable warnings, in fixed emission order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub advisories: Vec<Advisory>,
}

/// Compute the full impact record for one configuration
///
/// Validates both parameter sets first; any out-of-range value fails with
/// `ModelError::InvalidParameter` and no partial result is produced.
pub fn compute_impact(
    inputs: &ExperimentInputs,
    quality: &QualityParams,
) -> Result<ImpactResult, ModelError> {
    inputs.validate()?;
    quality.validate()?;
    Ok(compute_impact_unchecked(inputs, quality))
}

/// Compute without re-validating; callers must hold validated parameters
fn compute_impact_unchecked(inputs: &ExperimentInputs, quality: &QualityParams) -> ImpactResult {
    let ComposedRates {
        control_rate: observed_control_rate,
        variation_rate: observed_variation_rate,
        effective_control_n,
        effective_variation_n,
    } = compose_defects(inputs, quality);

    let true_lift = inputs.true_lift();
    let observed_lift = if observed_control_rate > 0.0 {
        observed_variation_rate / observed_control_rate - 1.0
    } else {
        0.0
    };
    let relative_lift_error = if true_lift.abs() > f64::EPSILON {
        (observed_lift - true_lift) / true_lift.abs()
    } else {
        0.0
    };

    let observed_delta = (observed_variation_rate - observed_control_rate).abs();
    let statistical_power = compute_power(
        effective_control_n,
        effective_variation_n,
        observed_control_rate,
        observed_delta,
        inputs.alpha,
    );
    let minimum_detectable_effect = compute_mde(
        effective_control_n,
        effective_variation_n,
        observed_control_rate,
        inputs.alpha,
        TARGET_POWER,
    );
    let required_n = required_sample_size(
        observed_control_rate,
        observed_delta,
        inputs.alpha,
        TARGET_POWER,
    );

    let control_q = quality.control;
    let variation_q = quality.variation_arm();
    let control_quality_score = control_q.quality_score();
    let variation_quality_score = variation_q.quality_score();
    let bias_risk_score = (control_quality_score - variation_quality_score).abs();

    // Signed asymmetry in summed defect percentages: positive means the
    // variation arm loses more data than control (false-negative pressure),
    // negative means control is dirtier (false-positive pressure).
    let asymmetry_pct = (variation_q.defect_total() - control_q.defect_total()) * 100.0;
    let false_negative_risk =
        (asymmetry_pct.max(0.0) / DECISION_RISK_SCALE / 100.0).clamp(0.0, 1.0);
    let false_positive_risk =
        ((-asymmetry_pct).max(0.0) / DECISION_RISK_SCALE / 100.0).clamp(0.0, 1.0);

    let recommendation = recommend(&RecommendationSignals {
        relative_lift_error,
        observed_delta,
        minimum_detectable_effect,
        statistical_power,
    });

    let true_delta = (inputs.variation_rate - inputs.control_rate).abs();
    let total_n = (inputs.control_n + inputs.variation_n) as f64;
    let advisories = advisories(&AdvisorySignals {
        bias_risk_score,
        effective_sample_fraction: (effective_control_n + effective_variation_n) / total_n,
        statistical_power,
        lift_error_abs: (observed_delta - true_delta).abs(),
        minimum_detectable_effect,
    });

    ImpactResult {
        observed_control_rate,
        observed_variation_rate,
        observed_lift,
        true_lift,
        relative_lift_error,
        effective_control_n,
        effective_variation_n,
        statistical_power,
        minimum_detectable_effect,
        required_sample_size: required_n,
        control_quality_score,
        variation_quality_score,
        bias_risk_score,
        false_positive_risk,
        false_negative_risk,
        recommendation,
        advisories,
    }
}

impl ImpactResult {
    /// Whether the observed effect clears the detection threshold
    pub fn is_significant(&self) -> bool {
        (self.observed_variation_rate - self.observed_control_rate).abs()
            >= self.minimum_detectable_effect
    }

    /// Whether power meets the recommended floor
    pub fn is_adequately_powered(&self) -> bool {
        self.statistical_power >= RELIABLE_POWER_FLOOR
    }
}

/// Which defect knob a sweep varies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DefectKind {
    EventLoss,
    UserIdError,
    PartialData,
    SegmentationError,
}

impl std::fmt::Display for DefectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DefectKind::EventLoss => write!(f, "event-loss"),
            DefectKind::UserIdError => write!(f, "user-id-error"),
            DefectKind::PartialData => write!(f, "partial-data"),
            DefectKind::SegmentationError => write!(f, "segmentation-error"),
        }
    }
}

/// One point of a defect-rate sweep (chart feed)
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SweepPoint {
    /// Swept defect rate applied to both arms
    pub defect_rate: f64,

    /// True relative lift (constant reference line)
    pub true_lift: f64,

    /// Observed relative lift at this defect rate
    pub observed_lift: f64,

    /// Statistical power at this defect rate
    pub statistical_power: f64,

    /// Whether the observed effect still clears the MDE
    pub significant: bool,
}

/// Sweep one defect kind from 0 to `max_rate` over `steps` points
///
/// The swept rate is applied symmetrically to both arms on top of the
/// supplied base quality configuration; all other knobs are held fixed.
pub fn sweep(
    inputs: &ExperimentInputs,
    base_quality: &QualityParams,
    kind: DefectKind,
    max_rate: f64,
    steps: usize,
) -> Result<Vec<SweepPoint>, ModelError> {
    inputs.validate()?;
    base_quality.validate()?;
    if !(0.0..=1.0).contains(&max_rate) {
        return Err(ModelError::InvalidParameter {
            field: "max_rate",
            value: max_rate,
            expected: "fraction in [0, 1]",
        });
    }
    if steps < 2 {
        return Err(ModelError::InvalidParameter {
            field: "steps",
            value: steps as f64,
            expected: "at least 2 sweep points",
        });
    }

    let mut points = Vec::with_capacity(steps);
    for i in 0..steps {
        let rate = max_rate * i as f64 / (steps - 1) as f64;

        let mut quality = *base_quality;
        let mut control = quality.control;
        let mut variation = quality.variation_arm();
        set_defect(&mut control, kind, rate);
        set_defect(&mut variation, kind, rate);
        quality.control = control;
        quality.variation = Some(variation);

        let result = compute_impact_unchecked(inputs, &quality);
        points.push(SweepPoint {
            defect_rate: rate,
            true_lift: result.true_lift,
            observed_lift: result.observed_lift,
            statistical_power: result.statistical_power,
            significant: result.is_significant(),
        });
    }
    Ok(points)
}

fn set_defect(arm: &mut ArmQuality, kind: DefectKind, rate: f64) {
    match kind {
        DefectKind::EventLoss => arm.event_loss = rate,
        DefectKind::UserIdError => arm.user_id_error = rate,
        DefectKind::PartialData => arm.partial_data = rate,
        DefectKind::SegmentationError => arm.segmentation_error = rate,
    }
}
