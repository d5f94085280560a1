//! Defect transformations mapping true rates to observed rates
//!
//! Composition order is fixed and load-bearing: event loss -> user-ID
//! error -> partial data -> segmentation error -> timeframe bias. Each
//! stage operates on the output of the previous one and the stages do not
//! commute (a multiplicative skew applied before a blend gives a different
//! composite than the reverse), so both arms are advanced stage-by-stage
//! together and blends always mix same-stage rates.

use serde::{Deserialize, Serialize};

use crate::model::inputs::{ExperimentInputs, QualityParams};

/// Observed rate under uniform event loss
///
/// Uniform loss thins the counting process on both the numerator and the
/// denominator, so the rate estimator stays unbiased; the cost shows up as
/// reduced effective sample size, carried by [`effective_sample_size`].
pub fn apply_event_loss(rate: f64, _loss_rate: f64) -> f64 {
    rate
}

/// Observed rate under cross-arm user-ID misattribution
///
/// A fraction `error_rate` of this arm's users actually belong to the
/// other arm, so the observed rate is the convex combination
/// `(1 - e) * own + e * other`. Symmetric per-arm rates dilute the lift by
/// `(1 - 2e)`; asymmetric rates dilute each arm independently.
pub fn apply_user_id_error(own_rate: f64, other_rate: f64, error_rate: f64) -> f64 {
    (1.0 - error_rate) * own_rate + error_rate * other_rate
}

/// Observed rate under partial property capture
///
/// Missingness is assumed independent of outcome: the point estimate is
/// unchanged, only the effective sample size shrinks by `(1 - partial)`.
pub fn apply_partial_data(rate: f64, _partial_rate: f64) -> f64 {
    rate
}

/// Observed rate under segment misassignment
///
/// Same contamination blend as user-ID error, applied at the cohort level:
/// swapped users carry the other segment's rate into this one.
pub fn apply_segmentation_error(own_rate: f64, other_rate: f64, error_rate: f64) -> f64 {
    (1.0 - error_rate) * own_rate + error_rate * other_rate
}

/// Observed rate under measurement-window skew
///
/// Multiplicative bias `rate * (1 + bias)`, saturated into [0, 1] so the
/// composed model stays total. Applied to the variation arm only: the bias
/// models its window being misaligned relative to control.
pub fn apply_timeframe_bias(rate: f64, bias_factor: f64) -> f64 {
    (rate * (1.0 + bias_factor)).clamp(0.0, 1.0)
}

/// Effective sample size after count-thinning defects
///
/// Event loss and partial data both discard otherwise-usable observations;
/// the survivors are `n * (1 - loss) * (1 - partial)`, floored at one
/// observation so downstream variance terms stay finite.
pub fn effective_sample_size(n: u64, event_loss: f64, partial_data: f64) -> f64 {
    (n as f64 * (1.0 - event_loss) * (1.0 - partial_data)).max(1.0)
}

/// Both arms' rates and effective sample sizes after composing all defects
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ComposedRates {
    pub control_rate: f64,
    pub variation_rate: f64,
    pub effective_control_n: f64,
    pub effective_variation_n: f64,
}

/// Apply every defect transformation in the fixed documented order
pub fn compose_defects(inputs: &ExperimentInputs, quality: &QualityParams) -> ComposedRates {
    let control_q = quality.control;
    let variation_q = quality.variation_arm();

    let mut control = inputs.control_rate;
    let mut variation = inputs.variation_rate;

    // Stage 1: event loss (rate-neutral, thins the sample)
    control = apply_event_loss(control, control_q.event_loss);
    variation = apply_event_loss(variation, variation_q.event_loss);

    // Stage 2: user-ID misattribution (cross-arm blend on same-stage rates)
    let (c, v) = (control, variation);
    control = apply_user_id_error(c, v, control_q.user_id_error);
    variation = apply_user_id_error(v, c, variation_q.user_id_error);

    // Stage 3: partial data (rate-neutral, thins the sample)
    control = apply_partial_data(control, control_q.partial_data);
    variation = apply_partial_data(variation, variation_q.partial_data);

    // Stage 4: segmentation error (cross-arm blend on same-stage rates)
    let (c, v) = (control, variation);
    control = apply_segmentation_error(c, v, control_q.segmentation_error);
    variation = apply_segmentation_error(v, c, variation_q.segmentation_error);

    // Stage 5: timeframe bias (variation window skew relative to control)
    variation = apply_timeframe_bias(variation, quality.timeframe_bias);

    ComposedRates {
        control_rate: control,
        variation_rate: variation,
        effective_control_n: effective_sample_size(
            inputs.control_n,
            control_q.event_loss,
            control_q.partial_data,
        ),
        effective_variation_n: effective_sample_size(
            inputs.variation_n,
            variation_q.event_loss,
            variation_q.partial_data,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::inputs::ArmQuality;

    #[test]
    fn test_event_loss_is_rate_neutral() {
        assert_eq!(apply_event_loss(0.10, 0.20), 0.10);
        assert_eq!(apply_event_loss(0.0, 1.0), 0.0);
    }

    #[test]
    fn test_event_loss_thins_sample() {
        let n = effective_sample_size(10_000, 0.20, 0.0);
        assert!((n - 8_000.0).abs() < 1e-9);
    }

    #[test]
    fn test_effective_sample_floor() {
        assert_eq!(effective_sample_size(10, 1.0, 1.0), 1.0);
    }

    #[test]
    fn test_user_id_error_convex_blend() {
        // 10% of control's users actually saw the variation
        let observed = apply_user_id_error(0.10, 0.20, 0.10);
        assert!((observed - 0.11).abs() < 1e-12);
    }

    #[test]
    fn test_symmetric_user_id_error_dilutes_lift() {
        let (c, v) = (0.10, 0.20);
        let oc = apply_user_id_error(c, v, 0.10);
        let ov = apply_user_id_error(v, c, 0.10);
        // delta shrinks by (1 - 2e)
        assert!(((ov - oc) - (v - c) * 0.8).abs() < 1e-12);
        assert!((ov - oc).abs() < (v - c).abs());
    }

    #[test]
    fn test_timeframe_bias_multiplicative() {
        assert!((apply_timeframe_bias(0.10, 0.05) - 0.105).abs() < 1e-12);
        assert!((apply_timeframe_bias(0.10, -0.05) - 0.095).abs() < 1e-12);
    }

    #[test]
    fn test_timeframe_bias_saturates() {
        assert_eq!(apply_timeframe_bias(0.9, 0.5), 1.0);
    }

    #[test]
    fn test_compose_identity_when_clean() {
        let inputs = ExperimentInputs::new(0.10, 0.12, 10_000, 10_000);
        let composed = compose_defects(&inputs, &QualityParams::default());
        assert_eq!(composed.control_rate, 0.10);
        assert_eq!(composed.variation_rate, 0.12);
        assert_eq!(composed.effective_control_n, 10_000.0);
        assert_eq!(composed.effective_variation_n, 10_000.0);
    }

    #[test]
    fn test_compose_order_is_not_commutative() {
        // Blend-then-skew differs from skew-then-blend for the variation arm.
        let (c, v) = (0.10, 0.20);
        let e = 0.10;
        let bias = 0.20;

        let blended = apply_user_id_error(v, c, e);
        let blend_then_skew = apply_timeframe_bias(blended, bias);

        let skewed = apply_timeframe_bias(v, bias);
        let skew_then_blend = apply_user_id_error(skewed, c, e);

        assert!((blend_then_skew - skew_then_blend).abs() > 1e-6);
    }

    #[test]
    fn test_asymmetric_arms_compose_independently() {
        let inputs = ExperimentInputs::new(0.10, 0.20, 10_000, 10_000);

        let symmetric = QualityParams::symmetric(ArmQuality::new(0.0, 0.125, 0.0, 0.0));
        let asymmetric = QualityParams::asymmetric(
            ArmQuality::new(0.0, 0.05, 0.0, 0.0),
            ArmQuality::new(0.0, 0.20, 0.0, 0.0),
        );

        let sym = compose_defects(&inputs, &symmetric);
        let asym = compose_defects(&inputs, &asymmetric);

        // The absolute delta shrinks by (1 - e_c - e_v) either way, but the
        // relative lift differs because the observed control rate differs.
        let sym_lift = sym.variation_rate / sym.control_rate - 1.0;
        let asym_lift = asym.variation_rate / asym.control_rate - 1.0;
        assert!((sym_lift - asym_lift).abs() > 1e-3);
    }
}
