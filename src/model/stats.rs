//! Two-proportion power, MDE, and required-sample-size calculations
//!
//! The standard error uses the baseline-rate variance in both directions,
//! `se = sqrt(p(1-p) * (1/n_c + 1/n_v))`, so `compute_power` and
//! `compute_mde` are exact inverses of each other: feeding the MDE back
//! into the power calculation at the same N returns the target power.

/// Standard normal cumulative distribution function (CDF)
/// Φ(z) = probability that a standard normal random variable is ≤ z
/// Uses Hastings approximation (error < 7.5e-8)
pub fn normal_cdf(z: f64) -> f64 {
    if z.is_nan() {
        return 0.5;
    }
    if z >= 8.0 {
        return 1.0;
    }
    if z <= -8.0 {
        return 0.0;
    }

    // Handle negative z by symmetry: Φ(-z) = 1 - Φ(z)
    let (z_abs, negate) = if z < 0.0 { (-z, true) } else { (z, false) };

    // Hastings approximation constants (A&S 26.2.17)
    const B0: f64 = 0.2316419;
    const B1: f64 = 0.319381530;
    const B2: f64 = -0.356563782;
    const B3: f64 = 1.781477937;
    const B4: f64 = -1.821255978;
    const B5: f64 = 1.330274429;

    let t = 1.0 / (1.0 + B0 * z_abs);
    let t2 = t * t;
    let t3 = t2 * t;
    let t4 = t3 * t;
    let t5 = t4 * t;

    let pdf = (-0.5 * z_abs * z_abs).exp() / (2.0 * std::f64::consts::PI).sqrt();
    let cdf = 1.0 - pdf * (B1 * t + B2 * t2 + B3 * t3 + B4 * t4 + B5 * t5);

    if negate {
        1.0 - cdf
    } else {
        cdf
    }
}

/// Inverse standard normal CDF (probit), Φ⁻¹(p)
/// Abramowitz & Stegun 26.2.23 rational approximation, |error| < 4.5e-4
pub fn normal_quantile(p: f64) -> f64 {
    if p <= 0.0 {
        return f64::NEG_INFINITY;
    }
    if p >= 1.0 {
        return f64::INFINITY;
    }

    // Symmetry: for p < 0.5, compute -Φ⁻¹(1 - p)
    let (sign, q) = if p < 0.5 { (-1.0, 1.0 - p) } else { (1.0, p) };

    const C0: f64 = 2.515517;
    const C1: f64 = 0.802853;
    const C2: f64 = 0.010328;
    const D1: f64 = 1.432788;
    const D2: f64 = 0.189269;
    const D3: f64 = 0.001308;

    let t = (-2.0 * (1.0 - q).ln()).sqrt();
    let z = t - (C0 + C1 * t + C2 * t * t) / (1.0 + D1 * t + D2 * t * t + D3 * t * t * t);

    sign * z
}

/// Pooled standard error of the rate difference at the baseline rate
fn standard_error(control_n: f64, variation_n: f64, baseline_rate: f64) -> f64 {
    let variance = baseline_rate * (1.0 - baseline_rate);
    (variance * (1.0 / control_n + 1.0 / variation_n)).sqrt()
}

/// Two-proportion z-test power for detecting an absolute rate difference
///
/// `power = Φ(|delta| / se - z_{1-α/2})`. Sample sizes are the effective
/// (quality-degraded) counts; power strictly decreases as they shrink or
/// as the detectable delta is diluted.
pub fn compute_power(
    control_n: f64,
    variation_n: f64,
    baseline_rate: f64,
    delta: f64,
    alpha: f64,
) -> f64 {
    let se = standard_error(control_n, variation_n, baseline_rate);
    if se <= 0.0 || !se.is_finite() {
        // Degenerate variance (baseline rate of exactly 0 or 1): any
        // nonzero difference is detected with certainty.
        return if delta.abs() > 0.0 { 1.0 } else { 0.0 };
    }
    let z_alpha = normal_quantile(1.0 - alpha / 2.0);
    normal_cdf(delta.abs() / se - z_alpha)
}

/// Minimum detectable effect (absolute rate difference)
///
/// Inverts [`compute_power`]: the smallest |delta| detectable at the given
/// significance level with probability `target_power`.
pub fn compute_mde(
    control_n: f64,
    variation_n: f64,
    baseline_rate: f64,
    alpha: f64,
    target_power: f64,
) -> f64 {
    let se = standard_error(control_n, variation_n, baseline_rate);
    let z_alpha = normal_quantile(1.0 - alpha / 2.0);
    let z_power = normal_quantile(target_power);
    (z_alpha + z_power) * se
}

/// Per-arm sample size required to detect an absolute difference `delta`
///
/// `n = (z_{1-α/2} + z_power)² · 2·p(1-p) / δ²`, rounded up. Returns
/// `None` for a zero delta (no finite sample detects a null effect).
pub fn required_sample_size(
    baseline_rate: f64,
    delta: f64,
    alpha: f64,
    target_power: f64,
) -> Option<u64> {
    if delta.abs() <= f64::EPSILON {
        return None;
    }
    let z_alpha = normal_quantile(1.0 - alpha / 2.0);
    let z_power = normal_quantile(target_power);
    let variance = baseline_rate * (1.0 - baseline_rate);
    let n = (z_alpha + z_power).powi(2) * 2.0 * variance / (delta * delta);
    Some(n.ceil().max(1.0) as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normal_cdf() {
        // Known values from the standard normal table
        assert!((normal_cdf(0.0) - 0.5).abs() < 1e-6);
        assert!((normal_cdf(1.0) - 0.8413).abs() < 0.01);
        assert!((normal_cdf(-1.0) - 0.1587).abs() < 0.01);
        assert!((normal_cdf(1.96) - 0.975).abs() < 0.01);
        assert!((normal_cdf(3.0) - 0.9987).abs() < 0.01);
        assert!((normal_cdf(10.0) - 1.0).abs() < 1e-6);
        assert!((normal_cdf(-10.0) - 0.0).abs() < 1e-6);
    }

    #[test]
    fn test_normal_quantile() {
        assert!(normal_quantile(0.5).abs() < 1e-3);
        assert!((normal_quantile(0.975) - 1.96).abs() < 0.01);
        assert!((normal_quantile(0.8) - 0.8416).abs() < 0.01);
        assert!((normal_quantile(0.025) + 1.96).abs() < 0.01);
        assert_eq!(normal_quantile(0.0), f64::NEG_INFINITY);
        assert_eq!(normal_quantile(1.0), f64::INFINITY);
    }

    #[test]
    fn test_quantile_is_cdf_inverse() {
        for p in [0.1, 0.25, 0.5, 0.8, 0.9, 0.975, 0.99] {
            let z = normal_quantile(p);
            assert!(
                (normal_cdf(z) - p).abs() < 1e-3,
                "Φ(Φ⁻¹({p})) = {}",
                normal_cdf(z)
            );
        }
    }

    #[test]
    fn test_power_increases_with_sample_size() {
        let small = compute_power(1_000.0, 1_000.0, 0.10, 0.02, 0.05);
        let large = compute_power(10_000.0, 10_000.0, 0.10, 0.02, 0.05);
        assert!(large > small);
    }

    #[test]
    fn test_power_increases_with_effect() {
        let weak = compute_power(5_000.0, 5_000.0, 0.10, 0.005, 0.05);
        let strong = compute_power(5_000.0, 5_000.0, 0.10, 0.02, 0.05);
        assert!(strong > weak);
    }

    #[test]
    fn test_power_zero_effect() {
        let power = compute_power(10_000.0, 10_000.0, 0.10, 0.0, 0.05);
        // At zero effect, "power" collapses to the one-tail false-positive
        // probability Φ(-z_alpha) = alpha/2.
        assert!((power - 0.025).abs() < 1e-3);
    }

    #[test]
    fn test_power_mde_round_trip() {
        for &target in &[0.5, 0.8, 0.9] {
            let mde = compute_mde(10_000.0, 10_000.0, 0.10, 0.05, target);
            let power = compute_power(10_000.0, 10_000.0, 0.10, mde, 0.05);
            assert!(
                (power - target).abs() < 1e-3,
                "round-trip at target {target}: got {power}"
            );
        }
    }

    #[test]
    fn test_required_sample_size_consistency() {
        let n = required_sample_size(0.10, 0.02, 0.05, 0.8).unwrap();
        let power = compute_power(n as f64, n as f64, 0.10, 0.02, 0.05);
        assert!(power >= 0.8 - 1e-3, "power at required N: {power}");
        // One fewer order of magnitude must undershoot
        let low = compute_power(n as f64 / 10.0, n as f64 / 10.0, 0.10, 0.02, 0.05);
        assert!(low < 0.8);
    }

    #[test]
    fn test_required_sample_size_none_for_zero_delta() {
        assert!(required_sample_size(0.10, 0.0, 0.05, 0.8).is_none());
    }

    #[test]
    fn test_degenerate_baseline_rate() {
        let power = compute_power(1_000.0, 1_000.0, 0.0, 0.01, 0.05);
        assert_eq!(power, 1.0);
        let no_effect = compute_power(1_000.0, 1_000.0, 0.0, 0.0, 0.05);
        assert_eq!(no_effect, 0.0);
    }
}
