//! `dqi power` - direct power / MDE / required-sample-size calculator

use console::style;
use miette::Result;

use crate::cli::args::PowerArgs;
use crate::model::{
    compute_mde, compute_power, required_sample_size, ExperimentInputs, ModelError,
};

pub fn run(args: PowerArgs) -> Result<()> {
    // Reuse the model's boundary validation for the shared fields.
    let inputs = ExperimentInputs {
        control_rate: args.control_rate,
        variation_rate: args.variation_rate,
        control_n: args.control_n,
        variation_n: args.variation_n,
        alpha: args.alpha,
    };
    inputs
        .validate()
        .map_err(|e| miette::miette!("{}", e))?;
    if !args.target_power.is_finite() || args.target_power <= 0.0 || args.target_power >= 1.0 {
        return Err(miette::miette!(
            "{}",
            ModelError::InvalidParameter {
                field: "target_power",
                value: args.target_power,
                expected: "fraction in (0, 1) exclusive",
            }
        ));
    }

    let delta = (args.variation_rate - args.control_rate).abs();
    let (n_c, n_v) = (args.control_n as f64, args.variation_n as f64);

    let power = compute_power(n_c, n_v, args.control_rate, delta, args.alpha);
    let mde = compute_mde(n_c, n_v, args.control_rate, args.alpha, args.target_power);
    let required = required_sample_size(args.control_rate, delta, args.alpha, args.target_power);

    println!(
        "{} power at current sample: {:.1}%",
        style("◆").cyan(),
        power * 100.0
    );
    println!(
        "{} minimum detectable effect at {:.0}% power: {:.4} (absolute)",
        style("◆").cyan(),
        args.target_power * 100.0,
        mde
    );
    match required {
        Some(n) => println!(
            "{} required sample per arm for the current effect: {}",
            style("◆").cyan(),
            n
        ),
        None => println!(
            "{} required sample per arm: n/a (rates are identical)",
            style("◆").cyan()
        ),
    }
    Ok(())
}
