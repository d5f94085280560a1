//! Command implementations

pub mod power;
pub mod run;
pub mod scenario;
pub mod sweep;

use miette::{IntoDiagnostic, Result};
use std::fs;

use crate::cli::args::ParamArgs;
use crate::model::{ArmQuality, ExperimentInputs, QualityParams, Scenario};

/// Resolve experiment + quality parameters from a scenario file or flags
pub fn load_params(args: &ParamArgs) -> Result<(ExperimentInputs, QualityParams)> {
    if let Some(path) = &args.scenario {
        let content = fs::read_to_string(path)
            .map_err(|e| miette::miette!("Cannot read scenario {}: {}", path.display(), e))?;
        let scenario: Scenario = serde_yml::from_str(&content)
            .map_err(|e| miette::miette!("Cannot parse scenario {}: {}", path.display(), e))?;
        scenario.validate().into_diagnostic()?;
        return Ok((scenario.inputs, scenario.quality));
    }

    let inputs = ExperimentInputs {
        control_rate: args.control_rate,
        variation_rate: args.variation_rate,
        control_n: args.control_n,
        variation_n: args.variation_n,
        alpha: args.alpha,
    };

    let control = ArmQuality::new(
        args.event_loss,
        args.user_id_error,
        args.partial_data,
        args.segmentation_error,
    );
    let has_override = args.variation_event_loss.is_some()
        || args.variation_user_id_error.is_some()
        || args.variation_partial_data.is_some()
        || args.variation_segmentation_error.is_some();
    let variation = has_override.then(|| {
        ArmQuality::new(
            args.variation_event_loss.unwrap_or(args.event_loss),
            args.variation_user_id_error.unwrap_or(args.user_id_error),
            args.variation_partial_data.unwrap_or(args.partial_data),
            args.variation_segmentation_error
                .unwrap_or(args.segmentation_error),
        )
    });

    let quality = QualityParams {
        control,
        variation,
        timeframe_bias: args.timeframe_bias,
    };

    Ok((inputs, quality))
}
