//! `dqi run` - full impact readout for one configuration

use miette::{IntoDiagnostic, Result};

use crate::cli::args::{OutputFormat, RunArgs};
use crate::cli::commands::load_params;
use crate::cli::output::{print_impact_table, to_json, to_yaml};
use crate::model::compute_impact;

pub fn run(args: RunArgs) -> Result<()> {
    let (inputs, quality) = load_params(&args.params)?;
    let result = compute_impact(&inputs, &quality).into_diagnostic()?;

    match args.format {
        OutputFormat::Table => print_impact_table(&result),
        OutputFormat::Yaml => print!("{}", to_yaml(&result)?),
        OutputFormat::Json => println!("{}", to_json(&result)?),
        OutputFormat::Csv => {
            return Err(miette::miette!(
                "CSV output applies to series; use 'dqi sweep --format csv'"
            ))
        }
    }
    Ok(())
}
