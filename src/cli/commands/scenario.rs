//! `dqi scenario` - scenario file management

use console::style;
use miette::{IntoDiagnostic, Result};
use std::fs;
use std::path::PathBuf;

use crate::cli::args::{OutputFormat, ScenarioCommands, ScenarioNewArgs, ScenarioShowArgs};
use crate::cli::output::{print_impact_table, to_json, to_yaml};
use crate::model::{compute_impact, Scenario};

pub fn run(cmd: ScenarioCommands) -> Result<()> {
    match cmd {
        ScenarioCommands::New(args) => new(args),
        ScenarioCommands::Show(args) => show(args),
    }
}

fn new(args: ScenarioNewArgs) -> Result<()> {
    let path = args
        .path
        .unwrap_or_else(|| PathBuf::from(format!("{}.dqi.yaml", args.name)));
    if path.exists() {
        return Err(miette::miette!(
            "Refusing to overwrite existing file {}",
            path.display()
        ));
    }

    let scenario = Scenario::template(&args.name, &args.author);
    let yaml = serde_yml::to_string(&scenario).into_diagnostic()?;
    fs::write(&path, yaml)
        .map_err(|e| miette::miette!("Cannot write {}: {}", path.display(), e))?;

    println!(
        "{} Created scenario '{}' at {}",
        style("✓").green(),
        args.name,
        path.display()
    );
    Ok(())
}

fn show(args: ScenarioShowArgs) -> Result<()> {
    let content = fs::read_to_string(&args.path)
        .map_err(|e| miette::miette!("Cannot read scenario {}: {}", args.path.display(), e))?;
    let scenario: Scenario = serde_yml::from_str(&content)
        .map_err(|e| miette::miette!("Cannot parse scenario {}: {}", args.path.display(), e))?;
    scenario.validate().into_diagnostic()?;

    let result = compute_impact(&scenario.inputs, &scenario.quality).into_diagnostic()?;

    match args.format {
        OutputFormat::Table => {
            println!(
                "{} {} (by {}, {})",
                style("◆").cyan(),
                style(&scenario.name).bold(),
                scenario.author,
                scenario.created.format("%Y-%m-%d")
            );
            if let Some(description) = &scenario.description {
                println!("  {description}");
            }
            print_impact_table(&result);
        }
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
