//! `dqi sweep` - defect-rate sweep series (chart feed)

use miette::{IntoDiagnostic, Result};
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::cli::args::{OutputFormat, SweepArgs};
use crate::cli::commands::load_params;
use crate::cli::output::{to_json, to_yaml};
use crate::model::{sweep, SweepPoint};

#[derive(Tabled)]
struct SweepRow {
    #[tabled(rename = "RATE")]
    rate: String,
    #[tabled(rename = "TRUE LIFT")]
    true_lift: String,
    #[tabled(rename = "OBSERVED LIFT")]
    observed_lift: String,
    #[tabled(rename = "POWER")]
    power: String,
    #[tabled(rename = "SIGNIFICANT")]
    significant: &'static str,
}

impl From<&SweepPoint> for SweepRow {
    fn from(point: &SweepPoint) -> Self {
        Self {
            rate: format!("{:.1}%", point.defect_rate * 100.0),
            true_lift: format!("{:+.2}%", point.true_lift * 100.0),
            observed_lift: format!("{:+.2}%", point.observed_lift * 100.0),
            power: format!("{:.1}%", point.statistical_power * 100.0),
            significant: if point.significant { "yes" } else { "no" },
        }
    }
}

pub fn run(args: SweepArgs) -> Result<()> {
    let (inputs, quality) = load_params(&args.params)?;
    let points = sweep(
        &inputs,
        &quality,
        args.defect.into(),
        args.max_rate,
        args.steps,
    )
    .into_diagnostic()?;

    match args.format {
        OutputFormat::Table => {
            let rows: Vec<SweepRow> = points.iter().map(SweepRow::from).collect();
            let mut table = Table::new(rows);
            table.with(Style::sharp());
            println!("{table}");
        }
        OutputFormat::Csv => {
            let mut writer = csv::Writer::from_writer(std::io::stdout());
            for point in &points {
                writer.serialize(point).into_diagnostic()?;
            }
            writer.flush().into_diagnostic()?;
        }
        OutputFormat::Yaml => print!("{}", to_yaml(&points)?),
        OutputFormat::Json => println!("{}", to_json(&points)?),
    }
    Ok(())
}
