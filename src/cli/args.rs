//! CLI argument definitions

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::model::DefectKind;

/// Data Quality Impact Calculator
///
/// Models how tracking defects (event loss, user-ID errors, partial data,
/// segmentation errors, timeframe bias) distort observed A/B test results
/// relative to the true outcome.
#[derive(Parser, Debug)]
#[command(name = "dqi", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compute the full impact readout for one configuration
    Run(RunArgs),

    /// Sweep one defect rate and emit the lift/power series
    Sweep(SweepArgs),

    /// Direct power / MDE / required-sample-size calculator
    Power(PowerArgs),

    /// Manage scenario files
    #[command(subcommand)]
    Scenario(ScenarioCommands),
}

/// Output format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    Table,
    /// YAML document
    Yaml,
    /// JSON document
    Json,
    /// CSV rows (series output only)
    Csv,
}

/// Defect knob selector for sweeps
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DefectArg {
    EventLoss,
    UserIdError,
    PartialData,
    SegmentationError,
}

impl From<DefectArg> for DefectKind {
    fn from(arg: DefectArg) -> Self {
        match arg {
            DefectArg::EventLoss => DefectKind::EventLoss,
            DefectArg::UserIdError => DefectKind::UserIdError,
            DefectArg::PartialData => DefectKind::PartialData,
            DefectArg::SegmentationError => DefectKind::SegmentationError,
        }
    }
}

/// Experiment + quality parameters, from flags or a scenario file
#[derive(Args, Debug, Clone)]
pub struct ParamArgs {
    /// Read parameters from a scenario YAML file instead of flags
    #[arg(long, short = 'f')]
    pub scenario: Option<PathBuf>,

    /// True control conversion rate (fraction)
    #[arg(long, default_value_t = 0.10)]
    pub control_rate: f64,

    /// True variation conversion rate (fraction)
    #[arg(long, default_value_t = 0.105)]
    pub variation_rate: f64,

    /// Control arm sample size (users)
    #[arg(long, default_value_t = 10_000)]
    pub control_n: u64,

    /// Variation arm sample size (users)
    #[arg(long, default_value_t = 10_000)]
    pub variation_n: u64,

    /// Significance level (two-sided)
    #[arg(long, default_value_t = 0.05)]
    pub alpha: f64,

    /// Event loss rate, both arms unless overridden
    #[arg(long, default_value_t = 0.0)]
    pub event_loss: f64,

    /// User-ID error rate, both arms unless overridden
    #[arg(long, default_value_t = 0.0)]
    pub user_id_error: f64,

    /// Partial data rate, both arms unless overridden
    #[arg(long, default_value_t = 0.0)]
    pub partial_data: f64,

    /// Segmentation error rate, both arms unless overridden
    #[arg(long, default_value_t = 0.0)]
    pub segmentation_error: f64,

    /// Variation-arm event loss override (asymmetric quality)
    #[arg(long)]
    pub variation_event_loss: Option<f64>,

    /// Variation-arm user-ID error override
    #[arg(long)]
    pub variation_user_id_error: Option<f64>,

    /// Variation-arm partial data override
    #[arg(long)]
    pub variation_partial_data: Option<f64>,

    /// Variation-arm segmentation error override
    #[arg(long)]
    pub variation_segmentation_error: Option<f64>,

    /// Signed timeframe-bias multiplier on the variation arm
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    pub timeframe_bias: f64,
}

#[derive(Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub params: ParamArgs,

    /// Output format
    #[arg(long, short = 'o', value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

#[derive(Args, Debug)]
pub struct SweepArgs {
    #[command(flatten)]
    pub params: ParamArgs,

    /// Defect knob to sweep (applied to both arms)
    #[arg(long, short = 'd', value_enum)]
    pub defect: DefectArg,

    /// Maximum swept defect rate
    #[arg(long, default_value_t = 0.20)]
    pub max_rate: f64,

    /// Number of sweep points (including 0 and max)
    #[arg(long, default_value_t = 11)]
    pub steps: usize,

    /// Output format
    #[arg(long, short = 'o', value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

#[derive(Args, Debug)]
pub struct PowerArgs {
    /// Baseline (control) conversion rate
    #[arg(long, default_value_t = 0.10)]
    pub control_rate: f64,

    /// Variation conversion rate
    #[arg(long, default_value_t = 0.105)]
    pub variation_rate: f64,

    /// Control arm sample size
    #[arg(long, default_value_t = 10_000)]
    pub control_n: u64,

    /// Variation arm sample size
    #[arg(long, default_value_t = 10_000)]
    pub variation_n: u64,

    /// Significance level (two-sided)
    #[arg(long, default_value_t = 0.05)]
    pub alpha: f64,

    /// Power target for MDE and required-N
    #[arg(long, default_value_t = 0.80)]
    pub target_power: f64,
}

#[derive(Subcommand, Debug)]
pub enum ScenarioCommands {
    /// Write a template scenario file
    New(ScenarioNewArgs),

    /// Validate a scenario file and show its impact readout
    Show(ScenarioShowArgs),
}

#[derive(Args, Debug)]
pub struct ScenarioNewArgs {
    /// Scenario name
    #[arg(long, short = 'n')]
    pub name: String,

    /// Author name
    #[arg(long, env = "USER", default_value = "unknown")]
    pub author: String,

    /// Output path (defaults to <name>.dqi.yaml)
    #[arg(long, short = 'p')]
    pub path: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct ScenarioShowArgs {
    /// Scenario file to read
    pub path: PathBuf,

    /// Output format
    #[arg(long, short = 'o', value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}
