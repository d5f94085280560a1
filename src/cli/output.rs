//! Output formatting utilities

use console::style;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::model::{ImpactResult, Recommendation};

/// Serialize a value as YAML
pub fn to_yaml<T: Serialize>(value: &T) -> Result<String> {
    serde_yml::to_string(value).into_diagnostic()
}

/// Serialize a value as pretty JSON
pub fn to_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).into_diagnostic()
}

#[derive(Tabled)]
struct MetricRow {
    #[tabled(rename = "METRIC")]
    metric: &'static str,
    #[tabled(rename = "VALUE")]
    value: String,
}

fn pct(fraction: f64) -> String {
    format!("{:.2}%", fraction * 100.0)
}

/// Render the impact readout as a metric/value table plus styled
/// recommendation and advisory lines
pub fn print_impact_table(result: &ImpactResult) {
    let rows = vec![
        MetricRow {
            metric: "observed conversion",
            value: format!(
                "{} vs {}",
                pct(result.observed_control_rate),
                pct(result.observed_variation_rate)
            ),
        },
        MetricRow {
            metric: "true lift",
            value: pct(result.true_lift),
        },
        MetricRow {
            metric: "observed lift",
            value: pct(result.observed_lift),
        },
        MetricRow {
            metric: "relative lift error",
            value: pct(result.relative_lift_error),
        },
        MetricRow {
            metric: "effective sample",
            value: format!(
                "{:.0} / {:.0}",
                result.effective_control_n, result.effective_variation_n
            ),
        },
        MetricRow {
            metric: "statistical power",
            value: pct(result.statistical_power),
        },
        MetricRow {
            metric: "minimum detectable effect",
            value: format!("{:.4} (absolute)", result.minimum_detectable_effect),
        },
        MetricRow {
            metric: "required sample per arm",
            value: result
                .required_sample_size
                .map(|n| n.to_string())
                .unwrap_or_else(|| "n/a (no observed effect)".to_string()),
        },
        MetricRow {
            metric: "quality scores",
            value: format!(
                "control {:.1} / variation {:.1}",
                result.control_quality_score, result.variation_quality_score
            ),
        },
        MetricRow {
            metric: "bias risk score",
            value: format!("{:.1}", result.bias_risk_score),
        },
        MetricRow {
            metric: "decision risk",
            value: format!(
                "false positive {} / false negative {}",
                pct(result.false_positive_risk),
                pct(result.false_negative_risk)
            ),
        },
    ];

    let mut table = Table::new(rows);
    table.with(Style::sharp());
    println!("{table}");

    let label = result.recommendation.to_string();
    let styled = match result.recommendation {
        Recommendation::Reliable => style(label).green(),
        Recommendation::Inconclusive => style(label).cyan(),
        Recommendation::LiftOverstated => style(label).red(),
        Recommendation::HighFalseNegativeRisk | Recommendation::NeedsInvestigation => {
            style(label).yellow()
        }
    };
    println!("{} {}", style("◆").cyan(), styled);

    for advisory in &result.advisories {
        println!("{} {}", style("⚠").yellow(), advisory);
    }
}
