//! Table and JSON rendering of command results.

use qq_core::{Real, Size};
use qq_instruments::Instrument;
use qq_models::MarketModel;
use qq_pricingengines::{Greeks, PricingResult};
use serde::Serialize;

use crate::{OutputFormat, Result};

/// One contract priced with one method.
#[derive(Debug, Clone, Serialize)]
pub struct PriceReport {
    /// Method name as typed on the command line.
    pub method: &'static str,
    /// Contract priced.
    pub instrument: Instrument,
    /// Market model used.
    pub model: MarketModel,
    /// Pricer output.
    pub result: PricingResult,
    /// Greeks, when requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub greeks: Option<Greeks>,
}

/// One method's line in a comparison.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonRow {
    /// Method name as typed on the command line.
    pub method: &'static str,
    /// Price, when the method supports the contract.
    pub price: Option<Real>,
    /// Price minus the first successful method's price.
    pub difference: Option<Real>,
    /// Steps, terms or evaluations reported by the pricer.
    pub steps: Option<Size>,
    /// Why the method could not price the contract.
    pub error: Option<String>,
}

fn line(label: &str, value: impl std::fmt::Display) -> String {
    format!("{label:<14}{value}")
}

/// Render a single price.
pub fn render_price(report: &PriceReport, format: OutputFormat) -> Result<String> {
    if format == OutputFormat::Json {
        return Ok(serde_json::to_string_pretty(report)?);
    }

    let result = &report.result;
    let diagnostics = result.diagnostics.as_ref();
    let mut lines = vec![
        line("model", report.model.family()),
        line(
            "method",
            diagnostics.map_or_else(|| report.method.to_string(), |d| d.method.to_string()),
        ),
        line("price", format!("{:.8}", result.price)),
    ];
    if let Some(steps) = diagnostics.and_then(|d| d.steps) {
        lines.push(line("steps", steps));
    }
    if let Some(estimate) = diagnostics.and_then(|d| d.convergence_estimate) {
        lines.push(line("error est.", format!("{estimate:.3e}")));
    }
    match report.greeks.or(result.greeks) {
        Some(g) => {
            for (name, value) in [
                ("delta", g.delta),
                ("gamma", g.gamma),
                ("vega", g.vega),
                ("theta", g.theta),
                ("rho", g.rho),
            ] {
                lines.push(line(name, format!("{value:.6}")));
            }
        }
        None => {
            for (name, value) in &result.additional_results {
                lines.push(line(name, format!("{value:.6}")));
            }
        }
    }
    for warning in result.warnings() {
        lines.push(line("warning", warning));
    }
    Ok(lines.join("\n"))
}

/// Render a method comparison.
pub fn render_comparison(rows: &[ComparisonRow], format: OutputFormat) -> Result<String> {
    if format == OutputFormat::Json {
        return Ok(serde_json::to_string_pretty(rows)?);
    }

    let mut lines = vec![format!(
        "{:<12} {:>14} {:>12} {:>8}  note",
        "method", "price", "difference", "steps"
    )];
    for row in rows {
        let steps = row.steps.map_or_else(String::new, |s| s.to_string());
        lines.push(match (row.price, &row.error) {
            (Some(price), _) => format!(
                "{:<12} {:>14.8} {:>12.2e} {:>8}",
                row.method,
                price,
                row.difference.unwrap_or(0.0),
                steps
            ),
            (None, Some(err)) => format!("{:<12} {:>14} {:>12} {:>8}  {err}", row.method, "-", "-", ""),
            (None, None) => format!("{:<12} {:>14}", row.method, "-"),
        });
    }
    Ok(lines.join("\n"))
}
