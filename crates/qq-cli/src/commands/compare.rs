//! `quickquant compare`: one contract, every method.

use qq_instruments::Instrument;
use qq_models::MarketModel;
use tracing::debug;

use super::ContractArgs;
use crate::config::EngineSettings;
use crate::output::{self, ComparisonRow};
use crate::{CliError, MethodArg, OutputFormat, Result};

/// Price with every method in [`MethodArg::ALL`] order.
///
/// Differences are taken against the first method that succeeds. Methods
/// that cannot price the contract keep their error message.
pub fn compare(
    settings: &EngineSettings,
    instrument: &Instrument,
    model: &MarketModel,
) -> Vec<ComparisonRow> {
    let mut reference = None;
    MethodArg::ALL
        .into_iter()
        .map(|method| match settings.engine(method).calculate(instrument, model) {
            Ok(result) => {
                let base = *reference.get_or_insert(result.price);
                ComparisonRow {
                    method: method.name(),
                    price: Some(result.price),
                    difference: Some(result.price - base),
                    steps: result.diagnostics.and_then(|d| d.steps),
                    error: None,
                }
            }
            Err(err) => {
                debug!(method = method.name(), %err, "method skipped");
                ComparisonRow {
                    method: method.name(),
                    price: None,
                    difference: None,
                    steps: None,
                    error: Some(err.to_string()),
                }
            }
        })
        .collect()
}

/// Run the compare command.
pub fn run(settings: &EngineSettings, contract: &ContractArgs, format: OutputFormat) -> Result<()> {
    let instrument = contract.instrument()?;
    let model = contract.market_model()?;
    let rows = compare(settings, &instrument, &model);
    if rows.iter().all(|row| row.price.is_none()) {
        return Err(CliError::InvalidArgument(format!(
            "no method supports a {} {} option under {}",
            instrument.exercise(),
            instrument.option_type(),
            model.family()
        )));
    }
    println!("{}", output::render_comparison(&rows, format)?);
    Ok(())
}
