//! `quickquant price`: one contract, one method.

use qq_core::Real;
use qq_pricingengines::greeks;
use tracing::info;

use super::ContractArgs;
use crate::config::EngineSettings;
use crate::output::{self, PriceReport};
use crate::{MethodArg, OutputFormat, Result};

/// Price the contract and, when `greeks_bump` is set, its Greeks.
pub fn evaluate(
    settings: &EngineSettings,
    method: MethodArg,
    contract: &ContractArgs,
    greeks_bump: Option<Real>,
) -> Result<PriceReport> {
    let instrument = contract.instrument()?;
    let model = contract.market_model()?;
    let engine = settings.engine(method);

    let result = engine.calculate(&instrument, &model)?;
    let greeks = greeks_bump
        .map(|bump| greeks(engine.as_ref(), &instrument, &model, bump))
        .transpose()?;
    info!(method = method.name(), price = result.price, "priced");

    Ok(PriceReport {
        method: method.name(),
        instrument,
        model,
        result,
        greeks,
    })
}

/// Run the price command.
pub fn run(
    settings: &EngineSettings,
    method: MethodArg,
    contract: &ContractArgs,
    greeks_bump: Option<Real>,
    format: OutputFormat,
) -> Result<()> {
    let report = evaluate(settings, method, contract, greeks_bump)?;
    println!("{}", output::render_price(&report, format)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::tests::contract;
    use crate::CliError;
    use qq_core::Error;

    #[test]
    fn closed_form_call() {
        let report =
            evaluate(&EngineSettings::default(), MethodArg::ClosedForm, &contract(&[]), None).unwrap();
        assert!((report.result.price - 10.450583572185565).abs() < 1e-12);
        assert!(report.greeks.is_none());
    }

    #[test]
    fn greeks_on_request() {
        let args = contract(&["--type", "put", "--exercise", "american"]);
        let report = evaluate(&EngineSettings::default(), MethodArg::Fd, &args, Some(1e-3)).unwrap();
        let g = report.greeks.unwrap();
        assert!(g.delta < 0.0 && g.gamma > 0.0 && g.vega > 0.0, "{g:?}");
        assert_eq!(Some(g.delta), report.result.result("delta"));
    }

    #[test]
    fn unsupported_combination_is_a_pricing_error() {
        let args = contract(&["--model", "heston"]);
        let err = evaluate(&EngineSettings::default(), MethodArg::Binomial, &args, None).unwrap_err();
        assert!(matches!(err, CliError::Pricing(Error::UnsupportedModel(_))), "{err}");
    }
}
