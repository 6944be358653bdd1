//! Closed-form pricing for European contracts.
//!
//! Dispatches on model and contract features:
//!
//! | model         | vanilla            | barrier            | averaging            |
//! |---------------|--------------------|--------------------|----------------------|
//! | Black-Scholes | BS + Greeks        | Reiner-Rubinstein  | geometric lognormal  |
//! | Merton        | Poisson series     | unsupported        | unsupported          |
//! | Heston        | unsupported model  |                    |                      |

use qq_core::{errors::Result, fail};
use qq_instruments::Instrument;
use qq_models::MarketModel;
use tracing::debug;

use crate::analytic_average_engine::geometric_average_price;
use crate::analytic_barrier_engine::analytic_barrier_price;
use crate::analytic_european_engine::black_scholes_merton;
use crate::merton_jump_engine::{merton_series_price, MertonSeriesConfig};
use crate::{Diagnostics, Method, PricingEngine, PricingResult};

/// Analytic pricer for European options under Black-Scholes and Merton.
///
/// American exercise is rejected with `InvalidExercise`: no closed form
/// exists, use [`LatticeEngine`](crate::LatticeEngine) or
/// [`FiniteDifferenceEngine`](crate::FiniteDifferenceEngine).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ClosedFormEngine {
    merton: MertonSeriesConfig,
}

impl ClosedFormEngine {
    /// Engine with the default Merton truncation policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different Merton truncation policy.
    pub fn with_merton_config(mut self, config: MertonSeriesConfig) -> Self {
        self.merton = config;
        self
    }

    /// The Merton truncation policy.
    pub fn merton_config(&self) -> &MertonSeriesConfig {
        &self.merton
    }
}

impl PricingEngine for ClosedFormEngine {
    fn calculate(&self, instrument: &Instrument, model: &MarketModel) -> Result<PricingResult> {
        if instrument.exercise().is_american() {
            fail!(
                InvalidExercise,
                "no closed form for American exercise; use a lattice or finite-difference pricer"
            );
        }
        let option_type = instrument.option_type();
        let (strike, t) = (instrument.strike(), instrument.maturity());

        let result = match model {
            MarketModel::BlackScholes(p) => {
                let (s, r, q, vol) = (p.spot(), p.rate(), p.dividend_yield(), p.volatility());
                if let Some(barrier) = instrument.barrier() {
                    let price = analytic_barrier_price(
                        option_type,
                        barrier.barrier_type,
                        s,
                        strike,
                        barrier.level,
                        r,
                        q,
                        vol,
                        t,
                    );
                    PricingResult::from_price(price)
                        .with_diagnostics(Diagnostics::new(Method::AnalyticBarrier))
                } else if let Some(avg) = instrument.averaging() {
                    let price =
                        geometric_average_price(option_type, s, strike, r, q, vol, t, avg.window);
                    PricingResult::from_price(price)
                        .with_diagnostics(Diagnostics::new(Method::AnalyticGeometricAverage))
                } else {
                    let (price, greeks) = black_scholes_merton(option_type, s, strike, r, q, vol, t);
                    PricingResult::from_price(price)
                        .with_greeks(greeks)
                        .with_diagnostics(Diagnostics::new(Method::AnalyticBlackScholes))
                }
            }
            MarketModel::Merton(p) => {
                if !instrument.is_vanilla() {
                    fail!(
                        UnsupportedMethod,
                        "closed-form Merton pricing covers vanilla contracts only"
                    );
                }
                let series = merton_series_price(option_type, p, strike, t, &self.merton)?;
                let mut diagnostics = Diagnostics::new(Method::MertonSeries)
                    .with_steps(series.terms)
                    .with_convergence_estimate(series.last_term);
                if !series.converged {
                    diagnostics = diagnostics.with_warning(format!(
                        "Merton series truncated at {} terms before reaching tolerance",
                        series.terms
                    ));
                }
                PricingResult::from_price(series.price).with_diagnostics(diagnostics)
            }
            MarketModel::Heston(_) => fail!(
                UnsupportedModel,
                "closed-form pricer does not support the Heston model; use the Fourier pricer"
            ),
        };

        qq_core::ensure_finite!(result.price, "closed-form price");
        debug!(price = result.price, model = %model.family(), "closed-form price");
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qq_core::Error;
    use qq_instruments::{Barrier, BarrierType, OptionType};
    use qq_models::{HestonParams, MertonParams};

    fn bs() -> MarketModel {
        MarketModel::black_scholes(100.0, 0.05, 0.0, 0.20).unwrap()
    }

    #[test]
    fn european_call_with_greeks() {
        let call = Instrument::european(OptionType::Call, 100.0, 1.0).unwrap();
        let r = ClosedFormEngine::new().calculate(&call, &bs()).unwrap();
        assert!((r.price - 10.450583572185565).abs() < 1e-10);
        let g = r.greeks.unwrap();
        assert!((g.delta - 0.636831).abs() < 1e-6);
        assert_eq!(r.diagnostics.unwrap().method, Method::AnalyticBlackScholes);
    }

    #[test]
    fn american_is_rejected() {
        let put = Instrument::american(OptionType::Put, 100.0, 1.0).unwrap();
        let err = ClosedFormEngine::new().calculate(&put, &bs()).unwrap_err();
        assert!(matches!(err, Error::InvalidExercise(_)), "{err}");
    }

    #[test]
    fn heston_is_rejected() {
        let heston: MarketModel = HestonParams::new(100.0, 0.05, 0.0, 0.04, 2.0, 0.04, 0.3, -0.7)
            .unwrap()
            .into();
        let call = Instrument::european(OptionType::Call, 100.0, 1.0).unwrap();
        let err = ClosedFormEngine::new().calculate(&call, &heston).unwrap_err();
        assert!(matches!(err, Error::UnsupportedModel(_)), "{err}");
    }

    #[test]
    fn merton_vanilla_and_exotics() {
        let merton: MarketModel = MertonParams::new(100.0, 0.05, 0.0, 0.20, 1.0, -0.1, 0.15)
            .unwrap()
            .into();
        let call = Instrument::european(OptionType::Call, 100.0, 1.0).unwrap();
        let r = ClosedFormEngine::new().calculate(&call, &merton).unwrap();
        assert!((r.price - 12.7612886).abs() < 1e-6, "{}", r.price);
        assert!(r.greeks.is_none());
        assert!(r.warnings().is_empty());

        let barrier = call
            .with_barrier(Barrier::new(BarrierType::DownOut, 90.0))
            .unwrap();
        let err = ClosedFormEngine::new().calculate(&barrier, &merton).unwrap_err();
        assert!(matches!(err, Error::UnsupportedMethod(_)));
    }

    #[test]
    fn best_effort_truncation_is_flagged() {
        let merton: MarketModel = MertonParams::new(100.0, 0.05, 0.0, 0.20, 3.0, -0.1, 0.15)
            .unwrap()
            .into();
        let call = Instrument::european(OptionType::Call, 100.0, 1.0).unwrap();
        let engine = ClosedFormEngine::new().with_merton_config(
            MertonSeriesConfig::default()
                .with_max_terms(2)
                .with_best_effort(true),
        );
        let r = engine.calculate(&call, &merton).unwrap();
        assert_eq!(r.warnings().len(), 1);
    }

    #[test]
    fn barrier_and_average_dispatch() {
        let model = MarketModel::black_scholes(100.0, 0.05, 0.02, 0.20).unwrap();
        let doc = Instrument::european(OptionType::Call, 100.0, 1.0)
            .unwrap()
            .with_barrier(Barrier::new(BarrierType::DownOut, 90.0))
            .unwrap();
        let r = ClosedFormEngine::new().calculate(&doc, &model).unwrap();
        assert!((r.price - 7.58695).abs() < 1e-4, "{}", r.price);
        assert_eq!(r.diagnostics.unwrap().method, Method::AnalyticBarrier);

        let avg = Instrument::european(OptionType::Call, 100.0, 1.0)
            .unwrap()
            .with_averaging(0.5)
            .unwrap();
        let r = ClosedFormEngine::new().calculate(&avg, &model).unwrap();
        assert!((r.price - 7.307231).abs() < 1e-5, "{}", r.price);
    }
}
