//! Finite-difference pricing of the Black-Scholes PDE in log-price.
//!
//! The mesh spans `width_std_devs` standard deviations around spot and
//! strike; a knock-out barrier replaces the grid edge on its side and
//! holds the value at zero (continuous monitoring).

use qq_core::{ensure, errors::Result, fail, Real, Size};
use qq_instruments::{Barrier, Instrument, OptionType};
use qq_methods::finite_differences::GridSensitivities;
use qq_methods::{Fdm1dSolver, FdmScheme, LogMesh};
use qq_models::{BlackScholesParams, MarketModel};
use tracing::debug;

use crate::{Diagnostics, Method, PricingEngine, PricingResult, MIN_STEPS};

/// θ-scheme finite-difference pricer for Black-Scholes models.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct FiniteDifferenceEngine {
    space_steps: Size,
    time_steps: Size,
    scheme: FdmScheme,
    width_std_devs: Real,
    rannacher_steps: Size,
}

impl Default for FiniteDifferenceEngine {
    fn default() -> Self {
        Self {
            space_steps: 400,
            time_steps: 400,
            scheme: FdmScheme::CrankNicolson,
            width_std_devs: 5.0,
            rannacher_steps: 2,
        }
    }
}

impl FiniteDifferenceEngine {
    /// Engine with the given grid size and scheme.
    pub fn new(space_steps: Size, time_steps: Size, scheme: FdmScheme) -> Self {
        Self {
            space_steps,
            time_steps,
            scheme,
            ..Self::default()
        }
    }

    /// Half-width of the mesh in standard deviations `σ√T`.
    pub fn with_width(mut self, std_devs: Real) -> Self {
        self.width_std_devs = std_devs;
        self
    }

    /// Fully implicit start-up steps for Crank-Nicolson.
    pub fn with_rannacher_steps(mut self, steps: Size) -> Self {
        self.rannacher_steps = steps;
        self
    }

    /// Change the grid size, keeping the other tunables.
    pub fn with_grid(mut self, space_steps: Size, time_steps: Size) -> Self {
        self.space_steps = space_steps;
        self.time_steps = time_steps;
        self
    }

    /// Change the time-stepping scheme.
    pub fn with_scheme(mut self, scheme: FdmScheme) -> Self {
        self.scheme = scheme;
        self
    }

    /// Time-stepping scheme.
    pub fn scheme(&self) -> FdmScheme {
        self.scheme
    }

    /// Value and sensitivities of `instrument`, treating `knock_out` as an
    /// absorbing edge.
    fn solve(
        &self,
        params: &BlackScholesParams,
        instrument: &Instrument,
        knock_out: Option<&Barrier>,
    ) -> Result<GridSensitivities> {
        let spot = params.spot();
        if knock_out.is_some_and(|b| b.is_breached(spot)) {
            return Ok(GridSensitivities {
                value: 0.0,
                delta: 0.0,
                gamma: 0.0,
                theta: 0.0,
            });
        }

        let (r, q) = (params.rate(), params.dividend_yield());
        let (strike, t) = (instrument.strike(), instrument.maturity());
        let half_width = self.width_std_devs * params.volatility() * t.sqrt();
        let mut x_min = spot.ln().min(strike.ln()) - half_width;
        let mut x_max = spot.ln().max(strike.ln()) + half_width;
        let (mut absorbing_low, mut absorbing_high) = (false, false);
        if let Some(b) = knock_out {
            if b.barrier_type.is_down() {
                x_min = b.level.ln();
                absorbing_low = true;
            } else {
                x_max = b.level.ln();
                absorbing_high = true;
            }
        }

        let mesh = LogMesh::uniform(x_min, x_max, self.space_steps)?;
        let prices = mesh.prices();
        let n = prices.len();
        let (s_min, s_max) = (prices[0], prices[n - 1]);

        let mut terminal: Vec<Real> = prices.iter().map(|&s| instrument.intrinsic(s)).collect();
        let mut exercise = instrument
            .exercise()
            .is_american()
            .then(|| terminal.clone());
        for values in std::iter::once(&mut terminal).chain(exercise.as_mut()) {
            if absorbing_low {
                values[0] = 0.0;
            }
            if absorbing_high {
                values[n - 1] = 0.0;
            }
        }

        let american = instrument.exercise().is_american();
        let option_type = instrument.option_type();
        let boundary = |tau: Real| {
            let (df_r, df_q) = ((-r * tau).exp(), (-q * tau).exp());
            let (lower, upper) = match option_type {
                OptionType::Call => {
                    let far = s_max * df_q - strike * df_r;
                    (0.0, if american { far.max(s_max - strike) } else { far })
                }
                OptionType::Put => {
                    let far = strike * df_r - s_min * df_q;
                    (if american { far.max(strike - s_min) } else { far }, 0.0)
                }
            };
            (
                if absorbing_low { 0.0 } else { lower },
                if absorbing_high { 0.0 } else { upper },
            )
        };

        let solver = Fdm1dSolver::new(params, t, self.time_steps, self.scheme)?
            .with_rannacher_steps(self.rannacher_steps);
        let grid = solver.solve(mesh, &terminal, boundary, exercise.as_deref())?;
        grid.sensitivities(spot)
    }
}

impl PricingEngine for FiniteDifferenceEngine {
    fn calculate(&self, instrument: &Instrument, model: &MarketModel) -> Result<PricingResult> {
        let params = match model {
            MarketModel::BlackScholes(p) => p,
            other => fail!(
                UnsupportedModel,
                "finite-difference pricer supports Black-Scholes only, got {}",
                other.family()
            ),
        };
        ensure!(
            self.space_steps >= MIN_STEPS && self.time_steps >= MIN_STEPS,
            "finite differences need at least {MIN_STEPS} space and time steps, got {}×{}",
            self.space_steps,
            self.time_steps
        );
        ensure!(
            self.width_std_devs.is_finite() && self.width_std_devs > 0.0,
            "mesh width must be positive, got {}",
            self.width_std_devs
        );
        if instrument.averaging().is_some() {
            fail!(UnsupportedMethod, "finite-difference pricer does not support averaging");
        }

        let sens = match instrument.barrier() {
            None => self.solve(params, instrument, None)?,
            Some(b) if b.barrier_type.is_knock_out() => self.solve(params, instrument, Some(b))?,
            Some(_) if instrument.exercise().is_american() => fail!(
                UnsupportedMethod,
                "American knock-in options are not supported by the finite-difference pricer"
            ),
            Some(b) => {
                let vanilla = self.solve(params, instrument, None)?;
                let out = self.solve(params, instrument, Some(&b.knock_out_counterpart()))?;
                GridSensitivities {
                    value: vanilla.value - out.value,
                    delta: vanilla.delta - out.delta,
                    gamma: vanilla.gamma - out.gamma,
                    theta: vanilla.theta - out.theta,
                }
            }
        };

        debug!(
            price = sens.value,
            space_steps = self.space_steps,
            time_steps = self.time_steps,
            scheme = %self.scheme,
            "finite-difference price"
        );
        Ok(PricingResult::from_price(sens.value)
            .with_result("delta", sens.delta)
            .with_result("gamma", sens.gamma)
            .with_result("theta", sens.theta)
            .with_diagnostics(
                Diagnostics::new(Method::FiniteDifference(self.scheme)).with_steps(self.time_steps),
            ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qq_core::Error;
    use qq_instruments::BarrierType;
    use qq_models::MertonParams;

    fn bs(q: Real) -> MarketModel {
        MarketModel::black_scholes(100.0, 0.05, q, 0.20).unwrap()
    }

    fn price(engine: &FiniteDifferenceEngine, inst: &Instrument, q: Real) -> Result<Real> {
        engine.calculate(inst, &bs(q)).map(|r| r.price)
    }

    #[test]
    fn schemes_match_reference_grid_prices() {
        let call = Instrument::european(OptionType::Call, 100.0, 1.0).unwrap();
        let cn = price(&FiniteDifferenceEngine::default(), &call, 0.0).unwrap();
        assert!((cn - 10.450008).abs() < 1e-4, "CN {cn:.6}");
        let implicit = FiniteDifferenceEngine::new(400, 400, FdmScheme::Implicit);
        let p = price(&implicit, &call, 0.0).unwrap();
        assert!((p - 10.447397).abs() < 1e-4, "implicit {p:.6}");
        let explicit = FiniteDifferenceEngine::new(100, 1000, FdmScheme::Explicit);
        let p = price(&explicit, &call, 0.0).unwrap();
        assert!((p - 10.442603).abs() < 1e-4, "explicit {p:.6}");
    }

    #[test]
    fn unstable_explicit_grid_is_rejected() {
        let call = Instrument::european(OptionType::Call, 100.0, 1.0).unwrap();
        let engine = FiniteDifferenceEngine::new(400, 50, FdmScheme::Explicit);
        assert!(matches!(price(&engine, &call, 0.0), Err(Error::UnstableScheme(_))));
    }

    #[test]
    fn puts_and_early_exercise() {
        let engine = FiniteDifferenceEngine::default();
        let eu = Instrument::european(OptionType::Put, 100.0, 1.0).unwrap();
        let am = Instrument::american(OptionType::Put, 100.0, 1.0).unwrap();
        let pe = price(&engine, &eu, 0.0).unwrap();
        let pa = price(&engine, &am, 0.0).unwrap();
        assert!((pe - 5.572936).abs() < 1e-4, "European put {pe:.6}");
        assert!((pa - 6.08809).abs() < 1e-3, "American put {pa:.6}");
        assert!(pa > pe);
    }

    #[test]
    fn native_sensitivities() {
        let call = Instrument::european(OptionType::Call, 100.0, 1.0).unwrap();
        let r = FiniteDifferenceEngine::default().calculate(&call, &bs(0.0)).unwrap();
        let delta = r.result("delta").unwrap();
        let gamma = r.result("gamma").unwrap();
        let theta = r.result("theta").unwrap();
        assert!((delta - 0.63683).abs() < 1e-3, "delta {delta}");
        assert!((gamma - 0.018762).abs() < 2e-4, "gamma {gamma}");
        assert!((theta + 6.41403).abs() < 0.05, "theta {theta}");
    }

    #[test]
    fn knock_outs_match_reiner_rubinstein() {
        let engine = FiniteDifferenceEngine::default();
        for (ot, bt, h, expected) in [
            (OptionType::Call, BarrierType::DownOut, 90.0, 7.58695),
            (OptionType::Put, BarrierType::UpOut, 110.0, 4.81555),
            (OptionType::Call, BarrierType::UpOut, 130.0, 3.13933),
        ] {
            let inst = Instrument::european(ot, 100.0, 1.0)
                .unwrap()
                .with_barrier(Barrier::new(bt, h))
                .unwrap();
            let p = price(&engine, &inst, 0.02).unwrap();
            assert!((p - expected).abs() < 1e-3, "{ot} {bt} H={h}: {p:.5} vs {expected}");
        }
    }

    #[test]
    fn knock_in_parity_and_breach() {
        let engine = FiniteDifferenceEngine::default();
        let vanilla = Instrument::european(OptionType::Call, 100.0, 1.0).unwrap();
        let din = vanilla
            .clone()
            .with_barrier(Barrier::new(BarrierType::DownIn, 90.0))
            .unwrap();
        let dout = vanilla
            .clone()
            .with_barrier(Barrier::new(BarrierType::DownOut, 90.0))
            .unwrap();
        let v = price(&engine, &vanilla, 0.02).unwrap();
        let i = price(&engine, &din, 0.02).unwrap();
        let o = price(&engine, &dout, 0.02).unwrap();
        assert!((i + o - v).abs() < 1e-10);

        let breached = vanilla
            .with_barrier(Barrier::new(BarrierType::DownOut, 105.0))
            .unwrap();
        assert_eq!(price(&engine, &breached, 0.02).unwrap(), 0.0);
    }

    #[test]
    fn rejects_unsupported_inputs() {
        let engine = FiniteDifferenceEngine::default();
        let call = Instrument::european(OptionType::Call, 100.0, 1.0).unwrap();
        let merton: MarketModel = MertonParams::new(100.0, 0.05, 0.0, 0.2, 1.0, -0.1, 0.15)
            .unwrap()
            .into();
        assert!(matches!(
            engine.calculate(&call, &merton),
            Err(Error::UnsupportedModel(_))
        ));
        assert!(matches!(
            price(&FiniteDifferenceEngine::new(2, 100, FdmScheme::Implicit), &call, 0.0),
            Err(Error::InvalidParameter(_))
        ));
        let avg = call.with_averaging(1.0).unwrap();
        assert!(matches!(price(&engine, &avg, 0.0), Err(Error::UnsupportedMethod(_))));
    }
}
