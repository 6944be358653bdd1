//! Binomial and trinomial tree pricing with early exercise and
//! discretely monitored barriers.

use std::fmt;
use std::str::FromStr;

use qq_core::{ensure, errors::Error, errors::Result, fail, Real, Size};
use qq_instruments::{Barrier, Instrument};
use qq_methods::lattice::DEFAULT_STRETCH;
use qq_methods::{backward_induction, BinomialScheme, BinomialTree, Lattice, LatticeState, TrinomialTree};
use qq_models::{BlackScholesParams, MarketModel};
use tracing::debug;

use crate::{Diagnostics, Method, PricingEngine, PricingResult, MIN_STEPS};

/// Tree shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum LatticeVariant {
    /// Two branches per node.
    #[default]
    Binomial,
    /// Three branches per node (Kamrad-Ritchken).
    Trinomial,
}

impl fmt::Display for LatticeVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LatticeVariant::Binomial => f.write_str("binomial"),
            LatticeVariant::Trinomial => f.write_str("trinomial"),
        }
    }
}

impl FromStr for LatticeVariant {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "binomial" => Ok(LatticeVariant::Binomial),
            "trinomial" => Ok(LatticeVariant::Trinomial),
            other => Err(Error::UnsupportedMethod(format!(
                "unknown lattice variant '{other}'"
            ))),
        }
    }
}

/// Tree pricer for Black-Scholes models.
///
/// Supports European and American exercise, knock-out barriers monitored
/// at every lattice date, and European knock-ins by in/out parity.
/// Lattice-native delta, gamma and theta are returned in
/// `additional_results`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct LatticeEngine {
    steps: Size,
    variant: LatticeVariant,
    binomial_scheme: BinomialScheme,
    trinomial_stretch: Real,
    estimate_convergence: bool,
}

impl Default for LatticeEngine {
    fn default() -> Self {
        Self {
            steps: 500,
            variant: LatticeVariant::Binomial,
            binomial_scheme: BinomialScheme::CoxRossRubinstein,
            trinomial_stretch: DEFAULT_STRETCH,
            estimate_convergence: false,
        }
    }
}

impl LatticeEngine {
    /// Binomial (Cox-Ross-Rubinstein) engine with `steps` time steps.
    pub fn binomial(steps: Size) -> Self {
        Self {
            steps,
            ..Self::default()
        }
    }

    /// Trinomial engine with `steps` time steps and stretch `√3`.
    pub fn trinomial(steps: Size) -> Self {
        Self {
            steps,
            variant: LatticeVariant::Trinomial,
            ..Self::default()
        }
    }

    /// Change the number of time steps.
    pub fn with_steps(mut self, steps: Size) -> Self {
        self.steps = steps;
        self
    }

    /// Change the tree shape.
    pub fn with_variant(mut self, variant: LatticeVariant) -> Self {
        self.variant = variant;
        self
    }

    /// Binomial parameterisation (ignored by trinomial trees).
    pub fn with_scheme(mut self, scheme: BinomialScheme) -> Self {
        self.binomial_scheme = scheme;
        self
    }

    /// Trinomial stretch `λ` (ignored by binomial trees).
    pub fn with_stretch(mut self, stretch: Real) -> Self {
        self.trinomial_stretch = stretch;
        self
    }

    /// Also price with one step fewer and report `|Vₙ − Vₙ₋₁|`.
    pub fn with_convergence_estimate(mut self, on: bool) -> Self {
        self.estimate_convergence = on;
        self
    }

    /// Number of time steps.
    pub fn steps(&self) -> Size {
        self.steps
    }

    /// Tree shape.
    pub fn variant(&self) -> LatticeVariant {
        self.variant
    }

    fn method(&self) -> Method {
        match self.variant {
            LatticeVariant::Binomial => Method::BinomialTree(self.binomial_scheme),
            LatticeVariant::Trinomial => Method::TrinomialTree,
        }
    }

    fn build(
        &self,
        params: &BlackScholesParams,
        instrument: &Instrument,
        steps: Size,
    ) -> Result<Box<dyn Lattice>> {
        let t = instrument.maturity();
        Ok(match self.variant {
            LatticeVariant::Binomial => Box::new(BinomialTree::new(
                self.binomial_scheme,
                params,
                t,
                steps,
                instrument.strike(),
            )?),
            LatticeVariant::Trinomial => {
                Box::new(TrinomialTree::new(params, t, steps, self.trinomial_stretch)?)
            }
        })
    }

    /// Roll the payoff back, zeroing nodes on the wrong side of `knock_out`.
    fn roll_back(
        &self,
        params: &BlackScholesParams,
        instrument: &Instrument,
        steps: Size,
        knock_out: Option<&Barrier>,
    ) -> Result<(LatticeState, Size)> {
        let lattice = self.build(params, instrument, steps)?;
        let discount = (-params.rate() * lattice.dt()).exp();
        let american = instrument.exercise().is_american();
        let state = backward_induction(
            lattice.as_ref(),
            discount,
            |s| instrument.intrinsic(s),
            |s, v| {
                if knock_out.is_some_and(|b| b.is_breached(s)) {
                    0.0
                } else if american {
                    v.max(instrument.intrinsic(s))
                } else {
                    v
                }
            },
        )?;
        Ok((state, lattice.steps()))
    }

    /// Price and native sensitivities with `steps` time steps.
    fn value(
        &self,
        params: &BlackScholesParams,
        instrument: &Instrument,
        steps: Size,
    ) -> Result<(Real, Option<(Real, Real, Real)>, Size)> {
        let spot = params.spot();
        match instrument.barrier() {
            None => {
                let (state, used) = self.roll_back(params, instrument, steps, None)?;
                Ok((state.root_value(), state.sensitivities(spot), used))
            }
            Some(b) if b.barrier_type.is_knock_out() => {
                let (state, used) = self.roll_back(params, instrument, steps, Some(b))?;
                Ok((state.root_value(), state.sensitivities(spot), used))
            }
            Some(b) => {
                let (vanilla, used) = self.roll_back(params, instrument, steps, None)?;
                let (out, _) =
                    self.roll_back(params, instrument, steps, Some(&b.knock_out_counterpart()))?;
                let sens = vanilla
                    .sensitivities(spot)
                    .zip(out.sensitivities(spot))
                    .map(|((d1, g1, t1), (d2, g2, t2))| (d1 - d2, g1 - g2, t1 - t2));
                Ok((vanilla.root_value() - out.root_value(), sens, used))
            }
        }
    }
}

impl PricingEngine for LatticeEngine {
    fn calculate(&self, instrument: &Instrument, model: &MarketModel) -> Result<PricingResult> {
        let params = match model {
            MarketModel::BlackScholes(p) => p,
            other => fail!(
                UnsupportedModel,
                "lattice pricer supports Black-Scholes only, got {}",
                other.family()
            ),
        };
        ensure!(
            self.steps >= MIN_STEPS,
            "lattice needs at least {MIN_STEPS} steps, got {}",
            self.steps
        );
        if instrument.averaging().is_some() {
            fail!(UnsupportedMethod, "lattice pricer does not support averaging");
        }
        if let Some(b) = instrument.barrier() {
            if !b.barrier_type.is_knock_out() && instrument.exercise().is_american() {
                fail!(
                    UnsupportedMethod,
                    "American knock-in options are not supported by the lattice pricer"
                );
            }
        }

        let (price, sensitivities, used) = self.value(params, instrument, self.steps)?;
        let mut diagnostics = Diagnostics::new(self.method()).with_steps(used);
        if self.estimate_convergence {
            let coarser = match (self.variant, self.binomial_scheme) {
                // Leisen-Reimer trees only come in odd sizes.
                (LatticeVariant::Binomial, BinomialScheme::LeisenReimer) => used - 2,
                _ => used - 1,
            };
            let (previous, _, _) = self.value(params, instrument, coarser)?;
            diagnostics = diagnostics.with_convergence_estimate((price - previous).abs());
        }

        let mut result = PricingResult::from_price(price).with_diagnostics(diagnostics);
        if let Some((delta, gamma, theta)) = sensitivities {
            result = result
                .with_result("delta", delta)
                .with_result("gamma", gamma)
                .with_result("theta", theta);
        }
        debug!(price, steps = used, method = %self.method(), "lattice price");
        Ok(result)
    }
}
