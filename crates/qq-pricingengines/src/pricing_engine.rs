//! The pricer interface and its result type.

use std::collections::BTreeMap;
use std::fmt;

use qq_core::{errors::Result, Real, Size};
use qq_instruments::Instrument;
use qq_methods::{BinomialScheme, FdmScheme};
use qq_models::MarketModel;

/// Smallest number of lattice steps, FD space steps or FD time steps any
/// discretised pricer accepts.
pub const MIN_STEPS: Size = 3;

/// First- and second-order sensitivities of an option price.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Greeks {
    /// `∂V/∂S`.
    pub delta: Real,
    /// `∂²V/∂S²`.
    pub gamma: Real,
    /// `∂V/∂σ`.
    pub vega: Real,
    /// `∂V/∂t` per year of calendar time (negative of `∂V/∂T`).
    pub theta: Real,
    /// `∂V/∂r`.
    pub rho: Real,
}

/// The algorithm that produced a [`PricingResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum Method {
    /// Black-Scholes formula.
    AnalyticBlackScholes,
    /// Reiner-Rubinstein barrier formula.
    AnalyticBarrier,
    /// Lognormal closed form for geometric averaging.
    AnalyticGeometricAverage,
    /// Poisson-weighted Black-Scholes series.
    MertonSeries,
    /// Binomial tree.
    BinomialTree(BinomialScheme),
    /// Kamrad-Ritchken trinomial tree.
    TrinomialTree,
    /// θ-scheme finite differences.
    FiniteDifference(FdmScheme),
    /// Characteristic-function inversion.
    Fourier,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::AnalyticBlackScholes => f.write_str("analytic black-scholes"),
            Method::AnalyticBarrier => f.write_str("analytic barrier"),
            Method::AnalyticGeometricAverage => f.write_str("analytic geometric average"),
            Method::MertonSeries => f.write_str("merton series"),
            Method::BinomialTree(scheme) => write!(f, "binomial ({scheme})"),
            Method::TrinomialTree => f.write_str("trinomial"),
            Method::FiniteDifference(scheme) => write!(f, "finite difference ({scheme})"),
            Method::Fourier => f.write_str("fourier"),
        }
    }
}

/// How a price was obtained.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Diagnostics {
    /// Algorithm used.
    pub method: Method,
    /// Steps, series terms or integrand evaluations, when meaningful.
    pub steps: Option<Size>,
    /// Estimate of the numerical error of the price.
    pub convergence_estimate: Option<Real>,
    /// Non-fatal conditions met while pricing.
    pub warnings: Vec<String>,
}

impl Diagnostics {
    /// Diagnostics naming only the method.
    pub fn new(method: Method) -> Self {
        Self {
            method,
            steps: None,
            convergence_estimate: None,
            warnings: Vec::new(),
        }
    }

    /// Record a step or evaluation count.
    pub fn with_steps(mut self, steps: Size) -> Self {
        self.steps = Some(steps);
        self
    }

    /// Record an error estimate.
    pub fn with_convergence_estimate(mut self, estimate: Real) -> Self {
        self.convergence_estimate = Some(estimate);
        self
    }

    /// Append a warning.
    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }
}

/// Output of a pricing call.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PricingResult {
    /// Present value.
    pub price: Real,
    /// Analytic Greeks, when the pricer has them.
    pub greeks: Option<Greeks>,
    /// Method, step count, error estimate and warnings.
    pub diagnostics: Option<Diagnostics>,
    /// Additional named results (`"delta"`, `"gamma"`, `"theta"` from
    /// lattices and grids).
    pub additional_results: BTreeMap<String, Real>,
}

impl PricingResult {
    /// A result carrying only a price.
    pub fn from_price(price: Real) -> Self {
        Self {
            price,
            greeks: None,
            diagnostics: None,
            additional_results: BTreeMap::new(),
        }
    }

    /// Attach analytic Greeks.
    pub fn with_greeks(mut self, greeks: Greeks) -> Self {
        self.greeks = Some(greeks);
        self
    }

    /// Attach diagnostics.
    pub fn with_diagnostics(mut self, diagnostics: Diagnostics) -> Self {
        self.diagnostics = Some(diagnostics);
        self
    }

    /// Add a named result.
    pub fn with_result(mut self, key: impl Into<String>, value: Real) -> Self {
        self.additional_results.insert(key.into(), value);
        self
    }

    /// Look up a named result.
    pub fn result(&self, key: &str) -> Option<Real> {
        self.additional_results.get(key).copied()
    }

    /// Diagnostics warnings, empty if there are none.
    pub fn warnings(&self) -> &[String] {
        self.diagnostics
            .as_ref()
            .map(|d| d.warnings.as_slice())
            .unwrap_or(&[])
    }
}

/// An option pricer.
///
/// Pricers hold only their tunables; every call is a pure function of the
/// instrument and model, so one pricer may be shared across threads.
pub trait PricingEngine: fmt::Debug + Send + Sync {
    /// Price `instrument` under `model`.
    fn calculate(&self, instrument: &Instrument, model: &MarketModel) -> Result<PricingResult>;
}

impl<E: PricingEngine + ?Sized> PricingEngine for &E {
    fn calculate(&self, instrument: &Instrument, model: &MarketModel) -> Result<PricingResult> {
        (**self).calculate(instrument, model)
    }
}

impl<E: PricingEngine + ?Sized> PricingEngine for Box<E> {
    fn calculate(&self, instrument: &Instrument, model: &MarketModel) -> Result<PricingResult> {
        (**self).calculate(instrument, model)
    }
}
