//! Characteristic-function pricing (Lewis / Gatheral single integral).
//!
//! With `F` the forward, `k = ln(F/K)` and `ψ` the characteristic function
//! of `ln(S_T/F)`:
//!
//! $$C = e^{-rT}\Big[F - \frac{\sqrt{FK}}{\pi}\int_0^\infty
//!       \frac{\mathrm{Re}\big(e^{iuk}\,\psi(u - i/2)\big)}{u^2 + 1/4}\,du\Big]$$
//!
//! Puts follow from put-call parity. The integral is truncated at
//! `truncation` and evaluated by adaptive Gauss-Kronrod quadrature.

use num_complex::Complex64;
use qq_core::{ensure, errors::Error, errors::Result, fail, Real, Size};
use qq_instruments::{Instrument, OptionType};
use qq_math::GaussKronrodAdaptive;
use qq_models::{CharacteristicFunction, MarketModel};
use std::f64::consts::PI;
use tracing::{debug, warn};

use crate::{Diagnostics, Method, PricingEngine, PricingResult};

/// Imaginary shift of the integration contour, `u ↦ u − i·CONTOUR_SHIFT`.
///
/// `½` is the symmetric choice between the poles of the call payoff
/// transform at `Im = 0` and `Im = −1`.
pub const CONTOUR_SHIFT: Real = 0.5;

/// Fourier pricer for European vanilla options under Heston, Merton or
/// Black-Scholes.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct FourierEngine {
    truncation: Real,
    tolerance: Real,
    max_evaluations: Size,
    require_feller: bool,
}

impl Default for FourierEngine {
    fn default() -> Self {
        Self {
            truncation: 1000.0,
            tolerance: 1e-10,
            max_evaluations: 200_000,
            require_feller: false,
        }
    }
}

impl FourierEngine {
    /// Engine with default truncation and tolerance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Upper frequency bound `U` of the integral.
    pub fn with_truncation(mut self, truncation: Real) -> Self {
        self.truncation = truncation;
        self
    }

    /// Absolute quadrature tolerance (on the undiscounted integral).
    pub fn with_tolerance(mut self, tolerance: Real) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Integrand evaluation budget.
    pub fn with_max_evaluations(mut self, n: Size) -> Self {
        self.max_evaluations = n;
        self
    }

    /// Fail with `InvalidParameter` when Heston parameters violate Feller.
    pub fn with_require_feller(mut self, on: bool) -> Self {
        self.require_feller = on;
        self
    }

    /// Integrand for log-moneyness `k` at maturity `t`.
    fn integrand<'a>(
        model: &'a MarketModel,
        k: Real,
        t: Real,
    ) -> impl Fn(Real) -> Real + 'a {
        move |u: Real| {
            let shifted = Complex64::new(u, -CONTOUR_SHIFT);
            let phase = Complex64::new(0.0, u * k);
            (phase + model.log_characteristic(shifted, t)).exp().re
                / (u * u + CONTOUR_SHIFT * CONTOUR_SHIFT)
        }
    }

    /// `|ψ(u − i/2)| · u / (u² + ¼)`: bounds `|integrand(u)| · u` for every
    /// strike, so an oscillation zero of the real part cannot hide the tail.
    fn tail_bound(model: &MarketModel, t: Real, u: Real) -> Real {
        let shifted = Complex64::new(u, -CONTOUR_SHIFT);
        model.log_characteristic(shifted, t).re.exp() * u
            / (u * u + CONTOUR_SHIFT * CONTOUR_SHIFT)
    }
}

impl PricingEngine for FourierEngine {
    fn calculate(&self, instrument: &Instrument, model: &MarketModel) -> Result<PricingResult> {
        if instrument.exercise().is_american() {
            fail!(InvalidExercise, "Fourier pricer handles European exercise only");
        }
        if !instrument.is_vanilla() {
            fail!(
                UnsupportedMethod,
                "Fourier pricer does not support barrier or averaging features"
            );
        }
        ensure!(
            self.truncation.is_finite() && self.truncation > 0.0,
            "Fourier truncation must be positive, got {}",
            self.truncation
        );

        let mut diagnostics = Diagnostics::new(Method::Fourier);
        if let MarketModel::Heston(h) = model {
            if !h.feller_satisfied() {
                let msg = format!(
                    "Feller condition violated: 2κθ = {:.6} < σ² = {:.6}",
                    2.0 * h.kappa() * h.theta(),
                    h.sigma() * h.sigma()
                );
                if self.require_feller {
                    return Err(Error::InvalidParameter(msg));
                }
                warn!("{msg}");
                diagnostics = diagnostics.with_warning(msg);
            }
        }

        let (strike, t) = (instrument.strike(), instrument.maturity());
        let forward = model.forward(t);
        let discount = (-model.rate() * t).exp();
        let k = (forward / strike).ln();
        let f = Self::integrand(model, k, t);

        let tail = Self::tail_bound(model, t, self.truncation);
        if tail.is_nan() || tail > self.tolerance {
            return Err(Error::NumericalInstability(format!(
                "Fourier integrand tail {tail:.3e} at u = {} exceeds tolerance {:.3e}; \
                 raise the truncation bound",
                self.truncation, self.tolerance
            )));
        }

        let quad = GaussKronrodAdaptive::new(self.tolerance, self.max_evaluations)
            .with_initial_segments(8)
            .integrate_with_estimate(&f, 0.0, self.truncation)?;

        let scale = discount * (forward * strike).sqrt() / PI;
        let call = discount * forward - scale * quad.value;
        let price = match instrument.option_type() {
            OptionType::Call => call,
            OptionType::Put => call - discount * (forward - strike),
        };
        qq_core::ensure_finite!(price, "Fourier price");

        debug!(
            price,
            evaluations = quad.evaluations,
            error = quad.error_estimate,
            model = %model.family(),
            "Fourier price"
        );
        Ok(PricingResult::from_price(price).with_diagnostics(
            diagnostics
                .with_steps(quad.evaluations)
                .with_convergence_estimate(scale * quad.error_estimate),
        ))
    }
}
