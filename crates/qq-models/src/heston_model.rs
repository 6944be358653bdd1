//! Heston stochastic volatility model.
//!
//! ```text
//! dS = (r − q)·S dt + √v·S dW₁
//! dv = κ(θ − v) dt + σ √v dW₂
//! dW₁·dW₂ = ρ dt
//! ```

use crate::black_scholes_model::validate_market;
use crate::characteristic_function::{ln_1p, CharacteristicFunction};
use num_complex::Complex64;
use qq_core::{ensure, errors::Result, Rate, Real, Time};

/// Parameters of the Heston model.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct HestonParams {
    spot: Real,
    rate: Rate,
    dividend_yield: Rate,
    v0: Real,
    kappa: Real,
    theta: Real,
    sigma: Real,
    rho: Real,
}

impl HestonParams {
    /// Create a validated parameter set.
    ///
    /// A Feller violation (`2κθ < σ²`) is allowed; pricers that care test
    /// [`feller_satisfied`](Self::feller_satisfied) and report it themselves.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        spot: Real,
        rate: Rate,
        dividend_yield: Rate,
        v0: Real,
        kappa: Real,
        theta: Real,
        sigma: Real,
        rho: Real,
    ) -> Result<Self> {
        validate_market(spot, rate, dividend_yield)?;
        for (name, value) in [("v0", v0), ("kappa", kappa), ("theta", theta), ("sigma", sigma)] {
            ensure!(
                value.is_finite() && value > 0.0,
                "Heston {name} must be finite and positive, got {value}"
            );
        }
        ensure!(
            (-1.0..=1.0).contains(&rho),
            "Heston rho must lie in [-1, 1], got {rho}"
        );
        Ok(Self {
            spot,
            rate,
            dividend_yield,
            v0,
            kappa,
            theta,
            sigma,
            rho,
        })
    }

    /// Spot price.
    pub fn spot(&self) -> Real {
        self.spot
    }

    /// Continuously compounded risk-free rate.
    pub fn rate(&self) -> Rate {
        self.rate
    }

    /// Continuous dividend yield.
    pub fn dividend_yield(&self) -> Rate {
        self.dividend_yield
    }

    /// Initial variance.
    pub fn v0(&self) -> Real {
        self.v0
    }

    /// Mean-reversion speed.
    pub fn kappa(&self) -> Real {
        self.kappa
    }

    /// Long-run variance.
    pub fn theta(&self) -> Real {
        self.theta
    }

    /// Vol-of-vol.
    pub fn sigma(&self) -> Real {
        self.sigma
    }

    /// Spot-vol correlation.
    pub fn rho(&self) -> Real {
        self.rho
    }

    /// Feller condition: `2κθ ≥ σ²`.
    pub fn feller_satisfied(&self) -> bool {
        2.0 * self.kappa * self.theta >= self.sigma * self.sigma
    }
}

impl CharacteristicFunction for HestonParams {
    /// "Little trap" form: `g = (β − d)/(β + d)` with `exp(−dT)`, which keeps
    /// `ln((1 − g·e^{−dT})/(1 − g))` on the principal branch along the real
    /// frequency axis. `β − d` is formed as `−σ²(u² + iu)/(β + d)` so the
    /// small vol-of-vol limit does not cancel.
    fn log_characteristic(&self, u: Complex64, t: Time) -> Complex64 {
        let i = Complex64::i();
        let s2 = self.sigma * self.sigma;
        let a = u * u + i * u;
        let beta = self.kappa - self.rho * self.sigma * i * u;
        let d = (beta * beta + s2 * a).sqrt();
        let beta_plus_d = beta + d;
        let beta_minus_d = -s2 * a / beta_plus_d;
        let g = beta_minus_d / beta_plus_d;
        let e = (-d * t).exp();

        // (β − d)/σ²
        let scaled = -a / beta_plus_d;
        let big_d = scaled * (1.0 - e) / (1.0 - g * e);
        // ln((1 − g·e)/(1 − g)) = ln(1 + g(1 − e)/(1 − g))
        let log_term = ln_1p(g * (1.0 - e) / (1.0 - g));
        let big_c = self.kappa * self.theta * (scaled * t - 2.0 / s2 * log_term);

        big_c + big_d * self.v0
    }
}
