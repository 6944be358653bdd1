//! Recombining trinomial tree in log-price space.
//!
//! Kamrad-Ritchken parameterisation with stretch parameter `λ`:
//!
//! ```text
//! dx  = λ·σ·√Δt
//! p_u = 1/(2λ²) + ν·√Δt/(2λσ)
//! p_m = 1 − 1/λ²
//! p_d = 1/(2λ²) − ν·√Δt/(2λσ)        ν = r − q − σ²/2
//! ```
//!
//! `λ = √3` makes the tree match the fourth moment of the normal step.

use super::Lattice;
use qq_core::{ensure, errors::Error, errors::Result, Probability, Real, Size, Time};
use qq_models::BlackScholesParams;

/// Default stretch `λ = √3`.
pub const DEFAULT_STRETCH: Real = 1.732_050_807_568_877_2;

/// A recombining trinomial tree for the Black-Scholes diffusion.
///
/// Layer `i` holds `2i + 1` nodes; node `(i, j)` sits at
/// `x0 · exp((j − i)·dx)`. Branches are `0` = down, `1` = middle, `2` = up,
/// and lead to node `j + branch` of the next layer.
#[derive(Debug, Clone)]
pub struct TrinomialTree {
    x0: Real,
    dt: Time,
    dx: Real,
    steps: Size,
    probs: [Probability; 3],
}

impl TrinomialTree {
    /// Build a tree over `[0, maturity]` with the given stretch.
    ///
    /// Fails with `NumericalInstability` if any branch probability is
    /// negative, which happens for `λ < 1` or when the drift dominates the
    /// step (`|ν|·√Δt > σ/λ`).
    pub fn new(
        params: &BlackScholesParams,
        maturity: Time,
        steps: Size,
        stretch: Real,
    ) -> Result<Self> {
        ensure!(steps >= 1, "trinomial tree needs at least one step");
        ensure!(
            maturity.is_finite() && maturity > 0.0,
            "maturity must be positive, got {maturity}"
        );
        ensure!(
            stretch.is_finite() && stretch > 0.0,
            "trinomial stretch must be positive, got {stretch}"
        );
        let sigma = params.volatility();
        let nu = params.rate() - params.dividend_yield() - 0.5 * sigma * sigma;
        let dt = maturity / steps as Real;
        let dx = stretch * sigma * dt.sqrt();

        let l2 = stretch * stretch;
        let skew = nu * dt.sqrt() / (2.0 * stretch * sigma);
        let pd = 0.5 / l2 - skew;
        let pm = 1.0 - 1.0 / l2;
        let pu = 0.5 / l2 + skew;

        for (name, p) in [("down", pd), ("middle", pm), ("up", pu)] {
            if !(p.is_finite() && p >= 0.0) {
                return Err(Error::NumericalInstability(format!(
                    "trinomial tree: {name} probability {p:.6} is negative \
                     (stretch {stretch}, {steps} steps)"
                )));
            }
        }

        Ok(Self {
            x0: params.spot(),
            dt,
            dx,
            steps,
            probs: [pd, pm, pu],
        })
    }

    /// Log-space node spacing.
    pub fn dx(&self) -> Real {
        self.dx
    }
}

impl Lattice for TrinomialTree {
    fn steps(&self) -> Size {
        self.steps
    }

    fn dt(&self) -> Time {
        self.dt
    }

    fn branches(&self) -> Size {
        3
    }

    fn size(&self, i: Size) -> Size {
        2 * i + 1
    }

    fn underlying(&self, i: Size, index: Size) -> Real {
        let j = index as isize - i as isize;
        self.x0 * (j as Real * self.dx).exp()
    }

    fn descendant(&self, _i: Size, index: Size, branch: Size) -> Size {
        index + branch
    }

    fn probability(&self, _i: Size, _index: Size, branch: Size) -> Probability {
        self.probs[branch]
    }
}
