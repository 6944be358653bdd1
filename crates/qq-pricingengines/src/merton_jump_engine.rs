//! Merton (1976) jump-diffusion prices as a Poisson-weighted series of
//! Black-Scholes prices.
//!
//! With `k = e^{μ+δ²/2} − 1` and `λ' = λ(1 + k)`:
//!
//! $$V = \sum_{n \ge 0} e^{-\lambda' T}\frac{(\lambda' T)^n}{n!}\,
//!       BS\big(S, K, r_n, q, \sigma_n, T\big)$$
//!
//! with `r_n = r − λk + n·ln(1+k)/T` and `σ_n² = σ² + nδ²/T`.

use qq_core::{ensure, errors::Error, errors::Result, Real, Size, Time};
use qq_instruments::OptionType;
use qq_math::PoissonDistribution;
use qq_models::MertonParams;
use tracing::warn;

use crate::analytic_european_engine::black_scholes_price;

/// Truncation policy of the Merton series.
///
/// The series is summed until a term past the Poisson mode `λ'T` falls
/// below `relative_tolerance` times the running sum. A tighter tolerance
/// costs more Black-Scholes evaluations, one per term; `max_terms` bounds
/// that cost. Hitting `max_terms` first is an error unless `best_effort`
/// is set, in which case the partial sum is returned with a warning.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct MertonSeriesConfig {
    /// Stop once a term is at most this fraction of the running sum.
    pub relative_tolerance: Real,
    /// Hard cap on the number of terms.
    pub max_terms: Size,
    /// Return the truncated sum instead of failing at `max_terms`.
    pub best_effort: bool,
}

impl Default for MertonSeriesConfig {
    fn default() -> Self {
        Self {
            relative_tolerance: 1e-10,
            max_terms: 100,
            best_effort: false,
        }
    }
}

impl MertonSeriesConfig {
    /// Set the relative tolerance.
    pub fn with_relative_tolerance(mut self, tol: Real) -> Self {
        self.relative_tolerance = tol;
        self
    }

    /// Set the term cap.
    pub fn with_max_terms(mut self, n: Size) -> Self {
        self.max_terms = n;
        self
    }

    /// Accept truncated sums at the term cap.
    pub fn with_best_effort(mut self, on: bool) -> Self {
        self.best_effort = on;
        self
    }

    fn validate(&self) -> Result<()> {
        ensure!(
            self.relative_tolerance.is_finite() && self.relative_tolerance > 0.0,
            "Merton relative tolerance must be positive, got {}",
            self.relative_tolerance
        );
        ensure!(self.max_terms >= 1, "Merton series needs at least one term");
        Ok(())
    }
}

/// A summed Merton series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MertonSeries {
    /// The (possibly truncated) sum.
    pub price: Real,
    /// Terms evaluated.
    pub terms: Size,
    /// Magnitude of the last term added.
    pub last_term: Real,
    /// Whether the tolerance was met before `max_terms`.
    pub converged: bool,
}

/// Sum the Merton series for a European option struck at `strike`,
/// expiring at `t`.
pub fn merton_series_price(
    option_type: OptionType,
    params: &MertonParams,
    strike: Real,
    t: Time,
    config: &MertonSeriesConfig,
) -> Result<MertonSeries> {
    config.validate()?;
    let k = params.mean_jump_size();
    let lambda = params.jump_intensity();
    let poisson = PoissonDistribution::new(lambda * (1.0 + k) * t)?;
    let log_jump = k.ln_1p();
    let var = params.volatility() * params.volatility();
    let jump_var = params.jump_std_dev() * params.jump_std_dev();

    let mut sum = 0.0;
    let mut last_term = 0.0;
    for n in 0..config.max_terms {
        let nf = n as Real;
        let r_n = params.rate() - lambda * k + nf * log_jump / t;
        let sigma_n = (var + nf * jump_var / t).sqrt();
        let term = poisson.pmf(n as u64)
            * black_scholes_price(
                option_type,
                params.spot(),
                strike,
                r_n,
                params.dividend_yield(),
                sigma_n,
                t,
            );
        if !term.is_finite() {
            return Err(Error::NumericalInstability(format!(
                "Merton series term {n} is {term}"
            )));
        }
        sum += term;
        last_term = term.abs();
        if nf >= poisson.lambda() && last_term <= config.relative_tolerance * sum.abs() {
            return Ok(MertonSeries {
                price: sum,
                terms: n + 1,
                last_term,
                converged: true,
            });
        }
    }

    if !config.best_effort {
        return Err(Error::NumericalInstability(format!(
            "Merton series not converged after {} terms (last term {last_term:.3e}, \
             sum {sum:.6}); raise max_terms or enable best_effort",
            config.max_terms
        )));
    }
    warn!(
        max_terms = config.max_terms,
        last_term, sum, "Merton series truncated before reaching tolerance"
    );
    Ok(MertonSeries {
        price: sum,
        terms: config.max_terms,
        last_term,
        converged: false,
    })
}
