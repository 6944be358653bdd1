//! # qq-math
//!
//! Numerical kernels shared by the pricers: the standard normal and
//! Poisson distributions (via statrs) and adaptive Gauss-Kronrod
//! quadrature with error estimates.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Modules ───────────────────────────────────────────────────────────────────

/// Probability distributions.
pub mod distributions;

/// Numerical integration.
pub mod integrals;

// ── Convenience re-exports ────────────────────────────────────────────────────

pub use distributions::{normal_cdf, normal_pdf, PoissonDistribution};
pub use integrals::{GaussKronrodAdaptive, QuadratureResult};
