//! # qq-pricingengines
//!
//! Option pricers sharing one [`PricingEngine`] interface.
//!
//! ## Engines
//!
//! - [`ClosedFormEngine`]: Black-Scholes, Reiner-Rubinstein barriers,
//!   geometric averages and the Merton jump series
//! - [`LatticeEngine`]: binomial and trinomial trees with early exercise
//! - [`FiniteDifferenceEngine`]: explicit, implicit and Crank-Nicolson
//!   schemes on a log-price grid
//! - [`FourierEngine`]: characteristic-function inversion (Heston, Merton,
//!   Black-Scholes)
//!
//! [`greeks()`] turns any of them into a Greeks calculator and
//! [`price_batch`] prices independent contracts in parallel.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Interface ─────────────────────────────────────────────────────────────────
pub mod pricing_engine;

// ── Closed forms ──────────────────────────────────────────────────────────────
pub mod analytic_average_engine;
pub mod analytic_barrier_engine;
pub mod analytic_european_engine;
pub mod closed_form_engine;
pub mod merton_jump_engine;

// ── Numerical pricers ─────────────────────────────────────────────────────────
pub mod fd_engine;
pub mod fourier_engine;
pub mod lattice_engine;

// ── Sensitivities and batching ────────────────────────────────────────────────
pub mod batch;
pub mod greeks;

// ── Re-exports ────────────────────────────────────────────────────────────────
pub use analytic_average_engine::geometric_average_price;
pub use analytic_barrier_engine::analytic_barrier_price;
pub use analytic_european_engine::{black_scholes_merton, black_scholes_price};
pub use batch::price_batch;
pub use closed_form_engine::ClosedFormEngine;
pub use fd_engine::FiniteDifferenceEngine;
pub use fourier_engine::{FourierEngine, CONTOUR_SHIFT};
pub use greeks::{greeks, DEFAULT_BUMP};
pub use lattice_engine::{LatticeEngine, LatticeVariant};
pub use merton_jump_engine::{merton_series_price, MertonSeries, MertonSeriesConfig};
pub use pricing_engine::{Diagnostics, Greeks, Method, PricingEngine, PricingResult, MIN_STEPS};
