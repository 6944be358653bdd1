//! # quickquant
//!
//! Multi-method pricing of European, American, barrier and geometric-average
//! options under Black-Scholes, Merton jump-diffusion and Heston dynamics.
//!
//! This crate is a **façade** that re-exports the underlying workspace
//! crates. Application code should depend on this crate rather than the
//! individual `qq-*` crates.
//!
//! ## Quick start
//!
//! ```rust
//! use quickquant::instruments::{Instrument, OptionType};
//! use quickquant::models::MarketModel;
//! use quickquant::pricingengines::{ClosedFormEngine, LatticeEngine, PricingEngine};
//!
//! let call = Instrument::european(OptionType::Call, 100.0, 1.0).unwrap();
//! let model = MarketModel::black_scholes(100.0, 0.05, 0.0, 0.2).unwrap();
//!
//! let exact = ClosedFormEngine::new().calculate(&call, &model).unwrap();
//! let tree = LatticeEngine::binomial(500).calculate(&call, &model).unwrap();
//! assert!((exact.price - 10.4506).abs() < 1e-4);
//! assert!((tree.price - exact.price).abs() < 1e-2);
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// Core type aliases and the error taxonomy.
pub use qq_core as core;

/// Normal and Poisson distributions, adaptive quadrature.
pub use qq_math as math;

/// Option contracts: payoffs, exercise, barriers, averaging.
pub use qq_instruments as instruments;

/// Market models and their characteristic functions.
pub use qq_models as models;

/// Numerical methods (lattices, finite differences).
pub use qq_methods as methods;

/// Pricing engines, Greeks and batch pricing.
pub use qq_pricingengines as pricingengines;

pub use qq_core::{Error, Result};
