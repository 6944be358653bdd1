//! # qq-models
//!
//! Market models for equity option pricing.
//!
//! ```text
//! MarketModel
//! ├── BlackScholes  → constant volatility
//! ├── Merton        → lognormal jumps on top of Black-Scholes
//! └── Heston        → square-root stochastic variance
//! ```
//!
//! Every model exposes the characteristic function of the forward-normalised
//! log price through [`CharacteristicFunction`].

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Models ───────────────────────────────────────────────────────────────
pub mod black_scholes_model;
pub mod heston_model;
pub mod merton_model;

// ── Dispatch ─────────────────────────────────────────────────────────────
pub mod characteristic_function;
pub mod market_model;

// ── Re-exports ───────────────────────────────────────────────────────────
pub use black_scholes_model::BlackScholesParams;
pub use characteristic_function::CharacteristicFunction;
pub use heston_model::HestonParams;
pub use market_model::{MarketModel, ModelFamily};
pub use merton_model::MertonParams;
