//! Probability distributions.
//!
//! The standard normal density and cumulative distribution, and the Poisson
//! distribution used to weight jump counts.

pub mod normal;
pub mod poisson;

pub use normal::{normal_cdf, normal_pdf};
pub use poisson::PoissonDistribution;
