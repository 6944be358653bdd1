//! # qq-instruments
//!
//! Immutable option contracts: call/put payoffs, European or American
//! exercise, and the optional single-barrier and geometric-averaging
//! features.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod barrier;
pub mod exercise;
pub mod instrument;
pub mod payoff;

pub use barrier::{Barrier, BarrierType};
pub use exercise::ExerciseType;
pub use instrument::{Averaging, Instrument};
pub use payoff::{OptionType, PlainVanillaPayoff};
