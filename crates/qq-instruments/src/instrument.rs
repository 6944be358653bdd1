//! The option contract priced by every engine.
//!
//! An [`Instrument`] is immutable once built; every constructor and `with_*`
//! method validates its inputs and returns a fresh value.

use crate::{Barrier, ExerciseType, OptionType, PlainVanillaPayoff};
use qq_core::{ensure, errors::Result, Real, Time};

/// Continuous geometric averaging of the underlying over the final
/// `window` years of the contract's life.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Averaging {
    /// Length of the averaging window in years, `0 < window ≤ maturity`.
    pub window: Time,
}

/// An option contract: payoff shape, strike, maturity, exercise style and
/// optional barrier or averaging feature.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Instrument {
    option_type: OptionType,
    strike: Real,
    maturity: Time,
    exercise: ExerciseType,
    barrier: Option<Barrier>,
    averaging: Option<Averaging>,
}

impl Instrument {
    /// Create a vanilla option.
    ///
    /// Fails with `InvalidParameter` unless strike and maturity are finite
    /// and strictly positive.
    pub fn new(
        option_type: OptionType,
        strike: Real,
        maturity: Time,
        exercise: ExerciseType,
    ) -> Result<Self> {
        ensure!(
            strike.is_finite() && strike > 0.0,
            "strike must be finite and positive, got {strike}"
        );
        ensure!(
            maturity.is_finite() && maturity > 0.0,
            "maturity must be finite and positive, got {maturity}"
        );
        Ok(Self {
            option_type,
            strike,
            maturity,
            exercise,
            barrier: None,
            averaging: None,
        })
    }

    /// Shorthand for a European vanilla option.
    pub fn european(option_type: OptionType, strike: Real, maturity: Time) -> Result<Self> {
        Self::new(option_type, strike, maturity, ExerciseType::European)
    }

    /// Shorthand for an American vanilla option.
    pub fn american(option_type: OptionType, strike: Real, maturity: Time) -> Result<Self> {
        Self::new(option_type, strike, maturity, ExerciseType::American)
    }

    /// Attach a single barrier.
    pub fn with_barrier(mut self, barrier: Barrier) -> Result<Self> {
        ensure!(
            barrier.level.is_finite() && barrier.level > 0.0,
            "barrier level must be finite and positive, got {}",
            barrier.level
        );
        ensure!(
            self.averaging.is_none(),
            "a contract cannot carry both a barrier and an averaging feature"
        );
        self.barrier = Some(barrier);
        Ok(self)
    }

    /// Attach geometric averaging over the final `window` years.
    pub fn with_averaging(mut self, window: Time) -> Result<Self> {
        ensure!(
            window.is_finite() && window > 0.0 && window <= self.maturity,
            "averaging window must lie in (0, {}], got {window}",
            self.maturity
        );
        ensure!(
            self.barrier.is_none(),
            "a contract cannot carry both a barrier and an averaging feature"
        );
        ensure!(
            !self.exercise.is_american(),
            "averaging is only defined for European exercise"
        );
        self.averaging = Some(Averaging { window });
        Ok(self)
    }

    /// Same contract with a different maturity; an averaging window longer
    /// than the new maturity is capped at it.
    pub fn with_maturity(&self, maturity: Time) -> Result<Self> {
        ensure!(
            maturity.is_finite() && maturity > 0.0,
            "maturity must be finite and positive, got {maturity}"
        );
        let mut out = self.clone();
        out.maturity = maturity;
        if let Some(avg) = out.averaging.as_mut() {
            avg.window = avg.window.min(maturity);
        }
        Ok(out)
    }

    /// Call or put.
    pub fn option_type(&self) -> OptionType {
        self.option_type
    }

    /// Strike price.
    pub fn strike(&self) -> Real {
        self.strike
    }

    /// Time to expiry in years.
    pub fn maturity(&self) -> Time {
        self.maturity
    }

    /// Exercise style.
    pub fn exercise(&self) -> ExerciseType {
        self.exercise
    }

    /// Barrier feature, if any.
    pub fn barrier(&self) -> Option<&Barrier> {
        self.barrier.as_ref()
    }

    /// Averaging feature, if any.
    pub fn averaging(&self) -> Option<&Averaging> {
        self.averaging.as_ref()
    }

    /// `true` for a plain contract with neither barrier nor averaging.
    pub fn is_vanilla(&self) -> bool {
        self.barrier.is_none() && self.averaging.is_none()
    }

    /// The terminal payoff.
    pub fn payoff(&self) -> PlainVanillaPayoff {
        PlainVanillaPayoff::new(self.option_type, self.strike)
    }

    /// Immediate-exercise value at underlying price `s`.
    #[inline]
    pub fn intrinsic(&self, s: Real) -> Real {
        self.payoff().value(s)
    }
}
