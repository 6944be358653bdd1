//! Black-Scholes model with continuous dividend yield.
//!
//! ```text
//! dS = (r − q)·S dt + σ·S dW
//! ```

use crate::characteristic_function::CharacteristicFunction;
use num_complex::Complex64;
use qq_core::{ensure, errors::Result, Rate, Real, Time, Volatility};

/// Checks shared by every model: positive finite spot, finite rates.
pub(crate) fn validate_market(spot: Real, rate: Rate, dividend_yield: Rate) -> Result<()> {
    ensure!(
        spot.is_finite() && spot > 0.0,
        "spot must be finite and positive, got {spot}"
    );
    ensure!(rate.is_finite(), "rate must be finite, got {rate}");
    ensure!(
        dividend_yield.is_finite(),
        "dividend yield must be finite, got {dividend_yield}"
    );
    Ok(())
}

/// Parameters of the Black-Scholes model.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct BlackScholesParams {
    spot: Real,
    rate: Rate,
    dividend_yield: Rate,
    volatility: Volatility,
}

impl BlackScholesParams {
    /// Create a validated parameter set.
    pub fn new(spot: Real, rate: Rate, dividend_yield: Rate, volatility: Volatility) -> Result<Self> {
        validate_market(spot, rate, dividend_yield)?;
        ensure!(
            volatility.is_finite() && volatility > 0.0,
            "volatility must be finite and positive, got {volatility}"
        );
        Ok(Self {
            spot,
            rate,
            dividend_yield,
            volatility,
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

    /// Volatility σ.
    pub fn volatility(&self) -> Volatility {
        self.volatility
    }
}

impl CharacteristicFunction for BlackScholesParams {
    fn log_characteristic(&self, u: Complex64, t: Time) -> Complex64 {
        let s2 = self.volatility * self.volatility;
        -0.5 * s2 * t * (u * u + Complex64::i() * u)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qq_core::Error;

    #[test]
    fn rejects_bad_inputs() {
        assert!(matches!(
            BlackScholesParams::new(-1.0, 0.05, 0.0, 0.2),
            Err(Error::InvalidParameter(_))
        ));
        assert!(BlackScholesParams::new(100.0, 0.05, 0.0, 0.0).is_err());
        assert!(BlackScholesParams::new(100.0, f64::NAN, 0.0, 0.2).is_err());
        assert!(BlackScholesParams::new(100.0, 0.05, 0.0, 0.2).is_ok());
    }

    #[test]
    fn characteristic_function_is_normalised() {
        let bs = BlackScholesParams::new(100.0, 0.05, 0.02, 0.3).unwrap();
        // E[S_T / F_T] = 1
        let psi = bs.characteristic(-Complex64::i(), 2.0);
        assert!((psi - Complex64::new(1.0, 0.0)).norm() < 1e-14);
        // Variance of ln(S_T/F_T) is σ²T.
        let psi = bs.characteristic(Complex64::new(1.0, 0.0), 1.0);
        assert!((psi.norm() - (-0.5 * 0.09_f64).exp()).abs() < 1e-14);
    }
}
