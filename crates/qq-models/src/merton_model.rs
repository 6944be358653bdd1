//! Merton (1976) jump-diffusion model.
//!
//! ```text
//! dS/S = (r − q − λk) dt + σ dW + (J − 1) dN,   ln J ~ N(μ, δ²)
//! k = E[J − 1] = exp(μ + δ²/2) − 1
//! ```

use crate::black_scholes_model::validate_market;
use crate::characteristic_function::CharacteristicFunction;
use num_complex::Complex64;
use qq_core::{ensure, errors::Result, Rate, Real, Time, Volatility};

/// Parameters of the Merton jump-diffusion model.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct MertonParams {
    spot: Real,
    rate: Rate,
    dividend_yield: Rate,
    volatility: Volatility,
    jump_intensity: Real,
    jump_mean: Real,
    jump_std_dev: Real,
}

impl MertonParams {
    /// Create a validated parameter set.
    ///
    /// `jump_intensity` (λ) and `jump_std_dev` (δ) must be non-negative;
    /// `jump_mean` (μ) is the mean of the log jump size.
    pub fn new(
        spot: Real,
        rate: Rate,
        dividend_yield: Rate,
        volatility: Volatility,
        jump_intensity: Real,
        jump_mean: Real,
        jump_std_dev: Real,
    ) -> Result<Self> {
        validate_market(spot, rate, dividend_yield)?;
        ensure!(
            volatility.is_finite() && volatility > 0.0,
            "volatility must be finite and positive, got {volatility}"
        );
        ensure!(
            jump_intensity.is_finite() && jump_intensity >= 0.0,
            "jump intensity must be finite and non-negative, got {jump_intensity}"
        );
        ensure!(jump_mean.is_finite(), "jump mean must be finite, got {jump_mean}");
        ensure!(
            jump_std_dev.is_finite() && jump_std_dev >= 0.0,
            "jump std dev must be finite and non-negative, got {jump_std_dev}"
        );
        Ok(Self {
            spot,
            rate,
            dividend_yield,
            volatility,
            jump_intensity,
            jump_mean,
            jump_std_dev,
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

    /// Diffusion volatility σ.
    pub fn volatility(&self) -> Volatility {
        self.volatility
    }

    /// Jump intensity λ (expected jumps per year).
    pub fn jump_intensity(&self) -> Real {
        self.jump_intensity
    }

    /// Mean μ of the log jump size.
    pub fn jump_mean(&self) -> Real {
        self.jump_mean
    }

    /// Standard deviation δ of the log jump size.
    pub fn jump_std_dev(&self) -> Real {
        self.jump_std_dev
    }

    /// Mean relative jump size `k = exp(μ + δ²/2) − 1`.
    pub fn mean_jump_size(&self) -> Real {
        (self.jump_mean + 0.5 * self.jump_std_dev * self.jump_std_dev).exp_m1()
    }
}

impl CharacteristicFunction for MertonParams {
    fn log_characteristic(&self, u: Complex64, t: Time) -> Complex64 {
        let i = Complex64::i();
        let s2 = self.volatility * self.volatility;
        let d2 = self.jump_std_dev * self.jump_std_dev;
        let diffusion = -0.5 * s2 * t * (u * u + i * u);
        let jump = (i * u * self.jump_mean - 0.5 * d2 * u * u).exp() - 1.0
            - i * u * self.mean_jump_size();
        diffusion + self.jump_intensity * t * jump
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn validation() {
        assert!(MertonParams::new(100.0, 0.05, 0.0, 0.2, -1.0, 0.0, 0.1).is_err());
        assert!(MertonParams::new(100.0, 0.05, 0.0, 0.2, 1.0, 0.0, -0.1).is_err());
        assert!(MertonParams::new(100.0, 0.05, 0.0, 0.2, 0.0, 0.0, 0.0).is_ok());
    }

    #[test]
    fn mean_jump_size() {
        let m = MertonParams::new(100.0, 0.05, 0.0, 0.2, 1.0, -0.1, 0.15).unwrap();
        assert_relative_eq!(
            m.mean_jump_size(),
            (-0.1_f64 + 0.5 * 0.0225).exp() - 1.0,
            max_relative = 1e-14
        );
    }

    #[test]
    fn characteristic_function_is_martingale() {
        let m = MertonParams::new(100.0, 0.05, 0.01, 0.2, 1.0, -0.1, 0.15).unwrap();
        let psi = m.characteristic(-Complex64::i(), 1.5);
        assert!((psi - Complex64::new(1.0, 0.0)).norm() < 1e-14);
    }
}
