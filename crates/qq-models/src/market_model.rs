//! The market-model sum type consumed by every pricer.

use crate::{BlackScholesParams, CharacteristicFunction, HestonParams, MertonParams};
use num_complex::Complex64;
use qq_core::{errors::Result, Rate, Real, Time, Volatility};
use std::fmt;

/// Model family tag, used in error messages and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum ModelFamily {
    /// Constant volatility.
    BlackScholes,
    /// Jump-diffusion.
    Merton,
    /// Stochastic volatility.
    Heston,
}

impl fmt::Display for ModelFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelFamily::BlackScholes => write!(f, "Black-Scholes"),
            ModelFamily::Merton => write!(f, "Merton"),
            ModelFamily::Heston => write!(f, "Heston"),
        }
    }
}

/// Market data and model parameters for one pricing call.
///
/// Exactly one variant is active; pricers match on it exhaustively and
/// reject the variants they do not support.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(tag = "model", rename_all = "kebab-case"))]
pub enum MarketModel {
    /// Black-Scholes with continuous dividend yield.
    BlackScholes(BlackScholesParams),
    /// Merton jump-diffusion.
    Merton(MertonParams),
    /// Heston stochastic volatility.
    Heston(HestonParams),
}

impl From<BlackScholesParams> for MarketModel {
    fn from(p: BlackScholesParams) -> Self {
        MarketModel::BlackScholes(p)
    }
}

impl From<MertonParams> for MarketModel {
    fn from(p: MertonParams) -> Self {
        MarketModel::Merton(p)
    }
}

impl From<HestonParams> for MarketModel {
    fn from(p: HestonParams) -> Self {
        MarketModel::Heston(p)
    }
}

impl MarketModel {
    /// Shorthand for a validated Black-Scholes model.
    pub fn black_scholes(spot: Real, rate: Rate, dividend_yield: Rate, volatility: Volatility) -> Result<Self> {
        BlackScholesParams::new(spot, rate, dividend_yield, volatility).map(Self::from)
    }

    /// Which family is active.
    pub fn family(&self) -> ModelFamily {
        match self {
            MarketModel::BlackScholes(_) => ModelFamily::BlackScholes,
            MarketModel::Merton(_) => ModelFamily::Merton,
            MarketModel::Heston(_) => ModelFamily::Heston,
        }
    }

    /// Spot price.
    pub fn spot(&self) -> Real {
        match self {
            MarketModel::BlackScholes(p) => p.spot(),
            MarketModel::Merton(p) => p.spot(),
            MarketModel::Heston(p) => p.spot(),
        }
    }

    /// Risk-free rate.
    pub fn rate(&self) -> Rate {
        match self {
            MarketModel::BlackScholes(p) => p.rate(),
            MarketModel::Merton(p) => p.rate(),
            MarketModel::Heston(p) => p.rate(),
        }
    }

    /// Dividend yield.
    pub fn dividend_yield(&self) -> Rate {
        match self {
            MarketModel::BlackScholes(p) => p.dividend_yield(),
            MarketModel::Merton(p) => p.dividend_yield(),
            MarketModel::Heston(p) => p.dividend_yield(),
        }
    }

    /// Forward price for delivery at `t`.
    pub fn forward(&self, t: Time) -> Real {
        self.spot() * ((self.rate() - self.dividend_yield()) * t).exp()
    }

    /// The volatility parameter bumped for vega: `σ` for Black-Scholes and
    /// Merton, the instantaneous volatility `√v0` for Heston.
    pub fn volatility(&self) -> Volatility {
        match self {
            MarketModel::BlackScholes(p) => p.volatility(),
            MarketModel::Merton(p) => p.volatility(),
            MarketModel::Heston(p) => p.v0().sqrt(),
        }
    }

    /// Same model with a different spot.
    pub fn with_spot(&self, spot: Real) -> Result<Self> {
        self.rebuild(spot, self.rate(), self.volatility())
    }

    /// Same model with a different risk-free rate.
    pub fn with_rate(&self, rate: Rate) -> Result<Self> {
        self.rebuild(self.spot(), rate, self.volatility())
    }

    /// Same model with a different volatility (see [`volatility`](Self::volatility)).
    pub fn with_volatility(&self, volatility: Volatility) -> Result<Self> {
        self.rebuild(self.spot(), self.rate(), volatility)
    }

    fn rebuild(&self, spot: Real, rate: Rate, vol: Volatility) -> Result<Self> {
        Ok(match self {
            MarketModel::BlackScholes(p) => {
                BlackScholesParams::new(spot, rate, p.dividend_yield(), vol)?.into()
            }
            MarketModel::Merton(p) => MertonParams::new(
                spot,
                rate,
                p.dividend_yield(),
                vol,
                p.jump_intensity(),
                p.jump_mean(),
                p.jump_std_dev(),
            )?
            .into(),
            MarketModel::Heston(p) => HestonParams::new(
                spot,
                rate,
                p.dividend_yield(),
                vol * vol,
                p.kappa(),
                p.theta(),
                p.sigma(),
                p.rho(),
            )?
            .into(),
        })
    }
}

impl CharacteristicFunction for MarketModel {
    fn log_characteristic(&self, u: Complex64, t: Time) -> Complex64 {
        match self {
            MarketModel::BlackScholes(p) => p.log_characteristic(u, t),
            MarketModel::Merton(p) => p.log_characteristic(u, t),
            MarketModel::Heston(p) => p.log_characteristic(u, t),
        }
    }
}
