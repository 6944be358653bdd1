//! CLI command implementations.
//!
//! Both commands describe the contract and the market with the same
//! [`ContractArgs`].

pub mod compare;
pub mod price;

use clap::Args;
use qq_core::Real;
use qq_instruments::{Barrier, BarrierType, ExerciseType, Instrument, OptionType};
use qq_models::{HestonParams, MarketModel, MertonParams};

use crate::ModelArg;

/// Contract terms and market data.
#[derive(Debug, Clone, Args)]
pub struct ContractArgs {
    /// Market model
    #[arg(long, value_enum, default_value_t = ModelArg::BlackScholes)]
    pub model: ModelArg,

    /// Call or put
    #[arg(long = "type", default_value = "call")]
    pub option_type: OptionType,

    /// Strike
    #[arg(long, default_value_t = 100.0)]
    pub strike: Real,

    /// Maturity in years
    #[arg(long, default_value_t = 1.0)]
    pub maturity: Real,

    /// Exercise style (european, american)
    #[arg(long, default_value = "european")]
    pub exercise: ExerciseType,

    /// Barrier type (down-in, up-in, down-out, up-out)
    #[arg(long, requires = "barrier_level")]
    pub barrier: Option<BarrierType>,

    /// Barrier level
    #[arg(long, requires = "barrier")]
    pub barrier_level: Option<Real>,

    /// Geometric averaging over the final WINDOW years
    #[arg(long, value_name = "WINDOW", conflicts_with = "barrier")]
    pub averaging: Option<Real>,

    /// Spot price
    #[arg(long, default_value_t = 100.0, help_heading = "Market")]
    pub spot: Real,

    /// Continuously compounded risk-free rate
    #[arg(long, default_value_t = 0.05, allow_negative_numbers = true, help_heading = "Market")]
    pub rate: Real,

    /// Continuous dividend yield
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true, help_heading = "Market")]
    pub dividend: Real,

    /// Diffusion volatility (Black-Scholes and Merton)
    #[arg(long, default_value_t = 0.2, help_heading = "Market")]
    pub vol: Real,

    /// Jumps per year
    #[arg(long, default_value_t = 1.0, help_heading = "Merton")]
    pub jump_intensity: Real,

    /// Mean of the log jump size
    #[arg(long, default_value_t = -0.1, allow_negative_numbers = true, help_heading = "Merton")]
    pub jump_mean: Real,

    /// Standard deviation of the log jump size
    #[arg(long, default_value_t = 0.15, help_heading = "Merton")]
    pub jump_std: Real,

    /// Initial variance
    #[arg(long, default_value_t = 0.04, help_heading = "Heston")]
    pub v0: Real,

    /// Mean-reversion speed
    #[arg(long, default_value_t = 2.0, help_heading = "Heston")]
    pub kappa: Real,

    /// Long-run variance
    #[arg(long, default_value_t = 0.04, help_heading = "Heston")]
    pub theta: Real,

    /// Volatility of variance
    #[arg(long, default_value_t = 0.3, help_heading = "Heston")]
    pub vol_of_vol: Real,

    /// Spot/variance correlation
    #[arg(long, default_value_t = -0.7, allow_negative_numbers = true, help_heading = "Heston")]
    pub rho: Real,
}

impl ContractArgs {
    /// The option contract.
    pub fn instrument(&self) -> qq_core::Result<Instrument> {
        let mut instrument =
            Instrument::new(self.option_type, self.strike, self.maturity, self.exercise)?;
        if let (Some(kind), Some(level)) = (self.barrier, self.barrier_level) {
            instrument = instrument.with_barrier(Barrier::new(kind, level))?;
        }
        if let Some(window) = self.averaging {
            instrument = instrument.with_averaging(window)?;
        }
        Ok(instrument)
    }

    /// The market model.
    pub fn market_model(&self) -> qq_core::Result<MarketModel> {
        let (spot, rate, q) = (self.spot, self.rate, self.dividend);
        Ok(match self.model {
            ModelArg::BlackScholes => MarketModel::black_scholes(spot, rate, q, self.vol)?,
            ModelArg::Merton => MertonParams::new(
                spot,
                rate,
                q,
                self.vol,
                self.jump_intensity,
                self.jump_mean,
                self.jump_std,
            )?
            .into(),
            ModelArg::Heston => HestonParams::new(
                spot,
                rate,
                q,
                self.v0,
                self.kappa,
                self.theta,
                self.vol_of_vol,
                self.rho,
            )?
            .into(),
        })
    }
}
