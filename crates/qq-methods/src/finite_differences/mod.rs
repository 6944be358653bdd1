//! Finite difference methods for PDE-based option pricing.
//!
//! # Overview
//!
//! * [`TridiagonalOperator`]: tridiagonal matrix with Thomas-algorithm solver
//! * [`LogMesh`] / [`Grid`]: uniform log-price mesh and the space × time values
//! * [`Fdm1dSolver`]: θ-scheme solver for the Black-Scholes PDE
//! * [`FdmScheme`]: explicit, implicit, or Crank-Nicolson

mod grid;
mod solver;
mod tridiagonal;

pub use grid::{Grid, GridSensitivities, LogMesh};
pub use solver::Fdm1dSolver;
pub use tridiagonal::TridiagonalOperator;

use qq_core::{errors::Error, Real};
use std::fmt;
use std::str::FromStr;

// ─── FDM scheme selection ─────────────────────────────────────────────────────

/// Finite difference time-stepping scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum FdmScheme {
    /// Explicit: `Vⁿ = (I + Δt·L)·Vⁿ⁺¹`, conditionally stable.
    Explicit,
    /// Fully implicit: `(I − Δt·L)·Vⁿ = Vⁿ⁺¹`, unconditionally stable.
    Implicit,
    /// Crank-Nicolson: θ = ½ average of explicit and implicit, second-order in time.
    #[default]
    CrankNicolson,
}

impl FdmScheme {
    /// Implicitness weight θ.
    pub fn theta(self) -> Real {
        match self {
            FdmScheme::Explicit => 0.0,
            FdmScheme::Implicit => 1.0,
            FdmScheme::CrankNicolson => 0.5,
        }
    }
}

impl fmt::Display for FdmScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FdmScheme::Explicit => write!(f, "explicit"),
            FdmScheme::Implicit => write!(f, "implicit"),
            FdmScheme::CrankNicolson => write!(f, "crank-nicolson"),
        }
    }
}

impl FromStr for FdmScheme {
    type Err = Error;

    /// Unknown names fail with `UnsupportedMethod`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "explicit" => Ok(FdmScheme::Explicit),
            "implicit" => Ok(FdmScheme::Implicit),
            "crank-nicolson" | "cranknicolson" | "cn" => Ok(FdmScheme::CrankNicolson),
            other => Err(Error::UnsupportedMethod(format!(
                "unknown finite-difference scheme '{other}'"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_schemes() {
        assert_eq!("explicit".parse::<FdmScheme>().unwrap(), FdmScheme::Explicit);
        assert_eq!(
            "Crank_Nicolson".parse::<FdmScheme>().unwrap(),
            FdmScheme::CrankNicolson
        );
        assert!(matches!(
            "adi".parse::<FdmScheme>(),
            Err(Error::UnsupportedMethod(_))
        ));
        assert_eq!(FdmScheme::CrankNicolson.to_string(), "crank-nicolson");
    }
}
