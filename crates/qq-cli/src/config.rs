//! Engine tunables loaded from TOML.
//!
//! ```toml
//! [merton]
//! relative_tolerance = 1e-12
//!
//! [lattice]
//! steps = 1000
//! binomial_scheme = "leisen-reimer"
//!
//! [finite_difference]
//! space_steps = 800
//! time_steps = 800
//! scheme = "crank-nicolson"
//!
//! [fourier]
//! truncation = 500.0
//! require_feller = true
//! ```
//!
//! Every table and every key is optional; missing values take the engine
//! defaults. Unknown keys are rejected.

use std::path::Path;

use clap::Args;
use qq_core::{Real, Size};
use qq_methods::{BinomialScheme, FdmScheme};
use qq_pricingengines::{
    ClosedFormEngine, FiniteDifferenceEngine, FourierEngine, LatticeEngine, LatticeVariant,
    MertonSeriesConfig, PricingEngine,
};
use serde::Deserialize;
use tracing::debug;

use crate::{CliError, MethodArg, Result};

/// Command-line overrides applied on top of the configuration file.
#[derive(Debug, Clone, Default, Args)]
#[command(next_help_heading = "Engine overrides")]
pub struct EngineOverrides {
    /// Lattice time steps
    #[arg(long)]
    pub steps: Option<Size>,

    /// Binomial parameterisation (crr, jr, trigeorgis, tian, lr)
    #[arg(long)]
    pub binomial_scheme: Option<BinomialScheme>,

    /// Finite-difference space and time steps
    #[arg(long, num_args = 2, value_names = ["SPACE", "TIME"])]
    pub grid: Option<Vec<Size>>,

    /// Finite-difference scheme (explicit, implicit, crank-nicolson)
    #[arg(long)]
    pub fd_scheme: Option<FdmScheme>,

    /// Fourier truncation bound
    #[arg(long)]
    pub truncation: Option<Real>,
}

/// Tunables for every pricer the CLI can build.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineSettings {
    /// Merton series used by the closed-form pricer.
    pub merton: MertonSeriesConfig,
    /// Binomial and trinomial trees.
    pub lattice: LatticeEngine,
    /// θ-scheme grid.
    pub finite_difference: FiniteDifferenceEngine,
    /// Characteristic-function inversion.
    pub fourier: FourierEngine,
}

impl EngineSettings {
    /// Parse settings from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Read settings from `path`, or use defaults when no file is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path).map_err(|source| CliError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = Self::from_toml_str(&text)?;
        debug!(path = %path.display(), ?settings, "loaded engine settings");
        Ok(settings)
    }

    /// These settings with command-line overrides applied.
    pub fn with_overrides(&self, overrides: &EngineOverrides) -> Self {
        let mut settings = self.clone();
        if let Some(steps) = overrides.steps {
            settings.lattice = settings.lattice.with_steps(steps);
        }
        if let Some(scheme) = overrides.binomial_scheme {
            settings.lattice = settings.lattice.with_scheme(scheme);
        }
        if let Some(&[space, time]) = overrides.grid.as_deref() {
            settings.finite_difference = settings.finite_difference.with_grid(space, time);
        }
        if let Some(scheme) = overrides.fd_scheme {
            settings.finite_difference = settings.finite_difference.with_scheme(scheme);
        }
        if let Some(truncation) = overrides.truncation {
            settings.fourier = settings.fourier.with_truncation(truncation);
        }
        settings
    }

    /// The pricer for `method`, configured from these settings.
    pub fn engine(&self, method: MethodArg) -> Box<dyn PricingEngine> {
        match method {
            MethodArg::ClosedForm => {
                Box::new(ClosedFormEngine::new().with_merton_config(self.merton))
            }
            MethodArg::Binomial => {
                Box::new(self.lattice.clone().with_variant(LatticeVariant::Binomial))
            }
            MethodArg::Trinomial => {
                Box::new(self.lattice.clone().with_variant(LatticeVariant::Trinomial))
            }
            MethodArg::Fd => Box::new(self.finite_difference.clone()),
            MethodArg::Fourier => Box::new(self.fourier.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        assert_eq!(EngineSettings::from_toml_str("").unwrap(), EngineSettings::default());
    }

    #[test]
    fn partial_tables_keep_remaining_defaults() {
        let settings = EngineSettings::from_toml_str(
            r#"
            [lattice]
            steps = 1001
            binomial_scheme = "leisen-reimer"

            [finite_difference]
            scheme = "implicit"
            "#,
        )
        .unwrap();
        assert_eq!(
            settings.lattice,
            LatticeEngine::binomial(1001).with_scheme(BinomialScheme::LeisenReimer)
        );
        assert_eq!(
            settings.finite_difference,
            FiniteDifferenceEngine::default().with_scheme(FdmScheme::Implicit)
        );
        assert_eq!(settings.merton, MertonSeriesConfig::default());
        assert_eq!(settings.fourier, FourierEngine::default());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = EngineSettings::from_toml_str("[fourier]\ntrunc = 10.0\n").unwrap_err();
        assert!(matches!(err, CliError::Config(_)), "{err}");
        let err = EngineSettings::from_toml_str("[monte_carlo]\npaths = 10\n").unwrap_err();
        assert!(matches!(err, CliError::Config(_)), "{err}");
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = EngineSettings::load(Some(Path::new("/nonexistent/quickquant.toml"))).unwrap_err();
        assert!(matches!(err, CliError::Io { .. }), "{err}");
        assert_eq!(EngineSettings::load(None).unwrap(), EngineSettings::default());
    }

    #[test]
    fn overrides_win_over_file() {
        let file = EngineSettings::from_toml_str("[lattice]\nsteps = 50\n").unwrap();
        let overrides = EngineOverrides {
            steps: Some(200),
            fd_scheme: Some(FdmScheme::Explicit),
            grid: Some(vec![100, 1000]),
            ..EngineOverrides::default()
        };
        let settings = file.with_overrides(&overrides);
        assert_eq!(settings.lattice.steps(), 200);
        assert_eq!(
            settings.finite_difference,
            FiniteDifferenceEngine::new(100, 1000, FdmScheme::Explicit)
        );
        assert_eq!(file.with_overrides(&EngineOverrides::default()), file);
    }

    #[test]
    fn engines_follow_settings() {
        let settings = EngineSettings::from_toml_str("[lattice]\nsteps = 50\n").unwrap();
        let debug = format!("{:?}", settings.engine(MethodArg::Trinomial));
        assert!(debug.contains("steps: 50") && debug.contains("Trinomial"), "{debug}");
    }
}
