//! quickquant CLI
//!
//! # Commands
//!
//! - `quickquant price` - price one contract with one method, optionally
//!   with Greeks
//! - `quickquant compare` - price one contract with every method that
//!   supports it and tabulate the differences
//!
//! Engine tunables come from an optional TOML file (`--config`); logging
//! is controlled by `RUST_LOG`, or raised to `debug` with `--verbose`.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;
mod config;
mod error;
mod output;

pub use error::{CliError, Result};

use commands::ContractArgs;
use config::{EngineOverrides, EngineSettings};

/// Multi-method option pricing
#[derive(Parser)]
#[command(name = "quickquant")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,

    /// TOML file with engine tunables
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Price one contract with one method
    Price {
        /// Pricing method
        #[arg(short, long, value_enum, default_value_t = MethodArg::ClosedForm)]
        method: MethodArg,

        /// Also compute delta, gamma, vega, theta and rho
        #[arg(short, long)]
        greeks: bool,

        /// Relative bump for finite-difference Greeks
        #[arg(long, default_value_t = qq_pricingengines::DEFAULT_BUMP)]
        bump: f64,

        #[command(flatten)]
        contract: ContractArgs,

        #[command(flatten)]
        overrides: EngineOverrides,
    },

    /// Price one contract with every method and compare
    Compare {
        #[command(flatten)]
        contract: ContractArgs,

        #[command(flatten)]
        overrides: EngineOverrides,
    },
}

/// Pricing method selectable on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MethodArg {
    /// Black-Scholes, Reiner-Rubinstein, geometric average or Merton series
    ClosedForm,
    /// Binomial tree
    Binomial,
    /// Trinomial tree
    Trinomial,
    /// Finite-difference grid
    Fd,
    /// Characteristic-function inversion
    Fourier,
}

impl MethodArg {
    /// Every method, closed form first.
    pub const ALL: [MethodArg; 5] = [
        MethodArg::ClosedForm,
        MethodArg::Binomial,
        MethodArg::Trinomial,
        MethodArg::Fd,
        MethodArg::Fourier,
    ];

    /// Name as typed on the command line.
    pub fn name(self) -> &'static str {
        match self {
            MethodArg::ClosedForm => "closed-form",
            MethodArg::Binomial => "binomial",
            MethodArg::Trinomial => "trinomial",
            MethodArg::Fd => "fd",
            MethodArg::Fourier => "fourier",
        }
    }
}

/// Market model selectable on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModelArg {
    /// Constant volatility
    BlackScholes,
    /// Lognormal jumps on top of Black-Scholes
    Merton,
    /// Stochastic variance
    Heston,
}

/// How results are written to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Aligned text table
    Table,
    /// Pretty-printed JSON
    Json,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let settings = EngineSettings::load(cli.config.as_deref())?;
    match cli.command {
        Commands::Price {
            method,
            greeks,
            bump,
            contract,
            overrides,
        } => commands::price::run(
            &settings.with_overrides(&overrides),
            method,
            &contract,
            greeks.then_some(bump),
            cli.format,
        ),
        Commands::Compare {
            contract,
            overrides,
        } => commands::compare::run(&settings.with_overrides(&overrides), &contract, cli.format),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_price_with_global_flags() {
        let cli = Cli::try_parse_from([
            "quickquant",
            "price",
            "--method",
            "fd",
            "--greeks",
            "--model",
            "black-scholes",
            "--strike",
            "105",
            "--rho",
            "-0.5",
            "--format",
            "json",
            "-v",
        ])
        .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.format, OutputFormat::Json);
        match cli.command {
            Commands::Price {
                method,
                greeks,
                contract,
                ..
            } => {
                assert_eq!(method, MethodArg::Fd);
                assert!(greeks);
                assert_eq!(contract.strike, 105.0);
                assert_eq!(contract.rho, -0.5);
            }
            Commands::Compare { .. } => panic!("expected price"),
        }
    }

    #[test]
    fn rejects_unknown_method() {
        assert!(Cli::try_parse_from(["quickquant", "price", "--method", "monte-carlo"]).is_err());
    }

    #[test]
    fn barrier_needs_a_level() {
        assert!(Cli::try_parse_from(["quickquant", "compare", "--barrier", "down-out"]).is_err());
        let cli = Cli::try_parse_from([
            "quickquant",
            "compare",
            "--barrier",
            "down-out",
            "--barrier-level",
            "90",
            "--grid",
            "200",
            "300",
        ])
        .unwrap();
        match cli.command {
            Commands::Compare {
                contract,
                overrides,
            } => {
                assert_eq!(contract.barrier_level, Some(90.0));
                assert_eq!(overrides.grid, Some(vec![200, 300]));
            }
            Commands::Price { .. } => panic!("expected compare"),
        }
    }

    #[test]
    fn method_names_match_value_enum() {
        for method in MethodArg::ALL {
            let parsed = MethodArg::from_str(method.name(), false).unwrap();
            assert_eq!(parsed, method);
        }
    }
}
