//! Recombining binomial trees for option pricing.
//!
//! | Scheme | Type | Reference |
//! |---|---|---|
//! | [`BinomialScheme::CoxRossRubinstein`] | Equal jumps, `u·d = 1` | Cox, Ross & Rubinstein (1979) |
//! | [`BinomialScheme::JarrowRudd`] | Equal probabilities | Jarrow & Rudd (1983) |
//! | [`BinomialScheme::Trigeorgis`] | Additive equal jumps | Trigeorgis (1991) |
//! | [`BinomialScheme::Tian`] | Third-moment matching | Tian (1993) |
//! | [`BinomialScheme::LeisenReimer`] | Strike-centred, odd steps | Leisen & Reimer (1996) |

use super::Lattice;
use qq_core::{ensure, errors::Error, errors::Result, Probability, Real, Size, Time};
use qq_models::BlackScholesParams;
use std::fmt;
use std::str::FromStr;

/// Binomial tree parameterisation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum BinomialScheme {
    /// Cox-Ross-Rubinstein: `u = e^{σ√Δt}`, `d = 1/u`, risk-neutral `p`.
    #[default]
    CoxRossRubinstein,
    /// Jarrow-Rudd: `p = ½`, drift carried by the node values.
    JarrowRudd,
    /// Trigeorgis: additive log steps `√(σ²Δt + ν²Δt²)`.
    Trigeorgis,
    /// Tian: matches the first three moments of the lognormal step.
    Tian,
    /// Leisen-Reimer: Peizer-Pratt inversion around the strike. Uses an
    /// odd number of steps (an even request is rounded up).
    LeisenReimer,
}

impl fmt::Display for BinomialScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BinomialScheme::CoxRossRubinstein => "cox-ross-rubinstein",
            BinomialScheme::JarrowRudd => "jarrow-rudd",
            BinomialScheme::Trigeorgis => "trigeorgis",
            BinomialScheme::Tian => "tian",
            BinomialScheme::LeisenReimer => "leisen-reimer",
        };
        f.write_str(s)
    }
}

impl FromStr for BinomialScheme {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "crr" | "cox-ross-rubinstein" => Ok(BinomialScheme::CoxRossRubinstein),
            "jr" | "jarrow-rudd" => Ok(BinomialScheme::JarrowRudd),
            "trigeorgis" => Ok(BinomialScheme::Trigeorgis),
            "tian" => Ok(BinomialScheme::Tian),
            "lr" | "leisen-reimer" => Ok(BinomialScheme::LeisenReimer),
            other => Err(Error::UnsupportedMethod(format!(
                "unknown binomial scheme '{other}'"
            ))),
        }
    }
}

/// How node values are generated.
#[derive(Debug, Clone, Copy)]
enum UnderlyingKind {
    /// `x0 · exp(i·drift_per_step + (2j − i)·step)`
    LogSpace { step: Real, drift_per_step: Real },
    /// `x0 · down^(i − j) · up^j`
    Multiplicative { up: Real, down: Real },
}

/// A recombining binomial tree for the Black-Scholes diffusion.
///
/// The tree has `steps + 1` time layers, with layer `i` having `i + 1` nodes.
/// Node `(i, j)` represents the state after `j` up-moves and `i − j`
/// down-moves. Branch `0` is the down move, branch `1` the up move.
#[derive(Debug, Clone)]
pub struct BinomialTree {
    x0: Real,
    dt: Time,
    steps: Size,
    underlying: UnderlyingKind,
    pu: Probability,
    scheme: BinomialScheme,
}

impl BinomialTree {
    /// Build a tree over `[0, maturity]`.
    ///
    /// `strike` centres the Leisen-Reimer tree and is ignored otherwise.
    /// Fails with `NumericalInstability` if the scheme yields a branch
    /// probability outside `[0, 1]` (too few steps for the drift).
    pub fn new(
        scheme: BinomialScheme,
        params: &BlackScholesParams,
        maturity: Time,
        steps: Size,
        strike: Real,
    ) -> Result<Self> {
        ensure!(steps >= 1, "binomial tree needs at least one step");
        ensure!(
            maturity.is_finite() && maturity > 0.0,
            "maturity must be positive, got {maturity}"
        );
        let x0 = params.spot();
        let sigma = params.volatility();
        let carry = params.rate() - params.dividend_yield();
        let nu = carry - 0.5 * sigma * sigma;

        let steps = match scheme {
            BinomialScheme::LeisenReimer if steps % 2 == 0 => steps + 1,
            _ => steps,
        };
        let dt = maturity / steps as Real;
        let growth = (carry * dt).exp();

        let (underlying, pu) = match scheme {
            BinomialScheme::CoxRossRubinstein => {
                let dx = sigma * dt.sqrt();
                let (up, down) = (dx.exp(), (-dx).exp());
                (
                    UnderlyingKind::LogSpace {
                        step: dx,
                        drift_per_step: 0.0,
                    },
                    (growth - down) / (up - down),
                )
            }
            BinomialScheme::JarrowRudd => (
                UnderlyingKind::LogSpace {
                    step: sigma * dt.sqrt(),
                    drift_per_step: nu * dt,
                },
                0.5,
            ),
            BinomialScheme::Trigeorgis => {
                let dx = (sigma * sigma * dt + nu * nu * dt * dt).sqrt();
                (
                    UnderlyingKind::LogSpace {
                        step: dx,
                        drift_per_step: 0.0,
                    },
                    0.5 + 0.5 * nu * dt / dx,
                )
            }
            BinomialScheme::Tian => {
                let v = (sigma * sigma * dt).exp();
                let root = (v * v + 2.0 * v - 3.0).sqrt();
                let up = 0.5 * growth * v * (v + 1.0 + root);
                let down = 0.5 * growth * v * (v + 1.0 - root);
                (
                    UnderlyingKind::Multiplicative { up, down },
                    (growth - down) / (up - down),
                )
            }
            BinomialScheme::LeisenReimer => {
                ensure!(
                    strike.is_finite() && strike > 0.0,
                    "Leisen-Reimer tree needs a positive strike, got {strike}"
                );
                let std_dev = sigma * maturity.sqrt();
                let d2 = ((x0 / strike).ln() + nu * maturity) / std_dev;
                let pu = peizer_pratt_2(d2, steps);
                let pdash = peizer_pratt_2(d2 + std_dev, steps);
                let up = growth * pdash / pu;
                let down = (growth - pu * up) / (1.0 - pu);
                (UnderlyingKind::Multiplicative { up, down }, pu)
            }
        };

        if !(pu.is_finite() && (0.0..=1.0).contains(&pu)) {
            return Err(Error::NumericalInstability(format!(
                "{scheme} tree: up probability {pu} outside [0, 1] with {steps} steps"
            )));
        }

        Ok(Self {
            x0,
            dt,
            steps,
            underlying,
            pu,
            scheme,
        })
    }

    /// The scheme used to build this tree.
    pub fn scheme(&self) -> BinomialScheme {
        self.scheme
    }

    /// Initial underlying value (spot price).
    pub fn x0(&self) -> Real {
        self.x0
    }
}

impl Lattice for BinomialTree {
    fn steps(&self) -> Size {
        self.steps
    }

    fn dt(&self) -> Time {
        self.dt
    }

    fn branches(&self) -> Size {
        2
    }

    fn size(&self, i: Size) -> Size {
        i + 1
    }

    fn underlying(&self, i: Size, index: Size) -> Real {
        match self.underlying {
            UnderlyingKind::LogSpace {
                step,
                drift_per_step,
            } => {
                let j = 2 * index as isize - i as isize;
                self.x0 * (i as Real * drift_per_step + j as Real * step).exp()
            }
            UnderlyingKind::Multiplicative { up, down } => {
                self.x0 * down.powi((i - index) as i32) * up.powi(index as i32)
            }
        }
    }

    fn descendant(&self, _i: Size, index: Size, branch: Size) -> Size {
        index + branch
    }

    fn probability(&self, _i: Size, _index: Size, branch: Size) -> Probability {
        if branch == 1 {
            self.pu
        } else {
            1.0 - self.pu
        }
    }
}

/// Peizer-Pratt Method 2 inversion.
///
/// Maps a normal quantile `z` to a probability `p ∈ [0, 1]` for an `n`-step
/// binomial approximation. Requires `n` to be odd.
fn peizer_pratt_2(z: Real, n: Size) -> Real {
    let nf = n as Real;
    let r = z / (nf + 1.0 / 3.0 + 0.1 / (nf + 1.0));
    let ex = (-r * r * (nf + 1.0 / 6.0)).exp();
    0.5 + z.signum() * 0.5 * (1.0 - ex).sqrt()
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lattice::backward_induction;

    /// S=100, r=5%, q=0%, σ=20%.
    fn params() -> BlackScholesParams {
        BlackScholesParams::new(100.0, 0.05, 0.0, 0.20).unwrap()
    }

    /// Black-Scholes ATM call, T=1.
    const BS_CALL: Real = 10.450_583_572_185_565;

    fn european_call(scheme: BinomialScheme, steps: Size) -> (Real, Size) {
        let tree = BinomialTree::new(scheme, &params(), 1.0, steps, 100.0).unwrap();
        let discount = (-0.05 * tree.dt()).exp();
        let state = backward_induction(&tree, discount, |s| (s - 100.0).max(0.0), |_, v| v).unwrap();
        (state.root_value(), tree.steps())
    }

    #[test]
    fn all_schemes_converge_to_black_scholes() {
        for scheme in [
            BinomialScheme::CoxRossRubinstein,
            BinomialScheme::JarrowRudd,
            BinomialScheme::Trigeorgis,
            BinomialScheme::Tian,
            BinomialScheme::LeisenReimer,
        ] {
            let (price, steps) = european_call(scheme, 500);
            assert!(
                (price - BS_CALL).abs() < 0.01,
                "{scheme}({steps} steps): {price:.6} vs BS {BS_CALL:.6}"
            );
        }
    }

    #[test]
    fn crr_reference_value() {
        let (price, _) = european_call(BinomialScheme::CoxRossRubinstein, 500);
        assert!((price - 10.446_585).abs() < 1e-5, "CRR(500) = {price:.6}");
    }

    #[test]
    fn leisen_reimer_fast_convergence() {
        let (price, steps) = european_call(BinomialScheme::LeisenReimer, 50);
        assert_eq!(steps, 51);
        assert!(
            (price - BS_CALL).abs() < 0.005,
            "LR({steps} steps): {price:.6} vs BS {BS_CALL:.6}"
        );
    }

    #[test]
    fn crr_is_risk_neutral() {
        let tree =
            BinomialTree::new(BinomialScheme::CoxRossRubinstein, &params(), 1.0, 10, 100.0)
                .unwrap();
        let s = tree.underlying(3, 1);
        let expected = tree.probability(3, 1, 1) * tree.underlying(4, 2)
            + tree.probability(3, 1, 0) * tree.underlying(4, 1);
        assert!((expected - s * (0.05 * tree.dt()).exp()).abs() < 1e-10);
    }

    #[test]
    fn invalid_probability_is_reported() {
        // Huge drift against tiny volatility and a single step.
        let p = BlackScholesParams::new(100.0, 0.9, 0.0, 0.01).unwrap();
        let err = BinomialTree::new(BinomialScheme::CoxRossRubinstein, &p, 5.0, 1, 100.0)
            .unwrap_err();
        assert!(matches!(err, Error::NumericalInstability(_)), "{err}");
    }

    #[test]
    fn parse_scheme() {
        assert_eq!(
            "crr".parse::<BinomialScheme>().unwrap(),
            BinomialScheme::CoxRossRubinstein
        );
        assert_eq!(
            "leisen_reimer".parse::<BinomialScheme>().unwrap(),
            BinomialScheme::LeisenReimer
        );
        assert!(matches!(
            "joshi".parse::<BinomialScheme>(),
            Err(Error::UnsupportedMethod(_))
        ));
    }
}
