//! θ-scheme time marching for the Black-Scholes PDE in log-price.
//!
//! Solves `∂V/∂t + ½σ²·∂²V/∂x² + (r − q − ½σ²)·∂V/∂x − rV = 0` backward
//! from the terminal payoff.

use super::{FdmScheme, Grid, LogMesh, TridiagonalOperator};
use qq_core::{ensure, errors::Error, errors::Result, Rate, Real, Size, Time, Volatility};
use qq_models::BlackScholesParams;

/// A 1-D finite difference solver with Dirichlet boundaries and optional
/// early-exercise projection.
#[derive(Debug, Clone)]
pub struct Fdm1dSolver {
    rate: Rate,
    dividend_yield: Rate,
    volatility: Volatility,
    maturity: Time,
    time_steps: Size,
    scheme: FdmScheme,
    rannacher_steps: Size,
}

impl Fdm1dSolver {
    /// Create a solver marching `time_steps` steps over `[0, maturity]`.
    pub fn new(
        params: &BlackScholesParams,
        maturity: Time,
        time_steps: Size,
        scheme: FdmScheme,
    ) -> Result<Self> {
        ensure!(time_steps >= 1, "solver needs at least one time step");
        ensure!(
            maturity.is_finite() && maturity > 0.0,
            "maturity must be positive, got {maturity}"
        );
        Ok(Self {
            rate: params.rate(),
            dividend_yield: params.dividend_yield(),
            volatility: params.volatility(),
            maturity,
            time_steps,
            scheme,
            rannacher_steps: 0,
        })
    }

    /// Number of fully implicit start-up steps taken by Crank-Nicolson.
    pub fn with_rannacher_steps(mut self, steps: Size) -> Self {
        self.rannacher_steps = steps;
        self
    }

    /// Time step.
    pub fn dt(&self) -> Time {
        self.maturity / self.time_steps as Real
    }

    /// Check the explicit-scheme stability bound `Δt·(σ²/Δx² + r) ≤ 1`.
    ///
    /// Always succeeds for the implicit and Crank-Nicolson schemes.
    pub fn check_stability(&self, mesh: &LogMesh) -> Result<()> {
        if self.scheme != FdmScheme::Explicit {
            return Ok(());
        }
        let dx = mesh.dx();
        let ratio =
            self.dt() * (self.volatility * self.volatility / (dx * dx) + self.rate.max(0.0));
        if ratio > 1.0 {
            return Err(Error::UnstableScheme(format!(
                "explicit scheme requires dt·(σ²/dx² + r) ≤ 1, got {ratio:.4} \
                 (dt = {:.3e}, dx = {dx:.3e}); add time steps or use an implicit scheme",
                self.dt()
            )));
        }
        Ok(())
    }

    /// March `terminal` back to today.
    ///
    /// `boundary(τ)` gives the `(lower, upper)` Dirichlet values at time to
    /// expiry `τ`. When `exercise` is given, every step is followed by the
    /// projection `V ← max(V, exercise)`.
    pub fn solve<B>(
        &self,
        mesh: LogMesh,
        terminal: &[Real],
        boundary: B,
        exercise: Option<&[Real]>,
    ) -> Result<Grid>
    where
        B: Fn(Time) -> (Real, Real),
    {
        let n = mesh.size();
        ensure!(
            terminal.len() == n,
            "terminal condition has {} values for {n} mesh nodes",
            terminal.len()
        );
        if let Some(ex) = exercise {
            ensure!(
                ex.len() == n,
                "exercise values have {} entries for {n} mesh nodes",
                ex.len()
            );
        }
        self.check_stability(&mesh)?;

        let dt = self.dt();
        let dx = mesh.dx();
        let sigma2 = self.volatility * self.volatility;
        let alpha = 0.5 * sigma2;
        let beta = self.rate - self.dividend_yield - 0.5 * sigma2;

        // L·V ≈ α·V_xx + β·V_x − r·V with central differences.
        let a = alpha / (dx * dx) - beta / (2.0 * dx);
        let b = -2.0 * alpha / (dx * dx) - self.rate;
        let c = alpha / (dx * dx) + beta / (2.0 * dx);

        let mut grid = Grid::new(mesh, dt, self.time_steps);
        let mut values = terminal.to_vec();
        grid.values_mut()
            .set_column(self.time_steps, &nalgebra::DVector::from_column_slice(&values));

        for (k, column) in (0..self.time_steps).rev().enumerate() {
            let tau = (k + 1) as Real * dt;
            let theta = match self.scheme {
                FdmScheme::CrankNicolson if k < self.rannacher_steps => 1.0,
                scheme => scheme.theta(),
            };

            // (I − θ·dt·L)·Vⁿ = (I + (1 − θ)·dt·L)·Vⁿ⁺¹
            let explicit_weight = (1.0 - theta) * dt;
            let mut rhs = values.clone();
            for i in 1..n - 1 {
                rhs[i] += explicit_weight * (a * values[i - 1] + b * values[i] + c * values[i + 1]);
            }
            let (lower, upper) = boundary(tau);
            rhs[0] = lower;
            rhs[n - 1] = upper;

            values = if theta > 0.0 {
                let mut op = TridiagonalOperator::identity(n);
                let implicit_weight = theta * dt;
                for i in 1..n - 1 {
                    op.lower[i] = -implicit_weight * a;
                    op.diag[i] = 1.0 - implicit_weight * b;
                    op.upper[i] = -implicit_weight * c;
                }
                op.solve(&rhs)?
            } else {
                rhs
            };

            if let Some(ex) = exercise {
                for (v, &e) in values.iter_mut().zip(ex) {
                    *v = v.max(e);
                }
            }
            if let Some(bad) = values.iter().find(|v| !v.is_finite()) {
                return Err(Error::NumericalInstability(format!(
                    "finite-difference value {bad} at τ = {tau:.4}"
                )));
            }
            grid.values_mut()
                .set_column(column, &nalgebra::DVector::from_column_slice(&values));
        }

        Ok(grid)
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
