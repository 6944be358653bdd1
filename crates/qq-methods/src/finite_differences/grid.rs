//! Log-price mesh and the space × time value grid.

use nalgebra::DMatrix;
use qq_core::{ensure, errors::Result, Real, Size, Time};

/// A uniform mesh in `x = ln S`.
#[derive(Debug, Clone, PartialEq)]
pub struct LogMesh {
    x_min: Real,
    dx: Real,
    intervals: Size,
}

impl LogMesh {
    /// `intervals` equal steps spanning `[x_min, x_max]`.
    pub fn uniform(x_min: Real, x_max: Real, intervals: Size) -> Result<Self> {
        ensure!(intervals >= 2, "mesh needs at least two intervals, got {intervals}");
        ensure!(
            x_min.is_finite() && x_max.is_finite() && x_max > x_min,
            "mesh bounds must be finite and increasing, got [{x_min}, {x_max}]"
        );
        Ok(Self {
            x_min,
            dx: (x_max - x_min) / intervals as Real,
            intervals,
        })
    }

    /// Number of nodes (`intervals + 1`).
    pub fn size(&self) -> Size {
        self.intervals + 1
    }

    /// Node spacing.
    pub fn dx(&self) -> Real {
        self.dx
    }

    /// Lower edge.
    pub fn x_min(&self) -> Real {
        self.x_min
    }

    /// Upper edge.
    pub fn x_max(&self) -> Real {
        self.location(self.intervals)
    }

    /// Log-price of node `i`.
    pub fn location(&self, i: Size) -> Real {
        self.x_min + i as Real * self.dx
    }

    /// Underlying prices at every node.
    pub fn prices(&self) -> Vec<Real> {
        (0..self.size()).map(|i| self.location(i).exp()).collect()
    }
}

/// Value, delta, gamma and theta read off a solved grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridSensitivities {
    /// Option value at the spot.
    pub value: Real,
    /// `∂V/∂S`.
    pub delta: Real,
    /// `∂²V/∂S²`.
    pub gamma: Real,
    /// `∂V/∂t` (calendar time, per year).
    pub theta: Real,
}

/// Option values on a [`LogMesh`] at every time step.
///
/// Column `n` holds the values at calendar time `n·dt`; column `0` is
/// today and the last column is the terminal payoff.
#[derive(Debug, Clone)]
pub struct Grid {
    mesh: LogMesh,
    dt: Time,
    values: DMatrix<Real>,
}

impl Grid {
    pub(crate) fn new(mesh: LogMesh, dt: Time, time_steps: Size) -> Self {
        let values = DMatrix::zeros(mesh.size(), time_steps + 1);
        Self { mesh, dt, values }
    }

    pub(crate) fn values_mut(&mut self) -> &mut DMatrix<Real> {
        &mut self.values
    }

    /// The spatial mesh.
    pub fn mesh(&self) -> &LogMesh {
        &self.mesh
    }

    /// Time step.
    pub fn dt(&self) -> Time {
        self.dt
    }

    /// Number of time steps.
    pub fn time_steps(&self) -> Size {
        self.values.ncols() - 1
    }

    /// Raw values, indexed `(space node, time step)`.
    pub fn values(&self) -> &DMatrix<Real> {
        &self.values
    }

    /// Value at node `i`, time step `n`.
    pub fn value(&self, i: Size, n: Size) -> Real {
        self.values[(i, n)]
    }

    /// Quadratic interpolation of column `n` at log-price `x`.
    ///
    /// Returns `(V, ∂V/∂x, ∂²V/∂x²)`.
    pub fn interpolate(&self, x: Real, n: Size) -> Result<(Real, Real, Real)> {
        ensure!(
            x >= self.mesh.x_min() && x <= self.mesh.x_max(),
            "log-price {x} outside mesh [{}, {}]",
            self.mesh.x_min(),
            self.mesh.x_max()
        );
        let dx = self.mesh.dx();
        let nearest = ((x - self.mesh.x_min()) / dx).round() as Size;
        let i = nearest.clamp(1, self.mesh.size() - 2);
        let h = (x - self.mesh.location(i)) / dx;
        let (vm, v0, vp) = (
            self.values[(i - 1, n)],
            self.values[(i, n)],
            self.values[(i + 1, n)],
        );
        let first = 0.5 * (vp - vm);
        let second = vp - 2.0 * v0 + vm;
        Ok((
            v0 + h * first + 0.5 * h * h * second,
            (first + h * second) / dx,
            second / (dx * dx),
        ))
    }

    /// Value and sensitivities at `spot` today.
    pub fn sensitivities(&self, spot: Real) -> Result<GridSensitivities> {
        let x = spot.ln();
        let (value, v_x, v_xx) = self.interpolate(x, 0)?;
        let (next, _, _) = self.interpolate(x, 1)?;
        Ok(GridSensitivities {
            value,
            delta: v_x / spot,
            gamma: (v_xx - v_x) / (spot * spot),
            theta: (next - value) / self.dt,
        })
    }
}
