//! Tridiagonal operator with a Thomas-algorithm solver.

use qq_core::{errors::Error, errors::Result, Real, Size};

/// A tridiagonal matrix operator.
///
/// Stores the lower, diagonal, and upper bands. Used for 1-D finite difference
/// discretisations of second-order PDEs.
#[derive(Debug, Clone)]
pub struct TridiagonalOperator {
    /// Lower diagonal (index 0 unused; starts from row 1).
    pub lower: Vec<Real>,
    /// Main diagonal.
    pub diag: Vec<Real>,
    /// Upper diagonal (last index unused; ends at row n−2).
    pub upper: Vec<Real>,
}

impl TridiagonalOperator {
    /// Create a zero tridiagonal operator of size `n`.
    pub fn new(n: Size) -> Self {
        Self {
            lower: vec![0.0; n],
            diag: vec![0.0; n],
            upper: vec![0.0; n],
        }
    }

    /// The identity operator of size `n`.
    pub fn identity(n: Size) -> Self {
        let mut op = Self::new(n);
        op.add_identity(1.0);
        op
    }

    /// Size (number of rows/columns).
    pub fn size(&self) -> Size {
        self.diag.len()
    }

    /// Solve `A · x = rhs` using the Thomas algorithm.
    ///
    /// Fails with `NumericalInstability` on a zero (or non-finite) pivot.
    pub fn solve(&self, rhs: &[Real]) -> Result<Vec<Real>> {
        let n = self.size();
        check_len(n, rhs.len())?;

        let mut c_prime = vec![0.0; n];
        let mut d_prime = vec![0.0; n];

        let mut pivot = self.diag[0];
        check_pivot(pivot, 0)?;
        if n > 1 {
            c_prime[0] = self.upper[0] / pivot;
        }
        d_prime[0] = rhs[0] / pivot;

        for i in 1..n {
            pivot = self.diag[i] - self.lower[i] * c_prime[i - 1];
            check_pivot(pivot, i)?;
            if i < n - 1 {
                c_prime[i] = self.upper[i] / pivot;
            }
            d_prime[i] = (rhs[i] - self.lower[i] * d_prime[i - 1]) / pivot;
        }

        let mut x = vec![0.0; n];
        x[n - 1] = d_prime[n - 1];
        for i in (0..n - 1).rev() {
            x[i] = d_prime[i] - c_prime[i] * x[i + 1];
        }
        Ok(x)
    }

    /// Add the identity matrix scaled by `factor`: `A ← A + factor · I`.
    pub fn add_identity(&mut self, factor: Real) {
        for d in &mut self.diag {
            *d += factor;
        }
    }
}

fn check_len(n: Size, got: Size) -> Result<()> {
    if n == 0 || got != n {
        return Err(Error::InvalidParameter(format!(
            "tridiagonal system of size {n} applied to vector of length {got}"
        )));
    }
    Ok(())
}

fn check_pivot(pivot: Real, row: Size) -> Result<()> {
    if pivot == 0.0 || !pivot.is_finite() {
        return Err(Error::NumericalInstability(format!(
            "tridiagonal solve: pivot {pivot} in row {row}"
        )));
    }
    Ok(())
}
