//! Poisson distribution.
//!
//! Wraps the `statrs` crate's Poisson implementation.

use qq_core::{ensure, Real, Result};
use statrs::distribution::{Discrete, Poisson};

/// Poisson distribution with mean `lambda`.
///
/// A zero mean is allowed and degenerates to a point mass at `0`, which is
/// what a jump process with zero intensity needs.
#[derive(Debug, Clone)]
pub struct PoissonDistribution {
    dist: Option<Poisson>,
    lambda: Real,
}

impl PoissonDistribution {
    /// Create a Poisson distribution with the given mean `lambda ≥ 0`.
    pub fn new(lambda: Real) -> Result<Self> {
        ensure!(
            lambda.is_finite() && lambda >= 0.0,
            "Poisson mean must be finite and non-negative, got {lambda}"
        );
        let dist = if lambda > 0.0 {
            Some(Poisson::new(lambda).map_err(|e| {
                qq_core::Error::InvalidParameter(format!("Poisson({lambda}): {e}"))
            })?)
        } else {
            None
        };
        Ok(Self { dist, lambda })
    }

    /// Mean parameter λ.
    pub fn lambda(&self) -> Real {
        self.lambda
    }

    /// Probability mass function P(X = k).
    pub fn pmf(&self, k: u64) -> Real {
        match &self.dist {
            Some(d) => d.pmf(k),
            None => {
                if k == 0 {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn poisson_pmf() {
        let d = PoissonDistribution::new(3.0).unwrap();
        // P(X=0) = e^{-3}
        let expected = (-3.0_f64).exp();
        assert_relative_eq!(d.pmf(0), expected, max_relative = 1e-12);
        // P(X=3) = e^{-3} * 27 / 6
        assert_relative_eq!(d.pmf(3), expected * 27.0 / 6.0, max_relative = 1e-12);
    }

    #[test]
    fn poisson_pmf_sums_to_one() {
        let d = PoissonDistribution::new(5.0).unwrap();
        let total: f64 = (0..=50).map(|k| d.pmf(k)).sum();
        assert!((total - 1.0).abs() < 1e-10);
    }

    #[test]
    fn zero_mean_is_point_mass() {
        let d = PoissonDistribution::new(0.0).unwrap();
        assert_eq!(d.pmf(0), 1.0);
        assert_eq!(d.pmf(1), 0.0);
    }

    #[test]
    fn negative_mean_is_rejected() {
        assert!(matches!(
            PoissonDistribution::new(-1.0),
            Err(qq_core::Error::InvalidParameter(_))
        ));
        assert!(PoissonDistribution::new(f64::NAN).is_err());
    }
}
