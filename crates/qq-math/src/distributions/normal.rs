//! Standard normal distribution.

use qq_core::Real;
use statrs::function::erf::erfc;
use std::f64::consts::{PI, SQRT_2};

/// The standard normal probability density function.
///
/// `φ(x) = exp(-x²/2) / √(2π)`
#[inline]
pub fn normal_pdf(x: Real) -> Real {
    (-0.5 * x * x).exp() / (2.0 * PI).sqrt()
}

/// The standard normal cumulative distribution function Φ(x).
///
/// Evaluated as `½·erfc(−x/√2)`, which keeps full relative precision in the
/// lower tail and satisfies `Φ(x) + Φ(−x) = 1` to rounding.
#[inline]
pub fn normal_cdf(x: Real) -> Real {
    0.5 * erfc(-x / SQRT_2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use proptest::prelude::*;

    #[test]
    fn normal_pdf_at_zero() {
        let expected = 1.0 / (2.0 * PI).sqrt();
        assert_abs_diff_eq!(normal_pdf(0.0), expected, epsilon = 1e-15);
    }

    #[test]
    fn normal_cdf_reference_values() {
        assert_abs_diff_eq!(normal_cdf(0.0), 0.5, epsilon = 1e-15);
        assert_abs_diff_eq!(normal_cdf(1.0), 0.841_344_746_068_542_9, epsilon = 1e-14);
        assert_abs_diff_eq!(normal_cdf(-1.96), 0.024_997_895_148_220_4, epsilon = 1e-14);
    }

    #[test]
    fn normal_cdf_tails() {
        assert_abs_diff_eq!(normal_cdf(10.0), 1.0, epsilon = 1e-15);
        let lower = normal_cdf(-10.0);
        assert!(lower > 0.0 && lower < 1e-22, "lower tail {lower:e}");
    }

    proptest! {
        #[test]
        fn normal_cdf_is_symmetric(x in -8.0_f64..8.0) {
            prop_assert!((normal_cdf(x) + normal_cdf(-x) - 1.0).abs() < 1e-14);
        }
    }
}
