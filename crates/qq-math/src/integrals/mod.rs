//! Numerical integration.
//!
//! Provides a globally adaptive Gauss-Kronrod (7/15-point) integrator that
//! reports an error estimate and honours an evaluation budget.

use qq_core::{
    ensure,
    errors::{Error, Result},
    Real, Size,
};

/// Outcome of an adaptive quadrature.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadratureResult {
    /// Integral estimate.
    pub value: Real,
    /// Estimated absolute error of `value`.
    pub error_estimate: Real,
    /// Number of integrand evaluations performed.
    pub evaluations: Size,
}

// ── Gauss-Kronrod ─────────────────────────────────────────────────────────────

// Abscissae of the 15-point Kronrod rule on [-1, 1] (non-negative half).
// Odd indices are the 7-point Gauss abscissae.
const XGK: [Real; 8] = [
    0.991_455_371_120_812_6,
    0.949_107_912_342_758_5,
    0.864_864_423_359_769_1,
    0.741_531_185_599_394_4,
    0.586_087_235_467_691_1,
    0.405_845_151_377_397_2,
    0.207_784_955_007_898_5,
    0.0,
];

const WGK: [Real; 8] = [
    0.022_935_322_010_529_22,
    0.063_092_092_629_978_55,
    0.104_790_010_322_250_18,
    0.140_653_259_715_525_92,
    0.169_004_726_639_267_9,
    0.190_350_578_064_785_4,
    0.204_432_940_075_298_9,
    0.209_482_141_084_727_83,
];

// Gauss weights for XGK[1], XGK[3], XGK[5], XGK[7].
const WG: [Real; 4] = [
    0.129_484_966_168_869_7,
    0.279_705_391_489_276_7,
    0.381_830_050_505_118_9,
    0.417_959_183_673_469_4,
];

const EVALS_PER_SEGMENT: Size = 15;

#[derive(Debug, Clone, Copy)]
struct Segment {
    a: Real,
    b: Real,
    value: Real,
    error: Real,
}

/// Globally adaptive Gauss-Kronrod integration using the G7/K15 pair.
///
/// The interval is split into `initial_segments` pieces; the piece with the
/// largest local error (`|K15 − G7|`) is then bisected until the summed
/// error falls below `absolute_accuracy` or `max_evaluations` is exhausted.
#[derive(Debug, Clone)]
pub struct GaussKronrodAdaptive {
    absolute_accuracy: Real,
    max_evaluations: Size,
    initial_segments: Size,
}

impl GaussKronrodAdaptive {
    /// Create a new integrator.
    pub fn new(absolute_accuracy: Real, max_evaluations: Size) -> Self {
        Self {
            absolute_accuracy,
            max_evaluations,
            initial_segments: 1,
        }
    }

    /// Start from `n` equal segments instead of a single one.
    pub fn with_initial_segments(mut self, n: Size) -> Self {
        self.initial_segments = n.max(1);
        self
    }

    /// Integrate `f` on `[a, b]`, returning the estimate together with its
    /// error and evaluation count.
    ///
    /// Fails with [`Error::NumericalInstability`] if the integrand is not
    /// finite somewhere or the accuracy target is not met within budget.
    pub fn integrate_with_estimate<F: Fn(Real) -> Real>(
        &self,
        f: F,
        a: Real,
        b: Real,
    ) -> Result<QuadratureResult> {
        ensure!(
            self.absolute_accuracy > 0.0,
            "absolute accuracy must be positive, got {}",
            self.absolute_accuracy
        );
        ensure!(
            a.is_finite() && b.is_finite(),
            "integration bounds must be finite, got [{a}, {b}]"
        );
        if a == b {
            return Ok(QuadratureResult {
                value: 0.0,
                error_estimate: 0.0,
                evaluations: 0,
            });
        }

        let mut evaluations = 0;
        let n0 = self.initial_segments;
        let width = (b - a) / n0 as Real;
        let mut segments = Vec::with_capacity(2 * n0);
        for k in 0..n0 {
            let lo = a + k as Real * width;
            let hi = if k + 1 == n0 { b } else { lo + width };
            segments.push(kronrod_segment(&f, lo, hi)?);
            evaluations += EVALS_PER_SEGMENT;
        }

        loop {
            let (value, error) = totals(&segments);
            if error <= self.absolute_accuracy {
                return Ok(QuadratureResult {
                    value,
                    error_estimate: error,
                    evaluations,
                });
            }
            if evaluations + 2 * EVALS_PER_SEGMENT > self.max_evaluations {
                return Err(Error::NumericalInstability(format!(
                    "Gauss-Kronrod: error estimate {error:.3e} above tolerance {:.3e} \
                     after {evaluations} evaluations",
                    self.absolute_accuracy
                )));
            }

            let worst = segments
                .iter()
                .enumerate()
                .max_by(|(_, x), (_, y)| x.error.total_cmp(&y.error))
                .map(|(i, _)| i)
                .unwrap_or(0);
            let seg = segments.swap_remove(worst);
            let mid = 0.5 * (seg.a + seg.b);
            if mid <= seg.a || mid >= seg.b {
                return Err(Error::NumericalInstability(format!(
                    "Gauss-Kronrod: segment [{}, {}] cannot be bisected further",
                    seg.a, seg.b
                )));
            }
            segments.push(kronrod_segment(&f, seg.a, mid)?);
            segments.push(kronrod_segment(&f, mid, seg.b)?);
            evaluations += 2 * EVALS_PER_SEGMENT;
        }
    }
}

fn totals(segments: &[Segment]) -> (Real, Real) {
    segments
        .iter()
        .fold((0.0, 0.0), |(v, e), s| (v + s.value, e + s.error))
}

fn kronrod_segment<F: Fn(Real) -> Real>(f: &F, a: Real, b: Real) -> Result<Segment> {
    let center = 0.5 * (a + b);
    let half = 0.5 * (b - a);

    let fc = f(center);
    let mut kronrod = WGK[7] * fc;
    let mut gauss = WG[3] * fc;
    let mut finite = fc.is_finite();
    for j in 0..7 {
        let dx = half * XGK[j];
        let sum = f(center - dx) + f(center + dx);
        finite &= sum.is_finite();
        kronrod += WGK[j] * sum;
        if j % 2 == 1 {
            gauss += WG[j / 2] * sum;
        }
    }
    if !finite {
        return Err(Error::NumericalInstability(format!(
            "Gauss-Kronrod: non-finite integrand on [{a}, {b}]"
        )));
    }
    Ok(Segment {
        a,
        b,
        value: kronrod * half,
        error: ((kronrod - gauss) * half).abs(),
    })
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::PI;

    #[test]
    fn polynomial_is_exact() {
        // K15 integrates polynomials of degree ≤ 22 exactly.
        let gk = GaussKronrodAdaptive::new(1e-12, 1_000);
        let r = gk
            .integrate_with_estimate(|x| x.powi(6) - 3.0 * x * x + 1.0, 0.0, 2.0)
            .unwrap();
        let exact = 2.0_f64.powi(7) / 7.0 - 8.0 + 2.0;
        assert_abs_diff_eq!(r.value, exact, epsilon = 1e-12);
        assert_eq!(r.evaluations, 15);
    }

    #[test]
    fn gaussian_integral() {
        let gk = GaussKronrodAdaptive::new(1e-12, 10_000).with_initial_segments(4);
        let r = gk
            .integrate_with_estimate(|x| (-0.5 * x * x).exp(), -10.0, 10.0)
            .unwrap();
        assert_abs_diff_eq!(r.value, (2.0 * PI).sqrt(), epsilon = 1e-11);
    }

    #[test]
    fn oscillatory_integrand_refines() {
        let gk = GaussKronrodAdaptive::new(1e-10, 50_000);
        let r = gk
            .integrate_with_estimate(|x| (20.0 * x).cos(), 0.0, PI)
            .unwrap();
        assert_abs_diff_eq!(r.value, 0.0, epsilon = 1e-9);
        assert!(r.evaluations > 15);
        assert!(r.error_estimate <= 1e-10);
    }

    #[test]
    fn budget_exhaustion_is_reported() {
        let gk = GaussKronrodAdaptive::new(1e-14, 45);
        let err = gk
            .integrate_with_estimate(|x| x.abs().sqrt(), -1.0, 1.0)
            .unwrap_err();
        assert!(matches!(err, Error::NumericalInstability(_)), "{err}");
    }

    #[test]
    fn non_finite_integrand_is_reported() {
        let gk = GaussKronrodAdaptive::new(1e-10, 1_000);
        let err = gk.integrate_with_estimate(|x| 1.0 / x, 0.0, 1.0);
        assert!(err.is_err());
        let nan = gk.integrate_with_estimate(|_| f64::NAN, 0.0, 1.0);
        assert!(matches!(nan, Err(Error::NumericalInstability(_))));
    }

    #[test]
    fn empty_interval() {
        let gk = GaussKronrodAdaptive::new(1e-10, 1_000);
        let r = gk.integrate_with_estimate(|x| x, 1.0, 1.0).unwrap();
        assert_eq!(r.value, 0.0);
        assert_eq!(r.evaluations, 0);
    }
}
