//! Characteristic functions of the forward-normalised log price.
//!
//! For a model with forward `F_T`, `X = ln(S_T / F_T)` and
//! `ψ(u) = E[exp(iuX)]`. Arguments are complex so that pricers can move
//! the integration contour off the real axis.

use num_complex::Complex64;
use qq_core::Time;

/// A model whose log-price characteristic function is known in closed form.
pub trait CharacteristicFunction {
    /// `ln ψ(u)` at maturity `t`.
    fn log_characteristic(&self, u: Complex64, t: Time) -> Complex64;

    /// `ψ(u)` at maturity `t`.
    fn characteristic(&self, u: Complex64, t: Time) -> Complex64 {
        self.log_characteristic(u, t).exp()
    }
}

/// `ln(1 + z)` accurate for small `|z|`.
pub(crate) fn ln_1p(z: Complex64) -> Complex64 {
    if z.norm() < 1e-4 {
        // z − z²/2 + z³/3 − z⁴/4
        z * (1.0 - z * (0.5 - z * (1.0 / 3.0 - 0.25 * z)))
    } else {
        (1.0 + z).ln()
    }
}
