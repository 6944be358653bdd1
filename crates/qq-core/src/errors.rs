//! Error types for quickquant.
//!
//! Every pricer reports failure through the single `thiserror`-derived
//! [`Error`] enum.  The [`ensure!`](crate::ensure), [`ensure_finite!`](crate::ensure_finite)
//! and [`fail!`](crate::fail) macros build the common variants.

use thiserror::Error;

/// The top-level error type used throughout quickquant.
///
/// Variants classify *why* a pricing request could not be honoured, so that
/// callers can distinguish bad input from numerical trouble.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// An input lies outside its valid domain (negative strike, `rho > 1`,
    /// too few steps, ...).
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// The pricer does not support the supplied market-model variant.
    #[error("unsupported model: {0}")]
    UnsupportedModel(String),

    /// The pricer does not support the instrument's exercise style.
    #[error("invalid exercise: {0}")]
    InvalidExercise(String),

    /// The discretisation violates a known stability bound.
    #[error("unstable scheme: {0}")]
    UnstableScheme(String),

    /// A computation produced negative probabilities, failed to converge,
    /// or yielded a non-finite value.
    #[error("numerical instability: {0}")]
    NumericalInstability(String),

    /// The requested combination of method and tunables is not implemented.
    #[error("unsupported method: {0}")]
    UnsupportedMethod(String),
}

/// Shorthand `Result` type used throughout quickquant.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Returns `Err(Error::InvalidParameter(...))` if `$cond` is false.
///
/// # Example
/// ```
/// use qq_core::{ensure, errors::Error};
/// fn positive(x: f64) -> qq_core::errors::Result<f64> {
///     ensure!(x > 0.0, "x must be positive, got {x}");
///     Ok(x)
/// }
/// assert!(positive(1.0).is_ok());
/// assert!(matches!(positive(-1.0), Err(Error::InvalidParameter(_))));
/// ```
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $($msg:tt)*) => {
        if !$cond {
            return Err($crate::errors::Error::InvalidParameter(
                format!($($msg)*)
            ));
        }
    };
}

/// Returns `Err(Error::NumericalInstability(...))` unless `$value` is finite.
///
/// # Example
/// ```
/// use qq_core::{ensure_finite, errors::Error};
/// fn ratio(a: f64, b: f64) -> qq_core::errors::Result<f64> {
///     let r = a / b;
///     ensure_finite!(r, "ratio {a}/{b}");
///     Ok(r)
/// }
/// assert!(ratio(1.0, 2.0).is_ok());
/// assert!(matches!(ratio(1.0, 0.0), Err(Error::NumericalInstability(_))));
/// ```
#[macro_export]
macro_rules! ensure_finite {
    ($value:expr, $($msg:tt)*) => {
        let value: f64 = $value;
        if !value.is_finite() {
            return Err($crate::errors::Error::NumericalInstability(
                format!("non-finite value ({}) in {}", value, format!($($msg)*))
            ));
        }
    };
}

/// Returns the given error variant immediately.
///
/// # Example
/// ```
/// use qq_core::{fail, errors::Error};
/// fn always_err() -> qq_core::errors::Result<()> {
///     fail!(UnsupportedMethod, "no such scheme: {}", "foo");
/// }
/// assert_eq!(
///     always_err(),
///     Err(Error::UnsupportedMethod("no such scheme: foo".into()))
/// );
/// ```
#[macro_export]
macro_rules! fail {
    ($kind:ident, $($msg:tt)*) => {
        return Err($crate::errors::Error::$kind(format!($($msg)*)))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checked(x: f64) -> Result<f64> {
        ensure!(x >= 0.0, "x = {x}");
        ensure_finite!(x.sqrt(), "sqrt");
        Ok(x.sqrt())
    }

    #[test]
    fn ensure_maps_to_invalid_parameter() {
        assert_eq!(checked(4.0), Ok(2.0));
        assert_eq!(
            checked(-1.0),
            Err(Error::InvalidParameter("x = -1".into()))
        );
        assert!(matches!(
            checked(f64::INFINITY),
            Err(Error::NumericalInstability(_))
        ));
    }

    #[test]
    fn display_prefixes_category() {
        let e = Error::UnstableScheme("dt too large".into());
        assert_eq!(e.to_string(), "unstable scheme: dt too large");
    }
}
