//! Continuous geometric-average options under Black-Scholes.
//!
//! The geometric mean `G` of the spot over the final `w` years of the
//! contract is lognormal with
//!
//! $$\ln G \sim \mathcal{N}\big(\ln S + (b - \sigma^2/2)(T - w/2),\ \sigma^2 (T - 2w/3)\big)$$
//!
//! where `b = r − q`, so the option is priced by Black's formula on `G`.

use qq_core::{Rate, Real, Time, Volatility};
use qq_instruments::OptionType;
use qq_math::normal_cdf;

/// Price of a European option paying `max(φ(G − K), 0)` at `t`, with `G`
/// the continuous geometric average over the final `window` years.
///
/// `window` must lie in `(0, t]`; a window shrinking to zero recovers the
/// Black-Scholes price.
#[allow(clippy::too_many_arguments)]
pub fn geometric_average_price(
    option_type: OptionType,
    spot: Real,
    strike: Real,
    r: Rate,
    q: Rate,
    sigma: Volatility,
    t: Time,
    window: Time,
) -> Real {
    let phi = option_type.sign();
    let mean = spot.ln() + (r - q - 0.5 * sigma * sigma) * (t - 0.5 * window);
    let variance = sigma * sigma * (t - 2.0 * window / 3.0);
    let forward = (mean + 0.5 * variance).exp();

    let std_dev = variance.sqrt();
    let d1 = ((forward / strike).ln() + 0.5 * variance) / std_dev;
    let d2 = d1 - std_dev;
    (-r * t).exp() * phi * (forward * normal_cdf(phi * d1) - strike * normal_cdf(phi * d2))
}
