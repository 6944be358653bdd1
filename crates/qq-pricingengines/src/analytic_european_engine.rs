//! Black-Scholes-Merton closed form for European vanilla options.
//!
//! $$C = S e^{-qT} N(d_1) - K e^{-rT} N(d_2)$$
//! $$P = K e^{-rT} N(-d_2) - S e^{-qT} N(-d_1)$$
//!
//! where $d_{1,2} = \frac{\ln(S/K) + (r - q \pm \sigma^2/2)T}{\sigma\sqrt{T}}$.

use qq_core::{Rate, Real, Time, Volatility};
use qq_instruments::OptionType;
use qq_math::{normal_cdf, normal_pdf};

use crate::Greeks;

/// Black-Scholes price and analytic Greeks for a European option.
///
/// Vega is per unit of volatility, rho per unit of rate and theta per year
/// of calendar time. Requires `spot`, `strike`, `volatility` and
/// `time_to_expiry` strictly positive; callers validate.
pub fn black_scholes_merton(
    option_type: OptionType,
    spot: Real,
    strike: Real,
    risk_free_rate: Rate,
    dividend_yield: Rate,
    volatility: Volatility,
    time_to_expiry: Time,
) -> (Real, Greeks) {
    let phi = option_type.sign();
    let (r, q, sigma, t) = (risk_free_rate, dividend_yield, volatility, time_to_expiry);
    let sqrt_t = t.sqrt();
    let std_dev = sigma * sqrt_t;
    let df_r = (-r * t).exp();
    let df_q = (-q * t).exp();

    let d1 = ((spot / strike).ln() + (r - q + 0.5 * sigma * sigma) * t) / std_dev;
    let d2 = d1 - std_dev;

    let nd1 = normal_cdf(phi * d1);
    let nd2 = normal_cdf(phi * d2);
    let npd1 = normal_pdf(d1);

    let price = phi * (spot * df_q * nd1 - strike * df_r * nd2);
    let greeks = Greeks {
        delta: phi * df_q * nd1,
        gamma: df_q * npd1 / (spot * std_dev),
        vega: spot * df_q * npd1 * sqrt_t,
        theta: -(spot * df_q * npd1 * sigma) / (2.0 * sqrt_t) - phi * r * strike * df_r * nd2
            + phi * q * spot * df_q * nd1,
        rho: phi * strike * t * df_r * nd2,
    };
    (price, greeks)
}

/// Black-Scholes price only.
#[inline]
pub fn black_scholes_price(
    option_type: OptionType,
    spot: Real,
    strike: Real,
    risk_free_rate: Rate,
    dividend_yield: Rate,
    volatility: Volatility,
    time_to_expiry: Time,
) -> Real {
    black_scholes_merton(
        option_type,
        spot,
        strike,
        risk_free_rate,
        dividend_yield,
        volatility,
        time_to_expiry,
    )
    .0
}
