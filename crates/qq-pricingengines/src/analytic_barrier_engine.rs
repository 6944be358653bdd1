//! Analytic single-barrier prices (Reiner & Rubinstein, 1991).
//!
//! Continuously monitored European barrier options without rebate under
//! Black-Scholes. Knock-out prices are built from the four Reiner-Rubinstein
//! terms `A`..`D`; knock-in prices follow from in/out parity
//! (`in + out = vanilla`).

use qq_core::{Rate, Real, Time, Volatility};
use qq_instruments::{BarrierType, OptionType};
use qq_math::normal_cdf;

use crate::analytic_european_engine::black_scholes_price;

/// Closed-form barrier option price.
///
/// Handles all eight up/down × in/out × call/put combinations. A barrier
/// already breached at inception makes a knock-out worthless and a
/// knock-in equal to the vanilla.
#[allow(clippy::too_many_arguments)]
pub fn analytic_barrier_price(
    option_type: OptionType,
    barrier_type: BarrierType,
    spot: Real,
    strike: Real,
    barrier: Real,
    r: Rate,
    q: Rate,
    sigma: Volatility,
    t: Time,
) -> Real {
    let vanilla = || black_scholes_price(option_type, spot, strike, r, q, sigma, t);
    let breached = if barrier_type.is_down() {
        spot <= barrier
    } else {
        spot >= barrier
    };

    if !barrier_type.is_knock_out() {
        if breached {
            return vanilla();
        }
        let out = knock_out_price(
            option_type,
            barrier_type.knock_out_counterpart(),
            spot,
            strike,
            barrier,
            r,
            q,
            sigma,
            t,
        );
        return (vanilla() - out).max(0.0);
    }
    if breached {
        return 0.0;
    }
    knock_out_price(option_type, barrier_type, spot, strike, barrier, r, q, sigma, t)
}

#[allow(clippy::too_many_arguments)]
fn knock_out_price(
    option_type: OptionType,
    barrier_type: BarrierType,
    spot: Real,
    strike: Real,
    barrier: Real,
    r: Rate,
    q: Rate,
    sigma: Volatility,
    t: Time,
) -> Real {
    let sigma2 = sigma * sigma;
    let std_dev = sigma * t.sqrt();
    let mu = (r - q - 0.5 * sigma2) / sigma2;

    let phi = option_type.sign();
    let eta = if barrier_type.is_down() { 1.0 } else { -1.0 };

    let x1 = (spot / strike).ln() / std_dev + (1.0 + mu) * std_dev;
    let x2 = (spot / barrier).ln() / std_dev + (1.0 + mu) * std_dev;
    let y1 = (barrier * barrier / (spot * strike)).ln() / std_dev + (1.0 + mu) * std_dev;
    let y2 = (barrier / spot).ln() / std_dev + (1.0 + mu) * std_dev;

    let df_r = (-r * t).exp();
    let df_q = (-q * t).exp();
    let h_over_s = barrier / spot;
    let reflect_s = h_over_s.powf(2.0 * (mu + 1.0));
    let reflect_k = h_over_s.powf(2.0 * mu);

    let a = phi * spot * df_q * normal_cdf(phi * x1)
        - phi * strike * df_r * normal_cdf(phi * (x1 - std_dev));
    let b = phi * spot * df_q * normal_cdf(phi * x2)
        - phi * strike * df_r * normal_cdf(phi * (x2 - std_dev));
    let c = phi * spot * df_q * reflect_s * normal_cdf(eta * y1)
        - phi * strike * df_r * reflect_k * normal_cdf(eta * (y1 - std_dev));
    let d = phi * spot * df_q * reflect_s * normal_cdf(eta * y2)
        - phi * strike * df_r * reflect_k * normal_cdf(eta * (y2 - std_dev));

    let above = strike >= barrier;
    let price = match (barrier_type, option_type) {
        (BarrierType::DownOut, OptionType::Call) if above => a - c,
        (BarrierType::DownOut, OptionType::Call) => b - d,
        (BarrierType::DownOut, OptionType::Put) if above => a - b + c - d,
        (BarrierType::DownOut, OptionType::Put) => 0.0,
        (BarrierType::UpOut, OptionType::Call) if above => 0.0,
        (BarrierType::UpOut, OptionType::Call) => a - b + c - d,
        (BarrierType::UpOut, OptionType::Put) if above => b - d,
        (BarrierType::UpOut, OptionType::Put) => a - c,
        // Knock-ins are routed through parity by the caller.
        (BarrierType::DownIn | BarrierType::UpIn, _) => 0.0,
    };
    price.max(0.0)
}
