//! Greeks from any pricer.
//!
//! Analytic Greeks are used when the pricer supplies them. Otherwise delta,
//! gamma and theta are taken from the pricer's lattice- or grid-native
//! `additional_results` when present, and from central differences when
//! not. Vega and rho are always bumped.
//!
//! | Greek | bumped input | step |
//! |-------|--------------|------|
//! | delta, gamma | spot | `bump·S` |
//! | vega  | `σ` (Heston: `√v0`) | `bump·σ` |
//! | rho   | rate | `bump` |
//! | theta | maturity | `bump·T`, `θ = −∂V/∂T` |

use qq_core::{ensure, errors::Result, Real};
use qq_instruments::Instrument;
use qq_models::MarketModel;

use crate::{Greeks, PricingEngine, PricingResult};

/// Relative bump used when the caller has no preference.
pub const DEFAULT_BUMP: Real = 1e-4;

/// Delta, gamma, vega, theta and rho of `instrument` under `model`.
///
/// `bump` must lie in `(0, 0.5)`. Smaller bumps reduce truncation error
/// but amplify the pricer's own numerical noise.
pub fn greeks<E: PricingEngine + ?Sized>(
    engine: &E,
    instrument: &Instrument,
    model: &MarketModel,
    bump: Real,
) -> Result<Greeks> {
    ensure!(
        bump.is_finite() && bump > 0.0 && bump < 0.5,
        "bump must lie in (0, 0.5), got {bump}"
    );
    let base = engine.calculate(instrument, model)?;
    if let Some(g) = base.greeks {
        return Ok(g);
    }

    let (delta, gamma, theta) = match native(&base) {
        Some(native) => native,
        None => {
            let (delta, gamma) = spot_sensitivities(engine, instrument, model, base.price, bump)?;
            (delta, gamma, theta(engine, instrument, model, bump)?)
        }
    };

    let sigma = model.volatility();
    let h = bump * sigma;
    let vega = central_difference(
        || price(engine, instrument, &model.with_volatility(sigma + h)?),
        || price(engine, instrument, &model.with_volatility(sigma - h)?),
        h,
    )?;

    let rate = model.rate();
    let rho = central_difference(
        || price(engine, instrument, &model.with_rate(rate + bump)?),
        || price(engine, instrument, &model.with_rate(rate - bump)?),
        bump,
    )?;

    Ok(Greeks {
        delta,
        gamma,
        vega,
        theta,
        rho,
    })
}

fn native(result: &PricingResult) -> Option<(Real, Real, Real)> {
    Some((
        result.result("delta")?,
        result.result("gamma")?,
        result.result("theta")?,
    ))
}

fn price<E: PricingEngine + ?Sized>(
    engine: &E,
    instrument: &Instrument,
    model: &MarketModel,
) -> Result<Real> {
    engine.calculate(instrument, model).map(|r| r.price)
}

fn central_difference<U, D>(up: U, down: D, h: Real) -> Result<Real>
where
    U: FnOnce() -> Result<Real>,
    D: FnOnce() -> Result<Real>,
{
    Ok((up()? - down()?) / (2.0 * h))
}

fn spot_sensitivities<E: PricingEngine + ?Sized>(
    engine: &E,
    instrument: &Instrument,
    model: &MarketModel,
    base: Real,
    bump: Real,
) -> Result<(Real, Real)> {
    let spot = model.spot();
    let h = bump * spot;
    let up = price(engine, instrument, &model.with_spot(spot + h)?)?;
    let down = price(engine, instrument, &model.with_spot(spot - h)?)?;
    Ok(((up - down) / (2.0 * h), (up - 2.0 * base + down) / (h * h)))
}

fn theta<E: PricingEngine + ?Sized>(
    engine: &E,
    instrument: &Instrument,
    model: &MarketModel,
    bump: Real,
) -> Result<Real> {
    let t = instrument.maturity();
    let h = bump * t;
    let dv_dt = central_difference(
        || price(engine, &instrument.with_maturity(t + h)?, model),
        || price(engine, &instrument.with_maturity(t - h)?, model),
        h,
    )?;
    Ok(-dv_dt)
}
