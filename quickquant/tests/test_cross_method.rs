//! Cross-method agreement: every pricer that supports a contract should
//! land on the same price.

use approx::assert_relative_eq;
use quickquant::core::{Error, Real};
use quickquant::instruments::{Barrier, BarrierType, Instrument, OptionType};
use quickquant::methods::FdmScheme;
use quickquant::models::{HestonParams, MarketModel, MertonParams};
use quickquant::pricingengines::{
    merton_series_price, ClosedFormEngine, FiniteDifferenceEngine, FourierEngine, LatticeEngine,
    MertonSeriesConfig, PricingEngine,
};

const BS_CALL: Real = 10.450583572185565;

fn bs(q: Real) -> MarketModel {
    MarketModel::black_scholes(100.0, 0.05, q, 0.2).unwrap()
}

fn price(engine: &dyn PricingEngine, instrument: &Instrument, model: &MarketModel) -> Real {
    engine.calculate(instrument, model).unwrap().price
}

// ─── European Black-Scholes ───────────────────────────────────────────────────

#[test]
fn closed_form_lattice_and_fd_agree() {
    let closed = ClosedFormEngine::new();
    let lattice = LatticeEngine::binomial(500);
    let fd = FiniteDifferenceEngine::default();

    for option_type in [OptionType::Call, OptionType::Put] {
        for strike in [90.0, 100.0, 110.0] {
            for q in [0.0, 0.03] {
                let option = Instrument::european(option_type, strike, 1.0).unwrap();
                let model = bs(q);
                let exact = price(&closed, &option, &model);
                assert_relative_eq!(price(&lattice, &option, &model), exact, max_relative = 1e-3);
                assert_relative_eq!(price(&fd, &option, &model), exact, max_relative = 1e-3);
            }
        }
    }
}

#[test]
fn reference_scenario() {
    let call = Instrument::european(OptionType::Call, 100.0, 1.0).unwrap();
    let model = bs(0.0);
    let engines: Vec<Box<dyn PricingEngine>> = vec![
        Box::new(ClosedFormEngine::new()),
        Box::new(LatticeEngine::binomial(500)),
        Box::new(LatticeEngine::trinomial(500)),
        Box::new(FiniteDifferenceEngine::default()),
        Box::new(FourierEngine::new()),
    ];
    for engine in &engines {
        let p = price(engine.as_ref(), &call, &model);
        assert!((p - 10.45).abs() < 0.01, "{engine:?}: {p}");
    }
}

#[test]
fn lattice_error_envelope_shrinks() {
    let call = Instrument::european(OptionType::Call, 100.0, 1.0).unwrap();
    let model = bs(0.0);
    // CRR oscillates between odd and even step counts; bound both.
    let envelope = |n: usize| -> Real {
        [n, n + 1]
            .into_iter()
            .map(|m| (price(&LatticeEngine::binomial(m), &call, &model) - BS_CALL).abs())
            .fold(0.0, Real::max)
    };
    let errors: Vec<Real> = [25, 50, 100, 200, 400, 800].into_iter().map(envelope).collect();
    assert!(errors.windows(2).all(|w| w[1] < w[0]), "{errors:?}");
    assert!(errors[5] < 3e-3, "{errors:?}");
}

#[test]
fn american_call_without_dividends_is_european() {
    let model = bs(0.0);
    let american = Instrument::american(OptionType::Call, 100.0, 1.0).unwrap();
    let p = price(&LatticeEngine::binomial(500), &american, &model);
    assert_relative_eq!(p, BS_CALL, max_relative = 1e-3);

    let fd = price(&FiniteDifferenceEngine::default(), &american, &model);
    assert_relative_eq!(fd, BS_CALL, max_relative = 1e-3);
}

#[test]
fn american_put_lattice_and_fd_agree() {
    let model = bs(0.0);
    let put = Instrument::american(OptionType::Put, 100.0, 1.0).unwrap();
    let tree = price(&LatticeEngine::binomial(500), &put, &model);
    let fd = price(&FiniteDifferenceEngine::default(), &put, &model);
    assert!((tree - 6.088810).abs() < 1e-4, "tree {tree}");
    assert_relative_eq!(fd, tree, max_relative = 1e-3);
}

#[test]
fn unstable_explicit_scheme_is_rejected() {
    let call = Instrument::european(OptionType::Call, 100.0, 1.0).unwrap();
    let engine = FiniteDifferenceEngine::new(400, 50, FdmScheme::Explicit);
    assert!(matches!(
        engine.calculate(&call, &bs(0.0)),
        Err(Error::UnstableScheme(_))
    ));
}

// ─── Barriers ─────────────────────────────────────────────────────────────────

#[test]
fn fd_knock_outs_match_reiner_rubinstein() {
    let model = bs(0.02);
    let cases = [
        (OptionType::Call, BarrierType::DownOut, 90.0),
        (OptionType::Put, BarrierType::UpOut, 110.0),
        (OptionType::Call, BarrierType::UpOut, 130.0),
    ];
    for (option_type, barrier_type, level) in cases {
        let option = Instrument::european(option_type, 100.0, 1.0)
            .unwrap()
            .with_barrier(Barrier::new(barrier_type, level))
            .unwrap();
        let exact = price(&ClosedFormEngine::new(), &option, &model);
        let fd = price(&FiniteDifferenceEngine::default(), &option, &model);
        assert!(
            (fd - exact).abs() < 5e-4,
            "{option_type} {barrier_type} {level}: fd {fd} vs analytic {exact}"
        );
    }
}

#[test]
fn knock_in_parity_holds_across_methods() {
    let model = bs(0.02);
    let vanilla = Instrument::european(OptionType::Call, 100.0, 1.0).unwrap();
    let barrier = Barrier::new(BarrierType::DownOut, 90.0);
    let out = vanilla.clone().with_barrier(barrier).unwrap();
    let knock_in = vanilla
        .clone()
        .with_barrier(Barrier::new(BarrierType::DownIn, 90.0))
        .unwrap();

    let engines: Vec<Box<dyn PricingEngine>> = vec![
        Box::new(ClosedFormEngine::new()),
        Box::new(LatticeEngine::binomial(300)),
        Box::new(FiniteDifferenceEngine::default()),
    ];
    for engine in &engines {
        let sum = price(engine.as_ref(), &out, &model) + price(engine.as_ref(), &knock_in, &model);
        let plain = price(engine.as_ref(), &vanilla, &model);
        assert!((sum - plain).abs() < 1e-8, "{engine:?}: {sum} vs {plain}");
    }
}

// ─── Jumps and stochastic volatility ──────────────────────────────────────────

#[test]
fn fourier_merton_matches_series() {
    let params = MertonParams::new(100.0, 0.05, 0.0, 0.2, 1.0, -0.1, 0.15).unwrap();
    let model: MarketModel = params.into();
    for option_type in [OptionType::Call, OptionType::Put] {
        for strike in [80.0, 100.0, 120.0] {
            let option = Instrument::european(option_type, strike, 1.0).unwrap();
            let series =
                merton_series_price(option_type, &params, strike, 1.0, &MertonSeriesConfig::default())
                    .unwrap();
            let fourier = price(&FourierEngine::new(), &option, &model);
            let closed = price(&ClosedFormEngine::new(), &option, &model);
            assert!((fourier - series.price).abs() < 1e-6, "{option_type} {strike}");
            assert_eq!(closed, series.price);
        }
    }
}

#[test]
fn heston_regression_baseline() {
    let model: MarketModel = HestonParams::new(100.0, 0.05, 0.0, 0.04, 2.0, 0.04, 0.3, -0.7)
        .unwrap()
        .into();
    let call = Instrument::european(OptionType::Call, 100.0, 1.0).unwrap();
    let p = price(&FourierEngine::new(), &call, &model);
    assert_relative_eq!(p, 10.394, max_relative = 0.05);

    // Only the Fourier pricer understands Heston.
    let engines: Vec<Box<dyn PricingEngine>> = vec![
        Box::new(ClosedFormEngine::new()),
        Box::new(LatticeEngine::default()),
        Box::new(FiniteDifferenceEngine::default()),
    ];
    for engine in &engines {
        assert!(matches!(
            engine.calculate(&call, &model),
            Err(Error::UnsupportedModel(_))
        ));
    }
}
