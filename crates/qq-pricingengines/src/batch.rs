//! Parallel pricing of independent contracts.

use qq_core::errors::Result;
use qq_instruments::Instrument;
use qq_models::MarketModel;
use rayon::prelude::*;

use crate::{PricingEngine, PricingResult};

/// Price every `(instrument, model)` pair with `engine` on the rayon pool.
///
/// Results come back in input order, one per job; a failing job does not
/// affect the others.
pub fn price_batch<E: PricingEngine + ?Sized>(
    engine: &E,
    jobs: &[(Instrument, MarketModel)],
) -> Vec<Result<PricingResult>> {
    jobs.par_iter()
        .map(|(instrument, model)| engine.calculate(instrument, model))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ClosedFormEngine, LatticeEngine};
    use qq_core::{Error, Real};
    use qq_instruments::OptionType;

    #[test]
    fn preserves_order_and_isolates_failures() {
        let model = MarketModel::black_scholes(100.0, 0.05, 0.0, 0.2).unwrap();
        let jobs: Vec<_> = [80.0, 90.0, 100.0, 110.0, 120.0]
            .into_iter()
            .map(|k| (Instrument::european(OptionType::Call, k, 1.0).unwrap(), model))
            .chain(std::iter::once((
                Instrument::american(OptionType::Put, 100.0, 1.0).unwrap(),
                model,
            )))
            .collect();

        let results = price_batch(&ClosedFormEngine::new(), &jobs);
        assert_eq!(results.len(), 6);
        let prices: Vec<Real> = results[..5]
            .iter()
            .map(|r| r.as_ref().unwrap().price)
            .collect();
        assert!(prices.windows(2).all(|w| w[0] > w[1]), "{prices:?}");
        assert!((prices[2] - 10.450583572185565).abs() < 1e-10);
        assert!(matches!(results[5], Err(Error::InvalidExercise(_))));
    }

    #[test]
    fn works_through_trait_objects() {
        let model = MarketModel::black_scholes(100.0, 0.05, 0.0, 0.2).unwrap();
        let engine: Box<dyn PricingEngine> = Box::new(LatticeEngine::binomial(100));
        let jobs = vec![(Instrument::american(OptionType::Put, 100.0, 1.0).unwrap(), model); 4];
        let results = price_batch(engine.as_ref(), &jobs);
        let first = results[0].as_ref().unwrap().price;
        assert!(results.iter().all(|r| r.as_ref().unwrap().price == first));
    }
}
