//! Lattice methods for option pricing.
//!
//! # Overview
//!
//! * [`Lattice`]: node geometry and branching of a recombining tree
//! * [`BinomialTree`]: recombining binomial tree with five classical schemes
//! * [`TrinomialTree`]: Kamrad-Ritchken trinomial tree
//! * [`LatticeState`]: flat arena holding every layer's node prices and values
//! * [`backward_induction`]: rolls a terminal payoff back to the root

pub mod binomial_tree;
pub mod trinomial_tree;

pub use binomial_tree::{BinomialScheme, BinomialTree};
pub use trinomial_tree::{TrinomialTree, DEFAULT_STRETCH};

use qq_core::{errors::Error, errors::Result, DiscountFactor, Probability, Real, Size, Time};

/// Geometry of a recombining tree with constant time step.
pub trait Lattice {
    /// Number of time steps.
    fn steps(&self) -> Size;

    /// Time increment per step.
    fn dt(&self) -> Time;

    /// Number of branches leaving each node.
    fn branches(&self) -> Size;

    /// Number of nodes at layer `i`.
    fn size(&self, i: Size) -> Size;

    /// Underlying price at node `(i, index)`.
    fn underlying(&self, i: Size, index: Size) -> Real;

    /// Index in layer `i + 1` reached from `(i, index)` along `branch`.
    fn descendant(&self, i: Size, index: Size, branch: Size) -> Size;

    /// Transition probability along `branch` from `(i, index)`.
    fn probability(&self, i: Size, index: Size, branch: Size) -> Probability;
}

// ─── LatticeState ─────────────────────────────────────────────────────────────

/// All layers of a rolled-back tree, stored as flat arrays.
///
/// Layer `i` occupies `offsets[i]..offsets[i + 1]` in both `underlying` and
/// `values`. Built fresh by each pricing call.
#[derive(Debug, Clone)]
pub struct LatticeState {
    offsets: Vec<Size>,
    underlying: Vec<Real>,
    values: Vec<Real>,
    dt: Time,
}

impl LatticeState {
    fn allocate<L: Lattice + ?Sized>(lattice: &L) -> Self {
        let n = lattice.steps();
        let mut offsets = Vec::with_capacity(n + 2);
        offsets.push(0);
        for i in 0..=n {
            let last = offsets[i];
            offsets.push(last + lattice.size(i));
        }
        let total = offsets[n + 1];
        let mut underlying = Vec::with_capacity(total);
        for i in 0..=n {
            underlying.extend((0..lattice.size(i)).map(|j| lattice.underlying(i, j)));
        }
        Self {
            offsets,
            underlying,
            values: vec![0.0; total],
            dt: lattice.dt(),
        }
    }

    /// Number of layers (`steps + 1`).
    pub fn layers(&self) -> Size {
        self.offsets.len() - 1
    }

    /// Underlying prices at layer `i`.
    pub fn underlying(&self, i: Size) -> &[Real] {
        &self.underlying[self.offsets[i]..self.offsets[i + 1]]
    }

    /// Discounted option values at layer `i`.
    pub fn values(&self, i: Size) -> &[Real] {
        &self.values[self.offsets[i]..self.offsets[i + 1]]
    }

    /// Value at the root node.
    pub fn root_value(&self) -> Real {
        self.values[0]
    }

    /// Delta, gamma and theta at `spot`, read off the first layer with three
    /// nodes by fitting a quadratic through them.
    ///
    /// Theta compares the fitted value at `spot` with the root value over
    /// the elapsed time.
    pub fn sensitivities(&self, spot: Real) -> Option<(Real, Real, Real)> {
        let layer = (0..self.layers()).find(|&i| self.underlying(i).len() == 3)?;
        let (xs, ys) = (self.underlying(layer), self.values(layer));
        let (x0, x1, x2) = (xs[0], xs[1], xs[2]);
        let (y0, y1, y2) = (ys[0], ys[1], ys[2]);

        let d01 = (y1 - y0) / (x1 - x0);
        let d12 = (y2 - y1) / (x2 - x1);
        let c2 = (d12 - d01) / (x2 - x0);

        let fitted = y0 + d01 * (spot - x0) + c2 * (spot - x0) * (spot - x1);
        let delta = d01 + c2 * ((spot - x0) + (spot - x1));
        let gamma = 2.0 * c2;
        let theta = (fitted - self.root_value()) / (layer as Real * self.dt);
        [delta, gamma, theta]
            .iter()
            .all(|g| g.is_finite())
            .then_some((delta, gamma, theta))
    }
}

// ─── Backward induction ───────────────────────────────────────────────────────

/// Roll a payoff back through `lattice`.
///
/// Terminal node values are `adjust(s, payoff(s))`; interior nodes take
/// `adjust(s, continuation)` where `continuation` is the discounted expected
/// value of the descendants. `adjust` carries early exercise
/// (`max(intrinsic, continuation)`) and knock-out conditions.
///
/// Fails with `NumericalInstability` if a non-finite value appears.
pub fn backward_induction<L, P, A>(
    lattice: &L,
    discount: DiscountFactor,
    payoff: P,
    adjust: A,
) -> Result<LatticeState>
where
    L: Lattice + ?Sized,
    P: Fn(Real) -> Real,
    A: Fn(Real, Real) -> Real,
{
    let mut state = LatticeState::allocate(lattice);
    let n = lattice.steps();
    let branches = lattice.branches();

    let (start, end) = (state.offsets[n], state.offsets[n + 1]);
    for k in start..end {
        let s = state.underlying[k];
        state.values[k] = adjust(s, payoff(s));
    }

    for i in (0..n).rev() {
        let (head, tail) = state.values.split_at_mut(state.offsets[i + 1]);
        let current = &mut head[state.offsets[i]..];
        let next = &tail[..lattice.size(i + 1)];
        let prices = &state.underlying[state.offsets[i]..state.offsets[i + 1]];
        for (j, value) in current.iter_mut().enumerate() {
            let expected: Real = (0..branches)
                .map(|b| lattice.probability(i, j, b) * next[lattice.descendant(i, j, b)])
                .sum();
            *value = adjust(prices[j], discount * expected);
        }
    }

    let root = state.root_value();
    if !root.is_finite() {
        return Err(Error::NumericalInstability(format!(
            "lattice backward induction produced {root}"
        )));
    }
    Ok(state)
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use qq_models::BlackScholesParams;

    fn crr(steps: Size) -> BinomialTree {
        let p = BlackScholesParams::new(100.0, 0.05, 0.0, 0.20).unwrap();
        BinomialTree::new(BinomialScheme::CoxRossRubinstein, &p, 1.0, steps, 100.0).unwrap()
    }

    #[test]
    fn arena_layout() {
        let tree = crr(4);
        let state = backward_induction(&tree, 1.0, |_| 1.0, |_, v| v).unwrap();
        assert_eq!(state.layers(), 5);
        assert_eq!(state.underlying(0).len(), 1);
        assert_eq!(state.values(4).len(), 5);
        // A unit payoff with no discounting stays 1 everywhere.
        for i in 0..5 {
            assert!(state.values(i).iter().all(|v| (v - 1.0).abs() < 1e-12));
        }
    }

    #[test]
    fn american_put_dominates_european() {
        let tree = crr(500);
        let discount = (-0.05 * tree.dt()).exp();
        let payoff = |s: Real| (100.0 - s).max(0.0);

        let eu = backward_induction(&tree, discount, payoff, |_, v| v)
            .unwrap()
            .root_value();
        let am = backward_induction(&tree, discount, payoff, |s, v| v.max(payoff(s)))
            .unwrap()
            .root_value();

        assert!((eu - 5.569_528).abs() < 1e-5, "European put {eu:.6}");
        assert!((am - 6.088_810).abs() < 1e-5, "American put {am:.6}");
        assert!(am >= eu);
    }

    #[test]
    fn lattice_sensitivities_match_black_scholes() {
        let tree = crr(500);
        let discount = (-0.05 * tree.dt()).exp();
        let state = backward_induction(&tree, discount, |s| (s - 100.0).max(0.0), |_, v| v)
            .unwrap();
        let (delta, gamma, theta) = state.sensitivities(100.0).unwrap();
        assert!((delta - 0.636_83).abs() < 2e-3, "delta {delta}");
        assert!((gamma - 0.018_762).abs() < 2e-4, "gamma {gamma}");
        assert!((theta + 6.414_03).abs() < 0.05, "theta {theta}");
    }

    #[test]
    fn trinomial_sensitivities_use_first_layer() {
        let p = BlackScholesParams::new(100.0, 0.05, 0.0, 0.20).unwrap();
        let tree = TrinomialTree::new(&p, 1.0, 400, DEFAULT_STRETCH).unwrap();
        let discount = (-0.05 * tree.dt()).exp();
        let state = backward_induction(&tree, discount, |s| (s - 100.0).max(0.0), |_, v| v)
            .unwrap();
        let (delta, gamma, _) = state.sensitivities(100.0).unwrap();
        assert!((delta - 0.636_83).abs() < 5e-3, "delta {delta}");
        assert!((gamma - 0.018_762).abs() < 5e-4, "gamma {gamma}");
    }

    #[test]
    fn non_finite_values_are_reported() {
        let tree = crr(10);
        let err = backward_induction(&tree, 1.0, |_| f64::NAN, |_, v| v).unwrap_err();
        assert!(matches!(err, Error::NumericalInstability(_)));
    }
}
