//! # qq-methods
//!
//! Numerical methods: lattice/tree builders and finite-difference grids.
//!
//! # Modules
//!
//! * [`lattice`]: binomial/trinomial trees and backward induction
//! * [`finite_differences`]: tridiagonal solver and 1-D θ-scheme PDE solver

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Modules ───────────────────────────────────────────────────────────────────

/// Lattice methods: binomial trees, trinomial trees, backward induction.
pub mod lattice;

/// Finite difference methods: tridiagonal solver, 1-D PDE solver.
pub mod finite_differences;

// ── Convenience re-exports ────────────────────────────────────────────────────

pub use finite_differences::{Fdm1dSolver, FdmScheme, Grid, LogMesh, TridiagonalOperator};
pub use lattice::{
    backward_induction, BinomialScheme, BinomialTree, Lattice, LatticeState, TrinomialTree,
};
