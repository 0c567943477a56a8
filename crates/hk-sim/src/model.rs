//! TransientModel trait for pluggable dynamic systems.

use crate::error::SimResult;

/// A system `dx/dt = f(t, x)` that the integrators can advance.
///
/// States are combined only through [`add`](TransientModel::add) and
/// [`scale`](TransientModel::scale), so a model is free to use a struct,
/// a tuple or a plain `f64` as its state.
pub trait TransientModel {
    /// State type (must be Clone).
    type State: Clone;

    /// State at the start of the run.
    fn initial_state(&self) -> Self::State;

    /// Compute state derivative dxdt = f(t, x).
    ///
    /// Takes `&mut self` so models may cache between calls.
    fn rhs(&mut self, t: f64, x: &Self::State) -> SimResult<Self::State>;

    /// Add two states element-wise: result = a + b.
    fn add(&self, a: &Self::State, b: &Self::State) -> Self::State;

    /// Scale a state by a scalar: result = scale * a.
    fn scale(&self, a: &Self::State, scale: f64) -> Self::State;

    /// Flat view of a state, in a fixed order. Used for error norms.
    fn components(&self, x: &Self::State) -> Vec<f64>;
}
