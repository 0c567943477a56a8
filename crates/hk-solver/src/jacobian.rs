//! Finite difference Jacobians.

use crate::error::{SolverError, SolverResult};
use nalgebra::{DMatrix, DVector};

/// Differencing scheme for [`difference_jacobian`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DifferenceScheme {
    /// `(f(x+h) - f(x)) / h`, one extra evaluation per column.
    Forward,
    /// `(f(x+h) - f(x-h)) / 2h`, two evaluations per column, second order.
    #[default]
    Central,
}

/// Step used for column `j`: relative to |x_j|, with an absolute floor of `epsilon`.
#[inline]
fn step_size(xj: f64, epsilon: f64) -> f64 {
    epsilon * xj.abs().max(1.0)
}

/// Compute the Jacobian of `f` at `x` by finite differences.
pub fn difference_jacobian<F>(
    x: &DVector<f64>,
    f: F,
    epsilon: f64,
    scheme: DifferenceScheme,
) -> SolverResult<DMatrix<f64>>
where
    F: Fn(&DVector<f64>) -> SolverResult<DVector<f64>>,
{
    if !epsilon.is_finite() || epsilon <= 0.0 {
        return Err(SolverError::ProblemSetup {
            what: format!("finite difference epsilon must be positive, got {epsilon}"),
        });
    }

    let n = x.len();
    let f_x = f(x)?;
    let mut jac = DMatrix::zeros(f_x.len(), n);

    for j in 0..n {
        let h = step_size(x[j], epsilon);

        let mut x_plus = x.clone();
        x_plus[j] += h;
        let f_plus = f(&x_plus)?;

        let column = match scheme {
            DifferenceScheme::Forward => (f_plus - &f_x) / h,
            DifferenceScheme::Central => {
                let mut x_minus = x.clone();
                x_minus[j] -= h;
                let f_minus = f(&x_minus)?;
                (f_plus - f_minus) / (2.0 * h)
            }
        };

        jac.set_column(j, &column);
    }

    Ok(jac)
}

/// Forward-difference Jacobian.
pub fn finite_difference_jacobian<F>(
    x: &DVector<f64>,
    f: F,
    epsilon: f64,
) -> SolverResult<DMatrix<f64>>
where
    F: Fn(&DVector<f64>) -> SolverResult<DVector<f64>>,
{
    difference_jacobian(x, f, epsilon, DifferenceScheme::Forward)
}

/// Central-difference Jacobian (more accurate, 2x cost).
pub fn central_difference_jacobian<F>(
    x: &DVector<f64>,
    f: F,
    epsilon: f64,
) -> SolverResult<DMatrix<f64>>
where
    F: Fn(&DVector<f64>) -> SolverResult<DVector<f64>>,
{
    difference_jacobian(x, f, epsilon, DifferenceScheme::Central)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jacobian_linear() {
        // f(x) = 2*x, J = 2
        let f = |x: &DVector<f64>| -> SolverResult<DVector<f64>> {
            Ok(DVector::from_element(1, 2.0 * x[0]))
        };

        let x = DVector::from_element(1, 3.0);
        let jac = finite_difference_jacobian(&x, f, 1e-7).unwrap();

        assert!((jac[(0, 0)] - 2.0).abs() < 1e-5);
    }

    #[test]
    fn jacobian_central_on_inverse_sqrt() {
        // f(x) = 1/sqrt(x), J = -0.5 x^-1.5; Colebrook-like curvature near x = 0.02
        let f = |x: &DVector<f64>| -> SolverResult<DVector<f64>> {
            Ok(DVector::from_element(1, 1.0 / x[0].sqrt()))
        };

        let x = DVector::from_element(1, 0.02);
        let jac = central_difference_jacobian(&x, f, 1e-7).unwrap();
        let exact = -0.5 * 0.02f64.powf(-1.5);

        assert!((jac[(0, 0)] - exact).abs() / exact.abs() < 1e-6);
    }

    #[test]
    fn jacobian_two_by_two() {
        // f = [x0*x1, x0 + 3 x1]
        let f = |x: &DVector<f64>| -> SolverResult<DVector<f64>> {
            Ok(DVector::from_vec(vec![x[0] * x[1], x[0] + 3.0 * x[1]]))
        };

        let x = DVector::from_vec(vec![2.0, 5.0]);
        let jac = central_difference_jacobian(&x, f, 1e-6).unwrap();

        assert!((jac[(0, 0)] - 5.0).abs() < 1e-6);
        assert!((jac[(0, 1)] - 2.0).abs() < 1e-6);
        assert!((jac[(1, 0)] - 1.0).abs() < 1e-6);
        assert!((jac[(1, 1)] - 3.0).abs() < 1e-6);
    }

    #[test]
    fn rejects_non_positive_epsilon() {
        let f = |x: &DVector<f64>| -> SolverResult<DVector<f64>> { Ok(x.clone()) };
        let x = DVector::from_element(1, 1.0);
        assert!(difference_jacobian(&x, f, 0.0, DifferenceScheme::Forward).is_err());
    }
}
