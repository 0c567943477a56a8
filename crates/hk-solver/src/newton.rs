//! Damped Newton solver with an optional lower bound on the iterate.

use crate::error::{SolverError, SolverResult};
use nalgebra::{DMatrix, DVector};
use tracing::trace;

/// Newton solver configuration.
#[derive(Clone, Debug)]
pub struct NewtonConfig {
    /// Maximum iterations
    pub max_iterations: usize,
    /// Absolute tolerance for residual norm
    pub abs_tol: f64,
    /// Relative tolerance for residual norm (against the initial residual)
    pub rel_tol: f64,
    /// Every component of an accepted iterate must be >= this bound
    pub lower_bound: Option<f64>,
    /// Line search backtracking factor
    pub line_search_beta: f64,
    /// Maximum line search iterations
    pub max_line_search_iters: usize,
}

impl Default for NewtonConfig {
    fn default() -> Self {
        Self {
            max_iterations: 50,
            abs_tol: 1e-6,
            rel_tol: 1e-6,
            lower_bound: None,
            line_search_beta: 0.5,
            max_line_search_iters: 20,
        }
    }
}

/// Newton iteration result.
///
/// `converged == false` means the iteration budget ran out or the line search
/// stagnated; `x` is then the best iterate reached.
#[derive(Clone, Debug)]
pub struct NewtonResult {
    /// Solution vector
    pub x: DVector<f64>,
    /// Residual vector at `x`
    pub residual: DVector<f64>,
    /// Final residual norm
    pub residual_norm: f64,
    /// Number of iterations
    pub iterations: usize,
    /// Converged flag
    pub converged: bool,
}

impl NewtonConfig {
    fn within_bounds(&self, x: &DVector<f64>) -> bool {
        match self.lower_bound {
            Some(lb) => x.iter().all(|&xi| xi >= lb),
            None => true,
        }
    }

    fn is_converged(&self, r_norm: f64, r0_norm: f64) -> bool {
        r_norm < self.abs_tol || r_norm < self.rel_tol * r0_norm
    }
}

/// Newton solver with backtracking line search.
///
/// A trial point is accepted when it respects `lower_bound`, has a finite
/// residual and reduces the residual norm. Errors are returned only for setup
/// problems (non-finite start, singular Jacobian); running out of iterations is
/// reported through [`NewtonResult::converged`].
pub fn newton_solve<F, J>(
    x0: DVector<f64>,
    residual_fn: F,
    jacobian_fn: J,
    config: &NewtonConfig,
) -> SolverResult<NewtonResult>
where
    F: Fn(&DVector<f64>) -> SolverResult<DVector<f64>>,
    J: Fn(&DVector<f64>) -> SolverResult<DMatrix<f64>>,
{
    let mut x = x0;
    let mut r = residual_fn(&x)?;
    let mut r_norm = r.norm();
    if !r_norm.is_finite() {
        return Err(SolverError::ProblemSetup {
            what: format!("residual is not finite at initial guess {:?}", x.as_slice()),
        });
    }
    let r0_norm = r_norm;

    for iter in 0..config.max_iterations {
        // Check convergence
        if config.is_converged(r_norm, r0_norm) {
            return Ok(NewtonResult {
                x,
                residual: r,
                residual_norm: r_norm,
                iterations: iter,
                converged: true,
            });
        }

        let jac = jacobian_fn(&x)?;

        // Solve J * dx = -r
        let dx = jac
            .lu()
            .solve(&(-&r))
            .ok_or_else(|| SolverError::Numeric {
                what: format!("Jacobian solve failed at iteration {iter}"),
            })?;

        // Line search: halve the step until the trial point is admissible
        let mut alpha = 1.0;
        let mut accepted = None;
        for _ in 0..=config.max_line_search_iters {
            let x_new = &x + alpha * &dx;
            if config.within_bounds(&x_new) {
                let r_new = residual_fn(&x_new)?;
                let r_new_norm = r_new.norm();
                if r_new_norm.is_finite() && r_new_norm < r_norm {
                    accepted = Some((x_new, r_new, r_new_norm));
                    break;
                }
            }
            alpha *= config.line_search_beta;
        }

        let Some((x_new, r_new, r_new_norm)) = accepted else {
            trace!(iter, residual_norm = r_norm, "newton line search stagnated");
            return Ok(NewtonResult {
                x,
                residual: r,
                residual_norm: r_norm,
                iterations: iter,
                converged: false,
            });
        };

        trace!(iter, alpha, residual_norm = r_new_norm, "newton step");
        x = x_new;
        r = r_new;
        r_norm = r_new_norm;
    }

    let converged = config.is_converged(r_norm, r0_norm);
    Ok(NewtonResult {
        x,
        residual: r,
        residual_norm: r_norm,
        iterations: config.max_iterations,
        converged,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quadratic() -> (
        impl Fn(&DVector<f64>) -> SolverResult<DVector<f64>>,
        impl Fn(&DVector<f64>) -> SolverResult<DMatrix<f64>>,
    ) {
        // x^2 - 4 = 0
        let residual = |x: &DVector<f64>| -> SolverResult<DVector<f64>> {
            Ok(DVector::from_element(1, x[0] * x[0] - 4.0))
        };
        let jacobian = |x: &DVector<f64>| -> SolverResult<DMatrix<f64>> {
            Ok(DMatrix::from_element(1, 1, 2.0 * x[0]))
        };
        (residual, jacobian)
    }

    #[test]
    fn simple_quadratic() {
        let (residual, jacobian) = quadratic();
        let x0 = DVector::from_element(1, 3.0);
        let config = NewtonConfig::default();
        let result = newton_solve(x0, residual, jacobian, &config).unwrap();

        assert!(result.converged);
        assert!((result.x[0] - 2.0).abs() < 1e-6);
    }

    #[test]
    fn lower_bound_keeps_positive_root() {
        // From x0 = 0.1 the full step overshoots to ~20 and has to be damped.
        let (residual, jacobian) = quadratic();
        let config = NewtonConfig {
            lower_bound: Some(0.0),
            abs_tol: 1e-10,
            rel_tol: 0.0,
            ..NewtonConfig::default()
        };
        let result = newton_solve(DVector::from_element(1, 0.1), residual, jacobian, &config)
            .unwrap();

        assert!(result.converged);
        assert!((result.x[0] - 2.0).abs() < 1e-9);
    }

    #[test]
    fn exhausted_iterations_are_reported_not_raised() {
        let (residual, jacobian) = quadratic();
        let config = NewtonConfig {
            max_iterations: 1,
            abs_tol: 1e-14,
            rel_tol: 0.0,
            ..NewtonConfig::default()
        };
        let result =
            newton_solve(DVector::from_element(1, 100.0), residual, jacobian, &config).unwrap();

        assert!(!result.converged);
        assert_eq!(result.iterations, 1);
        assert!(result.residual_norm > 1e-14);
    }

    #[test]
    fn stagnation_without_root_returns_unconverged() {
        // x^2 + 1 has no real root; the residual is minimised at x = 0.
        let residual = |x: &DVector<f64>| -> SolverResult<DVector<f64>> {
            Ok(DVector::from_element(1, x[0] * x[0] + 1.0))
        };
        let jacobian = |x: &DVector<f64>| -> SolverResult<DMatrix<f64>> {
            Ok(DMatrix::from_element(1, 1, 2.0 * x[0]))
        };
        let result = newton_solve(
            DVector::from_element(1, 1.0),
            residual,
            jacobian,
            &NewtonConfig::default(),
        );

        match result {
            Ok(r) => assert!(!r.converged),
            Err(SolverError::Numeric { .. }) => {}
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn non_finite_start_is_setup_error() {
        let (residual, jacobian) = quadratic();
        let err = newton_solve(
            DVector::from_element(1, f64::NAN),
            residual,
            jacobian,
            &NewtonConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, SolverError::ProblemSetup { .. }));
    }
}
