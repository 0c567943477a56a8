//! Scalar root finding behind a swappable interface.

use crate::error::{SolverError, SolverResult};
use crate::jacobian::{DifferenceScheme, difference_jacobian};
use crate::newton::{NewtonConfig, newton_solve};
use nalgebra::DVector;
use tracing::trace;

/// Outcome of a scalar root search.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RootSolution {
    /// Best estimate of the root
    pub root: f64,
    /// g(root)
    pub residual: f64,
    /// Iterations spent
    pub iterations: usize,
    /// Whether the backend's tolerance was met
    pub converged: bool,
}

/// Solves `g(x) = 0` near `x0`.
///
/// Implementations report non-convergence through [`RootSolution::converged`]
/// and reserve `Err` for problems that prevent a search at all.
pub trait RootFinder {
    fn find_root(&self, g: &dyn Fn(f64) -> f64, x0: f64) -> SolverResult<RootSolution>;
}

impl<T: RootFinder + ?Sized> RootFinder for &T {
    fn find_root(&self, g: &dyn Fn(f64) -> f64, x0: f64) -> SolverResult<RootSolution> {
        (**self).find_root(g, x0)
    }
}

/// Damped Newton with a central-difference derivative.
#[derive(Clone, Debug)]
pub struct NewtonRootFinder {
    pub config: NewtonConfig,
    /// Relative finite-difference step
    pub fd_epsilon: f64,
}

impl Default for NewtonRootFinder {
    fn default() -> Self {
        Self {
            config: NewtonConfig {
                abs_tol: 1e-10,
                rel_tol: 0.0,
                ..NewtonConfig::default()
            },
            fd_epsilon: 1e-7,
        }
    }
}

impl NewtonRootFinder {
    /// Restrict iterates to `x >= lower_bound`.
    pub fn with_lower_bound(mut self, lower_bound: f64) -> Self {
        self.config.lower_bound = Some(lower_bound);
        self
    }
}

impl RootFinder for NewtonRootFinder {
    fn find_root(&self, g: &dyn Fn(f64) -> f64, x0: f64) -> SolverResult<RootSolution> {
        let residual = |x: &DVector<f64>| -> SolverResult<DVector<f64>> {
            Ok(DVector::from_element(1, g(x[0])))
        };
        let jacobian = |x: &DVector<f64>| {
            difference_jacobian(x, &residual, self.fd_epsilon, DifferenceScheme::Central)
        };

        let result = newton_solve(
            DVector::from_element(1, x0),
            &residual,
            jacobian,
            &self.config,
        )?;

        Ok(RootSolution {
            root: result.x[0],
            residual: result.residual[0],
            iterations: result.iterations,
            converged: result.converged,
        })
    }
}

/// Bracketing bisection.
///
/// Grows a bracket `[x0 - w, x0 + w]` (doubling `w`) until `g` changes sign,
/// then halves it until `|g| < abs_tol` or the bracket is narrower than `x_tol`.
#[derive(Clone, Debug)]
pub struct BisectionRootFinder {
    /// Initial bracket half-width, relative to |x0| (absolute when x0 == 0)
    pub initial_half_width: f64,
    pub max_expansions: usize,
    pub max_iterations: usize,
    pub abs_tol: f64,
    pub x_tol: f64,
    /// The bracket never extends below this value
    pub lower_bound: Option<f64>,
}

impl Default for BisectionRootFinder {
    fn default() -> Self {
        Self {
            initial_half_width: 0.5,
            max_expansions: 60,
            max_iterations: 200,
            abs_tol: 1e-10,
            x_tol: 1e-15,
            lower_bound: None,
        }
    }
}

impl BisectionRootFinder {
    pub fn with_lower_bound(mut self, lower_bound: f64) -> Self {
        self.lower_bound = Some(lower_bound);
        self
    }

    fn clamp(&self, x: f64) -> f64 {
        match self.lower_bound {
            Some(lb) => x.max(lb),
            None => x,
        }
    }

    fn bracket(&self, g: &dyn Fn(f64) -> f64, x0: f64) -> SolverResult<(f64, f64, f64, f64)> {
        let scale = if x0 == 0.0 { 1.0 } else { x0.abs() };
        let mut half_width = self.initial_half_width * scale;

        for _ in 0..self.max_expansions {
            let a = self.clamp(x0 - half_width);
            let b = self.clamp(x0 + half_width);
            let (ga, gb) = (g(a), g(b));
            if ga.is_finite() && gb.is_finite() && ga * gb <= 0.0 {
                return Ok((a, b, ga, gb));
            }
            half_width *= 2.0;
        }

        Err(SolverError::NoBracket {
            x0,
            expansions: self.max_expansions,
        })
    }
}

impl RootFinder for BisectionRootFinder {
    fn find_root(&self, g: &dyn Fn(f64) -> f64, x0: f64) -> SolverResult<RootSolution> {
        if !x0.is_finite() {
            return Err(SolverError::ProblemSetup {
                what: format!("initial guess must be finite, got {x0}"),
            });
        }

        let (mut a, mut b, mut ga, gb) = self.bracket(g, x0)?;
        if ga == 0.0 {
            return Ok(RootSolution {
                root: a,
                residual: 0.0,
                iterations: 0,
                converged: true,
            });
        }
        if gb == 0.0 {
            return Ok(RootSolution {
                root: b,
                residual: 0.0,
                iterations: 0,
                converged: true,
            });
        }

        let mut mid = 0.5 * (a + b);
        let mut g_mid = g(mid);
        for iter in 1..=self.max_iterations {
            if g_mid.abs() < self.abs_tol || (b - a) < self.x_tol {
                trace!(iter, root = mid, residual = g_mid, "bisection converged");
                return Ok(RootSolution {
                    root: mid,
                    residual: g_mid,
                    iterations: iter,
                    converged: true,
                });
            }
            if ga * g_mid < 0.0 {
                b = mid;
            } else {
                a = mid;
                ga = g_mid;
            }
            mid = 0.5 * (a + b);
            g_mid = g(mid);
        }

        Ok(RootSolution {
            root: mid,
            residual: g_mid,
            iterations: self.max_iterations,
            converged: g_mid.abs() < self.abs_tol,
        })
    }
}
