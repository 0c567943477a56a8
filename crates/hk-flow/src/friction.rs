//! Darcy friction factor from the laminar law or the Colebrook equation.
//!
//! The Colebrook equation
//!
//! ```text
//! 1/sqrt(f) + 2 log10( rr/3.7 + 2.51 / (Re sqrt(f)) ) = 0
//! ```
//!
//! has no closed form. It is handed to a [`RootFinder`] starting from
//! `f = 0.02`. The residual is evaluated with `sqrt(|f| + 1e-10)` so a backend
//! that probes `f <= 0` gets a finite value back instead of a NaN.

use crate::common::{check_relative_roughness, check_reynolds};
use crate::error::{FlowError, FlowResult};
use hk_solver::{NewtonRootFinder, RootFinder};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// f = 64 / Re in fully developed laminar flow.
pub const LAMINAR_COEFFICIENT: f64 = 64.0;

/// Starting point for the Colebrook root search.
pub const COLEBROOK_INITIAL_GUESS: f64 = 0.02;

/// Added under the square root of the Colebrook residual.
pub const SQRT_STABILIZER: f64 = 1e-10;

/// Upper end of the relative roughness range covered by the Moody chart.
pub const MAX_TABULATED_ROUGHNESS: f64 = 0.05;

/// Smallest iterate the default Newton backend may visit.
const MIN_ITERATE: f64 = 1e-8;

/// Which friction law to evaluate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrictionEquation {
    /// f = 64/Re; relative roughness is ignored.
    Laminar,
    /// Implicit Colebrook equation.
    Colebrook,
}

/// What to do when the Colebrook root search stops short of its tolerance.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConvergencePolicy {
    /// Return the best root found and log a warning.
    #[default]
    BestEffort,
    /// Fail with [`FlowError::ConvergenceFailed`].
    Strict,
}

/// Colebrook root together with its convergence diagnostics.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ColebrookSolution {
    pub friction_factor: f64,
    /// Colebrook residual at `friction_factor`
    pub residual: f64,
    pub iterations: usize,
    pub converged: bool,
}

/// Laminar friction factor, `64 / Re`.
pub fn laminar_friction_factor(re: f64) -> FlowResult<f64> {
    let re = check_reynolds(re)?;
    Ok(LAMINAR_COEFFICIENT / re)
}

/// Left-hand side of the Colebrook equation; zero at the friction factor.
pub fn colebrook_residual(f: f64, re: f64, rr: f64) -> f64 {
    let sqrt_f = (f.abs() + SQRT_STABILIZER).sqrt();
    1.0 / sqrt_f + 2.0 * (rr / 3.7 + 2.51 / (re * sqrt_f)).log10()
}

/// Friction factor calculator with an injected root-finding backend.
#[derive(Clone, Debug)]
pub struct FrictionFactorSolver<R = NewtonRootFinder> {
    root_finder: R,
    policy: ConvergencePolicy,
    initial_guess: f64,
}

impl Default for FrictionFactorSolver<NewtonRootFinder> {
    fn default() -> Self {
        Self::with_root_finder(NewtonRootFinder::default().with_lower_bound(MIN_ITERATE))
    }
}

impl FrictionFactorSolver<NewtonRootFinder> {
    /// Newton backend, best-effort convergence policy.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<R: RootFinder> FrictionFactorSolver<R> {
    pub fn with_root_finder(root_finder: R) -> Self {
        Self {
            root_finder,
            policy: ConvergencePolicy::default(),
            initial_guess: COLEBROOK_INITIAL_GUESS,
        }
    }

    pub fn with_policy(mut self, policy: ConvergencePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> ConvergencePolicy {
        self.policy
    }

    pub fn root_finder(&self) -> &R {
        &self.root_finder
    }

    /// Darcy friction factor for `re` and relative roughness `rr`.
    ///
    /// `rr` is not looked at for [`FrictionEquation::Laminar`].
    pub fn friction_factor(&self, re: f64, rr: f64, equation: FrictionEquation) -> FlowResult<f64> {
        match equation {
            FrictionEquation::Laminar => laminar_friction_factor(re),
            FrictionEquation::Colebrook => Ok(self.colebrook(re, rr)?.friction_factor),
        }
    }

    /// Solve the Colebrook equation and report how well it was solved.
    pub fn colebrook(&self, re: f64, rr: f64) -> FlowResult<ColebrookSolution> {
        let re = check_reynolds(re)?;
        let rr = check_relative_roughness(rr)?;
        if rr > MAX_TABULATED_ROUGHNESS {
            debug!(rr, "relative roughness beyond the Moody chart range");
        }

        let residual = move |f: f64| colebrook_residual(f, re, rr);
        let sol = self.root_finder.find_root(&residual, self.initial_guess)?;

        // The residual only sees |f|, so the magnitude is the physical root.
        let solution = ColebrookSolution {
            friction_factor: sol.root.abs(),
            residual: sol.residual,
            iterations: sol.iterations,
            converged: sol.converged,
        };

        if !solution.converged {
            match self.policy {
                ConvergencePolicy::BestEffort => warn!(
                    re,
                    rr,
                    f = solution.friction_factor,
                    residual = solution.residual,
                    iterations = solution.iterations,
                    "Colebrook root search did not converge; returning best estimate"
                ),
                ConvergencePolicy::Strict => {
                    return Err(FlowError::ConvergenceFailed {
                        reynolds: re,
                        relative_roughness: rr,
                        residual: solution.residual,
                        iterations: solution.iterations,
                    });
                }
            }
        }

        Ok(solution)
    }
}
