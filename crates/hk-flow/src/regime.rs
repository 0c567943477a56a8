//! Flow regime selection and the randomized transition-region friction factor.
//!
//! Between Re = 2000 and Re = 4000 there is no accepted friction model. A
//! friction factor there is drawn from a normal distribution centred midway
//! between the laminar and Colebrook predictions, with a standard deviation of
//! 20% of that mean. The random source is always supplied by the caller.

use crate::error::FlowResult;
use crate::friction::{FrictionEquation, FrictionFactorSolver};
use hk_solver::{NewtonRootFinder, RootFinder};
use rand::Rng;
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Upper bound (inclusive) of the laminar regime.
pub const LAMINAR_MAX_RE: f64 = 2000.0;

/// Lower bound (inclusive) of the turbulent regime.
pub const TURBULENT_MIN_RE: f64 = 4000.0;

/// Standard deviation of the transition draw, as a fraction of its mean.
pub const TRANSITION_RELATIVE_SIGMA: f64 = 0.2;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowRegime {
    Laminar,
    Transition,
    Turbulent,
}

impl FlowRegime {
    pub fn label(&self) -> &'static str {
        match self {
            FlowRegime::Laminar => "laminar",
            FlowRegime::Transition => "transition",
            FlowRegime::Turbulent => "turbulent",
        }
    }
}

impl std::fmt::Display for FlowRegime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// True iff `2000 < re < 4000`.
pub fn is_transition(re: f64) -> bool {
    re > LAMINAR_MAX_RE && re < TURBULENT_MIN_RE
}

/// Regime for a Reynolds number. NaN falls through to laminar.
pub fn regime(re: f64) -> FlowRegime {
    if re >= TURBULENT_MIN_RE {
        FlowRegime::Turbulent
    } else if is_transition(re) {
        FlowRegime::Transition
    } else {
        FlowRegime::Laminar
    }
}

/// Normal distribution parameters used in the transition band.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct TransitionStatistics {
    pub colebrook: f64,
    pub laminar: f64,
    pub mean: f64,
    pub sigma: f64,
}

impl TransitionStatistics {
    /// `mean + sigma * z` for a standard normal deviate `z`.
    pub fn at_deviate(&self, z: f64) -> f64 {
        self.mean + self.sigma * z
    }
}

/// Chooses the friction law by regime.
#[derive(Clone, Debug)]
pub struct RegimeClassifier<R = NewtonRootFinder> {
    solver: FrictionFactorSolver<R>,
}

impl Default for RegimeClassifier<NewtonRootFinder> {
    fn default() -> Self {
        Self::with_solver(FrictionFactorSolver::default())
    }
}

impl RegimeClassifier<NewtonRootFinder> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<R: RootFinder> RegimeClassifier<R> {
    pub fn with_solver(solver: FrictionFactorSolver<R>) -> Self {
        Self { solver }
    }

    pub fn solver(&self) -> &FrictionFactorSolver<R> {
        &self.solver
    }

    /// Mean and spread of the transition draw at (`re`, `rr`).
    ///
    /// The laminar half uses a smooth pipe; `rr` only enters through Colebrook.
    pub fn transition_statistics(&self, re: f64, rr: f64) -> FlowResult<TransitionStatistics> {
        let colebrook = self
            .solver
            .friction_factor(re, rr, FrictionEquation::Colebrook)?;
        let laminar = self
            .solver
            .friction_factor(re, 0.0, FrictionEquation::Laminar)?;
        let mean = 0.5 * (colebrook + laminar);
        Ok(TransitionStatistics {
            colebrook,
            laminar,
            mean,
            sigma: TRANSITION_RELATIVE_SIGMA * mean,
        })
    }

    /// Friction factor for (`re`, `rr`).
    ///
    /// Laminar and turbulent results are deterministic. In the transition band
    /// every call consumes one standard normal deviate from `rng`.
    pub fn classify<G: Rng + ?Sized>(&self, re: f64, rr: f64, rng: &mut G) -> FlowResult<f64> {
        match regime(re) {
            FlowRegime::Turbulent => {
                self.solver
                    .friction_factor(re, rr, FrictionEquation::Colebrook)
            }
            FlowRegime::Laminar => self.solver.friction_factor(re, 0.0, FrictionEquation::Laminar),
            FlowRegime::Transition => {
                let stats = self.transition_statistics(re, rr)?;
                let z: f64 = rng.sample(StandardNormal);
                let f = stats.at_deviate(z);
                debug!(re, rr, mean = stats.mean, sigma = stats.sigma, z, f, "transition draw");
                Ok(f)
            }
        }
    }
}
