//! Simulation runners and result recording.

use crate::error::{SimError, SimResult};
use crate::integrator::{AdaptiveOptions, DormandPrince45, ForwardEuler, Integrator, RK4};
use crate::model::TransientModel;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Integrator selection for simulation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum IntegratorType {
    /// 4th-order Runge-Kutta (4 rhs calls per step).
    #[default]
    #[serde(rename = "rk4")]
    RK4,
    /// Forward Euler (1st-order, 1 rhs call per step).
    #[serde(rename = "forward_euler")]
    ForwardEuler,
    /// Adaptive Dormand-Prince 4(5); `dt` only bounds the output spacing.
    #[serde(rename = "dormand_prince45")]
    DormandPrince45,
}

impl IntegratorType {
    pub fn label(&self) -> &'static str {
        match self {
            IntegratorType::RK4 => "rk4",
            IntegratorType::ForwardEuler => "forward_euler",
            IntegratorType::DormandPrince45 => "dormand_prince45",
        }
    }

    pub fn is_adaptive(&self) -> bool {
        matches!(self, IntegratorType::DormandPrince45)
    }
}

impl fmt::Display for IntegratorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for IntegratorType {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rk4" => Ok(IntegratorType::RK4),
            "forward_euler" | "euler" => Ok(IntegratorType::ForwardEuler),
            "dormand_prince45" | "rk45" | "dopri5" => Ok(IntegratorType::DormandPrince45),
            _ => Err(SimError::InvalidArg {
                what: "unknown integrator (expected rk4, forward_euler or dormand_prince45)",
            }),
        }
    }
}

/// Options for simulation runs.
#[derive(Clone, Debug)]
pub struct SimOptions {
    /// Fixed time step (seconds); the largest substep for sampled runs
    pub dt: f64,
    /// Final simulation time (seconds), used by [`run_sim`]
    pub t_end: f64,
    /// Maximum number of fixed steps (safety limit)
    pub max_steps: usize,
    /// Record every N-th step (decimation), used by [`run_sim`]
    pub record_every: usize,
    /// Integrator type (default: RK4)
    pub integrator: IntegratorType,
    /// Tolerances for the adaptive integrator
    pub adaptive: AdaptiveOptions,
}

impl Default for SimOptions {
    fn default() -> Self {
        Self {
            dt: 1e-3,
            t_end: 1.0,
            max_steps: 100_000,
            record_every: 10,
            integrator: IntegratorType::default(),
            adaptive: AdaptiveOptions::default(),
        }
    }
}

impl SimOptions {
    fn validate(&self) -> SimResult<()> {
        if !self.dt.is_finite() || self.dt <= 0.0 {
            return Err(SimError::InvalidArg {
                what: "dt must be positive",
            });
        }
        if self.max_steps == 0 {
            return Err(SimError::InvalidArg {
                what: "max_steps must be positive",
            });
        }
        if self.integrator.is_adaptive() {
            self.adaptive.validate()?;
        }
        Ok(())
    }
}

/// Record of simulation results.
#[derive(Clone, Debug)]
pub struct SimRecord<S> {
    /// Time points (seconds)
    pub t: Vec<f64>,
    /// State snapshots
    pub x: Vec<S>,
}

impl<S> SimRecord<S> {
    pub fn len(&self) -> usize {
        self.t.len()
    }

    pub fn is_empty(&self) -> bool {
        self.t.is_empty()
    }
}

struct Stepper {
    integrator: IntegratorType,
    adaptive: DormandPrince45,
}

impl Stepper {
    fn new(opts: &SimOptions) -> Self {
        Self {
            integrator: opts.integrator,
            adaptive: DormandPrince45::new(opts.adaptive.clone()),
        }
    }

    fn step<M: TransientModel>(
        &self,
        model: &mut M,
        t: f64,
        x: &M::State,
        dt: f64,
    ) -> SimResult<M::State> {
        match self.integrator {
            IntegratorType::RK4 => RK4.step(model, t, x, dt),
            IntegratorType::ForwardEuler => ForwardEuler.step(model, t, x, dt),
            IntegratorType::DormandPrince45 => self.adaptive.step(model, t, x, dt),
        }
    }
}

/// Run a transient simulation from t = 0 to `t_end` in steps of `dt`,
/// recording every `record_every`-th step and the final state.
pub fn run_sim<M: TransientModel>(
    model: &mut M,
    opts: &SimOptions,
) -> SimResult<SimRecord<M::State>> {
    opts.validate()?;
    if !opts.t_end.is_finite() || opts.t_end < 0.0 {
        return Err(SimError::InvalidArg {
            what: "t_end must be non-negative",
        });
    }
    if opts.record_every == 0 {
        return Err(SimError::InvalidArg {
            what: "record_every must be positive",
        });
    }

    let stepper = Stepper::new(opts);
    let mut t = 0.0;
    let mut x = model.initial_state();

    let mut t_record = vec![t];
    let mut x_record = vec![x.clone()];

    let mut step = 0;
    while t < opts.t_end && step < opts.max_steps {
        // Last step is shortened to land on t_end
        let t_next = ((step + 1) as f64 * opts.dt).min(opts.t_end);
        x = stepper.step(model, t, &x, t_next - t)?;
        t = t_next;
        step += 1;

        if step % opts.record_every == 0 {
            t_record.push(t);
            x_record.push(x.clone());
        }
    }

    // Always record final state
    if step % opts.record_every != 0 {
        t_record.push(t);
        x_record.push(x);
    }

    debug!(steps = step, t, integrator = %opts.integrator, "simulation finished");
    Ok(SimRecord {
        t: t_record,
        x: x_record,
    })
}

/// Run a simulation and report the state exactly at each time in `t_eval`.
///
/// The model's initial state is taken to hold at `t_eval[0]`. Fixed-step
/// integrators split every interval into equal substeps no longer than
/// `dt`; the adaptive integrator chooses its own steps and stops on each
/// evaluation time.
pub fn run_sim_sampled<M: TransientModel>(
    model: &mut M,
    t_eval: &[f64],
    opts: &SimOptions,
) -> SimResult<SimRecord<M::State>> {
    opts.validate()?;
    let Some(&t0) = t_eval.first() else {
        return Err(SimError::InvalidArg {
            what: "evaluation grid must not be empty",
        });
    };
    if t_eval.iter().any(|t| !t.is_finite()) {
        return Err(SimError::InvalidArg {
            what: "evaluation times must be finite",
        });
    }
    if t_eval.windows(2).any(|w| w[1] <= w[0]) {
        return Err(SimError::InvalidArg {
            what: "evaluation times must be strictly increasing",
        });
    }

    let stepper = Stepper::new(opts);
    let mut x = model.initial_state();
    let mut x_record = Vec::with_capacity(t_eval.len());
    x_record.push(x.clone());

    let mut steps = 0usize;
    for w in t_eval.windows(2) {
        let (ta, tb) = (w[0], w[1]);
        if opts.integrator.is_adaptive() {
            let (next, stats) = stepper.adaptive.advance(model, ta, &x, tb)?;
            steps = steps.saturating_add(stats.accepted);
            x = next;
        } else {
            let substeps = ((tb - ta) / opts.dt).ceil().max(1.0) as usize;
            let h = (tb - ta) / substeps as f64;
            // The float-to-usize cast saturates, so the sum itself can overflow.
            let total = steps
                .checked_add(substeps)
                .filter(|&n| n <= opts.max_steps)
                .ok_or(SimError::ConvergenceFailed {
                    what: "fixed-step run exceeded max_steps",
                })?;
            for i in 0..substeps {
                x = stepper.step(model, ta + i as f64 * h, &x, h)?;
            }
            steps = total;
        }
        x_record.push(x.clone());
    }

    debug!(
        samples = t_eval.len(),
        t0,
        steps,
        integrator = %opts.integrator,
        "sampled simulation finished"
    );
    Ok(SimRecord {
        t: t_eval.to_vec(),
        x: x_record,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// dx/dt = 1
    struct Clock;

    impl TransientModel for Clock {
        type State = f64;

        fn initial_state(&self) -> f64 {
            0.0
        }

        fn rhs(&mut self, _t: f64, _x: &f64) -> SimResult<f64> {
            Ok(1.0)
        }

        fn add(&self, a: &f64, b: &f64) -> f64 {
            a + b
        }

        fn scale(&self, a: &f64, scale: f64) -> f64 {
            a * scale
        }

        fn components(&self, x: &f64) -> Vec<f64> {
            vec![*x]
        }
    }

    #[test]
    fn sim_options_defaults() {
        let opts = SimOptions::default();
        assert_eq!(opts.dt, 1e-3);
        assert_eq!(opts.t_end, 1.0);
        assert_eq!(opts.max_steps, 100_000);
        assert_eq!(opts.record_every, 10);
        assert_eq!(opts.integrator, IntegratorType::RK4);
    }

    #[test]
    fn run_sim_rejects_bad_options() {
        let bad = [
            SimOptions {
                dt: 0.0,
                ..SimOptions::default()
            },
            SimOptions {
                t_end: -1.0,
                ..SimOptions::default()
            },
            SimOptions {
                max_steps: 0,
                ..SimOptions::default()
            },
            SimOptions {
                record_every: 0,
                ..SimOptions::default()
            },
        ];
        for opts in bad {
            let err = run_sim(&mut Clock, &opts).unwrap_err();
            assert!(matches!(err, SimError::InvalidArg { .. }));
        }
    }

    #[test]
    fn run_sim_lands_on_t_end() {
        let opts = SimOptions {
            dt: 0.3,
            t_end: 1.0,
            record_every: 1,
            ..SimOptions::default()
        };
        let rec = run_sim(&mut Clock, &opts).unwrap();
        assert_eq!(rec.len(), 5);
        assert_eq!(*rec.t.last().unwrap(), 1.0);
        assert!((rec.x.last().unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn run_sim_decimates() {
        let opts = SimOptions {
            dt: 0.1,
            t_end: 1.0,
            record_every: 5,
            ..SimOptions::default()
        };
        let rec = run_sim(&mut Clock, &opts).unwrap();
        assert_eq!(rec.len(), 3);
    }

    #[test]
    fn sampled_grid_is_reported_verbatim() {
        let t_eval = [0.0, 0.25, 0.5, 2.0];
        for integrator in [
            IntegratorType::RK4,
            IntegratorType::ForwardEuler,
            IntegratorType::DormandPrince45,
        ] {
            let opts = SimOptions {
                dt: 0.1,
                integrator,
                ..SimOptions::default()
            };
            let rec = run_sim_sampled(&mut Clock, &t_eval, &opts).unwrap();
            assert_eq!(rec.t, t_eval);
            for (t, x) in rec.t.iter().zip(&rec.x) {
                assert!((t - x).abs() < 1e-12, "{integrator}: x({t}) = {x}");
            }
        }
    }

    #[test]
    fn sampled_grid_validation() {
        let opts = SimOptions::default();
        assert!(run_sim_sampled(&mut Clock, &[], &opts).is_err());
        assert!(run_sim_sampled(&mut Clock, &[0.0, 0.0], &opts).is_err());
        assert!(run_sim_sampled(&mut Clock, &[0.0, 1.0, 0.5], &opts).is_err());
        assert!(run_sim_sampled(&mut Clock, &[0.0, f64::NAN], &opts).is_err());
    }

    #[test]
    fn sampled_run_respects_step_budget() {
        let opts = SimOptions {
            dt: 1e-3,
            max_steps: 10,
            ..SimOptions::default()
        };
        let err = run_sim_sampled(&mut Clock, &[0.0, 1.0], &opts).unwrap_err();
        assert!(matches!(err, SimError::ConvergenceFailed { .. }));
    }

    #[test]
    fn sampled_run_with_huge_substep_count_fails_cleanly() {
        let opts = SimOptions {
            dt: 1e-300,
            max_steps: usize::MAX,
            ..SimOptions::default()
        };
        let err = run_sim_sampled(&mut Clock, &[0.0, 1e-300, 1.0], &opts).unwrap_err();
        assert!(matches!(err, SimError::ConvergenceFailed { .. }));
    }

    #[test]
    fn integrator_names_parse() {
        for it in [
            IntegratorType::RK4,
            IntegratorType::ForwardEuler,
            IntegratorType::DormandPrince45,
        ] {
            assert_eq!(it.label().parse::<IntegratorType>().unwrap(), it);
        }
        assert_eq!(
            "RK45".parse::<IntegratorType>().unwrap(),
            IntegratorType::DormandPrince45
        );
        assert!("midpoint".parse::<IntegratorType>().is_err());
    }
}
