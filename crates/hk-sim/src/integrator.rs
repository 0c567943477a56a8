//! Time integrators: fixed-step RK4 and forward Euler, adaptive Dormand-Prince 4(5).

use crate::error::{SimError, SimResult};
use crate::model::TransientModel;
use tracing::{trace, warn};

/// Trait for time integrators.
pub trait Integrator {
    /// Advance state by one time step using the transient model.
    fn step<M: TransientModel>(
        &self,
        model: &mut M,
        t: f64,
        x: &M::State,
        dt: f64,
    ) -> SimResult<M::State>;
}

/// Classical RK4 (Runge-Kutta 4th order) integrator.
#[derive(Clone, Debug)]
pub struct RK4;

impl Integrator for RK4 {
    fn step<M: TransientModel>(
        &self,
        model: &mut M,
        t: f64,
        x: &M::State,
        dt: f64,
    ) -> SimResult<M::State> {
        let k1 = model.rhs(t, x)?;

        let x2 = model.add(x, &model.scale(&k1, 0.5 * dt));
        let k2 = model.rhs(t + 0.5 * dt, &x2)?;

        let x3 = model.add(x, &model.scale(&k2, 0.5 * dt));
        let k3 = model.rhs(t + 0.5 * dt, &x3)?;

        let x4 = model.add(x, &model.scale(&k3, dt));
        let k4 = model.rhs(t + dt, &x4)?;

        // x_new = x + (dt/6) * (k1 + 2*k2 + 2*k3 + k4)
        let k_sum = model.add(
            &model.add(&k1, &model.scale(&k2, 2.0)),
            &model.add(&model.scale(&k3, 2.0), &k4),
        );

        Ok(model.add(x, &model.scale(&k_sum, dt / 6.0)))
    }
}

/// Forward Euler (explicit, 1st order). One rhs call per step.
#[derive(Clone, Debug)]
pub struct ForwardEuler;

impl Integrator for ForwardEuler {
    fn step<M: TransientModel>(
        &self,
        model: &mut M,
        t: f64,
        x: &M::State,
        dt: f64,
    ) -> SimResult<M::State> {
        let xdot = model.rhs(t, x)?;
        Ok(model.add(x, &model.scale(&xdot, dt)))
    }
}

/// Step size and tolerance settings for [`DormandPrince45`].
#[derive(Clone, Debug, PartialEq)]
pub struct AdaptiveOptions {
    /// Relative tolerance
    pub rtol: f64,
    /// Absolute tolerance
    pub atol: f64,
    /// Smallest step the controller may take (seconds)
    pub h_min: f64,
    /// Largest step the controller may take (seconds)
    pub h_max: f64,
    /// Attempted steps (accepted or rejected) per call to `advance`
    pub max_steps: usize,
}

impl Default for AdaptiveOptions {
    fn default() -> Self {
        Self {
            rtol: 1e-6,
            atol: 1e-9,
            h_min: 1e-14,
            h_max: f64::INFINITY,
            max_steps: 100_000,
        }
    }
}

impl AdaptiveOptions {
    pub fn validate(&self) -> SimResult<()> {
        if !self.rtol.is_finite() || self.rtol <= 0.0 {
            return Err(SimError::InvalidArg {
                what: "rtol must be finite and positive",
            });
        }
        if !self.atol.is_finite() || self.atol <= 0.0 {
            return Err(SimError::InvalidArg {
                what: "atol must be finite and positive",
            });
        }
        if self.h_min.is_nan() || self.h_min <= 0.0 || self.h_max < self.h_min {
            return Err(SimError::InvalidArg {
                what: "step bounds must satisfy 0 < h_min <= h_max",
            });
        }
        if self.max_steps == 0 {
            return Err(SimError::InvalidArg {
                what: "max_steps must be positive",
            });
        }
        Ok(())
    }
}

/// Counters from one adaptive `advance` call.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AdaptiveStats {
    pub accepted: usize,
    pub rejected: usize,
    pub rhs_calls: usize,
}

// Dormand-Prince tableau.
const C2: f64 = 1.0 / 5.0;
const C3: f64 = 3.0 / 10.0;
const C4: f64 = 4.0 / 5.0;
const C5: f64 = 8.0 / 9.0;

const A21: f64 = 1.0 / 5.0;
const A31: f64 = 3.0 / 40.0;
const A32: f64 = 9.0 / 40.0;
const A41: f64 = 44.0 / 45.0;
const A42: f64 = -56.0 / 15.0;
const A43: f64 = 32.0 / 9.0;
const A51: f64 = 19372.0 / 6561.0;
const A52: f64 = -25360.0 / 2187.0;
const A53: f64 = 64448.0 / 6561.0;
const A54: f64 = -212.0 / 729.0;
const A61: f64 = 9017.0 / 3168.0;
const A62: f64 = -355.0 / 33.0;
const A63: f64 = 46732.0 / 5247.0;
const A64: f64 = 49.0 / 176.0;
const A65: f64 = -5103.0 / 18656.0;

// 5th order weights, used to advance
const B1: f64 = 35.0 / 384.0;
const B3: f64 = 500.0 / 1113.0;
const B4: f64 = 125.0 / 192.0;
const B5: f64 = -2187.0 / 6784.0;
const B6: f64 = 11.0 / 84.0;

// 5th minus embedded 4th order weights
const E1: f64 = B1 - 5179.0 / 57600.0;
const E3: f64 = B3 - 7571.0 / 16695.0;
const E4: f64 = B4 - 393.0 / 640.0;
const E5: f64 = B5 + 92097.0 / 339200.0;
const E6: f64 = B6 - 187.0 / 2100.0;
const E7: f64 = -1.0 / 40.0;

/// `x + h * sum(c_i * k_i)`
fn combine<M: TransientModel>(
    model: &M,
    x: &M::State,
    h: f64,
    terms: &[(f64, &M::State)],
) -> M::State {
    terms
        .iter()
        .fold(x.clone(), |acc, &(c, k)| model.add(&acc, &model.scale(k, h * c)))
}

/// RMS of the local error scaled by `atol + rtol * max(|x|, |x_new|)`.
fn error_norm(err: &[f64], x: &[f64], x_new: &[f64], opts: &AdaptiveOptions) -> f64 {
    if err.is_empty() {
        return 0.0;
    }
    let sum: f64 = err
        .iter()
        .zip(x.iter().zip(x_new))
        .map(|(e, (a, b))| {
            let sc = opts.atol + opts.rtol * a.abs().max(b.abs());
            (e / sc).powi(2)
        })
        .sum();
    (sum / err.len() as f64).sqrt()
}

/// Dormand-Prince 4(5) explicit pair with error-controlled step size.
///
/// Advances with the 5th order solution and reuses the last stage as the
/// first stage of the next step.
#[derive(Clone, Debug, Default)]
pub struct DormandPrince45 {
    pub options: AdaptiveOptions,
}

impl DormandPrince45 {
    pub fn new(options: AdaptiveOptions) -> Self {
        Self { options }
    }

    /// Integrate from `(t0, x0)` to exactly `t1`, taking as many internal
    /// steps as the tolerances require.
    pub fn advance<M: TransientModel>(
        &self,
        model: &mut M,
        t0: f64,
        x0: &M::State,
        t1: f64,
    ) -> SimResult<(M::State, AdaptiveStats)> {
        let opts = &self.options;
        opts.validate()?;
        if !t0.is_finite() || !t1.is_finite() {
            return Err(SimError::InvalidArg {
                what: "integration bounds must be finite",
            });
        }
        if t1 < t0 {
            return Err(SimError::InvalidArg {
                what: "integration requires t1 >= t0",
            });
        }

        let mut stats = AdaptiveStats::default();
        let span = t1 - t0;
        if span == 0.0 {
            return Ok((x0.clone(), stats));
        }

        let mut t = t0;
        let mut x = x0.clone();
        let mut h = (span * 1e-3).max(opts.h_min).min(opts.h_max).min(span);
        let mut k1 = model.rhs(t, &x)?;
        stats.rhs_calls += 1;

        for _ in 0..opts.max_steps {
            let remaining = t1 - t;
            if remaining <= 0.0 {
                break;
            }
            h = h.min(remaining).max(opts.h_min).min(opts.h_max);
            let last = h >= remaining;

            let k2 = model.rhs(t + C2 * h, &combine(model, &x, h, &[(A21, &k1)]))?;
            let k3 = model.rhs(
                t + C3 * h,
                &combine(model, &x, h, &[(A31, &k1), (A32, &k2)]),
            )?;
            let k4 = model.rhs(
                t + C4 * h,
                &combine(model, &x, h, &[(A41, &k1), (A42, &k2), (A43, &k3)]),
            )?;
            let k5 = model.rhs(
                t + C5 * h,
                &combine(
                    model,
                    &x,
                    h,
                    &[(A51, &k1), (A52, &k2), (A53, &k3), (A54, &k4)],
                ),
            )?;
            let k6 = model.rhs(
                t + h,
                &combine(
                    model,
                    &x,
                    h,
                    &[(A61, &k1), (A62, &k2), (A63, &k3), (A64, &k4), (A65, &k5)],
                ),
            )?;
            let x_new = combine(
                model,
                &x,
                h,
                &[(B1, &k1), (B3, &k3), (B4, &k4), (B5, &k5), (B6, &k6)],
            );
            let k7 = model.rhs(t + h, &x_new)?;
            stats.rhs_calls += 6;

            let zero = model.scale(&k1, 0.0);
            let err = combine(
                model,
                &zero,
                h,
                &[(E1, &k1), (E3, &k3), (E4, &k4), (E5, &k5), (E6, &k6), (E7, &k7)],
            );
            let err_norm = error_norm(
                &model.components(&err),
                &model.components(&x),
                &model.components(&x_new),
                opts,
            );

            if err_norm <= 1.0 {
                t = if last { t1 } else { t + h };
                x = x_new;
                k1 = k7;
                stats.accepted += 1;
                trace!(t, h, err_norm, "accepted step");
                if last {
                    return Ok((x, stats));
                }
            } else {
                stats.rejected += 1;
                trace!(t, h, err_norm, "rejected step");
            }

            let factor = if err_norm == 0.0 {
                5.0
            } else if err_norm.is_finite() {
                (0.9 * err_norm.powf(-0.2)).clamp(0.2, 5.0)
            } else {
                0.2
            };
            h = (h * factor).max(opts.h_min).min(opts.h_max);
        }

        if t < t1 {
            warn!(
                t,
                t1,
                max_steps = opts.max_steps,
                rejected = stats.rejected,
                "adaptive integration stopped before reaching the end time"
            );
            return Err(SimError::ConvergenceFailed {
                what: "adaptive integrator exceeded max_steps",
            });
        }
        Ok((x, stats))
    }
}

impl Integrator for DormandPrince45 {
    fn step<M: TransientModel>(
        &self,
        model: &mut M,
        t: f64,
        x: &M::State,
        dt: f64,
    ) -> SimResult<M::State> {
        Ok(self.advance(model, t, x, t + dt)?.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// dx/dt = -k x
    struct Decay {
        k: f64,
    }

    impl TransientModel for Decay {
        type State = f64;

        fn initial_state(&self) -> f64 {
            1.0
        }

        fn rhs(&mut self, _t: f64, x: &f64) -> SimResult<f64> {
            Ok(-self.k * x)
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
    fn euler_single_step() {
        let mut model = Decay { k: 2.0 };
        let x = ForwardEuler.step(&mut model, 0.0, &1.0, 0.1).unwrap();
        assert!((x - 0.8).abs() < 1e-15);
    }

    #[test]
    fn rk4_matches_taylor_series() {
        let mut model = Decay { k: 1.0 };
        let h: f64 = 0.1;
        let x = RK4.step(&mut model, 0.0, &1.0, h).unwrap();
        let taylor = 1.0 - h + h.powi(2) / 2.0 - h.powi(3) / 6.0 + h.powi(4) / 24.0;
        assert!((x - taylor).abs() < 1e-14);
    }

    #[test]
    fn dormand_prince_hits_tolerance() {
        let mut model = Decay { k: 1.0 };
        let dp = DormandPrince45::default();
        let (x, stats) = dp.advance(&mut model, 0.0, &1.0, 1.0).unwrap();
        assert!((x - (-1.0f64).exp()).abs() < 1e-6);
        assert!(stats.accepted > 0);
        assert_eq!(stats.rhs_calls, 1 + 6 * (stats.accepted + stats.rejected));
    }

    #[test]
    fn dormand_prince_zero_span_is_identity() {
        let mut model = Decay { k: 1.0 };
        let (x, stats) = DormandPrince45::default()
            .advance(&mut model, 0.5, &0.3, 0.5)
            .unwrap();
        assert_eq!(x, 0.3);
        assert_eq!(stats, AdaptiveStats::default());
    }

    #[test]
    fn dormand_prince_rejects_backwards_span() {
        let mut model = Decay { k: 1.0 };
        let err = DormandPrince45::default()
            .advance(&mut model, 1.0, &1.0, 0.0)
            .unwrap_err();
        assert!(matches!(err, SimError::InvalidArg { .. }));
    }

    #[test]
    fn dormand_prince_reports_step_exhaustion() {
        let mut model = Decay { k: 50.0 };
        let dp = DormandPrince45::new(AdaptiveOptions {
            rtol: 1e-12,
            atol: 1e-14,
            max_steps: 3,
            ..AdaptiveOptions::default()
        });
        let err = dp.advance(&mut model, 0.0, &1.0, 10.0).unwrap_err();
        assert!(matches!(err, SimError::ConvergenceFailed { .. }));
    }

    #[test]
    fn adaptive_options_validation() {
        assert!(AdaptiveOptions::default().validate().is_ok());
        let bad = AdaptiveOptions {
            rtol: 0.0,
            ..AdaptiveOptions::default()
        };
        assert!(bad.validate().is_err());
        let bad = AdaptiveOptions {
            h_min: 1.0,
            h_max: 0.5,
            ..AdaptiveOptions::default()
        };
        assert!(bad.validate().is_err());
    }
}
