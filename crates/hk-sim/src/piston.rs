//! Hydraulic piston driven through a servo valve.
//!
//! Four states: piston position `x`, velocity `xdot`, and the chamber
//! pressures `p1` (supply side) and `p2` (return side).
//!
//! ```text
//! dx/dt    = xdot
//! dxdot/dt = (p1 - p2) A / m
//! dp1/dt   =  y K (ps - p1) - rho A xdot beta / V
//! dp2/dt   = -y K (p2 - pa) - rho A xdot beta / V
//! ```
//!
//! The piston starts at rest with both chambers at ambient pressure.

use crate::error::{SimError, SimResult};
use crate::model::TransientModel;
use crate::sim::{SimOptions, SimRecord, run_sim_sampled};
use hk_core::numeric::{ensure_finite, ensure_positive, linspace};
use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul};
use tracing::info;

/// Piston/valve state vector.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PistonState {
    /// Piston position (m)
    pub x: f64,
    /// Piston velocity (m/s)
    pub xdot: f64,
    /// Supply-side chamber pressure (Pa)
    pub p1: f64,
    /// Return-side chamber pressure (Pa)
    pub p2: f64,
}

impl PistonState {
    /// Piston at x = 0, not moving, both chambers at `ambient`.
    pub fn at_rest(ambient: f64) -> Self {
        Self {
            x: 0.0,
            xdot: 0.0,
            p1: ambient,
            p2: ambient,
        }
    }

    pub fn to_array(&self) -> [f64; 4] {
        [self.x, self.xdot, self.p1, self.p2]
    }

    /// p1 - p2
    pub fn pressure_differential(&self) -> f64 {
        self.p1 - self.p2
    }

    pub fn is_finite(&self) -> bool {
        self.to_array().iter().all(|v| v.is_finite())
    }
}

impl Add for PistonState {
    type Output = PistonState;

    fn add(self, rhs: PistonState) -> PistonState {
        PistonState {
            x: self.x + rhs.x,
            xdot: self.xdot + rhs.xdot,
            p1: self.p1 + rhs.p1,
            p2: self.p2 + rhs.p2,
        }
    }
}

impl Mul<f64> for PistonState {
    type Output = PistonState;

    fn mul(self, k: f64) -> PistonState {
        PistonState {
            x: self.x * k,
            xdot: self.xdot * k,
            p1: self.p1 * k,
            p2: self.p2 * k,
        }
    }
}

/// What a physical parameter has to be for the model to make sense.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParameterBound {
    Finite,
    /// Finite and strictly greater than zero
    Positive,
}

/// Physical constants of the piston/valve system (SI units).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PhysicalParameters {
    /// Piston area A (m²)
    pub area: f64,
    /// Valve discharge coefficient Cd. Carried for completeness; the
    /// linearised valve law does not use it.
    pub discharge_coefficient: f64,
    /// Supply pressure ps (Pa)
    pub supply_pressure: f64,
    /// Ambient / tank pressure pa (Pa)
    pub ambient_pressure: f64,
    /// Chamber volume V (m³)
    pub volume: f64,
    /// Fluid bulk modulus beta (Pa)
    pub bulk_modulus: f64,
    /// Fluid density rho (kg/m³)
    pub density: f64,
    /// Valve gain K
    pub valve_gain: f64,
    /// Moving mass m (kg)
    pub mass: f64,
    /// Valve opening y
    pub valve_opening: f64,
}

impl PhysicalParameters {
    /// The reference servo-valve/piston parameter set.
    pub fn reference() -> Self {
        Self {
            area: 4.909e-4,
            discharge_coefficient: 0.6,
            supply_pressure: 1.4e7,
            ambient_pressure: 1.0e5,
            volume: 1.473e-4,
            bulk_modulus: 2.0e9,
            density: 850.0,
            valve_gain: 2.0e-5,
            mass: 30.0,
            valve_opening: 0.002,
        }
    }

    /// Every field by its serialized name, with the bound it must satisfy.
    pub fn bounds(&self) -> [(&'static str, f64, ParameterBound); 10] {
        use ParameterBound::{Finite, Positive};
        [
            ("area", self.area, Finite),
            ("discharge_coefficient", self.discharge_coefficient, Finite),
            ("supply_pressure", self.supply_pressure, Finite),
            ("ambient_pressure", self.ambient_pressure, Finite),
            ("volume", self.volume, Positive),
            ("bulk_modulus", self.bulk_modulus, Finite),
            ("density", self.density, Finite),
            ("valve_gain", self.valve_gain, Finite),
            ("mass", self.mass, Positive),
            ("valve_opening", self.valve_opening, Finite),
        ]
    }

    /// All fields finite; mass and chamber volume strictly positive.
    pub fn validate(&self) -> SimResult<()> {
        for (name, value, bound) in self.bounds() {
            match bound {
                ParameterBound::Finite => ensure_finite(value, name)?,
                ParameterBound::Positive => ensure_positive(value, name)?,
            };
        }
        Ok(())
    }

    /// rho A beta / V, the pressure change per unit piston velocity.
    pub fn compliance_coupling(&self) -> f64 {
        self.density * self.area * self.bulk_modulus / self.volume
    }
}

impl Default for PhysicalParameters {
    fn default() -> Self {
        Self::reference()
    }
}

/// Time derivative of the piston state. Pure; `t` is unused.
pub fn derivative(_t: f64, state: &PistonState, params: &PhysicalParameters) -> PistonState {
    let p = params;
    let yk = p.valve_opening * p.valve_gain;
    let coupling = p.compliance_coupling() * state.xdot;
    PistonState {
        x: state.xdot,
        xdot: (state.p1 - state.p2) * p.area / p.mass,
        p1: yk * (p.supply_pressure - state.p1) - coupling,
        p2: -yk * (state.p2 - p.ambient_pressure) - coupling,
    }
}

/// [`derivative`] exposed to the integrators.
#[derive(Clone, Debug)]
pub struct PistonModel {
    params: PhysicalParameters,
    initial: PistonState,
}

impl PistonModel {
    /// Starts at rest at ambient pressure.
    pub fn new(params: PhysicalParameters) -> Self {
        Self {
            initial: PistonState::at_rest(params.ambient_pressure),
            params,
        }
    }

    pub fn with_initial_state(mut self, initial: PistonState) -> Self {
        self.initial = initial;
        self
    }

    pub fn params(&self) -> &PhysicalParameters {
        &self.params
    }
}

impl TransientModel for PistonModel {
    type State = PistonState;

    fn initial_state(&self) -> PistonState {
        self.initial
    }

    fn rhs(&mut self, t: f64, x: &PistonState) -> SimResult<PistonState> {
        let dx = derivative(t, x, &self.params);
        if !dx.is_finite() {
            return Err(SimError::NonPhysical {
                what: "piston state derivative is not finite",
            });
        }
        Ok(dx)
    }

    fn add(&self, a: &PistonState, b: &PistonState) -> PistonState {
        *a + *b
    }

    fn scale(&self, a: &PistonState, scale: f64) -> PistonState {
        *a * scale
    }

    fn components(&self, x: &PistonState) -> Vec<f64> {
        x.to_array().to_vec()
    }
}

/// Evenly sampled time window.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimWindow {
    /// Start time (s)
    pub t_start: f64,
    /// End time (s)
    pub t_end: f64,
    /// Number of samples, both ends included
    pub samples: usize,
}

impl SimWindow {
    /// 0 to 0.02 s, 200 samples.
    pub fn reference() -> Self {
        Self {
            t_start: 0.0,
            t_end: 0.02,
            samples: 200,
        }
    }

    pub fn validate(&self) -> SimResult<()> {
        if !self.t_start.is_finite() || !self.t_end.is_finite() {
            return Err(SimError::InvalidArg {
                what: "window bounds must be finite",
            });
        }
        if self.t_end <= self.t_start {
            return Err(SimError::InvalidArg {
                what: "window end must be after its start",
            });
        }
        if self.samples < 2 {
            return Err(SimError::InvalidArg {
                what: "window needs at least 2 samples",
            });
        }
        Ok(())
    }

    /// Sample times, first and last pinned to the window bounds.
    pub fn times(&self) -> SimResult<Vec<f64>> {
        self.validate()?;
        Ok(linspace(self.t_start, self.t_end, self.samples))
    }
}

impl Default for SimWindow {
    fn default() -> Self {
        Self::reference()
    }
}

/// Sampled piston response, one column per state.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct PistonTrajectory {
    pub t: Vec<f64>,
    pub x: Vec<f64>,
    pub xdot: Vec<f64>,
    pub p1: Vec<f64>,
    pub p2: Vec<f64>,
}

impl PistonTrajectory {
    pub fn from_record(record: &SimRecord<PistonState>) -> Self {
        Self {
            t: record.t.clone(),
            x: record.x.iter().map(|s| s.x).collect(),
            xdot: record.x.iter().map(|s| s.xdot).collect(),
            p1: record.x.iter().map(|s| s.p1).collect(),
            p2: record.x.iter().map(|s| s.p2).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.t.len()
    }

    pub fn is_empty(&self) -> bool {
        self.t.is_empty()
    }

    /// State at sample `i`.
    pub fn state(&self, i: usize) -> Option<PistonState> {
        Some(PistonState {
            x: *self.x.get(i)?,
            xdot: *self.xdot.get(i)?,
            p1: *self.p1.get(i)?,
            p2: *self.p2.get(i)?,
        })
    }

    pub fn last(&self) -> Option<PistonState> {
        self.len().checked_sub(1).and_then(|i| self.state(i))
    }

    /// p1 - p2 at every sample.
    pub fn pressure_differential(&self) -> Vec<f64> {
        self.p1.iter().zip(&self.p2).map(|(a, b)| a - b).collect()
    }

    pub fn to_csv(&self) -> String {
        let mut csv = String::from("t,x,xdot,p1,p2\n");
        for i in 0..self.len() {
            csv.push_str(&format!(
                "{},{},{},{},{}\n",
                self.t[i], self.x[i], self.xdot[i], self.p1[i], self.p2[i]
            ));
        }
        csv
    }

    pub fn to_json(&self) -> SimResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Integrate the piston over `window` and sample it at the window times.
pub fn simulate_piston(
    params: &PhysicalParameters,
    window: &SimWindow,
    options: &SimOptions,
) -> SimResult<PistonTrajectory> {
    params.validate()?;
    let times = window.times()?;
    let mut model = PistonModel::new(*params);
    let record = run_sim_sampled(&mut model, &times, options)?;
    let trajectory = PistonTrajectory::from_record(&record);

    if let Some(end) = trajectory.last() {
        info!(
            samples = trajectory.len(),
            integrator = %options.integrator,
            x = end.x,
            xdot = end.xdot,
            p1 = end.p1,
            p2 = end.p2,
            "piston simulation complete"
        );
    }
    Ok(trajectory)
}
