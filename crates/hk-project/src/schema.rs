//! Configuration file schema.

use hk_core::units::constants::water_nu_m2ps;
use hk_flow::ConvergencePolicy;
use hk_sim::{AdaptiveOptions, IntegratorType, PhysicalParameters, SimOptions, SimWindow};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProjectConfig {
    pub version: u32,
    pub name: String,
    #[serde(default)]
    pub fluid: FluidDef,
    #[serde(default)]
    pub friction: FrictionDef,
    #[serde(default)]
    pub transition: TransitionDef,
    #[serde(default)]
    pub piston: PhysicalParameters,
    #[serde(default)]
    pub simulation: SimulationDef,
}

impl ProjectConfig {
    /// Reference values everywhere, at the latest schema version.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            version: crate::migrate::LATEST_VERSION,
            name: name.into(),
            fluid: FluidDef::default(),
            friction: FrictionDef::default(),
            transition: TransitionDef::default(),
            piston: PhysicalParameters::reference(),
            simulation: SimulationDef::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct FluidDef {
    pub kinematic_viscosity_m2_s: f64,
}

impl Default for FluidDef {
    /// Water at room temperature (1.1e-5 ft²/s).
    fn default() -> Self {
        Self {
            kinematic_viscosity_m2_s: water_nu_m2ps(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct FrictionDef {
    #[serde(default)]
    pub policy: ConvergencePolicy,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct TransitionDef {
    /// Fixed RNG seed for transition-band draws; entropy-seeded when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SimulationDef {
    pub t_start_s: f64,
    pub t_end_s: f64,
    pub samples: usize,
    #[serde(default = "default_integrator")]
    pub integrator: IntegratorType,
    /// Largest fixed substep (s)
    pub dt_s: f64,
    pub rtol: f64,
    pub atol: f64,
}

fn default_integrator() -> IntegratorType {
    IntegratorType::DormandPrince45
}

impl Default for SimulationDef {
    fn default() -> Self {
        let window = SimWindow::reference();
        let adaptive = AdaptiveOptions::default();
        Self {
            t_start_s: window.t_start,
            t_end_s: window.t_end,
            samples: window.samples,
            integrator: default_integrator(),
            dt_s: 1e-4,
            rtol: adaptive.rtol,
            atol: adaptive.atol,
        }
    }
}

impl SimulationDef {
    pub fn window(&self) -> SimWindow {
        SimWindow {
            t_start: self.t_start_s,
            t_end: self.t_end_s,
            samples: self.samples,
        }
    }

    pub fn options(&self) -> SimOptions {
        SimOptions {
            dt: self.dt_s,
            t_end: self.t_end_s,
            integrator: self.integrator,
            adaptive: AdaptiveOptions {
                rtol: self.rtol,
                atol: self.atol,
                ..AdaptiveOptions::default()
            },
            ..SimOptions::default()
        }
    }
}
