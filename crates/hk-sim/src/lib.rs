//! Transient simulation for hydrokit.
//!
//! Provides:
//! - The `TransientModel` trait and fixed-step RK4 / forward Euler integrators
//! - An adaptive Dormand-Prince 4(5) integrator
//! - Decimated and exactly-sampled simulation runners
//! - The hydraulic piston/valve model

pub mod error;
pub mod integrator;
pub mod model;
pub mod piston;
pub mod sim;

pub use error::{SimError, SimResult};
pub use integrator::{
    AdaptiveOptions, AdaptiveStats, DormandPrince45, ForwardEuler, Integrator, RK4,
};
pub use model::TransientModel;
pub use piston::{
    ParameterBound, PhysicalParameters, PistonModel, PistonState, PistonTrajectory, SimWindow,
    derivative, simulate_piston,
};
pub use sim::{IntegratorType, SimOptions, SimRecord, run_sim, run_sim_sampled};
