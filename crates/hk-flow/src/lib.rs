//! Pipe flow friction for hydrokit.
//!
//! Provides:
//! - Darcy friction factor (laminar law, Colebrook via an injected root finder)
//! - Regime classification with a randomized transition-region friction factor
//! - Pipe operating point (Reynolds number, relative roughness, head loss)
//! - Moody diagram series for an external renderer

pub mod common;
pub mod error;
pub mod friction;
pub mod moody;
pub mod pipe;
pub mod regime;

pub use error::{FlowError, FlowResult};
pub use friction::{
    ColebrookSolution, ConvergencePolicy, FrictionEquation, FrictionFactorSolver,
    colebrook_residual, laminar_friction_factor,
};
pub use moody::{MarkerShape, MoodyDiagram, MoodyOptions, MoodyPoint, MoodySeries, SeriesKind};
pub use pipe::{Pipe, PipeOperatingPoint, head_loss_per_length, reynolds_number};
pub use regime::{FlowRegime, RegimeClassifier, TransitionStatistics, is_transition, regime};
