//! Nonlinear equation solvers for hydrokit.
//!
//! A damped Newton iteration over `nalgebra` vectors does the heavy lifting;
//! scalar problems such as the Colebrook equation go through the
//! [`RootFinder`] trait so the backend can be swapped without touching the
//! caller.

pub mod error;
pub mod jacobian;
pub mod newton;
pub mod root;

pub use error::{SolverError, SolverResult};
pub use newton::{NewtonConfig, NewtonResult, newton_solve};
pub use root::{BisectionRootFinder, NewtonRootFinder, RootFinder, RootSolution};
