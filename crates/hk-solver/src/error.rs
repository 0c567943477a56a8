//! Error types for solver operations.

use hk_core::error::HkError;
use thiserror::Error;

/// Errors that can occur while solving nonlinear equations.
#[derive(Error, Debug, Clone)]
pub enum SolverError {
    #[error("Problem setup error: {what}")]
    ProblemSetup { what: String },

    #[error("No sign change found around x0 = {x0} after {expansions} bracket expansions")]
    NoBracket { x0: f64, expansions: usize },

    #[error("Numeric error: {what}")]
    Numeric { what: String },
}

pub type SolverResult<T> = Result<T, SolverError>;

impl From<HkError> for SolverError {
    fn from(e: HkError) -> Self {
        SolverError::Numeric {
            what: e.to_string(),
        }
    }
}
