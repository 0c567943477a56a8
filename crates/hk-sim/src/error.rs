//! Error types for simulation operations.

use hk_core::error::HkError;
use thiserror::Error;

/// Errors encountered during transient simulation.
#[derive(Error, Debug)]
pub enum SimError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Non-physical condition: {what}")]
    NonPhysical { what: &'static str },

    #[error("Convergence failed: {what}")]
    ConvergenceFailed { what: &'static str },

    #[error("Backend error: {message}")]
    Backend { message: String },
}

pub type SimResult<T> = Result<T, SimError>;

impl From<HkError> for SimError {
    fn from(e: HkError) -> Self {
        match e {
            HkError::NonFinite { what, .. } => SimError::NonPhysical { what },
            HkError::Domain { what, .. } => SimError::InvalidArg { what },
        }
    }
}

impl From<serde_json::Error> for SimError {
    fn from(e: serde_json::Error) -> Self {
        SimError::Backend {
            message: format!("JSON export failed: {e}"),
        }
    }
}
