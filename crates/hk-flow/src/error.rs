//! Error types for flow calculations.

use hk_core::error::HkError;
use hk_solver::SolverError;
use thiserror::Error;

/// Errors that can occur during friction factor and pipe flow calculations.
#[derive(Error, Debug, Clone)]
pub enum FlowError {
    #[error("Out of domain: {what} = {value}")]
    Domain { what: &'static str, value: f64 },

    #[error("Non-physical value: {what}")]
    NonPhysical { what: &'static str },

    #[error(
        "Colebrook did not converge: Re={reynolds}, rr={relative_roughness}, \
         residual={residual:e} after {iterations} iterations"
    )]
    ConvergenceFailed {
        reynolds: f64,
        relative_roughness: f64,
        residual: f64,
        iterations: usize,
    },

    #[error("Solver error: {0}")]
    Solver(#[from] SolverError),

    #[error("Export error: {message}")]
    Export { message: String },
}

pub type FlowResult<T> = Result<T, FlowError>;

impl From<HkError> for FlowError {
    fn from(e: HkError) -> Self {
        match e {
            HkError::NonFinite { what, .. } => FlowError::NonPhysical { what },
            HkError::Domain { what, value } => FlowError::Domain { what, value },
        }
    }
}

impl From<serde_json::Error> for FlowError {
    fn from(e: serde_json::Error) -> Self {
        FlowError::Export {
            message: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = FlowError::Domain {
            what: "Reynolds number",
            value: 0.0,
        };
        assert!(err.to_string().contains("Reynolds number"));
    }

    #[test]
    fn error_conversion() {
        let core_err = HkError::Domain {
            what: "diameter",
            value: -1.0,
        };
        let flow_err: FlowError = core_err.into();
        assert!(matches!(flow_err, FlowError::Domain { what: "diameter", .. }));
    }
}
