//! Error type for the command line front end.

use hk_flow::FlowError;
use hk_project::ProjectError;
use hk_sim::SimError;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("Flow error: {0}")]
    Flow(#[from] FlowError),

    #[error("Simulation error: {0}")]
    Simulation(#[from] SimError),

    #[error("Project error: {0}")]
    Project(#[from] ProjectError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type CliResult<T> = Result<T, CliError>;
