//! Configuration validation.

use crate::schema::{FluidDef, ProjectConfig, SimulationDef};
use hk_sim::{ParameterBound, PhysicalParameters};

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

fn invalid(field: &str, value: impl ToString, reason: &str) -> ValidationError {
    ValidationError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn finite(field: &str, v: f64) -> Result<(), ValidationError> {
    if v.is_finite() {
        Ok(())
    } else {
        Err(invalid(field, v, "must be finite"))
    }
}

fn positive(field: &str, v: f64) -> Result<(), ValidationError> {
    finite(field, v)?;
    if v > 0.0 {
        Ok(())
    } else {
        Err(invalid(field, v, "must be positive"))
    }
}

pub fn validate_config(config: &ProjectConfig) -> Result<(), ValidationError> {
    if config.version > crate::migrate::LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: config.version,
        });
    }
    if config.name.trim().is_empty() {
        return Err(invalid("name", "\"\"", "must not be empty"));
    }

    validate_fluid(&config.fluid)?;
    validate_piston(&config.piston)?;
    validate_simulation(&config.simulation)?;
    Ok(())
}

fn validate_fluid(fluid: &FluidDef) -> Result<(), ValidationError> {
    positive("fluid.kinematic_viscosity_m2_s", fluid.kinematic_viscosity_m2_s)
}

fn validate_piston(p: &PhysicalParameters) -> Result<(), ValidationError> {
    for (name, value, bound) in p.bounds() {
        let field = format!("piston.{name}");
        match bound {
            ParameterBound::Finite => finite(&field, value)?,
            ParameterBound::Positive => positive(&field, value)?,
        }
    }
    Ok(())
}

fn validate_simulation(sim: &SimulationDef) -> Result<(), ValidationError> {
    finite("simulation.t_start_s", sim.t_start_s)?;
    finite("simulation.t_end_s", sim.t_end_s)?;
    if sim.t_end_s <= sim.t_start_s {
        return Err(invalid(
            "simulation.t_end_s",
            sim.t_end_s,
            "must be greater than t_start_s",
        ));
    }
    if sim.samples < 2 {
        return Err(invalid("simulation.samples", sim.samples, "must be at least 2"));
    }
    positive("simulation.dt_s", sim.dt_s)?;
    positive("simulation.rtol", sim.rtol)?;
    positive("simulation.atol", sim.atol)?;
    Ok(())
}
