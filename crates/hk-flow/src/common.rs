//! Common checks for flow calculations.

use crate::error::{FlowError, FlowResult};
use hk_core::numeric::ensure_finite;

/// Ensure a value is finite, returning FlowError if not.
pub fn check_finite(value: f64, what: &'static str) -> FlowResult<()> {
    ensure_finite(value, what).map_err(|_| FlowError::NonPhysical { what })?;
    Ok(())
}

/// Reynolds numbers must be finite and strictly positive.
///
/// Both failures are domain errors carrying the offending value.
pub fn check_reynolds(re: f64) -> FlowResult<f64> {
    if !re.is_finite() || re <= 0.0 {
        return Err(FlowError::Domain {
            what: "Reynolds number",
            value: re,
        });
    }
    Ok(re)
}

/// Relative roughness must be finite and non-negative.
pub fn check_relative_roughness(rr: f64) -> FlowResult<f64> {
    if !rr.is_finite() || rr < 0.0 {
        return Err(FlowError::Domain {
            what: "relative roughness",
            value: rr,
        });
    }
    Ok(rr)
}
