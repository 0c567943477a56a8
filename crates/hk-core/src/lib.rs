//! hk-core: shared foundation for hydrokit.
//!
//! Contains:
//! - units (uom SI types, constructors, US customary conversions)
//! - numeric (Real, finiteness checks, sample grids)
//! - error (shared error types)

pub mod error;
pub mod numeric;
pub mod units;

pub use error::{HkError, HkResult};
pub use numeric::*;
pub use units::*;
