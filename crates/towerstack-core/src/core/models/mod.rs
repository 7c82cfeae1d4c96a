//! # Models Module
//!
//! Identity and physical description of the units being stacked.
//!
//! - [`ids`] - `UnitId`, the one-based ordinal that names a unit everywhere in the crate
//! - [`unit`] - `Unit` and `UnitDimensions`

pub mod ids;
pub mod unit;
