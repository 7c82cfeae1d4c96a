//! # Workflows Module
//!
//! Top-level entry points of the library.
//!
//! - **Planning** ([`plan`]) - every cycle of a build computed up front, without motion
//! - **Building** ([`build`]) - `BuildOrchestrator`, running each pick-then-place cycle
//!   in ascending unit order against a robot cell
//! - **Resetting** ([`reset`]) - `BuildOrchestrator::reset`, taking a structure down into
//!   the magazine again, highest unit first
//! - **Simulation** ([`simulate`]) - a `SimulatedCell` stocked for a configuration, for
//!   dry runs

pub mod build;
pub mod plan;
pub mod reset;
pub mod simulate;
