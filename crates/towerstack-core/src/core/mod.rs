//! # Core Module
//!
//! Stateless building blocks of the tower builder.
//!
//! - **Geometry** ([`utils::geometry`]) - `PoseFrame`, a 6-DOF rigid transform with
//!   composition, inversion and the hover-offset helper
//! - **Models** ([`models`]) - unit identifiers and unit dimensions
//! - **Layouts** ([`layout`]) - ordinal indexing plus the magazine and structure pose layouts
//! - **Robot cell** ([`robot`]) - motion, gripper and scene interfaces, and a simulated cell
//!
//! Nothing in this module holds mutable build state; every function here is a pure
//! mapping from configuration and unit identity to poses.

pub mod layout;
pub mod models;
pub mod robot;
pub mod utils;
