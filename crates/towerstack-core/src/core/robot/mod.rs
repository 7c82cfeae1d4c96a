//! # Robot Cell Module
//!
//! The engine never talks to a robot controller directly. It drives three capabilities
//! defined in [`traits`]:
//!
//! - [`MotionBackend`](traits::MotionBackend) - blocking joint and linear moves, speed control
//! - [`GripperBackend`](traits::GripperBackend) - vacuum on/off
//! - [`SceneBackend`](traits::SceneBackend) - named frame lookup and static reparenting
//!
//! [`sim::SimulatedCell`] implements all three in memory and records every command, which
//! makes it both the dry-run backend of the command-line tool and the test double of the
//! engine.

pub mod sim;
pub mod traits;

pub use traits::{
    GripperBackend, GripperError, MotionBackend, MotionError, MotionTarget, ResolveError,
    RobotCell, SceneBackend, Speed, SpeedProfile,
};
