//! # Layout Module
//!
//! Deterministic mapping from a unit's ordinal to where it lives.
//!
//! - [`indexer`] - ordinal to (row, index) in the magazine and (layer, index, orientation)
//!   in the structure
//! - [`magazine`] - absolute pick and hover poses in the magazine
//! - [`structure`] - absolute place and hover poses in the structure, including the
//!   layer alternation rule
//!
//! All functions here are pure: for a fixed configuration the same unit always yields
//! bit-identical poses.

pub mod indexer;
pub mod magazine;
pub mod structure;

use crate::core::utils::geometry::PoseFrame;
use std::f64::consts::PI;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LayoutError {
    #[error("Ordinal {ordinal} is outside the layout capacity of {capacity} unit(s)")]
    IndexOutOfRange { ordinal: usize, capacity: usize },

    #[error("Structure is full: ordinal {ordinal} exceeds the configured {capacity} unit(s)")]
    StructureFull { ordinal: usize, capacity: usize },
}

/// The two waypoints of every pick or place: the hover pose above the slot and the exact
/// contact pose.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ApproachPoses {
    pub hover: PoseFrame,
    pub exact: PoseFrame,
}

/// Half-turn about X that points the gripper face down onto the unit.
pub(crate) fn gripper_flip() -> PoseFrame {
    PoseFrame::rotation_x(PI)
}
