use crate::core::utils::geometry::PoseFrame;
use std::fmt;

/// Where a unit currently is.
#[derive(Debug, Clone, PartialEq)]
pub enum UnitPlacementState {
    InMagazine,
    Grasped,
    /// Placed in the structure; `local_pose` is relative to `frame`.
    PlacedAt { frame: String, local_pose: PoseFrame },
}

impl UnitPlacementState {
    pub fn name(&self) -> &'static str {
        match self {
            UnitPlacementState::InMagazine => "in-magazine",
            UnitPlacementState::Grasped => "grasped",
            UnitPlacementState::PlacedAt { .. } => "placed",
        }
    }
}

impl fmt::Display for UnitPlacementState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnitPlacementState::PlacedAt { frame, local_pose } => {
                write!(f, "placed in {frame} at {local_pose}")
            }
            other => f.write_str(other.name()),
        }
    }
}

/// Position of the robot within a single pick or place cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequencerState {
    Unhomed,
    AtHome,
    AboveTarget,
    AtTarget,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Pick,
    Place,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Pick => f.write_str("pick"),
            Phase::Place => f.write_str("place"),
        }
    }
}
