use super::state::UnitPlacementState;
use crate::core::models::ids::UnitId;
use crate::core::utils::geometry::PoseFrame;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Cannot grasp unit {requested}: the gripper already holds unit {held}")]
    AlreadyGrasped { requested: UnitId, held: UnitId },

    #[error("Unit {unit} is {found}, expected {expected}")]
    InvalidState {
        unit: UnitId,
        expected: &'static str,
        found: &'static str,
    },

    #[error("Unit {0} is not part of this build")]
    UnknownUnit(UnitId),
}

/// Placement state of every unit in a build.
///
/// Units are only ever transitioned, never removed: a build runs `InMagazine -> Grasped ->
/// PlacedAt` and a reset runs `PlacedAt -> Grasped -> InMagazine`.
/// At most one unit is `Grasped` at any time.
#[derive(Debug, Clone)]
pub struct UnitRegistry {
    states: BTreeMap<UnitId, UnitPlacementState>,
    held: Option<UnitId>,
}

impl UnitRegistry {
    /// Registers units `1..=count`, all in the magazine.
    pub fn new(count: usize) -> Self {
        Self {
            states: UnitId::first_n(count)
                .map(|id| (id, UnitPlacementState::InMagazine))
                .collect(),
            held: None,
        }
    }

    pub fn state(&self, unit: UnitId) -> Result<&UnitPlacementState, RegistryError> {
        self.states
            .get(&unit)
            .ok_or(RegistryError::UnknownUnit(unit))
    }

    /// Checks that `unit` may be grasped without changing anything.
    pub fn can_grasp(&self, unit: UnitId) -> Result<(), RegistryError> {
        self.check_gripper_free(unit)?;
        match self.state(unit)? {
            UnitPlacementState::InMagazine => Ok(()),
            other => Err(invalid_state(unit, UnitPlacementState::InMagazine.name(), other)),
        }
    }

    /// Checks that a placed `unit` may be taken back off the structure.
    pub fn can_lift(&self, unit: UnitId) -> Result<(), RegistryError> {
        self.check_gripper_free(unit)?;
        match self.state(unit)? {
            UnitPlacementState::PlacedAt { .. } => Ok(()),
            other => Err(invalid_state(unit, "placed", other)),
        }
    }

    /// Checks that `unit` may be released, into the structure or back into the magazine.
    pub fn can_place(&self, unit: UnitId) -> Result<(), RegistryError> {
        match self.state(unit)? {
            UnitPlacementState::Grasped => Ok(()),
            other => Err(invalid_state(unit, UnitPlacementState::Grasped.name(), other)),
        }
    }

    pub fn mark_grasped(&mut self, unit: UnitId) -> Result<(), RegistryError> {
        self.can_grasp(unit)?;
        self.hold(unit)
    }

    /// `PlacedAt -> Grasped`: the unit is off the structure and in the gripper.
    pub fn mark_lifted(&mut self, unit: UnitId) -> Result<(), RegistryError> {
        self.can_lift(unit)?;
        self.hold(unit)
    }

    /// Hands `unit` over to the structure. From here on its pose is `local_pose` relative
    /// to `frame`.
    pub fn mark_placed(
        &mut self,
        unit: UnitId,
        frame: &str,
        local_pose: PoseFrame,
    ) -> Result<&UnitPlacementState, RegistryError> {
        self.release(
            unit,
            UnitPlacementState::PlacedAt {
                frame: frame.to_string(),
                local_pose,
            },
        )
    }

    /// `Grasped -> InMagazine`: the unit is back in its magazine slot.
    pub fn mark_returned(&mut self, unit: UnitId) -> Result<&UnitPlacementState, RegistryError> {
        self.release(unit, UnitPlacementState::InMagazine)
    }

    fn check_gripper_free(&self, unit: UnitId) -> Result<(), RegistryError> {
        match self.held {
            Some(held) if held != unit => Err(RegistryError::AlreadyGrasped {
                requested: unit,
                held,
            }),
            _ => Ok(()),
        }
    }

    fn hold(&mut self, unit: UnitId) -> Result<(), RegistryError> {
        let state = self
            .states
            .get_mut(&unit)
            .ok_or(RegistryError::UnknownUnit(unit))?;
        *state = UnitPlacementState::Grasped;
        self.held = Some(unit);
        Ok(())
    }

    fn release(
        &mut self,
        unit: UnitId,
        next: UnitPlacementState,
    ) -> Result<&UnitPlacementState, RegistryError> {
        self.can_place(unit)?;
        self.held = None;
        let state = self
            .states
            .get_mut(&unit)
            .ok_or(RegistryError::UnknownUnit(unit))?;
        *state = next;
        Ok(state)
    }

    pub fn held(&self) -> Option<UnitId> {
        self.held
    }

    pub fn placed_count(&self) -> usize {
        self.states
            .values()
            .filter(|s| matches!(s, UnitPlacementState::PlacedAt { .. }))
            .count()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// All units in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = (UnitId, &UnitPlacementState)> {
        self.states.iter().map(|(id, state)| (*id, state))
    }

    /// Structure-local pose of a placed unit; `None` while it is not placed.
    pub fn local_pose(&self, unit: UnitId) -> Result<Option<&PoseFrame>, RegistryError> {
        Ok(match self.state(unit)? {
            UnitPlacementState::PlacedAt { local_pose, .. } => Some(local_pose),
            _ => None,
        })
    }

    /// World pose of a placed unit given the current world pose of its structure frame.
    pub fn world_pose(
        &self,
        unit: UnitId,
        frame_pose: &PoseFrame,
    ) -> Result<Option<PoseFrame>, RegistryError> {
        Ok(self
            .local_pose(unit)?
            .map(|local| frame_pose.compose(local)))
    }
}

fn invalid_state(
    unit: UnitId,
    expected: &'static str,
    found: &UnitPlacementState,
) -> RegistryError {
    RegistryError::InvalidState {
        unit,
        expected,
        found: found.name(),
    }
}
