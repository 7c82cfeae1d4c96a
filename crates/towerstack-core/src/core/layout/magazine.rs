use super::indexer::{MagazineSlot, magazine_slot};
use super::{ApproachPoses, LayoutError, gripper_flip};
use crate::core::models::ids::UnitId;
use crate::core::utils::geometry::PoseFrame;

/// Fixed grid of the magazine, expressed in the magazine frame (millimetres).
#[derive(Debug, Clone, PartialEq)]
pub struct MagazineConfig {
    /// Units per row, filled in order. `[8, 7]` in the reference cell.
    pub row_capacities: Vec<usize>,
    /// Y coordinate of each row; one entry per row.
    pub row_offsets_y: Vec<f64>,
    /// X coordinate of the first unit of every row.
    pub offset_x: f64,
    /// Spacing between neighbouring units along X.
    pub pitch: f64,
    /// Tool Z at contact.
    pub z_pick: f64,
    /// Tool Z of the hover waypoint.
    pub z_hover: f64,
}

impl MagazineConfig {
    pub fn capacity(&self) -> usize {
        self.row_capacities.iter().sum()
    }
}

/// Pick and hover poses for units stored in the magazine.
#[derive(Debug, Clone)]
pub struct MagazineLayout<'a> {
    config: &'a MagazineConfig,
    frame: PoseFrame,
}

impl<'a> MagazineLayout<'a> {
    pub fn new(config: &'a MagazineConfig, frame: PoseFrame) -> Self {
        Self { config, frame }
    }

    pub fn frame(&self) -> &PoseFrame {
        &self.frame
    }

    pub fn slot(&self, unit: UnitId) -> Result<MagazineSlot, LayoutError> {
        magazine_slot(unit, &self.config.row_capacities)
    }

    /// Tool pose at contact, relative to the magazine frame.
    pub fn local_pick_pose(&self, unit: UnitId) -> Result<PoseFrame, LayoutError> {
        let slot = self.slot(unit)?;
        let row_y = self
            .config
            .row_offsets_y
            .get(slot.row)
            .copied()
            .ok_or(LayoutError::IndexOutOfRange {
                ordinal: slot.ordinal,
                capacity: self.config.capacity(),
            })?;
        let x = self.config.offset_x + slot.index_in_row as f64 * self.config.pitch;

        Ok(PoseFrame::translation(x, row_y, self.config.z_pick).compose(&gripper_flip()))
    }

    /// Absolute tool pose at contact.
    pub fn pick_pose(&self, unit: UnitId) -> Result<PoseFrame, LayoutError> {
        Ok(self.frame.compose(&self.local_pick_pose(unit)?))
    }

    /// Absolute hover pose: same X/Y as the pick pose, at `z_hover` in the magazine frame.
    pub fn hover_pose(&self, unit: UnitId) -> Result<PoseFrame, LayoutError> {
        let local = self
            .local_pick_pose(unit)?
            .with_hover_offset(self.config.z_hover - self.config.z_pick);
        Ok(self.frame.compose(&local))
    }

    pub fn approach_poses(&self, unit: UnitId) -> Result<ApproachPoses, LayoutError> {
        Ok(ApproachPoses {
            hover: self.hover_pose(unit)?,
            exact: self.pick_pose(unit)?,
        })
    }
}
