use crate::core::robot::sim::SimulatedCell;
use crate::core::utils::geometry::PoseFrame;
use crate::engine::config::BuildConfig;
use tracing::warn;

/// World poses of the three frames a build refers to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellFrames {
    pub world: PoseFrame,
    pub magazine: PoseFrame,
    pub structure: PoseFrame,
}

impl SimulatedCell {
    /// A cell holding the configured robot, tool and frames, with every unit lying at its
    /// magazine pick pose.
    pub fn stocked(config: &BuildConfig, frames: &CellFrames) -> Self {
        let names = &config.names;
        let magazine = config.magazine_layout(frames.magazine);

        let mut cell = Self::bare(config, frames);
        for unit in config.units() {
            match magazine.pick_pose(unit.id) {
                Ok(pose) => cell = cell.with_unit(names.unit_item_name(unit.id), pose),
                Err(e) => warn!(unit = %unit.id, error = %e, "Unit has no magazine slot; not stocked"),
            }
        }
        cell
    }

    /// A cell whose structure is complete: every unit sits at its place pose, attached to
    /// the structure frame.
    pub fn assembled(config: &BuildConfig, frames: &CellFrames) -> Self {
        let names = &config.names;
        let structure = config.structure_layout(frames.structure);

        let mut cell = Self::bare(config, frames);
        for unit in config.units() {
            match structure.placement_pose(unit.id) {
                Ok(poses) => {
                    cell = cell.with_attached_unit(
                        names.unit_item_name(unit.id),
                        poses.exact,
                        names.structure_frame.as_str(),
                    )
                }
                Err(e) => warn!(unit = %unit.id, error = %e, "Unit has no structure slot; not stocked"),
            }
        }
        cell
    }

    fn bare(config: &BuildConfig, frames: &CellFrames) -> Self {
        let names = &config.names;
        SimulatedCell::new()
            .with_item(names.robot.as_str())
            .with_item(names.tool.as_str())
            .with_frame(names.world_frame.as_str(), frames.world)
            .with_frame(names.magazine_frame.as_str(), frames.magazine)
            .with_frame(names.structure_frame.as_str(), frames.structure)
    }
}

#[cfg(test)]
pub(crate) fn reference_frames() -> CellFrames {
    CellFrames {
        world: PoseFrame::identity(),
        magazine: PoseFrame::from_xyzrpw([250.0, -300.0, 0.0, 0.0, 0.0, 0.0]),
        structure: PoseFrame::from_xyzrpw([300.0, 150.0, 0.0, 0.0, 0.0, 0.0]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::ids::UnitId;
    use crate::core::robot::SceneBackend;
    use crate::engine::config::reference_config;

    #[test]
    fn stocked_cell_contains_every_configured_item() {
        let config = reference_config();
        let cell = SimulatedCell::stocked(&config, &reference_frames());

        for name in ["Robot", "VacuumGripper", "World", "MagazineFrame", "TowerFrame"] {
            assert!(cell.contains(name), "missing {name}");
        }
        for unit in UnitId::first_n(15) {
            assert!(cell.contains(&config.names.unit_item_name(unit)));
        }
        assert!(!cell.contains("Block 16"));
    }

    #[test]
    fn units_lie_at_their_pick_poses() {
        let config = reference_config();
        let frames = reference_frames();
        let cell = SimulatedCell::stocked(&config, &frames);
        let magazine = config.magazine_layout(frames.magazine);

        let unit = UnitId::new(9).unwrap();
        assert_eq!(
            cell.unit_world_pose("Block 9"),
            Some(&magazine.pick_pose(unit).unwrap())
        );
        assert_eq!(cell.unit_parent("Block 9"), None);
    }

    #[test]
    fn assembled_cell_has_every_unit_in_the_structure() {
        let config = reference_config();
        let frames = reference_frames();
        let cell = SimulatedCell::assembled(&config, &frames);
        let structure = config.structure_layout(frames.structure);

        let unit = UnitId::new(13).unwrap();
        assert_eq!(
            cell.unit_world_pose("Block 13"),
            Some(&structure.placement_pose(unit).unwrap().exact)
        );
        assert_eq!(cell.unit_parent("Block 13"), Some("TowerFrame"));
        assert!(cell.contains("MagazineFrame"));
    }
}
