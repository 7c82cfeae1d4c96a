use crate::core::layout::indexer::{MagazineSlot, StructureSlot};
use crate::core::layout::{ApproachPoses, LayoutError};
use crate::core::models::ids::UnitId;
use crate::core::utils::geometry::PoseFrame;
use crate::engine::config::BuildConfig;
use tracing::{debug, instrument};

/// Everything needed to execute one pick-then-place cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CyclePlan {
    pub unit: UnitId,
    pub magazine_slot: MagazineSlot,
    pub structure_slot: StructureSlot,
    pub pick: ApproachPoses,
    pub place: ApproachPoses,
    /// Pose of the placed unit relative to the structure frame.
    pub local_pose: PoseFrame,
}

/// Computes every cycle of a build in ascending unit order.
///
/// Fails on the first unit that has no magazine or structure slot, so an unplannable
/// build is rejected before any motion is issued.
#[instrument(skip_all, name = "plan_workflow")]
pub fn plan(
    config: &BuildConfig,
    magazine_frame: PoseFrame,
    structure_frame: PoseFrame,
) -> Result<Vec<CyclePlan>, LayoutError> {
    let magazine = config.magazine_layout(magazine_frame);
    let structure = config.structure_layout(structure_frame);

    let cycles = config
        .units()
        .map(|unit| {
            let id = unit.id;
            Ok(CyclePlan {
                unit: id,
                magazine_slot: magazine.slot(id)?,
                structure_slot: structure.slot(id)?,
                pick: magazine.approach_poses(id)?,
                place: structure.placement_pose(id)?,
                local_pose: structure.unit_local_pose(id)?,
            })
        })
        .collect::<Result<Vec<_>, LayoutError>>()?;

    debug!(cycles = cycles.len(), "Build planned");
    Ok(cycles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::layout::indexer::Orientation;
    use crate::engine::config::reference_config;
    use std::f64::consts::PI;

    #[test]
    fn plans_one_cycle_per_unit_in_ascending_order() {
        let config = reference_config();
        let cycles = plan(&config, PoseFrame::identity(), PoseFrame::identity()).unwrap();

        assert_eq!(cycles.len(), 15);
        for (expected, cycle) in UnitId::first_n(15).zip(&cycles) {
            assert_eq!(cycle.unit, expected);
        }
    }

    #[test]
    fn cycles_match_the_layouts() {
        let config = reference_config();
        let structure_frame = PoseFrame::translation(400.0, 0.0, 0.0);
        let cycles = plan(&config, PoseFrame::identity(), structure_frame).unwrap();

        let fourth = &cycles[3];
        assert_eq!(fourth.structure_slot.layer, 1);
        assert_eq!(fourth.structure_slot.orientation, Orientation::Vertical);
        assert_eq!(fourth.magazine_slot.row, 0);
        let flipped = fourth.local_pose.compose(&PoseFrame::rotation_x(PI));
        assert_eq!(fourth.place.exact, structure_frame.compose(&flipped));
    }

    #[test]
    fn unplannable_unit_fails_the_whole_plan() {
        let mut config = reference_config();
        config.magazine.row_capacities = vec![8, 6];
        let result = plan(&config, PoseFrame::identity(), PoseFrame::identity());
        assert_eq!(
            result,
            Err(LayoutError::IndexOutOfRange {
                ordinal: 15,
                capacity: 14
            })
        );
    }
}
