use super::indexer::{Orientation, StructureSlot, structure_slot};
use super::{ApproachPoses, LayoutError, gripper_flip};
use crate::core::models::ids::UnitId;
use crate::core::models::unit::UnitDimensions;
use crate::core::utils::geometry::PoseFrame;

/// Geometry of the tower, expressed in the structure frame.
#[derive(Debug, Clone, PartialEq)]
pub struct StructureConfig {
    pub units_per_layer: usize,
    /// Centre of every layer in the structure frame (millimetres).
    pub base_x: f64,
    pub base_y: f64,
    /// Subtracted from each layer's top surface to get the tool contact height.
    pub tool_z_offset: f64,
    /// Height of the hover waypoint above the contact pose.
    pub hover_height: f64,
    /// Yaw of units in horizontal (even) layers, radians.
    pub horizontal_yaw: f64,
    /// Yaw of units in vertical (odd) layers, radians.
    pub vertical_yaw: f64,
}

/// Where one unit goes, in structure-local terms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub slot: StructureSlot,
    pub x_offset: f64,
    pub y_offset: f64,
    pub z: f64,
    pub rotation_z: f64,
}

/// Place and hover poses for the tower being built.
#[derive(Debug, Clone)]
pub struct StructureLayout<'a> {
    config: &'a StructureConfig,
    unit: UnitDimensions,
    max_units: usize,
    frame: PoseFrame,
}

impl<'a> StructureLayout<'a> {
    pub fn new(
        config: &'a StructureConfig,
        unit: UnitDimensions,
        max_units: usize,
        frame: PoseFrame,
    ) -> Self {
        Self {
            config,
            unit,
            max_units,
            frame,
        }
    }

    pub fn frame(&self) -> &PoseFrame {
        &self.frame
    }

    pub fn slot(&self, unit: UnitId) -> Result<StructureSlot, LayoutError> {
        structure_slot(unit, self.config.units_per_layer, self.max_units).map_err(|e| match e {
            LayoutError::IndexOutOfRange { ordinal, capacity } => {
                LayoutError::StructureFull { ordinal, capacity }
            }
            other => other,
        })
    }

    /// Offsets, contact height and yaw of a unit.
    ///
    /// Units of a layer are centred on the base point and spaced by the unit width:
    /// along Y in horizontal layers, along X in vertical ones. With three units per layer
    /// this yields `-W, 0, +W`.
    pub fn calculate_placement(&self, unit: UnitId) -> Result<Placement, LayoutError> {
        let slot = self.slot(unit)?;
        let z = (slot.layer + 1) as f64 * self.unit.height - self.config.tool_z_offset;
        let centre = (self.config.units_per_layer - 1) as f64 / 2.0;
        let spread = (slot.index_in_layer as f64 - centre) * self.unit.width;

        let (x_offset, y_offset, rotation_z) = match slot.orientation {
            Orientation::Horizontal => (0.0, spread, self.config.horizontal_yaw),
            Orientation::Vertical => (spread, 0.0, self.config.vertical_yaw),
        };

        Ok(Placement {
            slot,
            x_offset,
            y_offset,
            z,
            rotation_z,
        })
    }

    /// Pose of the placed unit relative to the structure frame, without the gripper flip.
    pub fn unit_local_pose(&self, unit: UnitId) -> Result<PoseFrame, LayoutError> {
        let placement = self.calculate_placement(unit)?;
        Ok(self.positioned(&placement))
    }

    /// Hover and place poses of the tool.
    ///
    /// The chain is `frame * translate(base + offsets, z) * rotZ(yaw) * rotX(pi)`; the flip is
    /// applied last so the yaw turns about the structure's vertical axis.
    pub fn placement_pose(&self, unit: UnitId) -> Result<ApproachPoses, LayoutError> {
        let placement = self.calculate_placement(unit)?;
        let local_tool = self.positioned(&placement).compose(&gripper_flip());

        Ok(ApproachPoses {
            hover: self
                .frame
                .compose(&local_tool.with_hover_offset(self.config.hover_height)),
            exact: self.frame.compose(&local_tool),
        })
    }

    fn positioned(&self, placement: &Placement) -> PoseFrame {
        PoseFrame::translation(
            self.config.base_x + placement.x_offset,
            self.config.base_y + placement.y_offset,
            placement.z,
        )
        .compose(&PoseFrame::rotation_z(placement.rotation_z))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    const TOL: f64 = 1e-9;
    const UNIT: UnitDimensions = UnitDimensions {
        length: 75.0,
        width: 25.5,
        height: 15.0,
    };

    fn reference_structure() -> StructureConfig {
        StructureConfig {
            units_per_layer: 3,
            base_x: 70.0,
            base_y: 70.0,
            tool_z_offset: 0.0,
            hover_height: 30.0,
            horizontal_yaw: FRAC_PI_2,
            vertical_yaw: PI,
        }
    }

    fn id(n: u32) -> UnitId {
        UnitId::new(n).unwrap()
    }

    fn yaw_congruent_mod_half_turn(a: f64, b: f64) -> bool {
        let diff = (a - b).rem_euclid(PI);
        diff < TOL || (PI - diff) < TOL
    }

    #[test]
    fn reference_examples_have_expected_layer_height() {
        let config = reference_structure();
        let layout = StructureLayout::new(&config, UNIT, 15, PoseFrame::identity());

        assert!((layout.calculate_placement(id(1)).unwrap().z - 15.0).abs() < TOL);
        assert!((layout.calculate_placement(id(4)).unwrap().z - 30.0).abs() < TOL);
        assert!((layout.calculate_placement(id(13)).unwrap().z - 75.0).abs() < TOL);
    }

    #[test]
    fn horizontal_layer_spreads_along_y_with_quarter_turn() {
        let config = reference_structure();
        let layout = StructureLayout::new(&config, UNIT, 15, PoseFrame::identity());

        let offsets: Vec<(f64, f64)> = (1..=3)
            .map(|n| {
                let p = layout.calculate_placement(id(n)).unwrap();
                assert!(yaw_congruent_mod_half_turn(p.rotation_z, FRAC_PI_2));
                (p.x_offset, p.y_offset)
            })
            .collect();
        assert_eq!(offsets, vec![(0.0, -25.5), (0.0, 0.0), (0.0, 25.5)]);
    }

    #[test]
    fn vertical_layer_spreads_along_x_with_yaw_congruent_to_zero() {
        let config = reference_structure();
        let layout = StructureLayout::new(&config, UNIT, 15, PoseFrame::identity());

        let offsets: Vec<(f64, f64)> = (4..=6)
            .map(|n| {
                let p = layout.calculate_placement(id(n)).unwrap();
                assert!(yaw_congruent_mod_half_turn(p.rotation_z, 0.0));
                (p.x_offset, p.y_offset)
            })
            .collect();
        assert_eq!(offsets, vec![(-25.5, 0.0), (0.0, 0.0), (25.5, 0.0)]);
    }

    #[test]
    fn consecutive_layers_differ_by_a_quarter_turn() {
        let config = reference_structure();
        let layout = StructureLayout::new(&config, UNIT, 15, PoseFrame::identity());

        for layer in 0..4u32 {
            let lower = layout.calculate_placement(id(layer * 3 + 1)).unwrap();
            let upper = layout.calculate_placement(id(layer * 3 + 4)).unwrap();
            let diff = (upper.rotation_z - lower.rotation_z).rem_euclid(PI);
            assert!((diff - FRAC_PI_2).abs() < TOL);
        }
    }

    #[test]
    fn every_slot_is_unique() {
        let config = reference_structure();
        let layout = StructureLayout::new(&config, UNIT, 15, PoseFrame::identity());

        let poses: Vec<PoseFrame> = UnitId::first_n(15)
            .map(|unit| layout.unit_local_pose(unit).unwrap())
            .collect();
        for (i, a) in poses.iter().enumerate() {
            for b in &poses[i + 1..] {
                assert!(a.distance_to(b) > 1.0);
            }
        }
    }

    #[test]
    fn placement_pose_composes_structure_frame_and_hover_height() {
        let config = reference_structure();
        let frame = PoseFrame::from_xyzrpw([500.0, 100.0, -20.0, 0.0, 0.0, 45.0]);
        let layout = StructureLayout::new(&config, UNIT, 15, frame);

        let poses = layout.placement_pose(id(2)).unwrap();
        let exact_local = frame.inverse().compose(&poses.exact);
        let hover_local = frame.inverse().compose(&poses.hover);

        assert!((exact_local.x() - 70.0).abs() < 1e-6);
        assert!((exact_local.y() - 70.0).abs() < 1e-6);
        assert!((exact_local.z() - 15.0).abs() < 1e-6);
        assert!((hover_local.z() - 45.0).abs() < 1e-6);
        assert!(hover_local.rotation().angle_to(&exact_local.rotation()) < 1e-9);
    }

    #[test]
    fn flip_is_applied_after_yaw() {
        let config = reference_structure();
        let layout = StructureLayout::new(&config, UNIT, 15, PoseFrame::identity());

        let exact = layout.placement_pose(id(1)).unwrap().exact;
        let expected = PoseFrame::translation(70.0, 44.5, 15.0)
            * PoseFrame::rotation_z(FRAC_PI_2)
            * PoseFrame::rotation_x(PI);
        assert!(exact.approx_eq(&expected, 1e-6, 1e-9));

        // Tool X axis must follow the yaw, i.e. point along structure +Y.
        let tool_x = exact.rotation() * nalgebra::Vector3::x();
        assert!((tool_x.y - 1.0).abs() < 1e-9);
    }

    #[test]
    fn placement_pose_is_idempotent() {
        let config = reference_structure();
        let layout = StructureLayout::new(&config, UNIT, 15, PoseFrame::from_xyzrpw([3.0, 2.0, 1.0, 0.0, 0.0, 10.0]));
        assert_eq!(layout.placement_pose(id(8)), layout.placement_pose(id(8)));
    }

    #[test]
    fn tool_offset_lowers_contact_height() {
        let mut config = reference_structure();
        config.tool_z_offset = 2.5;
        let layout = StructureLayout::new(&config, UNIT, 15, PoseFrame::identity());
        assert!((layout.calculate_placement(id(7)).unwrap().z - 42.5).abs() < TOL);
    }

    #[test]
    fn ordinal_beyond_unit_count_reports_structure_full() {
        let config = reference_structure();
        let layout = StructureLayout::new(&config, UNIT, 15, PoseFrame::identity());
        assert_eq!(
            layout.placement_pose(id(16)),
            Err(LayoutError::StructureFull {
                ordinal: 16,
                capacity: 15
            })
        );
    }
}
