use super::config::BuildConfig;
use super::error::EngineError;
use super::registry::UnitRegistry;
use super::state::SequencerState;
use crate::core::layout::ApproachPoses;
use crate::core::models::ids::UnitId;
use crate::core::robot::{GripperError, MotionTarget, RobotCell, Speed};
use crate::core::utils::geometry::PoseFrame;
use tracing::{debug, warn};

/// Drives single pick and place cycles against a robot cell, and their reverse (lift and
/// return) when a structure is taken down again.
///
/// Every cycle runs `home -> hover -> contact -> grip action -> hover`, with the two linear
/// moves adjacent to contact executed at precision speed and the nominal profile restored
/// right after. A failing step aborts the cycle and leaves the registry untouched for
/// that cycle; nothing is retried here.
pub struct MotionSequencer<'a, B: RobotCell> {
    cell: &'a mut B,
    config: &'a BuildConfig,
    state: SequencerState,
}

impl<'a, B: RobotCell> MotionSequencer<'a, B> {
    pub fn new(cell: &'a mut B, config: &'a BuildConfig) -> Self {
        Self {
            cell,
            config,
            state: SequencerState::Unhomed,
        }
    }

    pub fn state(&self) -> SequencerState {
        self.state
    }

    /// Puts the robot at its start joints, selects the world frame and applies the
    /// nominal speed profile.
    pub fn initialize(&mut self) -> Result<(), EngineError> {
        let motion = &self.config.motion;
        self.cell.set_joints(&motion.start_joints)?;
        self.cell.set_pose_frame(&self.config.names.world_frame)?;
        self.cell.set_speed(Speed::Profile(motion.nominal))?;
        self.state = SequencerState::Unhomed;
        debug!("Robot initialised at start joints");
        Ok(())
    }

    pub fn move_home(&mut self) -> Result<(), EngineError> {
        self.cell
            .move_joint(&MotionTarget::Joints(self.config.motion.home_joints))?;
        self.state = SequencerState::AtHome;
        Ok(())
    }

    /// Restores the nominal profile and returns home, the clean state a retried cycle
    /// starts from.
    pub fn recover(&mut self) -> Result<(), EngineError> {
        self.cell
            .set_speed(Speed::Profile(self.config.motion.nominal))?;
        self.move_home()
    }

    pub fn run_pick(
        &mut self,
        unit: UnitId,
        poses: &ApproachPoses,
        registry: &mut UnitRegistry,
    ) -> Result<(), EngineError> {
        registry.can_grasp(unit)?;
        debug!(%unit, "Pick cycle");
        self.grip(unit, poses)?;
        registry.mark_grasped(unit)?;
        Ok(())
    }

    /// Place cycle. The unit is handed over to the structure right after release, before
    /// the retract; a later failure therefore leaves it registered as placed.
    pub fn run_place(
        &mut self,
        unit: UnitId,
        poses: &ApproachPoses,
        local_pose: PoseFrame,
        registry: &mut UnitRegistry,
    ) -> Result<(), EngineError> {
        registry.can_place(unit)?;
        let config = self.config;
        let frame = &config.names.structure_frame;
        debug!(%unit, "Place cycle");

        self.release_into(unit, poses, frame)?;
        registry.mark_placed(unit, frame, local_pose)?;
        self.leave(poses)
    }

    /// Takes a placed unit back off the structure, from its placement poses.
    pub fn run_lift(
        &mut self,
        unit: UnitId,
        poses: &ApproachPoses,
        registry: &mut UnitRegistry,
    ) -> Result<(), EngineError> {
        registry.can_lift(unit)?;
        debug!(%unit, "Lift cycle");
        self.grip(unit, poses)?;
        registry.mark_lifted(unit)?;
        Ok(())
    }

    /// Puts a lifted unit back into its magazine slot, from its pick poses. Like a place,
    /// the unit counts as returned as soon as it is released.
    pub fn run_return(
        &mut self,
        unit: UnitId,
        poses: &ApproachPoses,
        registry: &mut UnitRegistry,
    ) -> Result<(), EngineError> {
        registry.can_place(unit)?;
        let config = self.config;
        debug!(%unit, "Return cycle");

        self.release_into(unit, poses, &config.names.magazine_frame)?;
        registry.mark_returned(unit)?;
        self.leave(poses)
    }

    /// `home -> hover -> contact -> vacuum on -> hover`. The vacuum must report the unit's
    /// own item, otherwise it is switched off again and the cycle fails at the contact pose.
    fn grip(&mut self, unit: UnitId, poses: &ApproachPoses) -> Result<(), EngineError> {
        let expected = self.config.names.unit_item_name(unit);
        self.move_home()?;
        self.approach(poses)?;

        let attached = self.cell.set_vacuum(true)?;
        if attached.as_deref() != Some(expected.as_str()) {
            warn!(%unit, expected = %expected, attached = ?attached, "Vacuum did not pick up the unit");
            self.cell.set_vacuum(false)?;
            return Err(GripperError::NothingAttached { expected, attached }.into());
        }

        self.retract(poses)
    }

    /// `home -> hover -> contact -> vacuum off`, then the unit is attached to `frame`.
    fn release_into(
        &mut self,
        unit: UnitId,
        poses: &ApproachPoses,
        frame: &str,
    ) -> Result<(), EngineError> {
        let item = self.config.names.unit_item_name(unit);
        self.move_home()?;
        self.approach(poses)?;
        self.cell.set_vacuum(false)?;
        self.cell.attach_statically(&item, frame)?;
        Ok(())
    }

    fn leave(&mut self, poses: &ApproachPoses) -> Result<(), EngineError> {
        self.retract(poses)?;
        self.move_home()
    }

    fn approach(&mut self, poses: &ApproachPoses) -> Result<(), EngineError> {
        self.cell.move_joint(&MotionTarget::Pose(poses.hover))?;
        self.state = SequencerState::AboveTarget;
        self.cell
            .set_speed(Speed::Linear(self.config.motion.precision_speed))?;
        self.cell.move_linear(&poses.exact)?;
        self.state = SequencerState::AtTarget;
        Ok(())
    }

    fn retract(&mut self, poses: &ApproachPoses) -> Result<(), EngineError> {
        self.cell.move_linear(&poses.hover)?;
        self.state = SequencerState::AboveTarget;
        self.cell
            .set_speed(Speed::Profile(self.config.motion.nominal))?;
        Ok(())
    }
}
