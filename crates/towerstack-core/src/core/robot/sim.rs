use super::traits::{
    GripperBackend, GripperError, MotionBackend, MotionError, MotionTarget, ResolveError,
    SceneBackend, Speed,
};
use crate::core::utils::geometry::PoseFrame;
use std::collections::{HashMap, HashSet};
use tracing::trace;

/// Distance within which the vacuum picks up a unit lying under the tool (mm).
const GRIP_CAPTURE_RADIUS_MM: f64 = 0.5;
const POSE_MATCH_LINEAR_MM: f64 = 1e-6;
const POSE_MATCH_ANGULAR_RAD: f64 = 1e-9;

/// A command accepted by the simulated cell, in execution order.
#[derive(Debug, Clone, PartialEq)]
pub enum CellCommand {
    MoveJoint(MotionTarget),
    MoveLinear(PoseFrame),
    SetSpeed(Speed),
    SetJoints([f64; 6]),
    SetPoseFrame(String),
    SetVacuum(bool),
    Attach { item: String, frame: String },
}

#[derive(Debug, Clone)]
struct SimUnit {
    world_pose: PoseFrame,
    parent: Option<String>,
}

/// In-memory robot cell.
///
/// Units lie at fixed world poses; switching the vacuum on while the tool sits on a unit
/// picks it up, and switching it off leaves the unit at the current tool pose. Only
/// successfully executed commands are appended to the log.
#[derive(Debug, Clone)]
pub struct SimulatedCell {
    frames: HashMap<String, PoseFrame>,
    items: HashSet<String>,
    units: HashMap<String, SimUnit>,
    tool_pose: Option<PoseFrame>,
    held: Option<String>,
    vacuum: bool,
    speed: Option<Speed>,
    gripper_configured: bool,
    unreachable: Vec<PoseFrame>,
    vacuum_fault: Option<String>,
    moves_before_fault: Option<usize>,
    log: Vec<CellCommand>,
}

impl Default for SimulatedCell {
    fn default() -> Self {
        Self {
            frames: HashMap::new(),
            items: HashSet::new(),
            units: HashMap::new(),
            tool_pose: None,
            held: None,
            vacuum: false,
            speed: None,
            gripper_configured: true,
            unreachable: Vec::new(),
            vacuum_fault: None,
            moves_before_fault: None,
            log: Vec::new(),
        }
    }
}

impl SimulatedCell {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_frame(mut self, name: impl Into<String>, world_pose: PoseFrame) -> Self {
        self.frames.insert(name.into(), world_pose);
        self
    }

    /// Registers a named item without a pose (robot, tool).
    pub fn with_item(mut self, name: impl Into<String>) -> Self {
        self.items.insert(name.into());
        self
    }

    /// Registers a unit lying at `world_pose`, the tool pose that grips it.
    pub fn with_unit(mut self, name: impl Into<String>, world_pose: PoseFrame) -> Self {
        self.units.insert(
            name.into(),
            SimUnit {
                world_pose,
                parent: None,
            },
        );
        self
    }

    /// Registers a unit already attached to `frame`, lying at `world_pose`.
    pub fn with_attached_unit(
        mut self,
        name: impl Into<String>,
        world_pose: PoseFrame,
        frame: impl Into<String>,
    ) -> Self {
        self.units.insert(
            name.into(),
            SimUnit {
                world_pose,
                parent: Some(frame.into()),
            },
        );
        self
    }

    /// Simulates a cell without a vacuum controller.
    pub fn without_gripper(mut self) -> Self {
        self.gripper_configured = false;
        self
    }

    /// Every move targeting `pose` fails with [`MotionError::Unreachable`].
    pub fn make_unreachable(&mut self, pose: PoseFrame) {
        self.unreachable.push(pose);
    }

    /// The next vacuum actuation fails with `message`.
    pub fn arm_vacuum_fault(&mut self, message: impl Into<String>) {
        self.vacuum_fault = Some(message.into());
    }

    /// After `moves` more successful moves, the next move is rejected by the controller.
    pub fn fail_move_after(&mut self, moves: usize) {
        self.moves_before_fault = Some(moves);
    }

    pub fn log(&self) -> &[CellCommand] {
        &self.log
    }

    pub fn held(&self) -> Option<&str> {
        self.held.as_deref()
    }

    pub fn vacuum_on(&self) -> bool {
        self.vacuum
    }

    pub fn current_speed(&self) -> Option<Speed> {
        self.speed
    }

    pub fn tool_pose(&self) -> Option<&PoseFrame> {
        self.tool_pose.as_ref()
    }

    pub fn unit_world_pose(&self, name: &str) -> Option<&PoseFrame> {
        self.units.get(name).map(|u| &u.world_pose)
    }

    pub fn unit_parent(&self, name: &str) -> Option<&str> {
        self.units.get(name).and_then(|u| u.parent.as_deref())
    }

    fn check_move_budget(&mut self) -> Result<(), MotionError> {
        match self.moves_before_fault {
            Some(0) => {
                self.moves_before_fault = None;
                Err(MotionError::Rejected("injected motion fault".to_string()))
            }
            Some(n) => {
                self.moves_before_fault = Some(n - 1);
                Ok(())
            }
            None => Ok(()),
        }
    }

    fn check_reachable(&self, pose: &PoseFrame) -> Result<(), MotionError> {
        if self
            .unreachable
            .iter()
            .any(|p| p.approx_eq(pose, POSE_MATCH_LINEAR_MM, POSE_MATCH_ANGULAR_RAD))
        {
            return Err(MotionError::Unreachable {
                target: pose.to_string(),
            });
        }
        Ok(())
    }

    fn arrive_at(&mut self, pose: Option<PoseFrame>) {
        self.tool_pose = pose;
        if let (Some(pose), Some(name)) = (pose, self.held.as_ref()) {
            if let Some(unit) = self.units.get_mut(name) {
                unit.world_pose = pose;
            }
        }
    }

    fn unit_under_tool(&self) -> Option<String> {
        let tool = self.tool_pose?;
        self.units
            .iter()
            .filter(|(_, unit)| unit.world_pose.distance_to(&tool) <= GRIP_CAPTURE_RADIUS_MM)
            .min_by(|(_, a), (_, b)| {
                a.world_pose
                    .distance_to(&tool)
                    .total_cmp(&b.world_pose.distance_to(&tool))
            })
            .map(|(name, _)| name.clone())
    }
}

impl MotionBackend for SimulatedCell {
    fn move_joint(&mut self, target: &MotionTarget) -> Result<(), MotionError> {
        if let MotionTarget::Pose(pose) = target {
            self.check_reachable(pose)?;
        }
        self.check_move_budget()?;
        let pose = match target {
            MotionTarget::Pose(pose) => Some(*pose),
            MotionTarget::Joints(_) => None,
        };
        trace!(?target, "sim: move joint");
        self.arrive_at(pose);
        self.log.push(CellCommand::MoveJoint(*target));
        Ok(())
    }

    fn move_linear(&mut self, pose: &PoseFrame) -> Result<(), MotionError> {
        self.check_reachable(pose)?;
        self.check_move_budget()?;
        trace!(%pose, "sim: move linear");
        self.arrive_at(Some(*pose));
        self.log.push(CellCommand::MoveLinear(*pose));
        Ok(())
    }

    fn set_speed(&mut self, speed: Speed) -> Result<(), MotionError> {
        self.speed = Some(speed);
        self.log.push(CellCommand::SetSpeed(speed));
        Ok(())
    }

    fn set_joints(&mut self, joints: &[f64; 6]) -> Result<(), MotionError> {
        self.arrive_at(None);
        self.log.push(CellCommand::SetJoints(*joints));
        Ok(())
    }

    fn set_pose_frame(&mut self, frame: &str) -> Result<(), MotionError> {
        if !self.frames.contains_key(frame) {
            return Err(MotionError::Rejected(format!("unknown reference frame '{frame}'")));
        }
        self.log.push(CellCommand::SetPoseFrame(frame.to_string()));
        Ok(())
    }
}

impl GripperBackend for SimulatedCell {
    fn set_vacuum(&mut self, on: bool) -> Result<Option<String>, GripperError> {
        if !self.gripper_configured {
            return Err(GripperError::NotConfigured);
        }
        if let Some(message) = self.vacuum_fault.take() {
            return Err(GripperError::Actuation(message));
        }

        self.vacuum = on;
        if on {
            if self.held.is_none() {
                self.held = self.unit_under_tool();
                if let Some(name) = &self.held {
                    if let Some(unit) = self.units.get_mut(name) {
                        unit.parent = None;
                    }
                }
            }
        } else if let Some(name) = self.held.take() {
            if let (Some(unit), Some(tool)) = (self.units.get_mut(&name), self.tool_pose) {
                unit.world_pose = tool;
            }
        }
        trace!(on, held = ?self.held, "sim: vacuum");
        self.log.push(CellCommand::SetVacuum(on));
        Ok(self.held.clone())
    }
}

impl SceneBackend for SimulatedCell {
    fn resolve_frame(&self, name: &str) -> Result<PoseFrame, ResolveError> {
        self.frames
            .get(name)
            .copied()
            .ok_or_else(|| ResolveError::NotFound(name.to_string()))
    }

    fn contains(&self, name: &str) -> bool {
        self.frames.contains_key(name) || self.items.contains(name) || self.units.contains_key(name)
    }

    fn attach_statically(&mut self, item: &str, frame: &str) -> Result<(), ResolveError> {
        if !self.frames.contains_key(frame) {
            return Err(ResolveError::NotFound(frame.to_string()));
        }
        let unit = self
            .units
            .get_mut(item)
            .ok_or_else(|| ResolveError::NotFound(item.to_string()))?;
        unit.parent = Some(frame.to_string());
        self.log.push(CellCommand::Attach {
            item: item.to_string(),
            frame: frame.to_string(),
        });
        Ok(())
    }
}
