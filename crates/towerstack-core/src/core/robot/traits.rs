use crate::core::utils::geometry::PoseFrame;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum MotionError {
    #[error("Target {target} is unreachable")]
    Unreachable { target: String },

    #[error("Motion command rejected by the controller: {0}")]
    Rejected(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GripperError {
    #[error("No gripper controller is configured")]
    NotConfigured,

    #[error("Vacuum actuation failed: {0}")]
    Actuation(String),

    #[error("Vacuum did not pick up '{expected}' (holding {})", attached.as_deref().unwrap_or("nothing"))]
    NothingAttached {
        expected: String,
        attached: Option<String>,
    },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("Item '{0}' was not found in the cell")]
    NotFound(String),
}

/// Speed and acceleration limits applied to subsequent moves.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedProfile {
    /// Linear tool speed, mm/s.
    pub linear: f64,
    /// Joint speed, deg/s.
    pub joint: f64,
    /// Linear acceleration, mm/s².
    pub linear_accel: f64,
    /// Joint acceleration, deg/s².
    pub joint_accel: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Speed {
    /// Linear tool speed only, mm/s.
    Linear(f64),
    Profile(SpeedProfile),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MotionTarget {
    /// Joint angles in degrees.
    Joints([f64; 6]),
    Pose(PoseFrame),
}

/// Blocking robot motion. Each call returns once the move has completed or failed.
pub trait MotionBackend {
    fn move_joint(&mut self, target: &MotionTarget) -> Result<(), MotionError>;
    fn move_linear(&mut self, pose: &PoseFrame) -> Result<(), MotionError>;
    fn set_speed(&mut self, speed: Speed) -> Result<(), MotionError>;

    /// Places the robot at `joints` without a motion (controller initialisation).
    fn set_joints(&mut self, joints: &[f64; 6]) -> Result<(), MotionError>;

    /// Selects the reference frame in which subsequent pose targets are interpreted.
    fn set_pose_frame(&mut self, frame: &str) -> Result<(), MotionError>;
}

pub trait GripperBackend {
    /// Switches the vacuum. Returns the name of the item now held by the tool, if any.
    fn set_vacuum(&mut self, on: bool) -> Result<Option<String>, GripperError>;
}

pub trait SceneBackend {
    /// World pose of a named frame.
    fn resolve_frame(&self, name: &str) -> Result<PoseFrame, ResolveError>;

    /// Whether a frame, robot, tool or item with this name exists.
    fn contains(&self, name: &str) -> bool;

    /// Makes `frame` the parent of `item`; the item's pose is reported relative to it
    /// from now on.
    fn attach_statically(&mut self, item: &str, frame: &str) -> Result<(), ResolveError>;
}

/// Everything a build needs from the cell.
pub trait RobotCell: MotionBackend + GripperBackend + SceneBackend {}

impl<T: MotionBackend + GripperBackend + SceneBackend> RobotCell for T {}
