use thiserror::Error;

use super::config::ConfigError;
use super::registry::RegistryError;
use crate::core::layout::LayoutError;
use crate::core::robot::{GripperError, MotionError, ResolveError};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum EngineError {
    /// The cell lacks a frame, robot, tool or unit the configuration names.
    #[error("Cell configuration error: {0}")]
    Configuration(String),

    #[error("Invalid build configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Layout error: {0}")]
    Layout(#[from] LayoutError),

    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("Motion failed: {0}")]
    Motion(#[from] MotionError),

    #[error("Gripper failed: {0}")]
    Gripper(#[from] GripperError),

    #[error("Lookup failed: {0}")]
    Resolve(#[from] ResolveError),
}
