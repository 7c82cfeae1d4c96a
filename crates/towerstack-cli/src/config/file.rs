use crate::error::{CliError, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileBuildConfig {
    pub unit_count: Option<usize>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileUnitConfig {
    pub length: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileMagazineConfig {
    pub row_capacities: Option<Vec<usize>>,
    pub row_offsets_y: Option<Vec<f64>>,
    pub offset_x: Option<f64>,
    pub pitch: Option<f64>,
    pub z_pick: Option<f64>,
    pub z_hover: Option<f64>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileStructureConfig {
    pub units_per_layer: Option<usize>,
    pub base_x: Option<f64>,
    pub base_y: Option<f64>,
    pub tool_z_offset: Option<f64>,
    pub hover_height: Option<f64>,
    pub horizontal_yaw_deg: Option<f64>,
    pub vertical_yaw_deg: Option<f64>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileMotionConfig {
    pub linear_speed: Option<f64>,
    pub joint_speed: Option<f64>,
    pub linear_accel: Option<f64>,
    pub joint_accel: Option<f64>,
    pub precision_speed: Option<f64>,
    pub home_joints: Option<[f64; 6]>,
    pub start_joints: Option<[f64; 6]>,
}

/// World poses as `[x, y, z, rx, ry, rz]` in millimetres and degrees.
#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileFramePoses {
    pub world: Option<[f64; 6]>,
    pub magazine: Option<[f64; 6]>,
    pub structure: Option<[f64; 6]>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileCellConfig {
    pub robot: Option<String>,
    pub tool: Option<String>,
    pub world_frame: Option<String>,
    pub magazine_frame: Option<String>,
    pub structure_frame: Option<String>,
    pub unit_item_template: Option<String>,
    pub frames: Option<FileFramePoses>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub build: Option<FileBuildConfig>,
    pub unit: Option<FileUnitConfig>,
    pub magazine: Option<FileMagazineConfig>,
    pub structure: Option<FileStructureConfig>,
    pub motion: Option<FileMotionConfig>,
    pub cell: Option<FileCellConfig>,
}

impl FileConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    pub fn from_toml(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}
