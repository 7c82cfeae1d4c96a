use crate::core::layout::magazine::MagazineLayout;
use crate::core::layout::structure::StructureLayout;
use crate::core::models::ids::UnitId;
use crate::core::models::unit::{Unit, UnitDimensions};
use crate::core::robot::SpeedProfile;
use crate::core::utils::geometry::PoseFrame;
use thiserror::Error;

pub use crate::core::layout::magazine::MagazineConfig;
pub use crate::core::layout::structure::StructureConfig;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Invalid value for parameter '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct MotionConfig {
    /// Profile applied at initialisation and restored after every precision segment.
    pub nominal: SpeedProfile,
    /// Linear speed of the hover-to-contact segment and its reverse, mm/s.
    pub precision_speed: f64,
    pub home_joints: [f64; 6],
    /// Joint values the robot is set to before the first move.
    pub start_joints: [f64; 6],
}

/// Names under which the cell's robot, tool, frames and units are registered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellNames {
    pub robot: String,
    pub tool: String,
    pub world_frame: String,
    pub magazine_frame: String,
    pub structure_frame: String,
    /// Item name of a unit; `{n}` is replaced by the unit number.
    pub unit_item_template: String,
}

impl CellNames {
    pub fn unit_item_name(&self, unit: UnitId) -> String {
        self.unit_item_template.replace("{n}", &unit.get().to_string())
    }
}

/// Everything a build needs, fixed for its whole duration.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildConfig {
    pub unit_count: usize,
    pub unit: UnitDimensions,
    pub magazine: MagazineConfig,
    pub structure: StructureConfig,
    pub motion: MotionConfig,
    pub names: CellNames,
}

impl BuildConfig {
    pub fn magazine_layout(&self, frame: PoseFrame) -> MagazineLayout<'_> {
        MagazineLayout::new(&self.magazine, frame)
    }

    pub fn structure_layout(&self, frame: PoseFrame) -> StructureLayout<'_> {
        StructureLayout::new(&self.structure, self.unit, self.unit_count, frame)
    }

    /// Units in build order.
    pub fn units(&self) -> impl Iterator<Item = Unit> + '_ {
        UnitId::first_n(self.unit_count).map(|id| Unit::new(id, self.unit))
    }
}

#[derive(Default)]
pub struct BuildConfigBuilder {
    unit_count: Option<usize>,
    unit: Option<UnitDimensions>,
    magazine: Option<MagazineConfig>,
    structure: Option<StructureConfig>,
    motion: Option<MotionConfig>,
    names: Option<CellNames>,
}

impl BuildConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unit_count(mut self, count: usize) -> Self {
        self.unit_count = Some(count);
        self
    }

    pub fn unit(mut self, dimensions: UnitDimensions) -> Self {
        self.unit = Some(dimensions);
        self
    }

    pub fn magazine(mut self, magazine: MagazineConfig) -> Self {
        self.magazine = Some(magazine);
        self
    }

    pub fn structure(mut self, structure: StructureConfig) -> Self {
        self.structure = Some(structure);
        self
    }

    pub fn motion(mut self, motion: MotionConfig) -> Self {
        self.motion = Some(motion);
        self
    }

    pub fn names(mut self, names: CellNames) -> Self {
        self.names = Some(names);
        self
    }

    pub fn build(self) -> Result<BuildConfig, ConfigError> {
        let config = BuildConfig {
            unit_count: self
                .unit_count
                .ok_or(ConfigError::MissingParameter("unit_count"))?,
            unit: self.unit.ok_or(ConfigError::MissingParameter("unit"))?,
            magazine: self
                .magazine
                .ok_or(ConfigError::MissingParameter("magazine"))?,
            structure: self
                .structure
                .ok_or(ConfigError::MissingParameter("structure"))?,
            motion: self.motion.ok_or(ConfigError::MissingParameter("motion"))?,
            names: self.names.ok_or(ConfigError::MissingParameter("names"))?,
        };
        validate(&config)?;
        Ok(config)
    }
}

fn invalid(name: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidParameter {
        name,
        reason: reason.into(),
    }
}

fn validate(config: &BuildConfig) -> Result<(), ConfigError> {
    if config.unit_count == 0 {
        return Err(invalid("unit_count", "at least one unit is required"));
    }
    let UnitDimensions {
        length,
        width,
        height,
    } = config.unit;
    if !(length > 0.0 && width > 0.0 && height > 0.0) {
        return Err(invalid("unit", "all dimensions must be positive"));
    }

    let magazine = &config.magazine;
    if magazine.row_capacities.len() != magazine.row_offsets_y.len() {
        return Err(invalid(
            "magazine.row_offsets_y",
            format!(
                "{} row offset(s) given for {} row(s)",
                magazine.row_offsets_y.len(),
                magazine.row_capacities.len()
            ),
        ));
    }
    if config.unit_count > magazine.capacity() {
        return Err(invalid(
            "unit_count",
            format!(
                "{} unit(s) exceed the magazine capacity of {}",
                config.unit_count,
                magazine.capacity()
            ),
        ));
    }
    if magazine.z_hover < magazine.z_pick {
        return Err(invalid("magazine.z_hover", "must not be below z_pick"));
    }

    if config.structure.units_per_layer == 0 {
        return Err(invalid("structure.units_per_layer", "must be at least 1"));
    }
    if config.structure.hover_height < 0.0 {
        return Err(invalid("structure.hover_height", "must not be negative"));
    }

    if config.motion.precision_speed <= 0.0 {
        return Err(invalid("motion.precision_speed", "must be positive"));
    }
    if config.motion.nominal.linear <= 0.0 || config.motion.nominal.joint <= 0.0 {
        return Err(invalid("motion.nominal", "speeds must be positive"));
    }

    if !config.names.unit_item_template.contains("{n}") {
        return Err(invalid(
            "names.unit_item_template",
            "must contain the '{n}' placeholder",
        ));
    }
    Ok(())
}

#[cfg(test)]
pub(crate) fn reference_config() -> BuildConfig {
    use std::f64::consts::{FRAC_PI_2, PI};

    BuildConfigBuilder::new()
        .unit_count(15)
        .unit(UnitDimensions::new(75.0, 25.5, 15.0))
        .magazine(MagazineConfig {
            row_capacities: vec![8, 7],
            row_offsets_y: vec![97.5, 172.5],
            offset_x: 72.5,
            pitch: 25.0,
            z_pick: 15.0,
            z_hover: 45.0,
        })
        .structure(StructureConfig {
            units_per_layer: 3,
            base_x: 70.0,
            base_y: 70.0,
            tool_z_offset: 0.0,
            hover_height: 30.0,
            horizontal_yaw: FRAC_PI_2,
            vertical_yaw: PI,
        })
        .motion(MotionConfig {
            nominal: SpeedProfile {
                linear: 50.0,
                joint: 50.0,
                linear_accel: 50.0,
                joint_accel: 75.0,
            },
            precision_speed: 10.0,
            home_joints: [0.0, 50.0, 50.0, 0.0, 60.0, 0.0],
            start_joints: [0.0, 0.0, 90.0, 0.0, 90.0, 0.0],
        })
        .names(CellNames {
            robot: "Robot".to_string(),
            tool: "VacuumGripper".to_string(),
            world_frame: "World".to_string(),
            magazine_frame: "MagazineFrame".to_string(),
            structure_frame: "TowerFrame".to_string(),
            unit_item_template: "Block {n}".to_string(),
        })
        .build()
        .expect("reference configuration is valid")
}
