use super::defaults::DefaultsConfig;
use super::file::FileConfig;
use super::models::AppConfig;
use crate::cli::ConfigArgs;
use crate::error::{CliError, Result};
use std::str::FromStr;
use towerstack::core::models::unit::UnitDimensions;
use towerstack::core::robot::SpeedProfile;
use towerstack::core::utils::geometry::PoseFrame;
use towerstack::engine::config::{
    BuildConfigBuilder, CellNames, MagazineConfig, MotionConfig, StructureConfig,
};
use towerstack::engine::error::EngineError;
use towerstack::workflows::simulate::CellFrames;
use tracing::debug;

/// Resolves the final configuration: `--set` values over CLI flags over the file over
/// the reference defaults.
pub fn build_config(args: &ConfigArgs) -> Result<AppConfig> {
    let defaults = DefaultsConfig::default();

    let mut file_config = if let Some(config_path) = &args.config {
        FileConfig::from_file(config_path)?
    } else {
        FileConfig::default()
    };
    if let Some(count) = args.unit_count {
        file_config
            .build
            .get_or_insert_with(Default::default)
            .unit_count = Some(count);
    }
    let mut file_config = apply_set_values(file_config, &args.set_values)?;

    let build_file = file_config.build.take().unwrap_or_default();
    let unit_count = build_file.unit_count.unwrap_or(defaults.unit_count);

    let unit_file = file_config.unit.take().unwrap_or_default();
    let unit = UnitDimensions::new(
        unit_file.length.unwrap_or(defaults.unit_length),
        unit_file.width.unwrap_or(defaults.unit_width),
        unit_file.height.unwrap_or(defaults.unit_height),
    );

    let mag_file = file_config.magazine.take().unwrap_or_default();
    let magazine = MagazineConfig {
        row_capacities: mag_file
            .row_capacities
            .unwrap_or_else(|| defaults.row_capacities.clone()),
        row_offsets_y: mag_file
            .row_offsets_y
            .unwrap_or_else(|| defaults.row_offsets_y.clone()),
        offset_x: mag_file.offset_x.unwrap_or(defaults.magazine_offset_x),
        pitch: mag_file.pitch.unwrap_or(defaults.magazine_pitch),
        z_pick: mag_file.z_pick.unwrap_or(defaults.z_pick),
        z_hover: mag_file.z_hover.unwrap_or(defaults.z_hover),
    };

    let struct_file = file_config.structure.take().unwrap_or_default();
    let structure = StructureConfig {
        units_per_layer: struct_file
            .units_per_layer
            .unwrap_or(defaults.units_per_layer),
        base_x: struct_file.base_x.unwrap_or(defaults.base_x),
        base_y: struct_file.base_y.unwrap_or(defaults.base_y),
        tool_z_offset: struct_file.tool_z_offset.unwrap_or(defaults.tool_z_offset),
        hover_height: struct_file.hover_height.unwrap_or(defaults.hover_height),
        horizontal_yaw: struct_file
            .horizontal_yaw_deg
            .unwrap_or(defaults.horizontal_yaw_deg)
            .to_radians(),
        vertical_yaw: struct_file
            .vertical_yaw_deg
            .unwrap_or(defaults.vertical_yaw_deg)
            .to_radians(),
    };

    let motion_file = file_config.motion.take().unwrap_or_default();
    let motion = MotionConfig {
        nominal: SpeedProfile {
            linear: motion_file.linear_speed.unwrap_or(defaults.linear_speed),
            joint: motion_file.joint_speed.unwrap_or(defaults.joint_speed),
            linear_accel: motion_file.linear_accel.unwrap_or(defaults.linear_accel),
            joint_accel: motion_file.joint_accel.unwrap_or(defaults.joint_accel),
        },
        precision_speed: motion_file
            .precision_speed
            .unwrap_or(defaults.precision_speed),
        home_joints: motion_file.home_joints.unwrap_or(defaults.home_joints),
        start_joints: motion_file.start_joints.unwrap_or(defaults.start_joints),
    };

    let mut cell_file = file_config.cell.take().unwrap_or_default();
    let frame_file = cell_file.frames.take().unwrap_or_default();
    let names = CellNames {
        robot: cell_file.robot.unwrap_or(defaults.robot),
        tool: cell_file.tool.unwrap_or(defaults.tool),
        world_frame: cell_file.world_frame.unwrap_or(defaults.world_frame),
        magazine_frame: cell_file.magazine_frame.unwrap_or(defaults.magazine_frame),
        structure_frame: cell_file.structure_frame.unwrap_or(defaults.structure_frame),
        unit_item_template: cell_file
            .unit_item_template
            .unwrap_or(defaults.unit_item_template),
    };
    let frames = CellFrames {
        world: PoseFrame::from_xyzrpw(frame_file.world.unwrap_or(defaults.world_pose)),
        magazine: PoseFrame::from_xyzrpw(frame_file.magazine.unwrap_or(defaults.magazine_pose)),
        structure: PoseFrame::from_xyzrpw(
            frame_file.structure.unwrap_or(defaults.structure_pose),
        ),
    };

    let build = BuildConfigBuilder::new()
        .unit_count(unit_count)
        .unit(unit)
        .magazine(magazine)
        .structure(structure)
        .motion(motion)
        .names(names)
        .build()
        .map_err(EngineError::from)?;

    debug!(units = build.unit_count, "Configuration resolved");
    Ok(AppConfig { build, frames })
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| {
        CliError::Config(format!(
            "Invalid value for {}: '{}' ({})",
            key,
            value,
            std::any::type_name::<T>()
        ))
    })
}

fn apply_set_values(mut file_config: FileConfig, set_values: &[String]) -> Result<FileConfig> {
    for kv_pair in set_values {
        let Some((key, value)) = kv_pair.split_once('=') else {
            return Err(CliError::Config(format!(
                "Invalid --set format: '{}'. Expected KEY=VALUE.",
                kv_pair
            )));
        };
        let key = key.trim();

        match key {
            "build.unit-count" => {
                file_config
                    .build
                    .get_or_insert_with(Default::default)
                    .unit_count = Some(parse_value(key, value)?);
            }
            "unit.length" | "unit.width" | "unit.height" => {
                let unit = file_config.unit.get_or_insert_with(Default::default);
                let parsed = Some(parse_value(key, value)?);
                match key {
                    "unit.length" => unit.length = parsed,
                    "unit.width" => unit.width = parsed,
                    _ => unit.height = parsed,
                }
            }
            "magazine.offset-x" | "magazine.pitch" | "magazine.z-pick" | "magazine.z-hover" => {
                let magazine = file_config.magazine.get_or_insert_with(Default::default);
                let parsed = Some(parse_value(key, value)?);
                match key {
                    "magazine.offset-x" => magazine.offset_x = parsed,
                    "magazine.pitch" => magazine.pitch = parsed,
                    "magazine.z-pick" => magazine.z_pick = parsed,
                    _ => magazine.z_hover = parsed,
                }
            }
            "structure.units-per-layer" => {
                file_config
                    .structure
                    .get_or_insert_with(Default::default)
                    .units_per_layer = Some(parse_value(key, value)?);
            }
            "structure.base-x"
            | "structure.base-y"
            | "structure.tool-z-offset"
            | "structure.hover-height"
            | "structure.horizontal-yaw-deg"
            | "structure.vertical-yaw-deg" => {
                let structure = file_config.structure.get_or_insert_with(Default::default);
                let parsed = Some(parse_value(key, value)?);
                match key {
                    "structure.base-x" => structure.base_x = parsed,
                    "structure.base-y" => structure.base_y = parsed,
                    "structure.tool-z-offset" => structure.tool_z_offset = parsed,
                    "structure.hover-height" => structure.hover_height = parsed,
                    "structure.horizontal-yaw-deg" => structure.horizontal_yaw_deg = parsed,
                    _ => structure.vertical_yaw_deg = parsed,
                }
            }
            "motion.linear-speed"
            | "motion.joint-speed"
            | "motion.linear-accel"
            | "motion.joint-accel"
            | "motion.precision-speed" => {
                let motion = file_config.motion.get_or_insert_with(Default::default);
                let parsed = Some(parse_value(key, value)?);
                match key {
                    "motion.linear-speed" => motion.linear_speed = parsed,
                    "motion.joint-speed" => motion.joint_speed = parsed,
                    "motion.linear-accel" => motion.linear_accel = parsed,
                    "motion.joint-accel" => motion.joint_accel = parsed,
                    _ => motion.precision_speed = parsed,
                }
            }
            "cell.robot"
            | "cell.tool"
            | "cell.world-frame"
            | "cell.magazine-frame"
            | "cell.structure-frame"
            | "cell.unit-item-template" => {
                let cell = file_config.cell.get_or_insert_with(Default::default);
                let parsed = Some(value.trim().to_string());
                match key {
                    "cell.robot" => cell.robot = parsed,
                    "cell.tool" => cell.tool = parsed,
                    "cell.world-frame" => cell.world_frame = parsed,
                    "cell.magazine-frame" => cell.magazine_frame = parsed,
                    "cell.structure-frame" => cell.structure_frame = parsed,
                    _ => cell.unit_item_template = parsed,
                }
            }
            _ => {
                return Err(CliError::Config(format!(
                    "Unsupported configuration key for --set: '{}'",
                    key
                )));
            }
        }
    }
    Ok(file_config)
}
