use crate::cli::PlanArgs;
use crate::config::build_config;
use crate::error::Result;
use std::fmt::Write;
use towerstack::core::utils::geometry::PoseFrame;
use towerstack::engine::error::EngineError;
use towerstack::workflows::plan::{CyclePlan, plan};
use tracing::info;

pub fn run(args: PlanArgs) -> Result<()> {
    let app = build_config(&args.config)?;
    info!(units = app.build.unit_count, "Planning build");

    let cycles = plan(&app.build, app.frames.magazine, app.frames.structure)
        .map_err(EngineError::from)?;

    print!("{}", render_plan(&cycles));
    println!(
        "{} cycle(s), {} layer(s).",
        cycles.len(),
        cycles
            .last()
            .map_or(0, |c| c.structure_slot.layer + 1)
    );
    Ok(())
}

fn pose_columns(pose: &PoseFrame) -> String {
    let [x, y, z, rx, ry, rz] = pose.to_xyzrpw();
    format!("{x:>8.1} {y:>8.1} {z:>7.1} {rx:>7.1} {ry:>7.1} {rz:>7.1}")
}

/// One row per cycle: slots, then the contact poses of pick and place in world
/// coordinates (mm, deg).
pub fn render_plan(cycles: &[CyclePlan]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>4} {:>7} {:>11} | {:^48} | {:^48}",
        "unit", "mag", "layer", "pick x/y/z rx/ry/rz", "place x/y/z rx/ry/rz"
    );
    for cycle in cycles {
        let mag = format!(
            "{}:{}",
            cycle.magazine_slot.row, cycle.magazine_slot.index_in_row
        );
        let layer = format!(
            "{}:{} {}",
            cycle.structure_slot.layer,
            cycle.structure_slot.index_in_layer,
            if cycle.structure_slot.index_in_layer == 0 {
                cycle.structure_slot.orientation.to_string()
            } else {
                String::new()
            }
        );
        let _ = writeln!(
            out,
            "{:>4} {:>7} {:<11} | {} | {}",
            cycle.unit.get(),
            mag,
            layer.trim_end(),
            pose_columns(&cycle.pick.exact),
            pose_columns(&cycle.place.exact)
        );
    }
    out
}
