use crate::cli::BuildArgs;
use crate::config::build_config;
use crate::error::{CliError, Result};
use crate::utils::progress::CliProgressHandler;
use std::fmt::Write;
use towerstack::core::models::ids::UnitId;
use towerstack::core::robot::sim::SimulatedCell;
use towerstack::engine::error::EngineError;
use towerstack::engine::progress::ProgressReporter;
use towerstack::engine::registry::UnitRegistry;
use towerstack::engine::state::UnitPlacementState;
use towerstack::workflows::build::{BuildOrchestrator, OrchestratorOptions};
use tracing::{info, warn};

pub fn run(args: BuildArgs) -> Result<()> {
    let app = build_config(&args.config)?;
    let mut cell = SimulatedCell::stocked(&app.build, &app.frames);

    if let Some(ordinal) = args.fail_at_pick {
        let unit = UnitId::new(ordinal)
            .ok_or_else(|| CliError::Argument("--fail-at-pick ordinals start at 1".to_string()))?;
        let pose = app
            .build
            .magazine_layout(app.frames.magazine)
            .pick_pose(unit)
            .map_err(EngineError::from)?;
        warn!(%unit, "Injecting an unreachable pick pose");
        cell.make_unreachable(pose);
    }

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!(
        "Starting build of {} unit(s) on the simulated cell...",
        app.build.unit_count
    );
    let mut orchestrator =
        BuildOrchestrator::new(&app.build, &mut cell).with_options(OrchestratorOptions {
            retry_attempts: args.retries,
            stop_flag: None,
        });
    let outcome = orchestrator.build(&reporter);

    print!("{}", render_registry(orchestrator.registry()));
    let report = outcome?;

    info!(cycles = report.cycles.len(), "Build finished");
    println!(
        "✓ {} unit(s) placed in '{}' ({} retry attempt(s)).",
        orchestrator.registry().placed_count(),
        app.build.names.structure_frame,
        report.retries()
    );
    Ok(())
}

/// Final state of every unit; placed units show their structure-local position.
pub fn render_registry(registry: &UnitRegistry) -> String {
    let mut out = String::new();
    for (unit, state) in registry.iter() {
        let _ = match state {
            UnitPlacementState::PlacedAt { frame, local_pose } => writeln!(
                out,
                "{:>4}  {:<12} {:<12} {:>8.1} {:>8.1} {:>7.1}",
                unit.get(),
                state.name(),
                frame,
                local_pose.x(),
                local_pose.y(),
                local_pose.z()
            ),
            other => writeln!(out, "{:>4}  {:<12}", unit.get(), other.name()),
        };
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::ConfigArgs;
    use towerstack::core::utils::geometry::PoseFrame;
    use towerstack::workflows::build::BuildError;

    fn build_args(fail_at_pick: Option<u32>) -> BuildArgs {
        BuildArgs {
            config: ConfigArgs {
                unit_count: Some(6),
                ..Default::default()
            },
            retries: 0,
            fail_at_pick,
        }
    }

    #[test]
    fn registry_table_lists_every_unit() {
        let mut registry = UnitRegistry::new(3);
        let first = UnitId::new(1).unwrap();
        registry.mark_grasped(first).unwrap();
        registry
            .mark_placed(first, "TowerFrame", PoseFrame::translation(70.0, 44.5, 15.0))
            .unwrap();

        let table = render_registry(&registry);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("placed"));
        assert!(lines[0].contains("TowerFrame"));
        assert!(lines[0].contains("44.5"));
        assert!(lines[1].contains("in-magazine"));
    }

    #[test]
    fn simulated_build_succeeds_with_defaults() {
        assert!(run(build_args(None)).is_ok());
    }

    #[test]
    fn injected_pick_failure_is_reported_with_its_ordinal() {
        match run(build_args(Some(4))) {
            Err(CliError::Build(BuildError::CycleFailed { ordinal, .. })) => assert_eq!(ordinal, 4),
            Err(other) => panic!("unexpected error: {other}"),
            Ok(()) => panic!("build should fail at ordinal 4"),
        }
    }

    #[test]
    fn zero_ordinal_is_an_argument_error() {
        assert!(matches!(
            run(build_args(Some(0))),
            Err(CliError::Argument(_))
        ));
    }
}
