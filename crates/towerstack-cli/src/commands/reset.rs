use super::build::render_registry;
use crate::cli::ResetArgs;
use crate::config::build_config;
use crate::error::Result;
use crate::utils::progress::CliProgressHandler;
use towerstack::core::robot::sim::SimulatedCell;
use towerstack::engine::progress::ProgressReporter;
use towerstack::workflows::build::{BuildOrchestrator, OrchestratorOptions};
use towerstack::workflows::reset::assembled_registry;
use tracing::info;

pub fn run(args: ResetArgs) -> Result<()> {
    let app = build_config(&args.config)?;
    let mut cell = SimulatedCell::assembled(&app.build, &app.frames);
    let registry = assembled_registry(&app.build)?;

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!(
        "Taking down a tower of {} unit(s) on the simulated cell...",
        app.build.unit_count
    );
    let mut orchestrator = BuildOrchestrator::new(&app.build, &mut cell)
        .with_registry(registry)
        .with_options(OrchestratorOptions {
            retry_attempts: args.retries,
            stop_flag: None,
        });
    let outcome = orchestrator.reset(&reporter);

    print!("{}", render_registry(orchestrator.registry()));
    let report = outcome?;

    info!(cycles = report.cycles.len(), "Reset finished");
    println!(
        "✓ {} unit(s) returned to '{}' ({} retry attempt(s)).",
        report.cycles.len(),
        app.build.names.magazine_frame,
        report.retries()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::ConfigArgs;
    use crate::error::CliError;

    #[test]
    fn simulated_reset_succeeds_with_defaults() {
        let args = ResetArgs {
            config: ConfigArgs {
                unit_count: Some(9),
                ..Default::default()
            },
            retries: 0,
        };
        assert!(run(args).is_ok());
    }

    #[test]
    fn invalid_configuration_is_reported_before_moving() {
        let args = ResetArgs {
            config: ConfigArgs {
                set_values: vec!["structure.units-per-layer=0".to_string()],
                ..Default::default()
            },
            retries: 0,
        };
        assert!(matches!(run(args), Err(CliError::Engine(_))));
    }
}
