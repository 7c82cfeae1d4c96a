use crate::error::Result;
use std::fs::File;
use std::path::PathBuf;
use tracing::Subscriber;
use tracing_subscriber::filter::{LevelFilter, Targets};
use tracing_subscriber::fmt::{self, format::FmtSpan};
use tracing_subscriber::layer::Layer;
use tracing_subscriber::prelude::*;
use tracing_subscriber::Registry;
use tracing_subscriber::registry::LookupSpan;

/// Module path prefix of the library and of this binary.
const CRATE_TARGET: &str = "towerstack";

/// `-q` keeps errors only; each `-v` adds one level on top of warnings.
fn console_level(verbosity: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::ERROR;
    }
    match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

/// The log file never records less than DEBUG, so every cycle of a failed build can be
/// traced afterwards whatever the console showed.
fn file_level(verbosity: u8) -> LevelFilter {
    console_level(verbosity, false).max(LevelFilter::DEBUG)
}

/// Workflow spans (`build_workflow`, `reset_workflow`, `plan_workflow`) are logged when they
/// close, with their duration.
fn file_layer<S>(file: File, verbosity: u8) -> impl Layer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fmt::layer()
        .with_writer(file)
        .with_ansi(false)
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_filter(Targets::new().with_target(CRATE_TARGET, file_level(verbosity)))
}

pub fn setup_logging(verbosity: u8, quiet: bool, log_file: Option<PathBuf>) -> Result<()> {
    let console = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .compact()
        .with_filter(
            Targets::new().with_target(CRATE_TARGET, console_level(verbosity, quiet)),
        );

    let file = match log_file {
        Some(path) => Some(file_layer::<Registry>(File::create(&path)?, verbosity)),
        None => None,
    };

    tracing_subscriber::registry().with(file).with(console).init();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CliError;
    use serial_test::serial;
    use tracing::{debug, info, info_span, trace};

    #[test]
    fn verbosity_maps_to_console_levels() {
        assert_eq!(console_level(0, false), LevelFilter::WARN);
        assert_eq!(console_level(1, false), LevelFilter::INFO);
        assert_eq!(console_level(2, false), LevelFilter::DEBUG);
        assert_eq!(console_level(7, false), LevelFilter::TRACE);
        assert_eq!(console_level(3, true), LevelFilter::ERROR);
    }

    #[test]
    fn file_level_is_at_least_debug() {
        assert_eq!(file_level(0), LevelFilter::DEBUG);
        assert_eq!(file_level(2), LevelFilter::DEBUG);
        assert_eq!(file_level(3), LevelFilter::TRACE);
    }

    #[test]
    #[serial]
    fn file_layer_records_cycles_and_workflow_durations() {
        let temp_dir = tempfile::tempdir().unwrap();
        let log_path = temp_dir.path().join("build.log");
        let file = File::create(&log_path).unwrap();
        let subscriber = tracing_subscriber::registry().with(file_layer::<Registry>(file, 0));

        tracing::subscriber::with_default(subscriber, || {
            let span = info_span!(target: "towerstack::workflows::build", "build_workflow");
            let _guard = span.enter();
            debug!(target: "towerstack::engine::sequencer", unit = "#7", "Pick cycle");
            trace!(target: "towerstack::core::robot::sim", "sim: move joint");
            info!(target: "other_crate", "not ours");
        });

        let content = std::fs::read_to_string(log_path).unwrap();
        assert!(content.contains("Pick cycle"));
        assert!(content.contains("unit=\"#7\""));
        assert!(content.contains("build_workflow"));
        assert!(content.contains("close"));
        assert!(!content.contains("sim: move joint"));
        assert!(!content.contains("not ours"));
    }

    #[test]
    #[serial]
    fn unwritable_log_file_is_an_io_error() {
        let invalid_path = PathBuf::from("/");
        if cfg!(unix) && invalid_path.is_dir() {
            let result = setup_logging(0, false, Some(invalid_path));
            assert!(matches!(result, Err(CliError::Io(_))));
        }
    }
}
