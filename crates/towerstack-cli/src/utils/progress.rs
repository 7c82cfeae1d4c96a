use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use towerstack::core::models::ids::UnitId;
use towerstack::engine::progress::{Progress, ProgressCallback};
use towerstack::engine::state::Phase;

const BAR_TEMPLATE: &str = "{prefix:>10.bold} [{bar:30.cyan/blue}] {pos}/{len} units  {msg}";

/// Terminal view of a build or a reset.
///
/// One bar counts finished units. The prefix names the running workflow phase and the
/// message shows the layer and the pick or place in progress. The bar stays hidden until
/// the first cycle is announced, so validation and planning print nothing.
#[derive(Clone)]
pub struct CliProgressHandler {
    bar: ProgressBar,
}

impl CliProgressHandler {
    pub fn new() -> Self {
        let bar = ProgressBar::with_draw_target(Some(0), ProgressDrawTarget::hidden())
            .with_style(cycle_style());
        Self { bar }
    }

    pub fn get_callback(&self) -> ProgressCallback<'static> {
        let bar = self.bar.clone();

        Box::new(move |progress: Progress| match progress {
            Progress::PhaseStart { name } => bar.set_prefix(name),
            Progress::PhaseFinish => {}
            Progress::TaskStart { total_steps } => {
                bar.reset();
                bar.set_length(total_steps);
                bar.set_draw_target(ProgressDrawTarget::stderr());
            }
            Progress::CycleStarted { unit, phase, layer } => {
                bar.set_message(cycle_message(unit, phase, layer));
            }
            Progress::TaskIncrement => bar.inc(1),
            Progress::TaskFinish => {
                let done = bar.position();
                bar.finish_with_message(format!("✓ {done} unit(s) done"));
            }
        })
    }
}

impl Default for CliProgressHandler {
    fn default() -> Self {
        Self::new()
    }
}

fn cycle_message(unit: UnitId, phase: Phase, layer: usize) -> String {
    format!("layer {layer}: {phase} {unit}")
}

fn cycle_style() -> ProgressStyle {
    ProgressStyle::with_template(BAR_TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn unit(n: u32) -> UnitId {
        UnitId::new(n).unwrap()
    }

    #[test]
    fn handler_starts_empty() {
        let handler = CliProgressHandler::new();
        assert_eq!(handler.bar.length(), Some(0));
        assert_eq!(handler.bar.position(), 0);
        assert!(handler.bar.message().is_empty());
    }

    #[test]
    fn build_events_drive_the_bar() {
        let handler = CliProgressHandler::new();
        let callback = handler.get_callback();

        callback(Progress::PhaseStart { name: "Building" });
        callback(Progress::TaskStart { total_steps: 15 });
        callback(Progress::CycleStarted {
            unit: unit(4),
            phase: Phase::Pick,
            layer: 1,
        });
        assert_eq!(handler.bar.prefix(), "Building");
        assert_eq!(handler.bar.length(), Some(15));
        assert_eq!(handler.bar.message(), "layer 1: pick #4");

        callback(Progress::CycleStarted {
            unit: unit(4),
            phase: Phase::Place,
            layer: 1,
        });
        callback(Progress::TaskIncrement);
        assert_eq!(handler.bar.position(), 1);
        assert_eq!(handler.bar.message(), "layer 1: place #4");

        callback(Progress::TaskFinish);
        callback(Progress::PhaseFinish);
        assert!(handler.bar.is_finished());
        assert_eq!(handler.bar.message(), "✓ 1 unit(s) done");
    }

    #[test]
    fn a_new_task_restarts_the_count() {
        let handler = CliProgressHandler::new();
        let callback = handler.get_callback();

        callback(Progress::TaskStart { total_steps: 3 });
        callback(Progress::TaskIncrement);
        callback(Progress::TaskIncrement);
        callback(Progress::PhaseStart { name: "Resetting" });
        callback(Progress::TaskStart { total_steps: 2 });

        assert_eq!(handler.bar.prefix(), "Resetting");
        assert_eq!(handler.bar.position(), 0);
        assert_eq!(handler.bar.length(), Some(2));
    }

    #[test]
    fn callback_can_run_on_another_thread() {
        let handler = CliProgressHandler::new();
        let callback = handler.get_callback();

        thread::spawn(move || {
            callback(Progress::TaskStart { total_steps: 2 });
            callback(Progress::TaskIncrement);
        })
        .join()
        .unwrap();

        assert_eq!(handler.bar.position(), 1);
    }
}
