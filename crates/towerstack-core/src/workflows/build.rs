use super::plan::{CyclePlan, plan};
use crate::core::layout::LayoutError;
use crate::core::models::ids::UnitId;
use crate::core::robot::RobotCell;
use crate::engine::config::BuildConfig;
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::registry::UnitRegistry;
use crate::engine::sequencer::MotionSequencer;
use crate::engine::state::{Phase, UnitPlacementState};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;
use tracing::{info, instrument, warn};

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Build setup failed: {0}")]
    Setup(#[from] EngineError),

    #[error("Build could not be planned: {0}")]
    Planning(#[from] LayoutError),

    #[error("Unit {unit} is {state}; a build starts with every unit in the magazine")]
    NotReady { unit: UnitId, state: &'static str },

    #[error(
        "{phase} of unit {unit} (ordinal {ordinal}) failed after {attempts} attempt(s): {source}"
    )]
    CycleFailed {
        unit: UnitId,
        ordinal: usize,
        phase: Phase,
        attempts: u32,
        #[source]
        source: EngineError,
    },

    #[error("Build stopped on request before ordinal {next_ordinal}")]
    Stopped { next_ordinal: usize },
}

#[derive(Debug, Clone, Default)]
pub struct OrchestratorOptions {
    /// Extra attempts granted to a failed pick or place, each started from home.
    pub retry_attempts: u32,
    /// Checked between cycles; once set, no further cycle is started.
    pub stop_flag: Option<Arc<AtomicBool>>,
}

/// Attempts a unit's cycle took. In a reset, the pick is the lift off the structure and the
/// place is the return to the magazine; a phase that was not needed counts zero attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleRecord {
    pub unit: UnitId,
    pub pick_attempts: u32,
    pub place_attempts: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    pub cycles: Vec<CycleRecord>,
}

impl BuildReport {
    pub fn retries(&self) -> u32 {
        self.cycles
            .iter()
            .map(|c| c.pick_attempts.saturating_sub(1) + c.place_attempts.saturating_sub(1))
            .sum()
    }
}

/// Builds the structure one unit at a time, in strictly ascending order.
///
/// The first unrecovered failure aborts the build. Units already placed stay placed and
/// registered; nothing is rolled back. [`reset`](Self::reset) takes a structure down
/// again, after which the same orchestrator can build once more.
pub struct BuildOrchestrator<'a, B: RobotCell> {
    pub(super) config: &'a BuildConfig,
    pub(super) cell: &'a mut B,
    pub(super) registry: UnitRegistry,
    pub(super) options: OrchestratorOptions,
}

impl<'a, B: RobotCell> BuildOrchestrator<'a, B> {
    /// Starts from a registry with every configured unit in the magazine.
    pub fn new(config: &'a BuildConfig, cell: &'a mut B) -> Self {
        Self {
            config,
            cell,
            registry: UnitRegistry::new(config.unit_count),
            options: OrchestratorOptions::default(),
        }
    }

    pub fn with_options(mut self, options: OrchestratorOptions) -> Self {
        self.options = options;
        self
    }

    /// Replaces the registry, for a cell whose units are not all in the magazine.
    pub fn with_registry(mut self, registry: UnitRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn registry(&self) -> &UnitRegistry {
        &self.registry
    }

    pub fn cell(&self) -> &B {
        &*self.cell
    }

    #[instrument(skip_all, name = "build_workflow", fields(units = self.config.unit_count))]
    pub fn build(&mut self, reporter: &ProgressReporter) -> Result<BuildReport, BuildError> {
        self.ensure_stocked()?;
        let cycles = self.prepare(reporter)?;

        // === Phase 3: Cycles ===
        reporter.report(Progress::PhaseStart { name: "Building" });
        let mut sequencer = MotionSequencer::new(&mut *self.cell, self.config);
        sequencer.initialize()?;
        info!(cycles = cycles.len(), "Robot initialised, starting build.");

        reporter.report(Progress::TaskStart {
            total_steps: cycles.len() as u64,
        });
        let stop_flag = self.options.stop_flag.clone();
        let mut report = BuildReport::default();
        for cycle in &cycles {
            let ordinal = cycle.unit.ordinal();
            if stop_requested(stop_flag.as_deref()) {
                warn!(next_ordinal = ordinal, "Stop requested, not starting next cycle");
                return Err(BuildError::Stopped {
                    next_ordinal: ordinal,
                });
            }
            let record = run_cycle(
                &mut sequencer,
                &mut self.registry,
                cycle,
                self.options.retry_attempts,
                reporter,
            )?;
            info!(unit = %cycle.unit, ordinal, layer = cycle.structure_slot.layer, "Unit placed");
            report.cycles.push(record);
            reporter.report(Progress::TaskIncrement);
        }
        reporter.report(Progress::TaskFinish);
        reporter.report(Progress::PhaseFinish);

        info!(
            placed = self.registry.placed_count(),
            retries = report.retries(),
            "Build complete."
        );
        Ok(report)
    }

    /// Validates the cell, resolves both frames and plans every cycle, all before the robot
    /// receives its first command.
    pub(super) fn prepare(
        &mut self,
        reporter: &ProgressReporter,
    ) -> Result<Vec<CyclePlan>, BuildError> {
        // === Phase 1: Cell validation ===
        reporter.report(Progress::PhaseStart {
            name: "Validating Cell",
        });
        self.validate_cell()?;
        let names = &self.config.names;
        let magazine_frame = self
            .cell
            .resolve_frame(&names.magazine_frame)
            .map_err(EngineError::from)?;
        let structure_frame = self
            .cell
            .resolve_frame(&names.structure_frame)
            .map_err(EngineError::from)?;
        reporter.report(Progress::PhaseFinish);

        // === Phase 2: Planning ===
        reporter.report(Progress::PhaseStart { name: "Planning" });
        let cycles = plan(self.config, magazine_frame, structure_frame)?;
        reporter.report(Progress::PhaseFinish);
        Ok(cycles)
    }

    /// A build only starts when every configured unit is waiting in the magazine.
    fn ensure_stocked(&self) -> Result<(), BuildError> {
        for unit in self.config.units() {
            let state = self.registry.state(unit.id).map_err(EngineError::from)?;
            if *state != UnitPlacementState::InMagazine {
                return Err(BuildError::NotReady {
                    unit: unit.id,
                    state: state.name(),
                });
            }
        }
        Ok(())
    }

    /// Every name the build refers to must exist before the robot moves.
    fn validate_cell(&self) -> Result<(), EngineError> {
        let names = &self.config.names;
        let fixed = [
            &names.robot,
            &names.tool,
            &names.world_frame,
            &names.magazine_frame,
            &names.structure_frame,
        ]
        .into_iter()
        .cloned();
        let units = self
            .config
            .units()
            .map(|unit| names.unit_item_name(unit.id));

        let missing: Vec<String> = fixed
            .chain(units)
            .filter(|name| !self.cell.contains(name))
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(EngineError::Configuration(format!(
                "missing from the cell: {}",
                missing.join(", ")
            )))
        }
    }
}

pub(super) fn stop_requested(flag: Option<&AtomicBool>) -> bool {
    flag.is_some_and(|flag| flag.load(Ordering::SeqCst))
}

fn run_cycle<B: RobotCell>(
    sequencer: &mut MotionSequencer<'_, B>,
    registry: &mut UnitRegistry,
    cycle: &CyclePlan,
    retry_attempts: u32,
    reporter: &ProgressReporter,
) -> Result<CycleRecord, BuildError> {
    let unit = cycle.unit;
    let layer = cycle.structure_slot.layer;

    reporter.report(Progress::CycleStarted {
        unit,
        phase: Phase::Pick,
        layer,
    });
    let pick_attempts = with_retries(sequencer, retry_attempts, unit, Phase::Pick, |seq| {
        seq.run_pick(unit, &cycle.pick, registry)
    })?;

    reporter.report(Progress::CycleStarted {
        unit,
        phase: Phase::Place,
        layer,
    });
    let place_attempts = with_retries(sequencer, retry_attempts, unit, Phase::Place, |seq| {
        // Released and reparented before the failure; recovery already brought it home.
        if matches!(registry.state(unit)?, UnitPlacementState::PlacedAt { .. }) {
            return Ok(());
        }
        seq.run_place(unit, &cycle.place, cycle.local_pose, registry)
    })?;

    Ok(CycleRecord {
        unit,
        pick_attempts,
        place_attempts,
    })
}

/// Runs `attempt` until it succeeds or the retries are used up, recovering to home
/// between attempts. Registry errors are never retried. Returns the number of attempts.
pub(super) fn with_retries<'s, B: RobotCell>(
    sequencer: &mut MotionSequencer<'s, B>,
    retry_attempts: u32,
    unit: UnitId,
    phase: Phase,
    mut attempt: impl FnMut(&mut MotionSequencer<'s, B>) -> Result<(), EngineError>,
) -> Result<u32, BuildError> {
    let failed = |attempts: u32, source: EngineError| BuildError::CycleFailed {
        unit,
        ordinal: unit.ordinal(),
        phase,
        attempts,
        source,
    };

    let mut attempts = 0;
    loop {
        attempts += 1;
        match attempt(sequencer) {
            Ok(()) => return Ok(attempts),
            Err(e @ EngineError::Registry(_)) => return Err(failed(attempts, e)),
            Err(e) if attempts > retry_attempts => return Err(failed(attempts, e)),
            Err(e) => {
                warn!(%unit, %phase, attempt = attempts, error = %e, "Cycle failed, retrying from home");
                sequencer.recover().map_err(|e| failed(attempts, e))?;
            }
        }
    }
}
