use super::build::{
    BuildError, BuildOrchestrator, BuildReport, CycleRecord, stop_requested, with_retries,
};
use super::plan::CyclePlan;
use crate::core::models::ids::UnitId;
use crate::core::robot::RobotCell;
use crate::core::utils::geometry::PoseFrame;
use crate::engine::config::BuildConfig;
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::registry::{RegistryError, UnitRegistry};
use crate::engine::sequencer::MotionSequencer;
use crate::engine::state::{Phase, UnitPlacementState};
use tracing::{info, instrument, warn};

/// Registry of a finished build: every unit placed in the structure at its local pose.
pub fn assembled_registry(config: &BuildConfig) -> Result<UnitRegistry, EngineError> {
    let structure = config.structure_layout(PoseFrame::identity());
    let frame = &config.names.structure_frame;

    let mut registry = UnitRegistry::new(config.unit_count);
    for unit in config.units() {
        let local_pose = structure.unit_local_pose(unit.id)?;
        registry.mark_grasped(unit.id)?;
        registry.mark_placed(unit.id, frame, local_pose)?;
    }
    Ok(registry)
}

impl<'a, B: RobotCell> BuildOrchestrator<'a, B> {
    /// Takes the structure down and refills the magazine.
    ///
    /// A unit still held from an aborted build goes back first. Then every placed unit is
    /// lifted off the structure and returned to its magazine slot, highest ordinal first, so
    /// a unit is never pulled from under another. Units already in the magazine are left
    /// alone. Retries and stop requests behave as in a build.
    #[instrument(skip_all, name = "reset_workflow", fields(units = self.config.unit_count))]
    pub fn reset(&mut self, reporter: &ProgressReporter) -> Result<BuildReport, BuildError> {
        let cycles = self.prepare(reporter)?;

        let held = match self.registry.held() {
            Some(unit) => Some(find_cycle(&cycles, unit)?),
            None => None,
        };
        let placed: Vec<&CyclePlan> = cycles
            .iter()
            .rev()
            .filter(|c| {
                matches!(
                    self.registry.state(c.unit),
                    Ok(UnitPlacementState::PlacedAt { .. })
                )
            })
            .collect();

        // === Phase 3: Reset cycles ===
        reporter.report(Progress::PhaseStart { name: "Resetting" });
        let mut sequencer = MotionSequencer::new(&mut *self.cell, self.config);
        sequencer.initialize()?;
        info!(
            placed = placed.len(),
            held = held.is_some(),
            "Robot initialised, starting reset."
        );

        reporter.report(Progress::TaskStart {
            total_steps: (placed.len() + usize::from(held.is_some())) as u64,
        });
        let retry_attempts = self.options.retry_attempts;
        let mut report = BuildReport::default();

        if let Some(cycle) = held {
            warn!(unit = %cycle.unit, "Returning a unit left in the gripper");
            let place_attempts = return_to_magazine(
                &mut sequencer,
                &mut self.registry,
                cycle,
                retry_attempts,
                reporter,
            )?;
            report.cycles.push(CycleRecord {
                unit: cycle.unit,
                pick_attempts: 0,
                place_attempts,
            });
            reporter.report(Progress::TaskIncrement);
        }

        let stop_flag = self.options.stop_flag.clone();
        for cycle in placed {
            let unit = cycle.unit;
            if stop_requested(stop_flag.as_deref()) {
                warn!(next_ordinal = unit.ordinal(), "Stop requested, not starting next cycle");
                return Err(BuildError::Stopped {
                    next_ordinal: unit.ordinal(),
                });
            }

            reporter.report(Progress::CycleStarted {
                unit,
                phase: Phase::Pick,
                layer: cycle.structure_slot.layer,
            });
            let registry = &mut self.registry;
            let pick_attempts =
                with_retries(&mut sequencer, retry_attempts, unit, Phase::Pick, |seq| {
                    seq.run_lift(unit, &cycle.place, registry)
                })?;
            let place_attempts = return_to_magazine(
                &mut sequencer,
                &mut self.registry,
                cycle,
                retry_attempts,
                reporter,
            )?;

            info!(%unit, layer = cycle.structure_slot.layer, "Unit returned");
            report.cycles.push(CycleRecord {
                unit,
                pick_attempts,
                place_attempts,
            });
            reporter.report(Progress::TaskIncrement);
        }
        reporter.report(Progress::TaskFinish);
        reporter.report(Progress::PhaseFinish);

        info!(
            returned = report.cycles.len(),
            retries = report.retries(),
            "Reset complete."
        );
        Ok(report)
    }
}

fn find_cycle(cycles: &[CyclePlan], unit: UnitId) -> Result<&CyclePlan, EngineError> {
    cycles
        .iter()
        .find(|c| c.unit == unit)
        .ok_or(EngineError::Registry(RegistryError::UnknownUnit(unit)))
}

fn return_to_magazine<B: RobotCell>(
    sequencer: &mut MotionSequencer<'_, B>,
    registry: &mut UnitRegistry,
    cycle: &CyclePlan,
    retry_attempts: u32,
    reporter: &ProgressReporter,
) -> Result<u32, BuildError> {
    let unit = cycle.unit;
    reporter.report(Progress::CycleStarted {
        unit,
        phase: Phase::Place,
        layer: cycle.structure_slot.layer,
    });
    with_retries(sequencer, retry_attempts, unit, Phase::Place, |seq| {
        // Released before the failure; recovery already brought the robot home.
        if *registry.state(unit)? == UnitPlacementState::InMagazine {
            return Ok(());
        }
        seq.run_return(unit, &cycle.pick, registry)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::robot::sim::{CellCommand, SimulatedCell};
    use crate::core::robot::{MotionError, Speed};
    use crate::engine::config::reference_config;
    use crate::workflows::build::OrchestratorOptions;
    use crate::workflows::plan::plan;
    use crate::workflows::simulate::reference_frames;
    use std::sync::atomic::AtomicBool;
    use std::sync::{Arc, Mutex};

    fn id(n: u32) -> UnitId {
        UnitId::new(n).unwrap()
    }

    fn assembled(config: &BuildConfig) -> SimulatedCell {
        SimulatedCell::assembled(config, &reference_frames())
    }

    #[test]
    fn assembled_registry_places_every_unit() {
        let config = reference_config();
        let registry = assembled_registry(&config).unwrap();
        assert_eq!(registry.placed_count(), 15);
        assert_eq!(registry.held(), None);

        let structure = config.structure_layout(PoseFrame::identity());
        assert_eq!(
            registry.local_pose(id(5)),
            Ok(Some(&structure.unit_local_pose(id(5)).unwrap()))
        );
    }

    #[test]
    fn reset_returns_every_unit_highest_first() {
        let config = reference_config();
        let mut cell = assembled(&config);
        let lifted = Mutex::new(Vec::new());
        let reporter = ProgressReporter::with_callback(Box::new(|event| {
            if let Progress::CycleStarted {
                unit,
                phase: Phase::Pick,
                ..
            } = event
            {
                lifted.lock().unwrap().push(unit.get());
            }
        }));

        let mut orchestrator = BuildOrchestrator::new(&config, &mut cell)
            .with_registry(assembled_registry(&config).unwrap());
        let report = orchestrator.reset(&reporter).unwrap();

        assert_eq!(report.cycles.len(), 15);
        assert_eq!(report.retries(), 0);
        assert_eq!(*lifted.lock().unwrap(), (1..=15).rev().collect::<Vec<_>>());
        assert!(
            orchestrator
                .registry()
                .iter()
                .all(|(_, s)| *s == UnitPlacementState::InMagazine)
        );

        let frames = reference_frames();
        for cycle in plan(&config, frames.magazine, frames.structure).unwrap() {
            let name = config.names.unit_item_name(cycle.unit);
            assert_eq!(cell.unit_world_pose(&name), Some(&cycle.pick.exact));
            assert_eq!(cell.unit_parent(&name), Some("MagazineFrame"));
        }
    }

    #[test]
    fn reset_keeps_precision_speed_on_contact_moves() {
        let config = reference_config();
        let mut cell = assembled(&config);
        BuildOrchestrator::new(&config, &mut cell)
            .with_registry(assembled_registry(&config).unwrap())
            .reset(&ProgressReporter::new())
            .unwrap();

        let mut precise = false;
        for command in cell.log() {
            match command {
                CellCommand::SetSpeed(Speed::Linear(_)) => precise = true,
                CellCommand::SetSpeed(Speed::Profile(_)) => precise = false,
                CellCommand::MoveLinear(_) => assert!(precise),
                CellCommand::MoveJoint(_) => assert!(!precise),
                _ => {}
            }
        }
    }

    #[test]
    fn reset_after_an_aborted_build_returns_only_what_moved() {
        let config = reference_config();
        let mut cell = SimulatedCell::stocked(&config, &reference_frames());
        let frames = reference_frames();
        let cycles = plan(&config, frames.magazine, frames.structure).unwrap();
        // Unit 5 is picked, then its place approach fails with the unit in the gripper.
        cell.make_unreachable(cycles[4].place.hover);

        let mut orchestrator = BuildOrchestrator::new(&config, &mut cell);
        assert!(orchestrator.build(&ProgressReporter::new()).is_err());
        assert_eq!(orchestrator.registry().held(), Some(id(5)));
        assert_eq!(orchestrator.registry().placed_count(), 4);

        let report = orchestrator.reset(&ProgressReporter::new()).unwrap();
        let order: Vec<u32> = report.cycles.iter().map(|c| c.unit.get()).collect();
        assert_eq!(order, vec![5, 4, 3, 2, 1]);
        assert_eq!(report.cycles[0].pick_attempts, 0);
        assert_eq!(orchestrator.registry().held(), None);
        assert_eq!(orchestrator.registry().placed_count(), 0);
        assert_eq!(cell.unit_world_pose("Block 5"), Some(&cycles[4].pick.exact));
    }

    #[test]
    fn failed_lift_is_reported_with_its_ordinal() {
        let config = reference_config();
        let mut cell = assembled(&config);
        let frames = reference_frames();
        let cycles = plan(&config, frames.magazine, frames.structure).unwrap();
        cell.make_unreachable(cycles[11].place.hover);

        let mut orchestrator = BuildOrchestrator::new(&config, &mut cell)
            .with_registry(assembled_registry(&config).unwrap());
        let err = orchestrator.reset(&ProgressReporter::new()).unwrap_err();
        assert!(matches!(
            err,
            BuildError::CycleFailed {
                ordinal: 12,
                phase: Phase::Pick,
                source: EngineError::Motion(MotionError::Unreachable { .. }),
                ..
            }
        ));
        assert_eq!(orchestrator.registry().placed_count(), 12);
    }

    #[test]
    fn stop_flag_is_honoured_between_reset_cycles() {
        let config = reference_config();
        let mut cell = assembled(&config);
        let mut orchestrator = BuildOrchestrator::new(&config, &mut cell)
            .with_registry(assembled_registry(&config).unwrap())
            .with_options(OrchestratorOptions {
                retry_attempts: 0,
                stop_flag: Some(Arc::new(AtomicBool::new(true))),
            });

        let err = orchestrator.reset(&ProgressReporter::new()).unwrap_err();
        assert!(matches!(err, BuildError::Stopped { next_ordinal: 15 }));
        assert_eq!(orchestrator.registry().placed_count(), 15);
    }
}
