//! # towerstack
//!
//! Placement geometry and motion sequencing for building a layered block tower with a
//! vacuum-gripping robot arm. Units are drawn one at a time from a fixed storage layout
//! (the magazine) and deposited into the tower, whose layers alternate orientation by 90°.
//!
//! ## Architectural Philosophy
//!
//! The library follows a three-layer split:
//!
//! - **[`core`]: The Foundation.** Stateless pieces: rigid-transform frames (`PoseFrame`),
//!   unit models, the ordinal-to-slot indexers, the magazine and structure layouts, and the
//!   abstract robot cell interfaces together with an in-memory simulated cell.
//!
//! - **[`engine`]: The Logic Core.** Stateful pieces: the immutable `BuildConfig`, the
//!   `UnitRegistry` that records which unit is where, and the `MotionSequencer` that drives
//!   a single pick or place cycle against a robot cell.
//!
//! - **[`workflows`]: The Public API.** Whole-build planning and the `BuildOrchestrator`
//!   that runs every pick-then-place cycle in ascending order and can take the structure
//!   down again.

pub mod core;
pub mod engine;
pub mod workflows;
