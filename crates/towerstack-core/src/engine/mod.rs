//! # Engine Module
//!
//! Stateful parts of a build: the configuration it runs under, the record of where each
//! unit is, and the sequencer that turns one pick or place into robot commands.
//!
//! - **Configuration** ([`config`]) - `BuildConfig`, assembled and validated by
//!   `BuildConfigBuilder`
//! - **Registry** ([`registry`]) - `UnitRegistry`, the single-gripper placement state
//!   machine
//! - **States** ([`state`]) - unit placement states, sequencer states and cycle phases
//! - **Sequencing** ([`sequencer`]) - `MotionSequencer`, one blocking cycle at a time
//! - **Progress** ([`progress`]) - callback-based progress events for front ends
//! - **Errors** ([`error`]) - `EngineError`, aggregating every failure a cycle can raise

pub mod config;
pub mod error;
pub mod progress;
pub mod registry;
pub mod sequencer;
pub mod state;
