//! Core palm-tree simulation library.
//!
//! Main components:
//! - [`generator`]: recursive binary branch generator.
//! - [`tree`]: node arena produced by the generator, with topology checks.
//! - [`world`]: bodies, constraints and the verlet integrator.
//! - [`constraint`]: distance and angle constraints.
//! - [`shed`]: stochastic leaf shedding.
//! - [`wind`]: per-step wind acting on leaves.
//! - [`phases`]: step stages and prioritised per-step hooks.
//! - [`simulation`]: the context object that ties everything together.
//! - [`config`]: parameters for all of the above.
//! - [`force_buffer`]: per-body force accumulation between phases.
//! - [`random`]: injectable random sources.
//! - [`body`], [`error`], [`types`]: shared types.

pub mod body;
pub mod config;
pub mod constraint;
pub mod error;
pub mod force_buffer;
pub mod generator;
pub mod phases;
pub mod random;
pub mod shed;
pub mod simulation;
pub mod tree;
pub mod types;
pub mod wind;
pub mod world;
