//! Tunable parameters for generation, the world, wind and shedding.
//!
//! Every struct has a [`Default`] that reproduces the reference palm tree.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::f32::consts::FRAC_PI_8;

/// Parameters of the recursive branch generator.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeParams {
    /// Position of the static base anchor.
    pub origin: Vec2,
    /// Number of binary branching levels below the first branch.
    pub max_depth: u32,
    /// Length of the first branch.
    pub branch_length: f32,
    /// Per-level decay; applied squared at every level.
    pub segment_length_decay: f32,
    /// Rotation (radians) applied with alternating sign to each child branch.
    pub branch_angle: f32,
    /// Height of the static root above the base.
    pub root_offset: f32,
    pub leaf_mass: f32,
    pub leaf_radius: f32,
    /// Rest length of the stem tying a leaf to its branch tip.
    pub leaf_stem: f32,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            origin: Vec2::ZERO,
            max_depth: 3,
            branch_length: 100.0,
            segment_length_decay: 0.92,
            branch_angle: FRAC_PI_8,
            root_offset: 10.0,
            leaf_mass: 0.02,
            leaf_radius: 5.0,
            leaf_stem: 6.0,
        }
    }
}

/// Thresholds of the leaf-shedding rule.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShedConfig {
    /// Speed (units per step) above which a leaf counts as fast.
    pub speed_threshold: f32,
    /// A fast leaf sheds when its draw exceeds this.
    pub fast_draw: f32,
    /// Any leaf sheds when its independent draw exceeds this.
    pub spontaneous_draw: f32,
}

impl Default for ShedConfig {
    fn default() -> Self {
        Self {
            speed_threshold: 0.35,
            fast_draw: 0.99,
            spontaneous_draw: 0.9999,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindConfig {
    /// Fraction of a full turn the wind phase may wander per body.
    pub jitter: f32,
    pub strength: f32,
    /// Leaves at or below this height get no wind force.
    pub ground_cutoff: f32,
    /// Downward force per unit of leaf mass.
    pub settle_bias: f32,
    pub max_angular_velocity: f32,
}

impl Default for WindConfig {
    fn default() -> Self {
        Self {
            jitter: 0.1,
            strength: 1e-5,
            ground_cutoff: 2.0,
            settle_bias: 0.0004 - 0.00004,
            max_angular_velocity: 0.01,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Acceleration added to every dynamic body each step.
    pub gravity: Vec2,
    /// Velocity retained per step.
    pub friction: f32,
    /// Relaxation sweeps over the constraint set per step.
    pub iterations: u32,
    /// Lowest height a dynamic body may reach, if any.
    pub floor: Option<f32>,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            gravity: Vec2::ZERO,
            friction: 0.99,
            iterations: 8,
            floor: Some(0.0),
        }
    }
}

/// Everything a [`crate::simulation::Simulation`] needs besides its random source.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub world: WorldConfig,
    pub wind: WindConfig,
    pub shed: ShedConfig,
}
