//! Stochastic leaf shedding.
//!
//! Once per step, after integration and before constraints are relaxed,
//! every leaf still hanging from a stem rolls two draws. Fast leaves shed
//! about one step in a hundred; any leaf sheds about one step in ten
//! thousand. A shed leaf loses its stem and its velocity and stays free for
//! the rest of the simulation.

use crate::{config::ShedConfig, random::RandomSource, types::NodeId, world::World};

/// Pure decision part of the rule.
///
/// Sheds when the leaf is faster than `speed_threshold` and `fast_draw`
/// is exceeded, or when `spontaneous_draw` is exceeded on its own.
///
/// ### Parameters
/// - `cfg` - Thresholds for speed and both draws.
/// - `speed` - Length of the leaf's velocity, in units per step.
/// - `fast` - Uniform draw in `[0, 1)` for the fast-leaf path.
/// - `spontaneous` - Uniform draw in `[0, 1)` for the spontaneous path.
///
/// ### Returns
/// `true` if the leaf should lose its stem this step.
#[inline]
pub fn should_shed(cfg: &ShedConfig, speed: f32, fast: f32, spontaneous: f32) -> bool {
    (speed > cfg.speed_threshold && fast > cfg.fast_draw) || spontaneous > cfg.spontaneous_draw
}

/// Runs the rule over every stem in `world` and returns the leaves shed.
///
/// Stems are visited in constraint order; each one consumes exactly two
/// draws (fast, then spontaneous) whatever the leaf's speed. Stems are
/// collected before any is removed, so a detachment never shifts which
/// leaf the next draws belong to.
///
/// ### Parameters
/// - `cfg` - Shedding thresholds.
/// - `world` - World whose attached leaves are tested; shed leaves are
///   detached in place.
/// - `rng` - Source of the two draws per stem.
///
/// ### Returns
/// World ids of the leaves shed, in visiting order.
pub fn shed_leaves<R>(cfg: &ShedConfig, world: &mut World, rng: &mut R) -> Vec<NodeId>
where
    R: RandomSource + ?Sized,
{
    let stems: Vec<NodeId> = world
        .constraints
        .distances()
        .filter_map(|d| {
            [d.b, d.a]
                .into_iter()
                .find(|&id| world.bodies[id].is_attached_leaf())
        })
        .collect();

    let mut shed = Vec::new();
    for leaf in stems {
        let speed = world.bodies[leaf].velocity().length();
        let fast = rng.next_unit();
        let spontaneous = rng.next_unit();

        if should_shed(cfg, speed, fast, spontaneous) && world.detach_leaf(leaf) {
            log::debug!("leaf {leaf} shed at speed {speed:.3}");
            shed.push(leaf);
        }
    }
    shed
}
