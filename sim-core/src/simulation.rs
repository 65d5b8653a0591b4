//! The explicit simulation context.
//!
//! [`Simulation`] owns the world, the hook schedule, the configuration and
//! the random source. Nothing in the crate keeps global state; two
//! simulations seeded alike evolve identically.

use crate::{
    config::{ShedConfig, SimConfig, TreeParams, WindConfig},
    generator::generate,
    phases::{Schedule, Stage, StepContext, StepHook, StepReport},
    random::RandomSource,
    types::NodeId,
    world::World,
};
use glam::Vec2;
use std::ops::Range;

/// Where a planted tree lives inside the world.
#[derive(Clone, Debug, PartialEq)]
pub struct TreeHandle {
    /// World ids of every node of the tree.
    pub nodes: Range<NodeId>,
    pub base: NodeId,
    pub root: NodeId,
    pub leaves: Vec<NodeId>,
}

pub struct Simulation<R: RandomSource> {
    pub world: World,
    pub wind: WindConfig,
    pub shed: ShedConfig,
    schedule: Schedule,
    rng: R,
    step: u64,
    trees: Vec<TreeHandle>,
}

impl<R: RandomSource> Simulation<R> {
    /// Empty world with the wind and shedding hooks registered.
    pub fn new(config: SimConfig, rng: R) -> Self {
        Self::with_schedule(config, rng, Schedule::with_defaults())
    }

    pub fn with_schedule(config: SimConfig, rng: R, schedule: Schedule) -> Self {
        Self {
            world: World::new(config.world),
            wind: config.wind,
            shed: config.shed,
            schedule,
            rng,
            step: 0,
            trees: Vec::new(),
        }
    }

    pub fn config(&self) -> SimConfig {
        SimConfig {
            world: self.world.cfg,
            wind: self.wind,
            shed: self.shed,
        }
    }

    pub fn set_config(&mut self, config: SimConfig) {
        self.world.cfg = config.world;
        self.wind = config.wind;
        self.shed = config.shed;
    }

    pub fn add_hook(&mut self, hook: impl StepHook + 'static) {
        self.schedule.add(Box::new(hook));
    }

    /// Hook names in execution order.
    pub fn hook_names(&self) -> Vec<&str> {
        self.schedule.names()
    }

    /// Generates a tree from `params` with this simulation's random source
    /// and admits it into the world.
    pub fn plant(&mut self, params: &TreeParams) -> TreeHandle {
        let tree = generate(params, &mut self.rng);
        let leaves: Vec<NodeId> = tree.leaf_ids().collect();
        let (base, root, len) = (tree.base, tree.root, tree.nodes.len());

        let offset = self.world.insert(tree);
        let handle = TreeHandle {
            nodes: offset..offset + len,
            base: offset + base,
            root: offset + root,
            leaves: leaves.into_iter().map(|id| offset + id).collect(),
        };
        self.trees.push(handle.clone());
        handle
    }

    /// Advances the world by one step: wind, integration, shedding,
    /// constraint relaxation.
    pub fn step(&mut self) -> StepReport {
        let mut report = StepReport {
            step: self.step,
            detached: Vec::new(),
        };

        for stage in [Stage::BeforeIntegrate, Stage::AfterIntegrate] {
            if stage == Stage::AfterIntegrate {
                self.world.integrate();
            }
            let mut ctx = StepContext {
                world: &mut self.world,
                rng: &mut self.rng,
                wind: &self.wind,
                shed: &self.shed,
                report: &mut report,
            };
            self.schedule.run_stage(stage, &mut ctx);
        }
        self.world.solve();

        log::trace!(
            "step {}: {} attached, {} detached",
            self.step,
            self.world.attached_leaf_count(),
            self.world.detached_leaf_count()
        );
        self.step += 1;
        report
    }

    /// Runs `steps` steps and returns every leaf shed along the way.
    pub fn run(&mut self, steps: usize) -> Vec<NodeId> {
        let mut shed = Vec::new();
        for _ in 0..steps {
            shed.extend(self.step().detached);
        }
        shed
    }

    /// See [`World::poke`].
    pub fn poke(&mut self, point: Vec2, radius: f32, impulse: f32) -> usize {
        self.world.poke(point, radius, impulse)
    }

    /// Number of steps taken so far.
    pub fn steps(&self) -> u64 {
        self.step
    }

    pub fn trees(&self) -> &[TreeHandle] {
        &self.trees
    }

    /// Drops every tree and resets the step counter; keeps configuration,
    /// hooks and the random source.
    pub fn clear(&mut self) {
        self.world = World::new(self.world.cfg);
        self.trees.clear();
        self.step = 0;
    }
}
