//! Per-step hook scheduling.
//!
//! A simulation step runs in a fixed order:
//! 1. [`Stage::BeforeIntegrate`] hooks: forces for this step (wind).
//! 2. [`crate::world::World::integrate`]: verlet positions update.
//! 3. [`Stage::AfterIntegrate`] hooks: rules that must see the integrated
//!    positions before constraints settle (leaf shedding).
//! 4. [`crate::world::World::solve`]: constraint relaxation.
//!
//! Within a stage, hooks run by descending [`StepHook::priority`]; equal
//! priorities keep registration order.

use crate::{
    config::{ShedConfig, WindConfig},
    random::RandomSource,
    shed::shed_leaves,
    types::NodeId,
    wind::WindModel,
    world::World,
};
use std::cmp::Reverse;

/// Priority of the shedding rule; above anything registered by default.
pub const SHED_PRIORITY: i32 = 100;
pub const WIND_PRIORITY: i32 = 0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    BeforeIntegrate,
    AfterIntegrate,
}

/// What happened during one step.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StepReport {
    /// Index of the step, starting at zero.
    pub step: u64,
    /// Leaves shed during this step, in the order they were shed.
    pub detached: Vec<NodeId>,
}

/// Everything a hook may read or mutate during a step.
pub struct StepContext<'a> {
    pub world: &'a mut World,
    pub rng: &'a mut dyn RandomSource,
    pub wind: &'a WindConfig,
    pub shed: &'a ShedConfig,
    pub report: &'a mut StepReport,
}

/// A callback run once per step at a given stage.
pub trait StepHook {
    fn name(&self) -> &str;
    fn stage(&self) -> Stage;
    fn priority(&self) -> i32 {
        0
    }
    fn run(&mut self, ctx: &mut StepContext<'_>);
}

/// Applies [`WindModel`] before integration.
#[derive(Debug, Default)]
pub struct WindHook {
    pub model: WindModel,
}

impl StepHook for WindHook {
    fn name(&self) -> &str {
        "wind"
    }

    fn stage(&self) -> Stage {
        Stage::BeforeIntegrate
    }

    fn priority(&self) -> i32 {
        WIND_PRIORITY
    }

    fn run(&mut self, ctx: &mut StepContext<'_>) {
        self.model.apply(ctx.wind, &mut *ctx.world, &mut *ctx.rng);
    }
}

/// Runs [`shed_leaves`] right after integration.
#[derive(Debug, Default)]
pub struct ShedHook;

impl StepHook for ShedHook {
    fn name(&self) -> &str {
        "shed"
    }

    fn stage(&self) -> Stage {
        Stage::AfterIntegrate
    }

    fn priority(&self) -> i32 {
        SHED_PRIORITY
    }

    fn run(&mut self, ctx: &mut StepContext<'_>) {
        let shed = shed_leaves(ctx.shed, &mut *ctx.world, &mut *ctx.rng);
        ctx.report.detached.extend(shed);
    }
}

/// Registered hooks, kept sorted by stage and priority.
#[derive(Default)]
pub struct Schedule {
    hooks: Vec<Box<dyn StepHook>>,
}

impl Schedule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule with the wind and shedding hooks registered.
    pub fn with_defaults() -> Self {
        let mut s = Self::new();
        s.add(Box::new(WindHook::default()));
        s.add(Box::new(ShedHook));
        s
    }

    pub fn add(&mut self, hook: Box<dyn StepHook>) {
        self.hooks.push(hook);
        // Stable sort: ties keep registration order.
        self.hooks
            .sort_by_key(|h| (h.stage(), Reverse(h.priority())));
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// Hook names in execution order.
    pub fn names(&self) -> Vec<&str> {
        self.hooks.iter().map(|h| h.name()).collect()
    }

    pub fn run_stage(&mut self, stage: Stage, ctx: &mut StepContext<'_>) {
        for hook in self.hooks.iter_mut().filter(|h| h.stage() == stage) {
            hook.run(ctx);
        }
    }
}
