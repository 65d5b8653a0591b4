//! Per-step wind acting on leaves.
//!
//! A single wind phase wanders randomly as the model visits each body.
//! Leaves above the ground cutoff are pushed along the current phase
//! direction and pulled gently downward; detached leaves are additionally
//! jostled in place. Every body has its spin clamped.

use crate::{config::WindConfig, random::RandomSource, world::World};
use glam::Vec2;
use std::f32::consts::TAU;

/// Gust displacement per unit of `radius * strength`.
pub const GUST_SCALE: f32 = 1000.0;

#[derive(Clone, Debug, Default)]
pub struct WindModel {
    phase: f32,
}

impl WindModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current wind direction, in radians.
    pub fn phase(&self) -> f32 {
        self.phase
    }

    /// Applies one step of wind to every body in `world`.
    ///
    /// Draws per body: one for the phase jitter, then two for the gust
    /// (x, y) if the body is a detached leaf. Forces go into
    /// `world.forces` and take effect at the next integration.
    ///
    /// ### Parameters
    /// - `cfg` - Wind strength, jitter, ground cutoff and spin limit.
    /// - `world` - Bodies to blow on. Its force buffer must cover every
    ///   body, which [`World::insert`] guarantees.
    /// - `rng` - Source of the jitter and gust draws.
    ///
    /// ### Panics
    /// Panics if `world.forces` is shorter than `world.bodies`.
    pub fn apply<R>(&mut self, cfg: &WindConfig, world: &mut World, rng: &mut R)
    where
        R: RandomSource + ?Sized,
    {
        let push = cfg.max_angular_velocity.abs();

        for (id, body) in world.bodies.iter_mut().enumerate() {
            self.phase = (self.phase + (rng.next_unit() - 0.5) * cfg.jitter * TAU) % TAU;

            if body.is_leaf() {
                let gust_scale = body.radius * cfg.strength;

                if body.is_detached_leaf() {
                    let gust = Vec2::new(rng.next_unit() - 0.5, rng.next_unit() - 0.5);
                    body.pos += gust * gust_scale * GUST_SCALE;
                }

                if body.pos.y > cfg.ground_cutoff {
                    let drift = Vec2::from_angle(self.phase) * gust_scale;
                    let settle = Vec2::new(0.0, -cfg.settle_bias * body.mass);
                    world.forces.add(id, drift + settle);
                }
            }

            body.angular_vel = body.angular_vel.clamp(-push, push);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{body::Body, config::WorldConfig, random::SequenceSource};

    fn world_with(bodies: Vec<Body>) -> World {
        let mut world = World::new(WorldConfig::default());
        world.bodies = bodies;
        world.forces.ensure_len(world.bodies.len());
        world
    }

    fn detached(pos: Vec2) -> Body {
        let mut b = Body::leaf(pos, 0.02, 5.0, 0.0);
        b.kind = crate::body::BodyKind::Leaf { attached: false };
        b
    }

    #[test]
    fn attached_leaf_gets_no_positional_jitter() {
        let mut world = world_with(vec![Body::leaf(Vec2::new(0.0, 50.0), 0.02, 5.0, 0.0)]);
        let cfg = WindConfig {
            strength: 1.0,
            ..WindConfig::default()
        };
        let mut rng = SequenceSource::new(vec![0.9, 0.0, 1.0]);

        WindModel::new().apply(&cfg, &mut world, &mut rng);

        assert_eq!(world.bodies[0].pos, Vec2::new(0.0, 50.0));
        // Only the phase draw was consumed.
        assert_eq!(rng.taken(), 1);
        // It is still above the cutoff, so it feels the wind.
        assert_ne!(world.forces.get(0), Vec2::ZERO);
    }

    #[test]
    fn detached_leaf_is_jostled() {
        let mut world = world_with(vec![detached(Vec2::new(0.0, 50.0))]);
        let cfg = WindConfig {
            strength: 1e-3,
            ..WindConfig::default()
        };
        // Phase draw, then gust x = +0.5, gust y = -0.25.
        let mut rng = SequenceSource::new(vec![0.5, 1.0, 0.25]);

        WindModel::new().apply(&cfg, &mut world, &mut rng);

        // radius 5 * strength 1e-3 * 1000 = 5 units per unit draw.
        let expected = Vec2::new(0.0, 50.0) + Vec2::new(0.5, -0.25) * 5.0;
        assert!((world.bodies[0].pos - expected).length() < 1e-4);
        assert_eq!(rng.taken(), 3);
    }

    #[test]
    fn leaf_below_cutoff_gets_no_force() {
        let mut world = world_with(vec![detached(Vec2::new(0.0, 1.0))]);
        let cfg = WindConfig {
            strength: 1.0,
            ground_cutoff: 2.0,
            ..WindConfig::default()
        };
        // Centered gust draws keep the leaf where it is.
        WindModel::new().apply(&cfg, &mut world, &mut SequenceSource::constant(0.5));

        assert_eq!(world.forces.get(0), Vec2::ZERO);
    }

    #[test]
    fn force_follows_phase_and_settles_downward() {
        let mut world = world_with(vec![Body::leaf(Vec2::new(0.0, 50.0), 2.0, 5.0, 0.0)]);
        let cfg = WindConfig {
            strength: 0.1,
            jitter: 0.0,
            ..WindConfig::default()
        };

        WindModel::new().apply(&cfg, &mut world, &mut SequenceSource::constant(0.5));

        // Phase stays at zero: drift is +x, settle pulls along -y.
        let f = world.forces.get(0);
        assert!((f.x - 0.5).abs() < 1e-6);
        assert!((f.y + cfg.settle_bias * 2.0).abs() < 1e-9);
    }

    #[test]
    fn branches_get_no_wind_force() {
        let mut world = world_with(vec![Body::branch(Vec2::new(0.0, 50.0), 1.0, 1.0, 0)]);
        WindModel::new().apply(
            &WindConfig::default(),
            &mut world,
            &mut SequenceSource::constant(0.9),
        );
        assert_eq!(world.forces.get(0), Vec2::ZERO);
    }

    #[test]
    fn phase_advances_by_jitter_per_body() {
        let mut world = world_with(vec![
            Body::anchor(Vec2::ZERO, 1.0),
            Body::branch(Vec2::Y, 1.0, 1.0, 0),
        ]);
        let cfg = WindConfig {
            jitter: 0.1,
            ..WindConfig::default()
        };
        let mut model = WindModel::new();
        model.apply(&cfg, &mut world, &mut SequenceSource::constant(0.75));

        let expected = 2.0 * 0.25 * 0.1 * TAU;
        assert!((model.phase() - expected).abs() < 1e-6);
    }

    #[test]
    fn angular_velocity_is_clamped_for_every_body() {
        let mut spinning = vec![
            Body::branch(Vec2::Y, 1.0, 1.0, 0),
            Body::leaf(Vec2::new(0.0, 40.0), 0.02, 5.0, 0.0),
            detached(Vec2::new(0.0, 40.0)),
            Body::anchor(Vec2::ZERO, 1.0),
        ];
        for (i, b) in spinning.iter_mut().enumerate() {
            b.angular_vel = if i % 2 == 0 { 3.0 } else { -0.5 };
        }
        let mut world = world_with(spinning);
        let cfg = WindConfig::default();
        WindModel::new().apply(&cfg, &mut world, &mut SequenceSource::constant(0.3));

        for b in &world.bodies {
            assert!((-0.01..=0.01).contains(&b.angular_vel), "{}", b.angular_vel);
        }
        assert_eq!(world.bodies[0].angular_vel, 0.01);
        assert_eq!(world.bodies[1].angular_vel, -0.01);
    }
}
