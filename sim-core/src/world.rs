//! Minimal position-based simulation world.
//!
//! Holds the bodies and constraints of every tree admitted with
//! [`World::insert`], integrates them with verlet steps and relaxes the
//! constraint set. There is no collision handling beyond an optional floor.

use crate::{
    body::{Body, BodyKind},
    config::WorldConfig,
    constraint::{Constraint, ConstraintSet},
    force_buffer::ForceBuffer,
    tree::Tree,
    types::NodeId,
};
use glam::Vec2;

/// Angular velocity added per unit of horizontal poke impulse.
pub const SPIN_PER_IMPULSE: f32 = 0.01;

#[derive(Debug, Default)]
pub struct World {
    pub bodies: Vec<Body>,
    pub constraints: ConstraintSet,
    pub forces: ForceBuffer,
    pub cfg: WorldConfig,
}

impl World {
    pub fn new(cfg: WorldConfig) -> Self {
        Self {
            cfg,
            ..Self::default()
        }
    }

    /// Admits every node and constraint of `tree`.
    ///
    /// Constraint endpoints are remapped so they keep pointing at the same
    /// nodes, and the force buffer is resized to cover the new bodies.
    ///
    /// ### Parameters
    /// - `tree` - A generated tree; its node ids start at zero.
    ///
    /// ### Returns
    /// The offset added to the tree's node ids: tree node `i` is world body
    /// `offset + i`.
    pub fn insert(&mut self, tree: Tree) -> usize {
        let offset = self.bodies.len();
        self.bodies.extend(tree.nodes.into_iter().map(|n| n.body));
        self.constraints
            .extend(tree.constraints.iter().map(|c| c.offset(offset)));
        self.forces.ensure_len(self.bodies.len());
        offset
    }

    /// Advances every dynamic body by one verlet step.
    ///
    /// `vel = (pos - prev) * friction`, then `pos += vel + gravity + F/m`,
    /// and the orientation advances by the angular velocity. Pinned bodies
    /// are skipped. Accumulated forces are cleared afterwards, so anything
    /// pushed before this call acts for exactly one step.
    pub fn integrate(&mut self) {
        let WorldConfig {
            gravity, friction, ..
        } = self.cfg;

        for (id, body) in self.bodies.iter_mut().enumerate() {
            if body.pinned {
                continue;
            }
            let vel = body.velocity() * friction;
            let accel = gravity + self.forces.get(id) * body.inv_mass();
            body.prev = body.pos;
            body.pos += vel + accel;
            body.angle += body.angular_vel;
        }
        self.forces.clear();
    }

    /// Relaxes the constraint set `cfg.iterations` times, then keeps
    /// dynamic bodies above the floor.
    ///
    /// A body clamped to the floor also loses its vertical velocity.
    pub fn solve(&mut self) {
        for _ in 0..self.cfg.iterations {
            self.constraints.relax_all(&mut self.bodies);
        }

        if let Some(floor) = self.cfg.floor {
            for body in self.bodies.iter_mut().filter(|b| !b.pinned) {
                if body.pos.y < floor {
                    body.pos.y = floor;
                    body.prev.y = floor;
                }
            }
        }
    }

    /// Cuts leaf `id` loose: removes its stem, zeroes its velocity and
    /// marks it detached. Detachment is permanent; nothing re-adds a stem.
    ///
    /// ### Parameters
    /// - `id` - World id of the leaf to detach.
    ///
    /// ### Returns
    /// `true` if the leaf was attached and is now free, `false` (with
    /// nothing changed) if `id` is out of range or not an attached leaf.
    pub fn detach_leaf(&mut self, id: NodeId) -> bool {
        if !self.bodies.get(id).is_some_and(Body::is_attached_leaf) {
            return false;
        }

        let removed = self
            .constraints
            .remove_where(|c| matches!(c, Constraint::Distance(d) if d.a == id || d.b == id));
        debug_assert_eq!(removed, 1, "leaf {id} should hang from exactly one stem");

        let leaf = &mut self.bodies[id];
        leaf.set_velocity(Vec2::ZERO);
        leaf.kind = BodyKind::Leaf { attached: false };
        true
    }

    /// Pushes every dynamic body within `radius` of `point` away from it.
    ///
    /// The velocity kick falls off linearly from `impulse` at the point to
    /// zero at the edge; bodies also pick up a little spin. Pinned bodies
    /// are never pushed.
    ///
    /// ### Parameters
    /// - `point` - Centre of the poke, in world coordinates.
    /// - `radius` - Reach of the poke; a non-positive radius pushes nothing.
    /// - `impulse` - Velocity change, in units per step, at the centre.
    ///
    /// ### Returns
    /// How many bodies were pushed.
    pub fn poke(&mut self, point: Vec2, radius: f32, impulse: f32) -> usize {
        if radius <= 0.0 {
            return 0;
        }

        let mut pushed = 0;
        for body in self.bodies.iter_mut().filter(|b| !b.pinned) {
            let delta = body.pos - point;
            let d = delta.length();
            if d > radius {
                continue;
            }
            let dir = delta.try_normalize().unwrap_or(Vec2::Y);
            let kick = impulse * (1.0 - d / radius);
            body.set_velocity(body.velocity() + dir * kick);
            body.angular_vel += dir.x * kick * SPIN_PER_IMPULSE;
            pushed += 1;
        }

        log::debug!("poke at ({:.1}, {:.1}) pushed {pushed} bodies", point.x, point.y);
        pushed
    }

    pub fn leaf_count(&self) -> usize {
        self.bodies.iter().filter(|b| b.is_leaf()).count()
    }

    pub fn attached_leaf_count(&self) -> usize {
        self.bodies.iter().filter(|b| b.is_attached_leaf()).count()
    }

    pub fn detached_leaf_count(&self) -> usize {
        self.bodies.iter().filter(|b| b.is_detached_leaf()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::TreeParams, generator::generate, random::SequenceSource};

    fn planted() -> (World, usize) {
        let tree = generate(&TreeParams::default(), &mut SequenceSource::constant(0.5));
        let mut world = World::new(WorldConfig::default());
        let offset = world.insert(tree);
        (world, offset)
    }

    #[test]
    fn insert_offsets_second_tree() {
        let (mut world, first) = planted();
        let n = world.bodies.len();
        let c = world.constraints.len();

        let tree = generate(
            &TreeParams {
                origin: Vec2::new(500.0, 0.0),
                ..TreeParams::default()
            },
            &mut SequenceSource::constant(0.5),
        );
        let second = world.insert(tree);

        assert_eq!(first, 0);
        assert_eq!(second, n);
        assert_eq!(world.bodies.len(), 2 * n);
        assert_eq!(world.constraints.len(), 2 * c);
        assert_eq!(world.forces.len(), 2 * n);

        // Constraints of the second tree only reference its own bodies.
        for c in world.constraints.iter().skip(c) {
            for id in 0..n {
                assert!(!c.references(id));
            }
        }
        assert_eq!(world.leaf_count(), 16);
    }

    #[test]
    fn integrate_applies_inertia_gravity_and_force() {
        let mut world = World::new(WorldConfig {
            gravity: Vec2::new(0.0, -0.5),
            friction: 1.0,
            iterations: 0,
            floor: None,
        });
        world.insert(Tree::new(Vec2::ZERO, Vec2::Y, 1.0));
        world.bodies.push(Body::branch(Vec2::new(0.0, 10.0), 2.0, 1.0, 0));
        world.forces.ensure_len(world.bodies.len());

        world.bodies[2].set_velocity(Vec2::new(1.0, 0.0));
        world.forces.add(2, Vec2::new(0.0, 4.0));
        world.integrate();

        // 1.0 of velocity, -0.5 of gravity, 4.0 / 2.0 of force.
        assert!((world.bodies[2].pos - Vec2::new(1.0, 11.5)).length() < 1e-6);
        assert_eq!(world.bodies[2].prev, Vec2::new(0.0, 10.0));
        assert_eq!(world.forces.get(2), Vec2::ZERO);

        // Anchors never move.
        assert_eq!(world.bodies[0].pos, Vec2::Y);
        assert_eq!(world.bodies[1].pos, Vec2::ZERO);
    }

    #[test]
    fn solve_clamps_to_floor() {
        let mut world = World::new(WorldConfig {
            floor: Some(0.0),
            ..WorldConfig::default()
        });
        world.bodies.push(Body::leaf(Vec2::new(3.0, -2.0), 0.02, 5.0, 0.0));
        world.bodies[0].prev = Vec2::new(3.0, -1.0);
        world.solve();
        assert_eq!(world.bodies[0].pos, Vec2::new(3.0, 0.0));
        assert_eq!(world.bodies[0].velocity().y, 0.0);
    }

    #[test]
    fn untouched_tree_stays_at_rest() {
        let (mut world, _) = planted();
        let start: Vec<Vec2> = world.bodies.iter().map(|b| b.pos).collect();
        for _ in 0..50 {
            world.integrate();
            world.solve();
        }
        for (b, p) in world.bodies.iter().zip(start) {
            assert!((b.pos - p).length() < 1e-2, "{:?} drifted from {p:?}", b.pos);
        }
    }

    #[test]
    fn detach_leaf_removes_stem_and_zeroes_velocity() {
        let (mut world, _) = planted();
        let leaf = world.bodies.iter().position(Body::is_leaf).unwrap();
        world.bodies[leaf].set_velocity(Vec2::new(2.0, 1.0));
        let before = world.constraints.len();

        assert!(world.detach_leaf(leaf));
        assert_eq!(world.constraints.len(), before - 1);
        assert!(!world.constraints.iter().any(|c| c.references(leaf)));
        assert_eq!(world.bodies[leaf].velocity(), Vec2::ZERO);
        assert!(world.bodies[leaf].is_detached_leaf());

        // Detachment is terminal.
        assert!(!world.detach_leaf(leaf));
        assert_eq!(world.constraints.len(), before - 1);
        assert_eq!(world.leaf_count(), 8);
        assert_eq!(world.detached_leaf_count(), 1);
        assert_eq!(world.attached_leaf_count(), 7);
    }

    #[test]
    fn detach_leaf_ignores_branches() {
        let (mut world, _) = planted();
        let before = world.constraints.len();
        assert!(!world.detach_leaf(2));
        assert!(!world.detach_leaf(10_000));
        assert_eq!(world.constraints.len(), before);
    }

    #[test]
    fn poke_pushes_nearby_bodies_outward() {
        let mut world = World::new(WorldConfig::default());
        world.bodies.push(Body::branch(Vec2::new(1.0, 0.0), 1.0, 1.0, 0));
        world.bodies.push(Body::branch(Vec2::new(50.0, 0.0), 1.0, 1.0, 0));
        world.bodies.push(Body::anchor(Vec2::new(-1.0, 0.0), 1.0));

        let pushed = world.poke(Vec2::ZERO, 10.0, 2.0);

        assert_eq!(pushed, 1);
        let v = world.bodies[0].velocity();
        assert!((v - Vec2::new(1.8, 0.0)).length() < 1e-5);
        assert!(world.bodies[0].angular_vel > 0.0);
        assert_eq!(world.bodies[1].velocity(), Vec2::ZERO);
        assert_eq!(world.bodies[2].velocity(), Vec2::ZERO);
    }
}
