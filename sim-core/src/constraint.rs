//! Distance and angle constraints and the mutable set that owns them.
//!
//! Constraints are relaxed in place, position-based: each call to
//! [`Constraint::relax`] moves the referenced bodies part of the way toward
//! satisfying the constraint, scaled by its stiffness.

use crate::{body::Body, types::NodeId};
use glam::Vec2;
use std::f32::consts::{PI, TAU};

/// Keeps two bodies `rest` apart.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DistanceConstraint {
    pub a: NodeId,
    pub b: NodeId,
    pub rest: f32,
    /// In `[0, 1]`; lower values let the pair stretch more.
    pub stiffness: f32,
}

/// Keeps the signed angle `a - center - c` near `target`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AngleConstraint {
    pub a: NodeId,
    pub center: NodeId,
    pub c: NodeId,
    pub target: f32,
    pub stiffness: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Constraint {
    Distance(DistanceConstraint),
    Angle(AngleConstraint),
}

/// Signed angle from `u` to `v`, in `(-π, π]`.
#[inline]
pub fn signed_angle(u: Vec2, v: Vec2) -> f32 {
    u.perp_dot(v).atan2(u.dot(v))
}

/// Rotates `p` about `pivot` by `theta` radians.
#[inline]
pub fn rotate_about(p: Vec2, pivot: Vec2, theta: f32) -> Vec2 {
    pivot + Vec2::from_angle(theta).rotate(p - pivot)
}

fn wrap_angle(mut a: f32) -> f32 {
    if a <= -PI {
        a += TAU;
    } else if a > PI {
        a -= TAU;
    }
    a
}

impl DistanceConstraint {
    pub fn new(bodies: &[Body], a: NodeId, b: NodeId, stiffness: f32) -> Self {
        let rest = (bodies[b].pos - bodies[a].pos).length();
        Self {
            a,
            b,
            rest,
            stiffness,
        }
    }

    fn relax(&self, bodies: &mut [Body]) {
        let wa = bodies[self.a].inv_mass();
        let wb = bodies[self.b].inv_mass();
        let w = wa + wb;
        if w == 0.0 {
            return;
        }

        let d = bodies[self.b].pos - bodies[self.a].pos;
        let len = d.length();
        if len <= f32::EPSILON {
            return;
        }

        let correction = d * ((len - self.rest) / len) * self.stiffness;
        bodies[self.a].pos += correction * (wa / w);
        bodies[self.b].pos -= correction * (wb / w);
    }
}

impl AngleConstraint {
    pub fn new(bodies: &[Body], a: NodeId, center: NodeId, c: NodeId, stiffness: f32) -> Self {
        let o = bodies[center].pos;
        let target = signed_angle(bodies[a].pos - o, bodies[c].pos - o);
        Self {
            a,
            center,
            c,
            target,
            stiffness,
        }
    }

    /// Current signed angle, or `None` when an arm has collapsed.
    pub fn current(&self, bodies: &[Body]) -> Option<f32> {
        let o = bodies[self.center].pos;
        let u = bodies[self.a].pos - o;
        let v = bodies[self.c].pos - o;
        if u.length_squared() <= f32::EPSILON || v.length_squared() <= f32::EPSILON {
            return None;
        }
        Some(signed_angle(u, v))
    }

    fn relax(&self, bodies: &mut [Body]) {
        let Some(angle) = self.current(bodies) else {
            return;
        };
        let diff = wrap_angle(angle - self.target) * self.stiffness;
        if diff == 0.0 {
            return;
        }

        // Close the gap from both sides: the arms swing toward each other
        // about the center, and the center swings about each arm tip.
        let (a, o, c) = (self.a, self.center, self.c);
        if bodies[a].inv_mass() > 0.0 {
            bodies[a].pos = rotate_about(bodies[a].pos, bodies[o].pos, diff * 0.5);
        }
        if bodies[c].inv_mass() > 0.0 {
            bodies[c].pos = rotate_about(bodies[c].pos, bodies[o].pos, -diff * 0.5);
        }
        if bodies[o].inv_mass() > 0.0 {
            let pa = bodies[a].pos;
            let pc = bodies[c].pos;
            bodies[o].pos = rotate_about(bodies[o].pos, pa, diff * 0.25);
            bodies[o].pos = rotate_about(bodies[o].pos, pc, -diff * 0.25);
        }
    }
}

impl Constraint {
    #[inline]
    pub fn relax(&self, bodies: &mut [Body]) {
        match self {
            Constraint::Distance(d) => d.relax(bodies),
            Constraint::Angle(a) => a.relax(bodies),
        }
    }

    /// Shifts every referenced id by `offset`.
    pub fn offset(self, offset: usize) -> Self {
        match self {
            Constraint::Distance(d) => Constraint::Distance(DistanceConstraint {
                a: d.a + offset,
                b: d.b + offset,
                ..d
            }),
            Constraint::Angle(a) => Constraint::Angle(AngleConstraint {
                a: a.a + offset,
                center: a.center + offset,
                c: a.c + offset,
                ..a
            }),
        }
    }

    pub fn references(&self, id: NodeId) -> bool {
        match self {
            Constraint::Distance(d) => d.a == id || d.b == id,
            Constraint::Angle(a) => a.a == id || a.center == id || a.c == id,
        }
    }
}

/// Ordered constraint storage that supports removing single constraints.
#[derive(Clone, Debug, Default)]
pub struct ConstraintSet {
    items: Vec<Constraint>,
}

impl ConstraintSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, c: Constraint) {
        self.items.push(c);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Constraint> {
        self.items.iter()
    }

    pub fn distances(&self) -> impl Iterator<Item = &DistanceConstraint> {
        self.items.iter().filter_map(|c| match c {
            Constraint::Distance(d) => Some(d),
            Constraint::Angle(_) => None,
        })
    }

    pub fn angles(&self) -> impl Iterator<Item = &AngleConstraint> {
        self.items.iter().filter_map(|c| match c {
            Constraint::Angle(a) => Some(a),
            Constraint::Distance(_) => None,
        })
    }

    /// Runs one relaxation sweep in insertion order.
    pub fn relax_all(&self, bodies: &mut [Body]) {
        for c in &self.items {
            c.relax(bodies);
        }
    }

    /// Removes every constraint for which `pred` returns `true`, keeping
    /// the order of the rest. Returns how many were removed.
    pub fn remove_where(&mut self, mut pred: impl FnMut(&Constraint) -> bool) -> usize {
        let before = self.items.len();
        self.items.retain(|c| !pred(c));
        before - self.items.len()
    }
}

impl Extend<Constraint> for ConstraintSet {
    fn extend<T: IntoIterator<Item = Constraint>>(&mut self, iter: T) {
        self.items.extend(iter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn pair(a: Vec2, b: Vec2) -> Vec<Body> {
        vec![Body::branch(a, 1.0, 1.0, 0), Body::branch(b, 1.0, 1.0, 0)]
    }

    #[test]
    fn signed_angle_is_counter_clockwise_positive() {
        let a = signed_angle(Vec2::X, Vec2::Y);
        assert!((a - FRAC_PI_2).abs() < 1e-6);
        let b = signed_angle(Vec2::Y, Vec2::X);
        assert!((b + FRAC_PI_2).abs() < 1e-6);
    }

    #[test]
    fn distance_constraint_records_initial_separation() {
        let bodies = pair(Vec2::ZERO, Vec2::new(3.0, 4.0));
        let dc = DistanceConstraint::new(&bodies, 0, 1, 0.7);
        assert!((dc.rest - 5.0).abs() < 1e-6);
    }

    #[test]
    fn distance_relax_with_full_stiffness_restores_rest_length() {
        let mut bodies = pair(Vec2::ZERO, Vec2::new(2.0, 0.0));
        let dc = DistanceConstraint {
            a: 0,
            b: 1,
            rest: 1.0,
            stiffness: 1.0,
        };
        dc.relax(&mut bodies);

        // Equal masses split the correction evenly.
        assert!((bodies[0].pos - Vec2::new(0.5, 0.0)).length() < 1e-6);
        assert!((bodies[1].pos - Vec2::new(1.5, 0.0)).length() < 1e-6);
    }

    #[test]
    fn distance_relax_never_moves_pinned_body() {
        let mut bodies = vec![
            Body::anchor(Vec2::ZERO, 1.0),
            Body::branch(Vec2::new(4.0, 0.0), 1.0, 1.0, 0),
        ];
        let dc = DistanceConstraint {
            a: 0,
            b: 1,
            rest: 2.0,
            stiffness: 1.0,
        };
        dc.relax(&mut bodies);

        assert_eq!(bodies[0].pos, Vec2::ZERO);
        assert!((bodies[1].pos - Vec2::new(2.0, 0.0)).length() < 1e-6);
    }

    #[test]
    fn angle_relax_reduces_error() {
        let mut bodies = vec![
            Body::branch(Vec2::new(0.0, -1.0), 1.0, 1.0, 0),
            Body::anchor(Vec2::ZERO, 1.0),
            Body::branch(Vec2::new(1.0, 0.0), 1.0, 1.0, 0),
        ];
        // Target is a straight line; the current angle is a right angle.
        let ac = AngleConstraint {
            a: 0,
            center: 1,
            c: 2,
            target: PI,
            stiffness: 0.5,
        };
        let before = wrap_angle(ac.current(&bodies).unwrap() - ac.target).abs();
        Constraint::Angle(ac).relax(&mut bodies);
        let after = wrap_angle(ac.current(&bodies).unwrap() - ac.target).abs();

        assert!(after < before, "before={before}, after={after}");
        assert_eq!(bodies[1].pos, Vec2::ZERO);
    }

    #[test]
    fn remove_where_keeps_order_of_survivors() {
        let bodies = vec![
            Body::branch(Vec2::ZERO, 1.0, 1.0, 0),
            Body::branch(Vec2::X, 1.0, 1.0, 0),
            Body::branch(Vec2::Y, 1.0, 1.0, 0),
        ];
        let mut set = ConstraintSet::new();
        set.push(Constraint::Distance(DistanceConstraint::new(&bodies, 0, 1, 1.0)));
        set.push(Constraint::Distance(DistanceConstraint::new(&bodies, 1, 2, 1.0)));
        set.push(Constraint::Distance(DistanceConstraint::new(&bodies, 0, 2, 1.0)));

        let removed = set.remove_where(|c| c.references(1) && !c.references(0));
        assert_eq!(removed, 1);

        let ends: Vec<(NodeId, NodeId)> = set.distances().map(|d| (d.a, d.b)).collect();
        assert_eq!(ends, vec![(0, 1), (0, 2)]);
    }

    #[test]
    fn offset_shifts_all_endpoints() {
        let c = Constraint::Angle(AngleConstraint {
            a: 0,
            center: 1,
            c: 2,
            target: 0.3,
            stiffness: 0.7,
        })
        .offset(10);
        assert!(c.references(10) && c.references(11) && c.references(12));
        assert!(!c.references(0));
    }
}
