use glam::Vec2;

/// What role a body plays in the tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BodyKind {
    /// Static base or root.
    Anchor,
    /// Intermediate node; `depth` 0 is the first branch above the root.
    Branch { depth: u32 },
    /// Terminal leaf; `attached` stays `true` until its stem is removed.
    Leaf { attached: bool },
}

/// A verlet point mass.
///
/// Velocity is implicit: `pos - prev`, in units per step.
#[derive(Clone, Debug)]
pub struct Body {
    pub pos: Vec2,
    pub prev: Vec2,
    pub mass: f32,
    pub radius: f32,
    pub angle: f32,
    pub angular_vel: f32,
    pub pinned: bool,
    pub kind: BodyKind,
}

impl Body {
    pub fn anchor(pos: Vec2, radius: f32) -> Self {
        Self {
            pos,
            prev: pos,
            mass: 0.0,
            radius,
            angle: 0.0,
            angular_vel: 0.0,
            pinned: true,
            kind: BodyKind::Anchor,
        }
    }

    pub fn branch(pos: Vec2, mass: f32, radius: f32, depth: u32) -> Self {
        Self {
            pos,
            prev: pos,
            mass,
            radius,
            angle: 0.0,
            angular_vel: 0.0,
            pinned: false,
            kind: BodyKind::Branch { depth },
        }
    }

    pub fn leaf(pos: Vec2, mass: f32, radius: f32, angle: f32) -> Self {
        Self {
            pos,
            prev: pos,
            mass,
            radius,
            angle,
            angular_vel: 0.0,
            pinned: false,
            kind: BodyKind::Leaf { attached: true },
        }
    }

    #[inline]
    pub fn velocity(&self) -> Vec2 {
        self.pos - self.prev
    }

    /// Overwrites the implicit velocity without moving the body.
    #[inline]
    pub fn set_velocity(&mut self, vel: Vec2) {
        self.prev = self.pos - vel;
    }

    /// Zero for pinned or massless bodies, so constraints never move them.
    #[inline]
    pub fn inv_mass(&self) -> f32 {
        if self.pinned || self.mass <= 0.0 {
            0.0
        } else {
            1.0 / self.mass
        }
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, BodyKind::Leaf { .. })
    }

    #[inline]
    pub fn is_attached_leaf(&self) -> bool {
        matches!(self.kind, BodyKind::Leaf { attached: true })
    }

    #[inline]
    pub fn is_detached_leaf(&self) -> bool {
        matches!(self.kind, BodyKind::Leaf { attached: false })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_velocity_keeps_position() {
        let mut b = Body::branch(Vec2::new(3.0, 4.0), 1.0, 1.0, 0);
        b.set_velocity(Vec2::new(0.5, -1.0));
        assert_eq!(b.pos, Vec2::new(3.0, 4.0));
        assert_eq!(b.velocity(), Vec2::new(0.5, -1.0));
    }

    #[test]
    fn pinned_and_massless_bodies_have_zero_inverse_mass() {
        assert_eq!(Body::anchor(Vec2::ZERO, 1.0).inv_mass(), 0.0);
        assert_eq!(Body::branch(Vec2::ZERO, 0.0, 1.0, 0).inv_mass(), 0.0);
        assert_eq!(Body::branch(Vec2::ZERO, 4.0, 1.0, 0).inv_mass(), 0.25);
    }

    #[test]
    fn new_leaf_starts_attached() {
        let leaf = Body::leaf(Vec2::ZERO, 0.02, 5.0, 1.0);
        assert!(leaf.is_leaf());
        assert!(leaf.is_attached_leaf());
        assert!(!leaf.is_detached_leaf());
    }
}
