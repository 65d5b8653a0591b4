use crate::types::NodeId;
use glam::Vec2;

/// Per-body force accumulator, cleared after every integration.
///
/// For each `NodeId`, this buffer stores the sum of all forces applied
/// during the current step. Hooks that run before integration (wind,
/// host-applied pushes) add into it; [`crate::world::World::integrate`]
/// turns the totals into accelerations and then clears it.
///
/// Internally, `force[i]` corresponds to world body `i`.
#[derive(Debug, Default)]
pub struct ForceBuffer {
    force: Vec<Vec2>,
}

impl ForceBuffer {
    /// Ensures that the internal storage has exactly the given length.
    ///
    /// After this call every entry is `Vec2::ZERO`, even if the length was
    /// already correct.
    ///
    /// ### Parameters
    /// - `len` - Number of bodies the buffer must cover.
    pub fn ensure_len(&mut self, len: usize) {
        if self.force.len() != len {
            self.force.resize(len, Vec2::ZERO);
        }
        self.clear();
    }

    pub fn len(&self) -> usize {
        self.force.len()
    }

    pub fn is_empty(&self) -> bool {
        self.force.is_empty()
    }

    /// Sets every force to zero without changing the length.
    pub fn clear(&mut self) {
        self.force.fill(Vec2::ZERO);
    }

    /// Adds `force` to the total for body `id`.
    ///
    /// ### Parameters
    /// - `id` - World id of the body being pushed.
    /// - `force` - Force to add, in mass units per step squared.
    ///
    /// ### Panics
    /// Panics if `id` is out of bounds.
    #[inline]
    pub fn add(&mut self, id: NodeId, force: Vec2) {
        self.force[id] += force;
    }

    /// Total force on body `id` this step.
    ///
    /// ### Panics
    /// Panics if `id` is out of bounds.
    #[inline]
    pub fn get(&self, id: NodeId) -> Vec2 {
        self.force[id]
    }
}
