/// Identifier for a body in a [`crate::tree::Tree`] or [`crate::world::World`].
///
/// This is an index into `Tree::nodes` / `World::bodies`, and is only
/// meaningful within the container that produced it. Ids returned by a
/// tree are shifted by the offset reported from [`crate::world::World::insert`].
pub type NodeId = usize;
