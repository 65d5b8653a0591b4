//! Recursive binary branch generator.
//!
//! Layout of a generated [`Tree`]:
//!
//! ```text
//!            leaf  leaf  leaf  leaf
//!              \    /      \    /
//!              branch      branch      depth 1 (length L·d²)
//!                   \       /
//!                    branch            depth 0 (length L)
//!                      |
//!                     root  (static)
//!                      |
//!                     base  (static)
//! ```
//!
//! Nodes are stored in pre-order, so each subtree occupies a contiguous
//! range of ids; [`branch`] returns that range.

use crate::{
    body::Body,
    config::TreeParams,
    random::RandomSource,
    tree::Tree,
    types::NodeId,
};
use glam::Vec2;
use std::{f32::consts::TAU, ops::Range};

/// Stiffness of the distance constraint between a branch and its parent.
pub const BRANCH_STIFFNESS: f32 = 0.7;
/// Stiffness of the stem tying a leaf to its branch tip.
pub const LEAF_STIFFNESS: f32 = 0.1;
/// Stiffness of the trunk lock between base, root and first branch.
pub const TRUNK_LOCK_STIFFNESS: f32 = 1.0;
/// Joint stiffness at the trunk; falls linearly to zero at the tips.
pub const JOINT_STIFFNESS: f32 = 0.7;
/// Branch mass per squared unit of incoming branch length.
pub const MASS_PER_LENGTH_SQ: f32 = 0.04;
pub const BRANCH_RADIUS_PER_LENGTH: f32 = 0.04;
pub const ANCHOR_RADIUS: f32 = 3.0;

#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Builds a complete tree from `params`.
///
/// The static root sits `root_offset` above the static base; the first
/// branch grows straight up from the root and the base/root/first-branch
/// angle is locked with stiffness 1. Draws one value from `rng` per leaf
/// for its initial orientation.
pub fn generate<R>(params: &TreeParams, rng: &mut R) -> Tree
where
    R: RandomSource + ?Sized,
{
    let base_pos = params.origin;
    let root_pos = params.origin + Vec2::new(0.0, params.root_offset);
    let mut tree = Tree::new(base_pos, root_pos, ANCHOR_RADIUS);

    let trunk = Vec2::Y * params.branch_length;
    let root = tree.root;
    let first = branch(&mut tree, params, rng, root, 0, trunk);
    let base = tree.base;
    tree.add_angle(base, root, first.start, TRUNK_LOCK_STIFFNESS);

    debug_assert!(
        tree.validate().is_ok(),
        "generator produced a malformed tree: {:?}",
        tree.validate()
    );

    log::info!(
        "generated tree: depth {}, {} nodes, {} leaves, {} constraints",
        params.max_depth,
        tree.nodes.len(),
        tree.leaf_ids().count(),
        tree.constraints.len()
    );
    tree
}

/// Grows one branch node at `parent + vec` and, recursively, everything
/// above it. Returns the id range of the new subtree.
///
/// Below `max_depth` the node forks into two children whose branch vectors
/// are `vec` rotated by `∓branch_angle` and scaled by `decay²`; at
/// `max_depth` it carries a single leaf instead.
pub fn branch<R>(
    tree: &mut Tree,
    params: &TreeParams,
    rng: &mut R,
    parent: NodeId,
    depth: u32,
    vec: Vec2,
) -> Range<NodeId>
where
    R: RandomSource + ?Sized,
{
    let pos = tree.nodes[parent].body.pos + vec;
    let mass = MASS_PER_LENGTH_SQ * vec.length_squared();
    let radius = BRANCH_RADIUS_PER_LENGTH * vec.length();
    let id = tree.add_child(parent, Body::branch(pos, mass, radius, depth), BRANCH_STIFFNESS);

    if depth < params.max_depth {
        let decay = params.segment_length_decay * params.segment_length_decay;
        let left_vec = Vec2::from_angle(-params.branch_angle).rotate(vec) * decay;
        let right_vec = Vec2::from_angle(params.branch_angle).rotate(vec) * decay;

        let left = branch(tree, params, rng, id, depth + 1, left_vec);
        let right = branch(tree, params, rng, id, depth + 1, right_vec);

        let joint = lerp(JOINT_STIFFNESS, 0.0, depth as f32 / params.max_depth as f32);
        tree.add_angle(parent, id, left.start, joint);
        tree.add_angle(parent, id, right.start, joint);

        id..right.end
    } else {
        let leaf_pos = pos + vec.normalize_or_zero() * params.leaf_stem;
        let angle = rng.next_unit() * TAU;
        let leaf = tree.add_child(
            id,
            Body::leaf(leaf_pos, params.leaf_mass, params.leaf_radius, angle),
            LEAF_STIFFNESS,
        );
        id..leaf + 1
    }
}
