use crate::{
    body::{Body, BodyKind},
    constraint::{AngleConstraint, Constraint, ConstraintSet, DistanceConstraint, signed_angle},
    error::TopologyError,
    types::NodeId,
};
use glam::Vec2;
use std::collections::VecDeque;

#[derive(Debug, Clone)]
pub struct TreeNode {
    pub body: Body,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

/// Flat arena of tree nodes plus the constraints that hold them together.
///
/// Node `root` is the only node without a parent. The static `base` hangs
/// off the root so that every node, the base included, has exactly one
/// distance path back to the root.
#[derive(Debug, Clone)]
pub struct Tree {
    pub nodes: Vec<TreeNode>,
    pub constraints: ConstraintSet,
    pub base: NodeId,
    pub root: NodeId,
}

impl TreeNode {
    pub fn new_root(body: Body) -> Self {
        Self {
            body,
            parent: None,
            children: Vec::with_capacity(2),
        }
    }

    pub fn new_child(body: Body, parent: NodeId) -> Self {
        Self {
            body,
            parent: Some(parent),
            children: Vec::with_capacity(2),
        }
    }
}

impl Tree {
    /// Creates the two static anchors: the root at `root_pos` and the base
    /// at `base_pos`, tied together by a rigid distance constraint.
    pub fn new(base_pos: Vec2, root_pos: Vec2, anchor_radius: f32) -> Self {
        let mut tree = Self {
            nodes: vec![TreeNode::new_root(Body::anchor(root_pos, anchor_radius))],
            constraints: ConstraintSet::new(),
            base: 0,
            root: 0,
        };
        tree.base = tree.add_child(0, Body::anchor(base_pos, anchor_radius), 1.0);
        tree
    }

    /// Appends `body` as a child of `parent`, linked by a distance
    /// constraint whose rest length is their current separation.
    pub fn add_child(&mut self, parent: NodeId, body: Body, stiffness: f32) -> NodeId {
        let id: usize = self.nodes.len();
        self.nodes.push(TreeNode::new_child(body, parent));
        self.nodes[parent].children.push(id);
        let rest = (self.nodes[id].body.pos - self.nodes[parent].body.pos).length();
        self.constraints.push(Constraint::Distance(DistanceConstraint {
            a: parent,
            b: id,
            rest,
            stiffness,
        }));
        id
    }

    /// Locks the current angle `a - center - c`.
    pub fn add_angle(&mut self, a: NodeId, center: NodeId, c: NodeId, stiffness: f32) {
        let o = self.nodes[center].body.pos;
        let target = signed_angle(self.nodes[a].body.pos - o, self.nodes[c].body.pos - o);
        self.constraints.push(Constraint::Angle(AngleConstraint {
            a,
            center,
            c,
            target,
            stiffness,
        }));
    }

    /// Snapshot of every node's body, indexed by [`NodeId`].
    pub fn bodies(&self) -> Vec<Body> {
        self.nodes.iter().map(|n| n.body.clone()).collect()
    }

    pub fn leaf_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(i, n)| n.body.is_leaf().then_some(i))
    }

    pub fn branch_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(i, n)| matches!(n.body.kind, BodyKind::Branch { .. }).then_some(i))
    }

    /// Checks the structural invariants of a generated tree.
    ///
    /// - every constraint endpoint exists;
    /// - the distance constraints form a spanning tree rooted at `root`
    ///   (each node reachable along exactly one path);
    /// - every angle constraint pairs a node with its own parent/children.
    pub fn validate(&self) -> Result<(), TopologyError> {
        let len = self.nodes.len();
        let check = |node: NodeId| {
            if node < len {
                Ok(())
            } else {
                Err(TopologyError::DanglingReference { node, len })
            }
        };

        let mut adj: Vec<Vec<(NodeId, usize)>> = vec![Vec::new(); len];
        for (e, d) in self.constraints.distances().enumerate() {
            check(d.a)?;
            check(d.b)?;
            adj[d.a].push((d.b, e));
            adj[d.b].push((d.a, e));
        }

        let mut visited = vec![false; len];
        let mut queue = VecDeque::new();
        if len > 0 {
            check(self.root)?;
            visited[self.root] = true;
            queue.push_back((self.root, usize::MAX));
        }
        while let Some((node, via)) = queue.pop_front() {
            for &(next, e) in &adj[node] {
                if e == via {
                    continue;
                }
                if visited[next] {
                    return Err(TopologyError::Cycle(next));
                }
                visited[next] = true;
                queue.push_back((next, e));
            }
        }
        if let Some(lost) = visited.iter().position(|v| !v) {
            return Err(TopologyError::Unreachable(lost));
        }

        for ac in self.constraints.angles() {
            check(ac.a)?;
            check(ac.center)?;
            check(ac.c)?;
            let center = &self.nodes[ac.center];
            for node in [ac.a, ac.c] {
                let related = center.parent == Some(node) || center.children.contains(&node);
                if !related {
                    return Err(TopologyError::StrayAngle {
                        center: ac.center,
                        node,
                    });
                }
            }
        }

        Ok(())
    }
}
