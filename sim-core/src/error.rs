use crate::types::NodeId;
use thiserror::Error;

/// Structural defects found by [`crate::tree::Tree::validate`].
///
/// A correctly generated tree never produces one of these; seeing one
/// means the generator (or a hand-built tree) is broken.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TopologyError {
    #[error("constraint references node {node}, but the tree has {len} nodes")]
    DanglingReference { node: NodeId, len: usize },

    #[error("node {0} has no distance path back to the root")]
    Unreachable(NodeId),

    #[error("node {0} is reachable from the root along more than one path")]
    Cycle(NodeId),

    #[error("angle constraint at node {center} references node {node} which is not its parent or child")]
    StrayAngle { center: NodeId, node: NodeId },
}
