//! Ephemeral tree nodes produced by transitive resolution.

use super::DepKey;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One node in a resolved ecosystem dependency tree.
///
/// A diamond-dependency package can be reached through multiple parents at
/// different depths: the node keeps the minimum depth and the union of
/// parents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeNode {
    /// Distance from a direct dependency (1 = direct)
    pub depth: u32,
    /// Every key that introduced this node
    pub parents: BTreeSet<DepKey>,
    /// Keys this node introduces
    pub children: BTreeSet<DepKey>,
}

impl TreeNode {
    /// Create a node at the given depth.
    #[must_use]
    pub fn at_depth(depth: u32) -> Self {
        Self {
            depth,
            parents: BTreeSet::new(),
            children: BTreeSet::new(),
        }
    }

    /// Merge another sighting of the same node: keep the minimum depth and
    /// union the adjacency sets.
    pub fn absorb(&mut self, depth: u32, parent: Option<DepKey>) {
        self.depth = self.depth.min(depth);
        if let Some(parent) = parent {
            self.parents.insert(parent);
        }
    }
}
