//! Arena-based search tree.
//!
//! Uses a flat `Vec<SearchNode>` with index-based references. Parents are
//! plain indices, so walking back up for the training record needs no
//! shared ownership.

use crate::core::GameState;

use super::node::{NodeId, NodeState, SearchNode};

/// Arena-based search tree.
#[derive(Clone, Debug)]
pub struct MCTSTree {
    nodes: Vec<SearchNode>,
    root: NodeId,
}

impl MCTSTree {
    /// Create a tree whose root holds `state`.
    pub fn new(state: GameState) -> Self {
        Self::with_capacity(state, 1024)
    }

    /// Create a tree with custom initial capacity.
    pub fn with_capacity(state: GameState, capacity: usize) -> Self {
        let mut nodes = Vec::with_capacity(capacity.max(1));
        nodes.push(SearchNode::root(state));
        Self {
            nodes,
            root: NodeId::new(0),
        }
    }

    #[inline]
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Get a node by ID.
    #[inline]
    #[must_use]
    pub fn get(&self, id: NodeId) -> &SearchNode {
        &self.nodes[id.index()]
    }

    /// Get a mutable node by ID.
    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> &mut SearchNode {
        &mut self.nodes[id.index()]
    }

    /// Allocate a new node, returning its ID.
    pub fn alloc(&mut self, node: SearchNode) -> NodeId {
        let id = NodeId::new(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Number of nodes in the tree.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// `id` followed by its parent, grandparent, ... up to the root.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors((!id.is_none()).then_some(id), move |&current| {
            let parent = self.get(current).parent;
            (!parent.is_none()).then_some(parent)
        })
    }

    /// Iterate over all nodes.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &SearchNode)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (NodeId::new(i as u32), n))
    }

    /// Get statistics about the tree.
    #[must_use]
    pub fn stats(&self) -> TreeStats {
        let mut stats = TreeStats {
            node_count: self.nodes.len(),
            ..TreeStats::default()
        };
        for node in &self.nodes {
            stats.max_depth = stats.max_depth.max(node.depth);
            match &node.expansion {
                NodeState::Unexpanded => {}
                NodeState::Terminal(_) => stats.terminal_count += 1,
                NodeState::Expanded(expansion) => {
                    stats.expanded_count += 1;
                    stats.total_edges += expansion.children.len();
                }
            }
        }
        stats
    }
}

/// Statistics about the search tree.
#[derive(Clone, Debug, Default)]
pub struct TreeStats {
    pub node_count: usize,
    pub max_depth: u16,
    pub terminal_count: usize,
    /// Nodes that have been evaluated and given children.
    pub expanded_count: usize,
    pub total_edges: usize,
}

impl TreeStats {
    /// Average children per expanded node.
    #[must_use]
    pub fn branching_factor(&self) -> f64 {
        if self.expanded_count == 0 {
            0.0
        } else {
            self.total_edges as f64 / self.expanded_count as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Cell, Move};
    use crate::mcts::node::Expansion;
    use crate::rules::apply_move;

    #[test]
    fn test_tree_new() {
        let tree = MCTSTree::new(GameState::new());
        assert_eq!(tree.len(), 1);
        assert!(!tree.is_empty());
        assert_eq!(tree.root(), NodeId::new(0));
        assert_eq!(tree.get(tree.root()).state, GameState::new());
    }

    #[test]
    fn test_alloc_and_ancestors() {
        let mut tree = MCTSTree::new(GameState::new());
        let root = tree.root();
        let state = apply_move(&GameState::new(), &Move::PlaceFlat { cell: Cell::new(0, 0) });
        let child = tree.alloc(SearchNode::new(state.clone(), root, 0, 1));
        let state = apply_move(&state, &Move::PlaceFlat { cell: Cell::new(1, 0) });
        let grandchild = tree.alloc(SearchNode::new(state, child, 2, 2));

        let chain: Vec<_> = tree.ancestors(grandchild).collect();
        assert_eq!(chain, vec![grandchild, child, root]);
        assert_eq!(tree.ancestors(root).count(), 1);
        assert_eq!(tree.ancestors(NodeId::NONE).count(), 0);
        assert_eq!(tree.iter().count(), 3);
    }

    #[test]
    fn test_stats() {
        let mut tree = MCTSTree::new(GameState::new());
        let root = tree.root();
        let state = apply_move(&GameState::new(), &Move::PlaceFlat { cell: Cell::new(0, 0) });
        let child = tree.alloc(SearchNode::new(state, root, 0, 1));
        tree.get_mut(root).expansion = NodeState::Expanded(Expansion {
            moves: vec![Move::PlaceFlat { cell: Cell::new(0, 0) }],
            priors: vec![1.0],
            children: vec![child],
        });

        let stats = tree.stats();
        assert_eq!(stats.node_count, 2);
        assert_eq!(stats.max_depth, 1);
        assert_eq!(stats.expanded_count, 1);
        assert_eq!(stats.branching_factor(), 1.0);
    }
}
