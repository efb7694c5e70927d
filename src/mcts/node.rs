//! Search tree nodes.
//!
//! Nodes live in an arena ([`MCTSTree`](super::MCTSTree)) and refer to each
//! other by [`NodeId`]. A node starts `Unexpanded` holding only its state and
//! moves to `Expanded` or `Terminal` exactly once.

use crate::core::{GameState, Move};
use crate::rules::Outcome;

/// Index into the MCTSTree node arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Sentinel value representing no node.
    pub const NONE: NodeId = NodeId(u32::MAX);

    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Check if this is the NONE sentinel.
    #[inline]
    #[must_use]
    pub const fn is_none(self) -> bool {
        self.0 == u32::MAX
    }

    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_none() {
            write!(f, "NodeId(NONE)")
        } else {
            write!(f, "NodeId({})", self.0)
        }
    }
}

/// Moves, priors and children of an expanded node, index-aligned.
#[derive(Clone, Debug)]
pub struct Expansion {
    pub moves: Vec<Move>,
    pub priors: Vec<f32>,
    pub children: Vec<NodeId>,
}

impl Expansion {
    /// Child reached by `mv`, matched by structural equality.
    #[must_use]
    pub fn child_for(&self, mv: &Move) -> Option<NodeId> {
        self.moves
            .iter()
            .position(|m| m == mv)
            .map(|i| self.children[i])
    }
}

/// Expansion status of a node.
#[derive(Clone, Debug)]
pub enum NodeState {
    /// Created but not yet evaluated.
    Unexpanded,
    /// The game is over in this node's state.
    Terminal(Outcome),
    /// Evaluated, with one child per legal move.
    Expanded(Expansion),
}

/// A node in the search tree.
#[derive(Clone, Debug)]
pub struct SearchNode {
    /// Position at this node.
    pub state: GameState,

    /// Parent node (NONE for root).
    pub parent: NodeId,

    /// Index of this node among the parent's children.
    pub parent_edge: u16,

    /// Depth in tree (root = 0).
    pub depth: u16,

    /// Times this node was backed up through.
    pub visits: u32,

    /// Value estimate from the perspective of the player to move here.
    ///
    /// Set by expansion, overwritten by the running mean of backed-up values,
    /// and fixed at ±1 or 0 for terminal nodes.
    pub value: f32,

    pub expansion: NodeState,
}

impl SearchNode {
    /// A fresh node. Terminal states are resolved immediately.
    pub fn new(state: GameState, parent: NodeId, parent_edge: u16, depth: u16) -> Self {
        let outcome = state.outcome();
        let (expansion, value) = if outcome.is_terminal() {
            (NodeState::Terminal(outcome), outcome.value_for(state.turn()))
        } else {
            (NodeState::Unexpanded, 0.0)
        };
        Self {
            state,
            parent,
            parent_edge,
            depth,
            visits: 0,
            value,
            expansion,
        }
    }

    /// Create a root node.
    pub fn root(state: GameState) -> Self {
        Self::new(state, NodeId::NONE, 0, 0)
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self.expansion, NodeState::Terminal(_))
    }

    #[must_use]
    pub fn is_expanded(&self) -> bool {
        matches!(self.expansion, NodeState::Expanded(_))
    }

    /// The game outcome if this node is terminal.
    #[must_use]
    pub fn outcome(&self) -> Option<Outcome> {
        match self.expansion {
            NodeState::Terminal(outcome) => Some(outcome),
            _ => None,
        }
    }

    #[must_use]
    pub fn expansion(&self) -> Option<&Expansion> {
        match &self.expansion {
            NodeState::Expanded(expansion) => Some(expansion),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Cell;
    use crate::rules::apply_move;

    #[test]
    fn test_node_id() {
        let id = NodeId::new(5);
        assert_eq!(id.index(), 5);
        assert!(!id.is_none());
        assert!(NodeId::NONE.is_none());
        assert_eq!(format!("{}", id), "NodeId(5)");
        assert_eq!(format!("{}", NodeId::NONE), "NodeId(NONE)");
    }

    #[test]
    fn test_fresh_node_is_unexpanded() {
        let node = SearchNode::root(GameState::new());
        assert!(!node.is_terminal());
        assert!(!node.is_expanded());
        assert_eq!(node.visits, 0);
        assert_eq!(node.value, 0.0);
        assert!(node.parent.is_none());
    }

    #[test]
    fn test_terminal_node_value_is_from_its_mover() {
        let mut state = GameState::new();
        for rank in 0..3u8 {
            state = apply_move(&state, &Move::PlaceFlat { cell: Cell::new(0, rank) });
            state = apply_move(&state, &Move::PlaceFlat { cell: Cell::new(2, rank) });
        }
        state = apply_move(&state, &Move::PlaceFlat { cell: Cell::new(0, 3) });

        // Player 1 completed a road; player 2 is to move and has lost.
        let node = SearchNode::new(state, NodeId::new(0), 3, 1);
        assert_eq!(node.outcome(), Some(Outcome::Player1Win));
        assert_eq!(node.value, -1.0);
        assert_eq!(node.visits, 0);
    }

    #[test]
    fn test_expansion_lookup() {
        let a = Move::PlaceFlat { cell: Cell::new(0, 0) };
        let b = Move::PlaceWall { cell: Cell::new(0, 0) };
        let expansion = Expansion {
            moves: vec![a, b],
            priors: vec![0.5, 0.5],
            children: vec![NodeId::new(1), NodeId::new(2)],
        };
        assert_eq!(expansion.child_for(&b), Some(NodeId::new(2)));
        assert_eq!(expansion.child_for(&Move::PlaceFlat { cell: Cell::new(1, 0) }), None);
    }
}
