//! Core MCTS search algorithm.
//!
//! One simulation walks down from a node, choosing at each expanded node the
//! child maximizing
//!
//! ```text
//! -child.value + λ · prior · sqrt(1 / (1 + child.visits))
//! ```
//!
//! (first maximum in move order wins). It stops at a terminal node or at an
//! unexpanded node, which it expands with the evaluator. The leaf value is
//! then backed up with alternating sign, each child on the path taking the
//! running mean of the negated value returned through it.
//!
//! The tree is kept between moves: [`MCTSSearch::advance`] moves the current
//! pointer to the child for the played move and every statistic below it is
//! reused.

use std::sync::Arc;
use std::time::Instant;

use thiserror::Error;
use tracing::{debug, trace};

use crate::core::{GameRng, GameState, Move};
use crate::nn::{Evaluator, EvaluatorError};
use crate::rules::{apply_move, legal_moves, Outcome};

use super::config::{ConfigError, MCTSConfig};
use super::node::{Expansion, NodeId, NodeState, SearchNode};
use super::stats::SearchStats;
use super::tree::MCTSTree;

/// Errors raised by the search. All of them abort the current game.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("the current position has no legal moves")]
    NoLegalMoves,

    #[error("no child of the node has been visited")]
    NoVisits,

    #[error("move {0} is not legal at the current node")]
    UnknownMove(Move),

    #[error("expanded node {0} has no selectable child")]
    EmptyExpansion(NodeId),

    #[error("evaluator returned {actual} priors for {expected} moves")]
    PriorCount { expected: usize, actual: usize },

    #[error(transparent)]
    Evaluator(#[from] EvaluatorError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// What one step of the descent does next.
enum Step {
    Leaf(f32),
    Expand,
    Descend(NodeId),
}

/// One search tree with its evaluator, RNG and current position.
pub struct MCTSSearch {
    tree: MCTSTree,

    /// Node holding the real game position.
    current: NodeId,

    evaluator: Arc<dyn Evaluator>,
    config: MCTSConfig,
    rng: GameRng,
    stats: SearchStats,
}

impl std::fmt::Debug for MCTSSearch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MCTSSearch")
            .field("nodes", &self.tree.len())
            .field("current", &self.current)
            .field("evaluator", &self.evaluator.name())
            .field("config", &self.config)
            .finish()
    }
}

impl MCTSSearch {
    /// Create a search rooted at `state`.
    ///
    /// The RNG is seeded from `config.seed`.
    pub fn new(
        state: GameState,
        evaluator: Arc<dyn Evaluator>,
        config: MCTSConfig,
    ) -> Result<Self, SearchError> {
        config.validate()?;
        let tree = MCTSTree::new(state);
        Ok(Self {
            current: tree.root(),
            tree,
            evaluator,
            rng: GameRng::new(config.seed),
            config,
            stats: SearchStats::default(),
        })
    }

    /// Replace the RNG, e.g. with a stream forked from a worker's base RNG.
    #[must_use]
    pub fn with_rng(mut self, rng: GameRng) -> Self {
        self.rng = rng;
        self
    }

    #[must_use]
    pub fn tree(&self) -> &MCTSTree {
        &self.tree
    }

    #[must_use]
    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    #[must_use]
    pub fn config(&self) -> &MCTSConfig {
        &self.config
    }

    #[must_use]
    pub fn evaluator(&self) -> &Arc<dyn Evaluator> {
        &self.evaluator
    }

    /// The node holding the real game position.
    #[must_use]
    pub fn current(&self) -> NodeId {
        self.current
    }

    #[must_use]
    pub fn current_node(&self) -> &SearchNode {
        self.tree.get(self.current)
    }

    /// The real game position.
    #[must_use]
    pub fn state(&self) -> &GameState {
        &self.current_node().state
    }

    /// Outcome at the current node, `None` while the game continues.
    #[must_use]
    pub fn outcome(&self) -> Option<Outcome> {
        self.current_node().outcome()
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.current_node().is_terminal()
    }

    /// Run one simulation from `from`.
    ///
    /// Returns the backed-up value from the perspective of the player who
    /// moved into `from`.
    pub fn search(&mut self, from: NodeId) -> Result<f32, SearchError> {
        self.stats.simulations += 1;
        let lambda = self.config.exploration;
        let mut path = vec![from];
        let mut id = from;

        let leaf_value = loop {
            let node = self.tree.get(id);
            let step = match &node.expansion {
                NodeState::Terminal(_) => Step::Leaf(-node.value),
                NodeState::Unexpanded => Step::Expand,
                NodeState::Expanded(expansion) => Step::Descend(
                    select_child(&self.tree, expansion, lambda)
                        .ok_or(SearchError::EmptyExpansion(id))?,
                ),
            };
            match step {
                Step::Leaf(value) => {
                    self.stats.terminal_hits += 1;
                    break value;
                }
                Step::Expand => break -self.expand(id)?,
                Step::Descend(child) => {
                    path.push(child);
                    id = child;
                }
            }
        };

        let depth = self.tree.get(id).depth;
        self.stats.max_depth = self.stats.max_depth.max(depth);

        let mut value = leaf_value;
        for &node_id in path[1..].iter().rev() {
            let node = self.tree.get_mut(node_id);
            let visits = node.visits as f32;
            node.value = (visits * node.value - value) / (visits + 1.0);
            node.visits += 1;
            value = -value;
        }
        Ok(value)
    }

    /// Evaluate an unexpanded node and allocate its children.
    ///
    /// Returns the evaluator's value for the node's mover.
    fn expand(&mut self, id: NodeId) -> Result<f32, SearchError> {
        let node = self.tree.get(id);
        let state = node.state.clone();
        let depth = node.depth;

        let moves = legal_moves(&state);
        if moves.is_empty() {
            return Err(SearchError::EmptyExpansion(id));
        }
        let evaluation = self.evaluator.evaluate(&state, &moves)?;
        if evaluation.priors.len() != moves.len() {
            return Err(SearchError::PriorCount {
                expected: moves.len(),
                actual: evaluation.priors.len(),
            });
        }

        let children = moves
            .iter()
            .enumerate()
            .map(|(edge, mv)| {
                self.tree.alloc(SearchNode::new(
                    apply_move(&state, mv),
                    id,
                    edge as u16,
                    depth + 1,
                ))
            })
            .collect();

        let node = self.tree.get_mut(id);
        node.value = evaluation.value;
        node.expansion = NodeState::Expanded(Expansion {
            moves,
            priors: evaluation.priors,
            children,
        });
        self.stats.expansions += 1;
        Ok(evaluation.value)
    }

    /// Children's share of visits at `id`, aligned with its legal moves.
    pub fn visit_distribution(&self, id: NodeId) -> Result<Vec<f32>, SearchError> {
        let node = self.tree.get(id);
        let expansion = match &node.expansion {
            NodeState::Expanded(expansion) => expansion,
            NodeState::Terminal(_) => return Err(SearchError::NoLegalMoves),
            NodeState::Unexpanded => return Err(SearchError::NoVisits),
        };
        let visits: Vec<u32> = expansion
            .children
            .iter()
            .map(|&child| self.tree.get(child).visits)
            .collect();
        let total: u64 = visits.iter().map(|&v| u64::from(v)).sum();
        if total == 0 {
            return Err(SearchError::NoVisits);
        }
        Ok(visits
            .into_iter()
            .map(|v| v as f32 / total as f32)
            .collect())
    }

    /// Run `simulations` simulations from the current node and sample a move
    /// from the resulting visit distribution.
    pub fn choose_move(&mut self, simulations: u32) -> Result<Move, SearchError> {
        if self.is_terminal() {
            return Err(SearchError::NoLegalMoves);
        }

        let start = Instant::now();
        for _ in 0..simulations {
            self.search(self.current)?;
        }
        self.stats.time_us += start.elapsed().as_micros() as u64;

        let distribution = self.visit_distribution(self.current)?;
        let index = self
            .rng
            .sample_cumulative(&distribution)
            .ok_or(SearchError::NoVisits)?;
        let expansion = self
            .current_node()
            .expansion()
            .ok_or(SearchError::NoLegalMoves)?;
        let mv = expansion.moves[index];

        trace!(
            simulations,
            nodes = self.tree.len(),
            expansions = self.stats.expansions,
            terminal_hits = self.stats.terminal_hits,
            max_depth = self.stats.max_depth,
            "search finished"
        );
        debug!(
            chosen = %mv,
            share = distribution[index],
            value = self.tree.get(expansion.children[index]).value,
            "chose move"
        );
        Ok(mv)
    }

    /// Move the current pointer to the child reached by `mv`, expanding the
    /// current node first if needed.
    pub fn advance(&mut self, mv: &Move) -> Result<NodeId, SearchError> {
        if matches!(self.current_node().expansion, NodeState::Unexpanded) {
            self.expand(self.current)?;
        }
        let child = self
            .current_node()
            .expansion()
            .and_then(|expansion| expansion.child_for(mv))
            .ok_or(SearchError::UnknownMove(*mv))?;
        self.current = child;
        Ok(child)
    }
}

/// The child maximizing the selection score; the first maximum wins.
fn select_child(tree: &MCTSTree, expansion: &Expansion, lambda: f32) -> Option<NodeId> {
    let mut best = None;
    let mut best_score = f32::NEG_INFINITY;
    for (&child, &prior) in expansion.children.iter().zip(&expansion.priors) {
        let node = tree.get(child);
        let confidence = (1.0 / (1.0 + node.visits as f32)).sqrt();
        let score = -node.value + lambda * prior * confidence;
        if score > best_score {
            best_score = score;
            best = Some(child);
        }
    }
    best
}
