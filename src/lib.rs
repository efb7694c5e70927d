//! # tak-zero
//!
//! A 4x4 Tak rules engine with a guided Monte Carlo Tree Search, built to
//! generate self-play training data for a policy/value network.
//!
//! ## Design Principles
//!
//! 1. **Immutable States**: the rules engine maps a state and a move to a
//!    new state. Search nodes own their states and nothing mutates them.
//!
//! 2. **Side-to-Move Values**: every value in the tree and in training
//!    records is from the perspective of the player about to move.
//!
//! 3. **Pluggable Evaluation**: search only sees the `Evaluator` trait, so
//!    a heuristic, a uniform baseline and a neural network are
//!    interchangeable.
//!
//! ## Architecture
//!
//! - **Tree Reuse**: one tree follows the real game; the current pointer
//!   moves down as moves are played.
//!
//! - **Arena Storage**: nodes live in a `Vec` and refer to parents and
//!   children by `NodeId`.
//!
//! - **Reproducibility**: all sampling goes through a seeded `GameRng`,
//!   forked per worker and per game.
//!
//! ## Modules
//!
//! - `core`: board, pieces, moves, game state and RNG
//! - `rules`: move generation, move application, outcomes and move text
//! - `nn`: evaluators, board encoding and the policy index table
//! - `mcts`: search tree, simulation and move choice
//! - `training`: self-play, opposition games and record output

pub mod core;
pub mod mcts;
pub mod nn;
pub mod rules;
pub mod training;

#[cfg(feature = "python")]
pub mod python;

// Re-export commonly used types
pub use crate::core::{
    Board, Cell, Direction, GameRng, GameState, Move, Piece, PieceKind, Player,
    PlayerMap, Stack, StateSnapshot,
};

pub use crate::rules::{legal_moves, outcome, parse_move, Outcome, RulesError};

pub use crate::nn::{
    BoardEncoder, Evaluation, Evaluator, EvaluatorError, HeuristicEvaluator, NetworkEvaluator,
    PolicyTable, PolicyValueNetwork, UniformNetwork,
};

pub use crate::mcts::{MCTSConfig, MCTSSearch, MCTSTree, NodeId, SearchError, SearchStats};

pub use crate::training::{
    GameRecord, Opposition, OppositionTally, PositionRecord, RecordFormat, RecordWriter,
    SelfPlayConfig, SelfPlayError, SelfPlayWorker,
};
