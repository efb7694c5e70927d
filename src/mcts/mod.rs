//! Guided Monte Carlo Tree Search.
//!
//! ## Overview
//!
//! - **Lazy expansion**: nodes hold only their state until first visited;
//!   the evaluator then supplies a value and one prior per legal move
//! - **Negamax backup**: every value is stored from the perspective of the
//!   player to move at that node and flips sign on the way up
//! - **Tree reuse**: the tree follows the real game, so statistics gathered
//!   for earlier moves carry over
//! - **Arena storage**: nodes refer to parents and children by `NodeId`
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use tak_zero::core::GameState;
//! use tak_zero::mcts::{MCTSConfig, MCTSSearch};
//! use tak_zero::nn::HeuristicEvaluator;
//!
//! let config = MCTSConfig::default().with_seed(7);
//! let mut search = MCTSSearch::new(GameState::new(), Arc::new(HeuristicEvaluator), config)
//!     .unwrap();
//!
//! let mv = search.choose_move(64).unwrap();
//! let probs = search.visit_distribution(search.current()).unwrap();
//! assert!((probs.iter().sum::<f32>() - 1.0).abs() < 1e-5);
//!
//! search.advance(&mv).unwrap();
//! ```

pub mod config;
pub mod node;
pub mod search;
pub mod stats;
pub mod tree;

pub use config::{ConfigError, MCTSConfig, MIN_SIMULATIONS};
pub use node::{Expansion, NodeId, NodeState, SearchNode};
pub use search::{MCTSSearch, SearchError};
pub use stats::SearchStats;
pub use tree::{MCTSTree, TreeStats};
