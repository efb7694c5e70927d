//! Evaluator boundary between the search and position evaluation.
//!
//! ## Overview
//!
//! - **Encoding**: `StateEncoder` trait and the `[4, 4, 9]` `BoardEncoder`
//! - **Policy layout**: `PolicyTable`, the fixed 4128-slot move indexing
//! - **Networks**: `PolicyValueNetwork` trait, `UniformNetwork` baseline
//! - **Evaluators**: `Evaluator` trait, `HeuristicEvaluator`, `NetworkEvaluator`
//!
//! ## Usage
//!
//! ```
//! use tak_zero::core::GameState;
//! use tak_zero::nn::{Evaluator, NetworkEvaluator, UniformNetwork};
//! use tak_zero::rules::legal_moves;
//!
//! let state = GameState::new();
//! let moves = legal_moves(&state);
//! let eval = NetworkEvaluator::new(UniformNetwork).evaluate(&state, &moves).unwrap();
//! assert_eq!(eval.priors.len(), moves.len());
//! ```

pub mod encoder;
pub mod evaluator;
pub mod policy_table;
pub mod traits;

pub use encoder::{BoardEncoder, StateEncoder};
pub use evaluator::{
    softmax, Evaluation, Evaluator, EvaluatorError, HeuristicEvaluator, NetworkEvaluator,
};
pub use policy_table::{PolicyTable, POLICY_SIZE, SLOTS_PER_CELL};
pub use traits::{EncodedState, NetworkOutput, PolicyValueNetwork, UniformNetwork};
