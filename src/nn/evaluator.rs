//! Position evaluators used by the search.
//!
//! An evaluator returns a value for the side to move and one prior per legal
//! move. Two implementations are provided:
//!
//! - [`HeuristicEvaluator`]: uniform priors, flat-count value. Needs no model.
//! - [`NetworkEvaluator`]: runs a [`PolicyValueNetwork`] and softmaxes its
//!   logits over the legal moves.

use thiserror::Error;

use crate::core::{GameState, Move};
use crate::rules::tiles_eval;

use super::encoder::{BoardEncoder, StateEncoder};
use super::policy_table::PolicyTable;
use super::traits::PolicyValueNetwork;

/// Errors that can occur during evaluation.
#[derive(Debug, Error)]
pub enum EvaluatorError {
    #[error("Evaluation failed: {0}")]
    EvaluationFailed(String),

    #[error("policy has {actual} entries, expected {expected}")]
    PolicyLength { expected: usize, actual: usize },

    #[error("network returned a non-finite value")]
    NonFinite,

    #[error("Model error: {0}")]
    ModelError(String),
}

/// Value and priors for one position.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    /// Value for the side to move, in `[-1, 1]`.
    pub value: f32,

    /// One prior per legal move, index-aligned with the move list. Sums to 1
    /// when there is at least one move.
    pub priors: Vec<f32>,
}

/// Trait for position evaluators.
///
/// Shared read-only between worker threads.
pub trait Evaluator: Send + Sync {
    /// Evaluate `state` given its legal moves.
    fn evaluate(&self, state: &GameState, moves: &[Move]) -> Result<Evaluation, EvaluatorError>;

    /// Short name for logs.
    fn name(&self) -> &'static str {
        "evaluator"
    }
}

fn uniform(count: usize) -> Vec<f32> {
    if count == 0 {
        return Vec::new();
    }
    vec![1.0 / count as f32; count]
}

/// Uniform priors with the flat-count value from [`tiles_eval`].
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicEvaluator;

impl Evaluator for HeuristicEvaluator {
    fn evaluate(&self, state: &GameState, moves: &[Move]) -> Result<Evaluation, EvaluatorError> {
        Ok(Evaluation {
            value: tiles_eval(state),
            priors: uniform(moves.len()),
        })
    }

    fn name(&self) -> &'static str {
        "heuristic"
    }
}

/// Adapter from a policy/value network to [`Evaluator`].
#[derive(Debug, Clone)]
pub struct NetworkEvaluator<N> {
    network: N,
    encoder: BoardEncoder,
}

impl<N: PolicyValueNetwork> NetworkEvaluator<N> {
    /// Wrap a network using the standard board encoder.
    pub fn new(network: N) -> Self {
        Self {
            network,
            encoder: BoardEncoder,
        }
    }
}

/// Numerically stable softmax.
#[must_use]
pub fn softmax(logits: &[f32]) -> Vec<f32> {
    let Some(max) = logits.iter().copied().reduce(f32::max) else {
        return Vec::new();
    };
    let exps: Vec<f32> = logits.iter().map(|&l| (l - max).exp()).collect();
    let total: f32 = exps.iter().sum();
    exps.into_iter().map(|e| e / total).collect()
}

impl<N: PolicyValueNetwork> Evaluator for NetworkEvaluator<N> {
    fn evaluate(&self, state: &GameState, moves: &[Move]) -> Result<Evaluation, EvaluatorError> {
        let encoded = self.encoder.encode(state);
        let output = self.network.predict(&encoded)?;

        let expected = self.encoder.action_space_size();
        if output.policy_logits.len() != expected {
            return Err(EvaluatorError::PolicyLength {
                expected,
                actual: output.policy_logits.len(),
            });
        }
        if !output.value.is_finite() {
            return Err(EvaluatorError::NonFinite);
        }

        let logits = PolicyTable::gather(&output.policy_logits, moves);
        if logits.iter().any(|l| !l.is_finite()) {
            return Err(EvaluatorError::NonFinite);
        }

        Ok(Evaluation {
            value: output.value.clamp(-1.0, 1.0),
            priors: softmax(&logits),
        })
    }

    fn name(&self) -> &'static str {
        "network"
    }
}
