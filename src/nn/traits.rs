//! Network boundary: encoded inputs, raw outputs and the network trait.
//!
//! A network sees only the encoded board and returns one logit per policy
//! slot plus a scalar value. Mapping logits onto legal moves is the job of
//! [`NetworkEvaluator`](super::NetworkEvaluator).

use serde::{Deserialize, Serialize};

use super::evaluator::EvaluatorError;
use super::policy_table::POLICY_SIZE;

/// Encoded game state as a flat tensor for neural network input.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EncodedState {
    /// Flattened tensor data (row-major order).
    pub tensor: Vec<f32>,

    /// Shape of the tensor, e.g. `[4, 4, 9]`.
    pub shape: Vec<usize>,
}

impl EncodedState {
    /// Create a new encoded state.
    pub fn new(tensor: Vec<f32>, shape: Vec<usize>) -> Self {
        debug_assert_eq!(
            tensor.len(),
            shape.iter().product::<usize>(),
            "Tensor length must match shape product"
        );
        Self { tensor, shape }
    }

    /// Create a zero-filled encoded state with the given shape.
    pub fn zeros(shape: Vec<usize>) -> Self {
        let size = shape.iter().product();
        Self {
            tensor: vec![0.0; size],
            shape,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tensor.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tensor.is_empty()
    }

    /// Get element at a flat index.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<f32> {
        self.tensor.get(index).copied()
    }
}

/// Raw network output for one position.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NetworkOutput {
    /// One unnormalized logit per policy slot ([`POLICY_SIZE`] entries).
    pub policy_logits: Vec<f32>,

    /// Value for the side to move, nominally in `[-1, 1]`.
    pub value: f32,
}

/// Combined policy-value network.
///
/// Implementations must be shareable across worker threads.
pub trait PolicyValueNetwork: Send + Sync {
    /// Predict policy logits and value for the given state.
    fn predict(&self, encoded: &EncodedState) -> Result<NetworkOutput, EvaluatorError>;

    /// Batch prediction for multiple states (optional optimization).
    fn predict_batch(
        &self,
        encoded: &[EncodedState],
    ) -> Result<Vec<NetworkOutput>, EvaluatorError> {
        encoded.iter().map(|e| self.predict(e)).collect()
    }
}

/// All-zero logits and zero value (baseline for testing).
///
/// After the softmax over legal moves this is a uniform prior.
#[derive(Clone, Copy, Debug, Default)]
pub struct UniformNetwork;

impl PolicyValueNetwork for UniformNetwork {
    fn predict(&self, _encoded: &EncodedState) -> Result<NetworkOutput, EvaluatorError> {
        Ok(NetworkOutput {
            policy_logits: vec![0.0; POLICY_SIZE],
            value: 0.0,
        })
    }
}
