//! MCTS configuration parameters.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Rejected configuration, reported before any game starts.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("at least {min} simulations per move are required, got {got}")]
    TooFewSimulations { got: u32, min: u32 },

    #[error("only temperature 1 is supported, got {0}")]
    UnsupportedTemperature(f32),

    #[error("exploration constant must be finite and non-negative, got {0}")]
    InvalidExploration(f32),

    #[error("number of games must be positive")]
    ZeroGames,

    #[error("number of worker threads must be positive")]
    ZeroThreads,
}

/// Search parameters for one tree.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MCTSConfig {
    /// Weight of the prior term in child selection (λ).
    pub exploration: f32,

    /// Simulations run before each move is chosen.
    ///
    /// Two is the minimum: the first expands an unexpanded node, the second
    /// gives it a visited child to sample from.
    pub simulations: u32,

    /// Random seed for move sampling.
    /// Same seed and evaluator produce the same games.
    pub seed: u64,

    /// Temperature applied to visit counts when sampling a move.
    pub temperature: f32,
}

/// Fewest simulations that guarantee a visit distribution from a fresh node.
pub const MIN_SIMULATIONS: u32 = 2;

impl Default for MCTSConfig {
    fn default() -> Self {
        Self {
            exploration: 1.0,
            simulations: 100,
            seed: 42,
            temperature: 1.0,
        }
    }
}

impl MCTSConfig {
    /// Set the exploration constant.
    pub fn with_exploration(mut self, lambda: f32) -> Self {
        self.exploration = lambda;
        self
    }

    /// Set the per-move simulation count.
    pub fn with_simulations(mut self, simulations: u32) -> Self {
        self.simulations = simulations;
        self
    }

    /// Set the seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Check the parameters before a search is built.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.simulations < MIN_SIMULATIONS {
            return Err(ConfigError::TooFewSimulations {
                got: self.simulations,
                min: MIN_SIMULATIONS,
            });
        }
        if self.temperature != 1.0 {
            return Err(ConfigError::UnsupportedTemperature(self.temperature));
        }
        if !self.exploration.is_finite() || self.exploration < 0.0 {
            return Err(ConfigError::InvalidExploration(self.exploration));
        }
        Ok(())
    }
}
