//! Self-play bindings for Python.

use std::sync::Arc;

use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;

use crate::nn::{Evaluator, HeuristicEvaluator, NetworkEvaluator};
use crate::training::{RecordFormat, RecordWriter, SelfPlayConfig, SelfPlayWorker};

use super::py_nn::PyPolicyValueNetwork;

/// Python wrapper for SelfPlayConfig.
#[pyclass(name = "SelfPlayConfig")]
#[derive(Clone)]
pub struct PySelfPlayConfig(pub SelfPlayConfig);

#[pymethods]
impl PySelfPlayConfig {
    /// Create a new self-play configuration.
    ///
    /// # Arguments
    /// - games: Number of games (default: 1)
    /// - simulations: Simulations per move, at least 2 (default: 100)
    /// - seed: Base random seed (default: 42)
    /// - exploration: Weight of the prior term (default: 1.0)
    /// - max_plies: Abandon longer games (default: 500)
    #[new]
    #[pyo3(signature = (games = 1, simulations = 100, seed = 42, exploration = 1.0, max_plies = 500))]
    fn new(games: usize, simulations: u32, seed: u64, exploration: f32, max_plies: usize) -> Self {
        let mut config = SelfPlayConfig::new()
            .with_games(games)
            .with_simulations(simulations)
            .with_seed(seed)
            .with_max_plies(max_plies);
        config.mcts.exploration = exploration;
        Self(config)
    }

    #[getter]
    fn games(&self) -> usize {
        self.0.games
    }

    #[getter]
    fn simulations(&self) -> u32 {
        self.0.mcts.simulations
    }

    #[getter]
    fn seed(&self) -> u64 {
        self.0.mcts.seed
    }

    #[getter]
    fn exploration(&self) -> f32 {
        self.0.mcts.exploration
    }

    #[getter]
    fn max_plies(&self) -> usize {
        self.0.max_plies
    }

    fn __repr__(&self) -> String {
        format!(
            "SelfPlayConfig(games={}, simulations={}, seed={}, max_plies={})",
            self.0.games, self.0.mcts.simulations, self.0.mcts.seed, self.0.max_plies
        )
    }
}

/// Play self-play games and return their positions as one JSON array.
///
/// Without a network the flat-count heuristic guides the search.
#[pyfunction]
#[pyo3(signature = (config, network = None))]
pub fn self_play(
    py: Python<'_>,
    config: &PySelfPlayConfig,
    network: Option<PyRef<'_, PyPolicyValueNetwork>>,
) -> PyResult<String> {
    let evaluator: Arc<dyn Evaluator> = match network {
        Some(network) => Arc::new(NetworkEvaluator::new(network.share(py))),
        None => Arc::new(HeuristicEvaluator),
    };
    let config = config.0.clone();

    let bytes = py.allow_threads(move || {
        let mut worker = SelfPlayWorker::new(evaluator, config.clone())?;
        let mut writer = RecordWriter::new(Vec::new(), RecordFormat::Json);
        for game in worker.play_games(config.games)? {
            writer.write_game(&game)?;
        }
        Ok::<_, crate::training::SelfPlayError>(writer.finish()?)
    });

    let bytes = bytes.map_err(|e| PyRuntimeError::new_err(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| PyValueError::new_err(e.to_string()))
}
