//! Game state bindings for Python.

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use crate::core::GameState;
use crate::nn::{BoardEncoder, StateEncoder};
use crate::rules::{parse_move, try_apply};

use super::py_nn::PyEncodedState;

/// Python wrapper for GameState. Moves are given in move text ("fa1").
#[pyclass(name = "GameState")]
#[derive(Clone, Debug)]
pub struct PyGameState(pub GameState);

#[pymethods]
impl PyGameState {
    /// The initial position.
    #[new]
    fn new() -> Self {
        Self(GameState::new())
    }

    /// Play a move, raising ValueError if it is malformed or illegal.
    fn play(&mut self, text: &str) -> PyResult<()> {
        let mv = parse_move(text, &self.0).map_err(|e| PyValueError::new_err(e.to_string()))?;
        self.0 = try_apply(&self.0, &mv).map_err(|e| PyValueError::new_err(e.to_string()))?;
        Ok(())
    }

    /// Legal moves in enumeration order.
    fn legal_moves(&self) -> Vec<String> {
        self.0.legal_moves().iter().map(ToString::to_string).collect()
    }

    /// 1 or 2.
    #[getter]
    fn turn(&self) -> u8 {
        self.0.turn().number()
    }

    #[getter]
    fn outcome(&self) -> String {
        self.0.outcome().to_string()
    }

    fn is_terminal(&self) -> bool {
        self.0.is_terminal()
    }

    /// Board tensor relative to the side to move.
    fn encode(&self) -> PyEncodedState {
        PyEncodedState(BoardEncoder.encode(&self.0))
    }

    /// Snapshot in the training-record JSON format.
    fn to_json(&self) -> PyResult<String> {
        serde_json::to_string(&self.0.snapshot()).map_err(|e| PyValueError::new_err(e.to_string()))
    }

    fn __repr__(&self) -> String {
        self.0.to_string()
    }
}
