//! Neural network bindings for Python.

use numpy::{PyArray1, PyArrayMethods};
use pyo3::prelude::*;

use crate::nn::{EncodedState, EvaluatorError, NetworkOutput, PolicyValueNetwork, POLICY_SIZE};

/// Python wrapper for EncodedState.
#[pyclass(name = "EncodedState")]
#[derive(Clone, Debug)]
pub struct PyEncodedState(pub EncodedState);

#[pymethods]
impl PyEncodedState {
    #[new]
    fn new(tensor: Vec<f32>, shape: Vec<usize>) -> Self {
        Self(EncodedState::new(tensor, shape))
    }

    #[getter]
    fn tensor(&self) -> Vec<f32> {
        self.0.tensor.clone()
    }

    #[getter]
    fn shape(&self) -> Vec<usize> {
        self.0.shape.clone()
    }

    fn __len__(&self) -> usize {
        self.0.len()
    }

    /// Convert to a numpy array with the tensor's shape.
    fn to_numpy<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyAny>> {
        encoded_to_numpy(py, &self.0)
    }

    fn __repr__(&self) -> String {
        format!("EncodedState(shape={:?}, len={})", self.0.shape, self.0.len())
    }
}

pub(crate) fn encoded_to_numpy<'py>(
    py: Python<'py>,
    encoded: &EncodedState,
) -> PyResult<Bound<'py, PyAny>> {
    let flat = PyArray1::from_slice_bound(py, &encoded.tensor);
    Ok(flat.reshape(encoded.shape.clone())?.into_any())
}

/// A network implemented by a Python callable.
///
/// The callable receives the `[4, 4, 9]` board as a numpy array and returns
/// `(policy_logits, value)` with one logit per policy slot.
#[pyclass(name = "PolicyValueNetwork")]
pub struct PyPolicyValueNetwork {
    callback: PyObject,
}

#[pymethods]
impl PyPolicyValueNetwork {
    #[new]
    fn new(callback: PyObject) -> Self {
        Self { callback }
    }

    /// Call the network on an encoded state.
    fn predict(&self, py: Python<'_>, encoded: &PyEncodedState) -> PyResult<(Vec<f32>, f32)> {
        let board = encoded_to_numpy(py, &encoded.0)?;
        self.callback.call1(py, (board,))?.extract(py)
    }

    #[getter]
    fn policy_size(&self) -> usize {
        POLICY_SIZE
    }
}

impl PyPolicyValueNetwork {
    pub(crate) fn share(&self, py: Python<'_>) -> PythonNetwork {
        PythonNetwork {
            callback: self.callback.clone_ref(py),
        }
    }
}

/// Rust-side handle on a Python callable network.
///
/// Every call reacquires the GIL, so search may run with it released.
pub struct PythonNetwork {
    callback: PyObject,
}

impl PolicyValueNetwork for PythonNetwork {
    fn predict(&self, encoded: &EncodedState) -> Result<NetworkOutput, EvaluatorError> {
        Python::with_gil(|py| {
            let board = encoded_to_numpy(py, encoded)?;
            let (policy_logits, value): (Vec<f32>, f32) =
                self.callback.call1(py, (board,))?.extract(py)?;
            Ok(NetworkOutput {
                policy_logits,
                value,
            })
        })
        .map_err(|e: PyErr| EvaluatorError::ModelError(e.to_string()))
    }
}
