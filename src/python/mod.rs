//! Python bindings for tak-zero.
//!
//! # Quick Start
//!
//! ```python
//! import json
//! import tak_zero
//!
//! state = tak_zero.GameState()
//! state.play("fa1")
//! print(state.legal_moves())
//!
//! def net(board):                      # board: numpy array [4, 4, 9]
//!     return [0.0] * 4128, 0.0         # (policy_logits, value)
//!
//! config = tak_zero.SelfPlayConfig(games=2, simulations=50)
//! positions = json.loads(tak_zero.self_play(config, tak_zero.PolicyValueNetwork(net)))
//! ```

use pyo3::prelude::*;

mod py_core;
mod py_nn;
mod py_self_play;

pub use py_core::*;
pub use py_nn::*;
pub use py_self_play::*;

/// tak_zero: 4x4 Tak self-play for AlphaZero-style training.
#[pymodule]
fn tak_zero(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyGameState>()?;

    m.add_class::<PyEncodedState>()?;
    m.add_class::<PyPolicyValueNetwork>()?;

    m.add_class::<PySelfPlayConfig>()?;
    m.add_function(wrap_pyfunction!(self_play, m)?)?;

    Ok(())
}
