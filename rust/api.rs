//! Python entry points over the nusb-backed adapter
//!
//! Blocking functions run on the calling thread. The `_async` variants return
//! awaitables and run the same blocking call on tokio's blocking pool.

use crate::adapter::RelayBoardAdapter;
use crate::board::Board;
use crate::hid::{NusbTransport, RelayError, RelayState, TransportConfig};
use pyo3::exceptions::PyRuntimeError;
use pyo3::prelude::*;
use pyo3_async_runtimes::tokio::future_into_py;

fn adapter(timeout_ms: Option<u64>) -> RelayBoardAdapter<NusbTransport> {
    RelayBoardAdapter::new(NusbTransport::with_config(
        TransportConfig::with_timeout_ms(timeout_ms),
    ))
}

async fn run_blocking<T, F>(f: F) -> PyResult<T>
where
    F: FnOnce() -> Result<T, RelayError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| PyRuntimeError::new_err(e.to_string()))?
        .map_err(PyErr::from)
}

/// List all connected relay boards.
///
/// Args:
///     timeout_ms: USB transfer timeout (default 1000)
#[pyfunction]
#[pyo3(signature = (timeout_ms=None))]
pub fn list_boards(py: Python<'_>, timeout_ms: Option<u64>) -> PyResult<Vec<Board>> {
    Ok(py.detach(|| adapter(timeout_ms).list_boards())?)
}

/// Read the state of the relay at zero-based `relay`.
#[pyfunction]
#[pyo3(signature = (board, relay, timeout_ms=None))]
pub fn get_state(
    py: Python<'_>,
    board: Board,
    relay: u8,
    timeout_ms: Option<u64>,
) -> PyResult<RelayState> {
    Ok(py.detach(|| adapter(timeout_ms).get_state(&board, relay))?)
}

/// Switch the relay at zero-based `relay`. The state is not read back.
#[pyfunction]
#[pyo3(signature = (board, relay, state, timeout_ms=None))]
pub fn set_state(
    py: Python<'_>,
    board: Board,
    relay: u8,
    state: RelayState,
    timeout_ms: Option<u64>,
) -> PyResult<()> {
    Ok(py.detach(|| adapter(timeout_ms).set_state(&board, relay, state))?)
}

/// List all connected relay boards (async).
#[pyfunction]
#[pyo3(signature = (timeout_ms=None))]
pub fn list_boards_async(py: Python<'_>, timeout_ms: Option<u64>) -> PyResult<Bound<'_, PyAny>> {
    future_into_py(py, async move {
        run_blocking(move || adapter(timeout_ms).list_boards()).await
    })
}

/// Read the state of one relay (async).
#[pyfunction]
#[pyo3(signature = (board, relay, timeout_ms=None))]
pub fn get_state_async(
    py: Python<'_>,
    board: Board,
    relay: u8,
    timeout_ms: Option<u64>,
) -> PyResult<Bound<'_, PyAny>> {
    future_into_py(py, async move {
        run_blocking(move || adapter(timeout_ms).get_state(&board, relay)).await
    })
}

/// Switch one relay (async).
#[pyfunction]
#[pyo3(signature = (board, relay, state, timeout_ms=None))]
pub fn set_state_async(
    py: Python<'_>,
    board: Board,
    relay: u8,
    state: RelayState,
    timeout_ms: Option<u64>,
) -> PyResult<Bound<'_, PyAny>> {
    future_into_py(py, async move {
        run_blocking(move || adapter(timeout_ms).set_state(&board, relay, state)).await
    })
}
