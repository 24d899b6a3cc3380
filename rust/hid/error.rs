//! Error types for relay board operations

use pyo3::exceptions::PyOSError;
use pyo3::prelude::*;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RelayError {
    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    #[error("USB error: {0}")]
    UsbError(#[from] nusb::Error),

    #[error("Transfer error: {0}")]
    TransferError(#[from] nusb::transfer::TransferError),

    #[error("Device disconnected")]
    Disconnected,
}

impl From<RelayError> for PyErr {
    fn from(err: RelayError) -> PyErr {
        PyOSError::new_err(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, RelayError>;
