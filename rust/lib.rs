//! Native Rust driver for DCT-Tech USB HID relay boards
//!
//! - Board discovery (vendor 0x16c0, product 0x05df)
//! - Per-relay state read via feature report
//! - Per-relay switching via output report
//! - Blocking and async Python bindings

use pyo3::prelude::*;

pub mod adapter;
mod api;
pub mod board;
pub mod hid;

pub use adapter::RelayBoardAdapter;
pub use board::{parse_relay_count, Board, Relay};
pub use hid::{
    CommandReport, DeviceInfo, DevicePath, HidTransport, NusbTransport, RelayError, RelayState,
    StatusReport, TransportConfig, REPORT_SIZE,
};

pub const VENDOR_ID: u16 = 0x16c0;
pub const PRODUCT_ID: u16 = 0x05df;

/// Native Rust driver for USB HID relay boards.
#[pymodule(name = "_native")]
fn _native(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Types
    m.add_class::<Board>()?;
    m.add_class::<Relay>()?;
    m.add_class::<RelayState>()?;

    // Blocking API
    m.add_function(wrap_pyfunction!(api::list_boards, m)?)?;
    m.add_function(wrap_pyfunction!(api::get_state, m)?)?;
    m.add_function(wrap_pyfunction!(api::set_state, m)?)?;

    // Async API
    m.add_function(wrap_pyfunction!(api::list_boards_async, m)?)?;
    m.add_function(wrap_pyfunction!(api::get_state_async, m)?)?;
    m.add_function(wrap_pyfunction!(api::set_state_async, m)?)?;

    // Constants
    m.add("VENDOR_ID", VENDOR_ID)?;
    m.add("PRODUCT_ID", PRODUCT_ID)?;
    m.add("REPORT_SIZE", REPORT_SIZE)?;

    Ok(())
}
