//! HID access for relay boards
//!
//! Blocking USB HID operations via nusb, behind the `HidTransport` trait.

pub mod device;
pub mod device_info;
pub mod enumerate;
pub mod error;
#[cfg(any(test, feature = "mocks"))]
pub mod mock;
pub mod report;
pub mod transport;

pub use device::{NusbTransport, TransportConfig};
pub use device_info::{DeviceInfo, DevicePath};
pub use error::{RelayError, Result};
pub use report::{CommandReport, RelayState, StatusReport, REPORT_SIZE};
pub use transport::{DeviceHandle, HidTransport};
