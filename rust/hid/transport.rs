//! Narrow capability interface over a native HID library
//!
//! The relay logic only ever talks to a `HidTransport`. The nusb-backed
//! implementation lives in `device.rs`; tests use the in-memory `MockTransport`.

use crate::hid::{DeviceInfo, DevicePath, RelayError, Result};
use log::trace;

/// HID primitives needed to drive a relay board.
///
/// Every call blocks until the underlying transport returns.
pub trait HidTransport {
    /// Open device handle. Released through `close`.
    type Handle;

    /// List HID interfaces matching `vendor_id`/`product_id`.
    fn enumerate(&self, vendor_id: u16, product_id: u16) -> Result<Vec<DeviceInfo>>;

    /// Release an enumeration obtained from `enumerate`.
    fn free_enumeration(&self, devices: Vec<DeviceInfo>);

    fn open_path(&self, path: &DevicePath) -> Result<Self::Handle>;

    /// Read a feature report into `buf`, returning the number of bytes read.
    fn get_feature_report(&self, handle: &mut Self::Handle, buf: &mut [u8]) -> Result<usize>;

    /// Write an output report. `buf[0]` is the report ID.
    fn write(&self, handle: &mut Self::Handle, buf: &[u8]) -> Result<usize>;

    fn close(&self, handle: Self::Handle);

    /// Global library teardown.
    fn exit(&self);
}

/// Scoped device handle, closed on drop.
pub struct DeviceHandle<'t, T: HidTransport> {
    transport: &'t T,
    handle: Option<T::Handle>,
    path: DevicePath,
}

impl<'t, T: HidTransport> DeviceHandle<'t, T> {
    pub fn open(transport: &'t T, path: &DevicePath) -> Result<Self> {
        trace!("Opening device {}", path);
        let handle = transport.open_path(path)?;
        Ok(Self {
            transport,
            handle: Some(handle),
            path: *path,
        })
    }

    pub fn get_feature_report(&mut self, buf: &mut [u8]) -> Result<usize> {
        let handle = self.handle.as_mut().ok_or(RelayError::Disconnected)?;
        self.transport.get_feature_report(handle, buf)
    }

    pub fn write(&mut self, buf: &[u8]) -> Result<usize> {
        let handle = self.handle.as_mut().ok_or(RelayError::Disconnected)?;
        self.transport.write(handle, buf)
    }
}

impl<T: HidTransport> Drop for DeviceHandle<'_, T> {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            trace!("Closing device {}", self.path);
            self.transport.close(handle);
        }
    }
}
