//! nusb-backed HID transport

use crate::hid::enumerate::enumerate_hid;
use crate::hid::{DeviceInfo, DevicePath, HidTransport, RelayError, Result};
use crate::{PRODUCT_ID, VENDOR_ID};
use log::trace;
use nusb::transfer::{ControlIn, ControlOut, ControlType, Recipient};
use nusb::MaybeFuture;
use std::time::Duration;

// HID class requests
const HID_GET_REPORT: u8 = 0x01;
const HID_SET_REPORT: u8 = 0x09;

// Report types (in high byte of wValue)
const HID_REPORT_TYPE_OUTPUT: u16 = 0x02;
const HID_REPORT_TYPE_FEATURE: u16 = 0x03;

// Default timeout for USB transfers
const DEFAULT_TIMEOUT: Duration = Duration::from_millis(1000);

/// Transfer settings for `NusbTransport`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TransportConfig {
    pub timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl TransportConfig {
    pub fn with_timeout_ms(timeout_ms: Option<u64>) -> Self {
        timeout_ms.map_or_else(Self::default, |ms| Self {
            timeout: Duration::from_millis(ms),
        })
    }
}

/// HID access through HID class control requests on the default pipe.
#[derive(Clone, Debug, Default)]
pub struct NusbTransport {
    config: TransportConfig,
}

fn matches_path(dev_info: &nusb::DeviceInfo, path: &DevicePath) -> bool {
    #[cfg(target_os = "linux")]
    let bus_number = Some(dev_info.busnum());
    // Bus number is not available on non-Linux
    #[cfg(not(target_os = "linux"))]
    let bus_number = None;

    is_relay_board_at(
        path,
        dev_info.vendor_id(),
        dev_info.product_id(),
        bus_number,
        dev_info.device_address(),
    )
}

/// Whether a device with these ids sits at `path`.
///
/// Addresses alone are reused across controllers and replugs, so only a
/// relay board's vendor/product pair may match.
fn is_relay_board_at(
    path: &DevicePath,
    vendor_id: u16,
    product_id: u16,
    bus_number: Option<u8>,
    device_address: u8,
) -> bool {
    vendor_id == VENDOR_ID
        && product_id == PRODUCT_ID
        && bus_number.is_none_or(|bus| bus == path.bus_number)
        && device_address == path.device_address
}

/// GET_REPORT(feature) wValue and length for a read into `buf`.
///
/// `buf[0]` carries the report ID, 0 for an empty buffer.
fn feature_request(buf: &[u8]) -> (u16, u16) {
    let report_id = buf.first().copied().unwrap_or(0);

    // wValue = (report_type << 8) | report_id
    let w_value = (HID_REPORT_TYPE_FEATURE << 8) | (report_id as u16);
    (w_value, buf.len() as u16)
}

/// SET_REPORT(output) wValue and payload for `buf`, or `None` if empty.
fn output_request(buf: &[u8]) -> Option<(u16, &[u8])> {
    let (&report_id, payload) = buf.split_first()?;
    // Unnumbered reports go out without the ID byte
    let data = if report_id == 0 { payload } else { buf };

    let w_value = (HID_REPORT_TYPE_OUTPUT << 8) | (report_id as u16);
    Some((w_value, data))
}

impl NusbTransport {
    pub fn with_config(config: TransportConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TransportConfig {
        &self.config
    }
}

impl HidTransport for NusbTransport {
    type Handle = nusb::Interface;

    fn enumerate(&self, vendor_id: u16, product_id: u16) -> Result<Vec<DeviceInfo>> {
        trace!("Enumerating {:04x}:{:04x}", vendor_id, product_id);
        enumerate_hid(vendor_id, product_id)
    }

    fn free_enumeration(&self, devices: Vec<DeviceInfo>) {
        trace!("Releasing enumeration of {} device(s)", devices.len());
    }

    fn open_path(&self, path: &DevicePath) -> Result<nusb::Interface> {
        let dev_info = nusb::list_devices()
            .wait()?
            .find(|d| matches_path(d, path))
            .ok_or_else(|| RelayError::DeviceNotFound(path.to_string()))?;

        let device = dev_info.open().wait()?;
        // On Linux, detach kernel driver before claiming (usbhid)
        #[cfg(target_os = "linux")]
        let interface = device
            .detach_and_claim_interface(path.interface_number)
            .wait()?;
        #[cfg(not(target_os = "linux"))]
        let interface = device.claim_interface(path.interface_number).wait()?;

        Ok(interface)
    }

    fn get_feature_report(&self, iface: &mut nusb::Interface, buf: &mut [u8]) -> Result<usize> {
        // GET_REPORT: bmRequestType=0xA1, bRequest=0x01
        let (w_value, length) = feature_request(buf);

        let data = iface
            .control_in(
                ControlIn {
                    control_type: ControlType::Class,
                    recipient: Recipient::Interface,
                    request: HID_GET_REPORT,
                    value: w_value,
                    index: iface.interface_number() as u16,
                    length,
                },
                self.config.timeout,
            )
            .wait()?;

        let len = data.len().min(buf.len());
        buf[..len].copy_from_slice(&data[..len]);
        trace!("GET_REPORT(feature) {:02x?}", &buf[..len]);
        Ok(len)
    }

    fn write(&self, iface: &mut nusb::Interface, buf: &[u8]) -> Result<usize> {
        // SET_REPORT: bmRequestType=0x21, bRequest=0x09
        let Some((w_value, data)) = output_request(buf) else {
            return Ok(0);
        };

        trace!("SET_REPORT(output) {:02x?}", buf);
        iface
            .control_out(
                ControlOut {
                    control_type: ControlType::Class,
                    recipient: Recipient::Interface,
                    request: HID_SET_REPORT,
                    value: w_value,
                    index: iface.interface_number() as u16,
                    data,
                },
                self.config.timeout,
            )
            .wait()?;

        Ok(buf.len())
    }

    fn close(&self, iface: nusb::Interface) {
        // Releasing the interface hands it back to the kernel
        drop(iface);
    }

    fn exit(&self) {
        // nusb keeps no global library state
        trace!("HID transport exit");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hid_constants() {
        assert_eq!(HID_GET_REPORT, 0x01);
        assert_eq!(HID_SET_REPORT, 0x09);
        assert_eq!(HID_REPORT_TYPE_OUTPUT, 0x02);
        assert_eq!(HID_REPORT_TYPE_FEATURE, 0x03);
    }

    #[test]
    fn test_feature_request() {
        let buf = [0u8; 9];
        assert_eq!(feature_request(&buf), (0x0300, 9));

        let mut numbered = [0u8; 4];
        numbered[0] = 0x05;
        assert_eq!(feature_request(&numbered), (0x0305, 4));

        assert_eq!(feature_request(&[]), (0x0300, 0));
    }

    #[test]
    fn test_output_request_strips_unnumbered_id() {
        let buf = [0x00, 0xFF, 0x01, 0, 0, 0, 0, 0, 0];
        let (w_value, data) = output_request(&buf).unwrap();
        assert_eq!(w_value, 0x0200);
        assert_eq!(data, &[0xFFu8, 0x01, 0, 0, 0, 0, 0, 0]);
        assert_eq!(data.len(), 8);
    }

    #[test]
    fn test_output_request_keeps_numbered_id() {
        let buf = [0x02, 0xFD, 0x03];
        let (w_value, data) = output_request(&buf).unwrap();
        assert_eq!(w_value, 0x0202);
        assert_eq!(data, &buf);
    }

    #[test]
    fn test_output_request_empty() {
        assert!(output_request(&[]).is_none());
    }

    #[test]
    fn test_relay_board_match() {
        let path = DevicePath::new(1, 4, 0);
        assert!(is_relay_board_at(&path, VENDOR_ID, PRODUCT_ID, Some(1), 4));
        assert!(is_relay_board_at(&path, VENDOR_ID, PRODUCT_ID, None, 4));

        // Same address on another bus
        assert!(!is_relay_board_at(&path, VENDOR_ID, PRODUCT_ID, Some(2), 4));
        assert!(!is_relay_board_at(&path, VENDOR_ID, PRODUCT_ID, Some(1), 5));
    }

    #[test]
    fn test_relay_board_match_rejects_other_devices() {
        // A keyboard that took over the board's address
        let path = DevicePath::new(0, 4, 0);
        assert!(!is_relay_board_at(&path, 0x046d, 0xc31c, None, 4));
        assert!(!is_relay_board_at(&path, VENDOR_ID, 0xc31c, None, 4));
        assert!(!is_relay_board_at(&path, 0x046d, PRODUCT_ID, Some(0), 4));
    }

    #[test]
    fn test_config_timeout() {
        assert_eq!(TransportConfig::default().timeout, Duration::from_millis(1000));
        assert_eq!(
            TransportConfig::with_timeout_ms(Some(250)).timeout,
            Duration::from_millis(250)
        );
        assert_eq!(
            TransportConfig::with_timeout_ms(None),
            TransportConfig::default()
        );

        let transport = NusbTransport::with_config(TransportConfig::with_timeout_ms(Some(50)));
        assert_eq!(transport.config().timeout, Duration::from_millis(50));
    }
}
