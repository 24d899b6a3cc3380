//! HID device enumeration

use crate::hid::{DeviceInfo, Result};
use log::trace;
use nusb::descriptors::ConfigurationDescriptor;
use nusb::MaybeFuture;

const HID_CLASS: u8 = 0x03;

/// Enumerate HID interfaces of devices matching `vendor_id`/`product_id`.
///
/// Results are sorted by path for a consistent ordering.
pub fn enumerate_hid(vendor_id: u16, product_id: u16) -> Result<Vec<DeviceInfo>> {
    let mut results = Vec::new();

    for dev_info in nusb::list_devices().wait()? {
        if dev_info.vendor_id() != vendor_id || dev_info.product_id() != product_id {
            continue;
        }

        // Need the active configuration to find the HID interface
        let device: nusb::Device = match dev_info.open().wait() {
            Ok(d) => d,
            Err(e) => {
                trace!("Skipping {:?}: {}", dev_info, e);
                continue;
            }
        };

        let config: ConfigurationDescriptor = match device.active_configuration() {
            Ok(c) => c,
            Err(_) => continue,
        };

        for iface in config.interfaces() {
            if iface.alt_settings().any(|alt| alt.class() == HID_CLASS) {
                results.push(DeviceInfo::from_nusb(&dev_info, iface.interface_number()));
            }
        }
    }

    results.sort_by_key(|info| info.path);

    Ok(results)
}
