//! HID device information from enumeration

use std::fmt;

/// OS-level location of a HID interface (bus:addr:interface).
///
/// Stable for the lifetime of one enumeration. Re-plugging a board or
/// re-enumerating the bus may hand out a different path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DevicePath {
    pub bus_number: u8,
    pub device_address: u8,
    pub interface_number: u8,
}

impl DevicePath {
    pub fn new(bus_number: u8, device_address: u8, interface_number: u8) -> Self {
        Self {
            bus_number,
            device_address,
            interface_number,
        }
    }
}

impl fmt::Display for DevicePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Same shape as the hidapi libusb backend path
        write!(
            f,
            "{:03}:{:03}:{:02}",
            self.bus_number, self.device_address, self.interface_number
        )
    }
}

/// One record returned by `HidTransport::enumerate`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeviceInfo {
    pub vendor_id: u16,
    pub product_id: u16,
    pub path: DevicePath,
    pub product_string: String,
}

impl DeviceInfo {
    #[cfg(target_os = "linux")]
    pub fn from_nusb(dev: &nusb::DeviceInfo, interface: u8) -> Self {
        Self {
            vendor_id: dev.vendor_id(),
            product_id: dev.product_id(),
            path: DevicePath::new(dev.busnum(), dev.device_address(), interface),
            product_string: dev.product_string().unwrap_or_default().to_string(),
        }
    }

    #[cfg(not(target_os = "linux"))]
    pub fn from_nusb(dev: &nusb::DeviceInfo, interface: u8) -> Self {
        Self {
            vendor_id: dev.vendor_id(),
            product_id: dev.product_id(),
            // Bus number is not available on non-Linux
            path: DevicePath::new(0, dev.device_address(), interface),
            product_string: dev.product_string().unwrap_or_default().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_display() {
        let path = DevicePath::new(1, 4, 0);
        assert_eq!(path.to_string(), "001:004:00");
    }
}
