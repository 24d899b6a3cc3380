//! Relay boards and their channels

use crate::hid::{DeviceInfo, DevicePath};
use log::debug;
use pyo3::prelude::*;

const PRODUCT_PREFIX: &str = "USBRelay";

/// Relay count advertised by a `USBRelay<N>` product string.
///
/// Any other name yields 0. `N` must fit a `u8` (the wire channel byte), so
/// `USBRelay256` and above also yield 0.
pub fn parse_relay_count(product_string: &str) -> u8 {
    let count = product_string
        .strip_prefix(PRODUCT_PREFIX)
        .filter(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
        .and_then(|digits| digits.parse::<u8>().ok());

    match count {
        Some(n) => n,
        None => {
            debug!("Unrecognized product string {:?}", product_string);
            0
        }
    }
}

/// One enumerated relay board.
#[pyclass]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Board {
    #[pyo3(get)]
    pub identifier: String,

    #[pyo3(get)]
    pub relay_count: u8,

    pub path: DevicePath,
}

impl Board {
    pub fn new(info: &DeviceInfo, identifier: String) -> Self {
        Self {
            identifier,
            relay_count: parse_relay_count(&info.product_string),
            path: info.path,
        }
    }

    pub fn relays(&self) -> impl Iterator<Item = Relay> {
        (0..self.relay_count).map(Relay::new)
    }
}

#[pymethods]
impl Board {
    fn __repr__(&self) -> String {
        format!(
            "Board(identifier={:?}, relay_count={}, path={:?})",
            self.identifier,
            self.relay_count,
            self.path.to_string()
        )
    }

    /// OS path of the board (bus:addr:interface)
    #[getter(path)]
    fn py_path(&self) -> String {
        self.path.to_string()
    }

    /// Relays of this board, in channel order.
    #[pyo3(name = "relays")]
    fn py_relays(&self) -> Vec<Relay> {
        self.relays().collect()
    }
}

/// Channel of a board, by zero-based index.
#[pyclass(eq, hash, frozen)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Relay {
    #[pyo3(get)]
    pub index: u8,
}

impl Relay {
    pub fn new(index: u8) -> Self {
        Self { index }
    }

    /// 1-based channel number used on the wire.
    pub fn channel(&self) -> u8 {
        self.index.wrapping_add(1)
    }
}

#[pymethods]
impl Relay {
    fn __repr__(&self) -> String {
        format!("Relay(index={})", self.index)
    }

    #[getter(channel)]
    fn py_channel(&self) -> u8 {
        self.channel()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(product_string: &str) -> DeviceInfo {
        DeviceInfo {
            vendor_id: crate::VENDOR_ID,
            product_id: crate::PRODUCT_ID,
            path: DevicePath::new(1, 2, 0),
            product_string: product_string.to_string(),
        }
    }

    #[test]
    fn test_parse_relay_count() {
        assert_eq!(parse_relay_count("USBRelay1"), 1);
        assert_eq!(parse_relay_count("USBRelay2"), 2);
        assert_eq!(parse_relay_count("USBRelay4"), 4);
        assert_eq!(parse_relay_count("USBRelay8"), 8);
        assert_eq!(parse_relay_count("USBRelay16"), 16);
    }

    #[test]
    fn test_parse_relay_count_mismatch() {
        assert_eq!(parse_relay_count(""), 0);
        assert_eq!(parse_relay_count("USBRelay"), 0);
        assert_eq!(parse_relay_count("usbrelay2"), 0);
        assert_eq!(parse_relay_count("USBRelay2 "), 0);
        assert_eq!(parse_relay_count(" USBRelay2"), 0);
        assert_eq!(parse_relay_count("USBRelay+2"), 0);
        assert_eq!(parse_relay_count("USBRelayX"), 0);
        assert_eq!(parse_relay_count("USBRelay999"), 0);
        assert_eq!(parse_relay_count("HIDRelay2"), 0);
    }

    #[test]
    fn test_parse_relay_count_caps_at_u8() {
        assert_eq!(parse_relay_count("USBRelay255"), 255);
        assert_eq!(parse_relay_count("USBRelay256"), 0);
    }

    #[test]
    fn test_board_from_info() {
        let board = Board::new(&info("USBRelay2"), "ABCDE".into());
        assert_eq!(board.identifier, "ABCDE");
        assert_eq!(board.relay_count, 2);
        assert_eq!(board.path, DevicePath::new(1, 2, 0));
    }

    #[test]
    fn test_board_relays() {
        let board = Board::new(&info("USBRelay4"), "ABCDE".into());
        let relays: Vec<Relay> = board.relays().collect();
        assert_eq!(relays.len(), 4);
        assert_eq!(relays[0].index, 0);
        assert_eq!(relays[3].channel(), 4);

        let board = Board::new(&info("Generic HID"), "ABCDE".into());
        assert_eq!(board.relays().count(), 0);
    }
}
