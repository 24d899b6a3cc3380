//! DCT-Tech relay board report layouts
//!
//! Both directions use 9-byte buffers (report ID byte included).
//!
//! Command (output report):
//!   0      - Report ID (0x00)
//!   1      - Command (0xFF = on, 0xFD = off)
//!   2      - Channel number, 1-based
//!   3-8    - Unused (0x00)
//!
//! Status (feature report):
//!   0-4    - Board identifier (ASCII, NUL padded)
//!   5-6    - Reserved
//!   7-8    - Channel bitfield (u16 LE, bit N = relay N)

use pyo3::prelude::*;

pub const REPORT_SIZE: usize = 9;
pub const IDENTIFIER_SIZE: usize = 5;

const CMD_ON: u8 = 0xFF;
const CMD_OFF: u8 = 0xFD;

const STATE_OFFSET: usize = 7;

/// State of a single relay channel.
#[pyclass(eq, eq_int)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RelayState {
    Active,
    Inactive,
}

impl RelayState {
    fn command(self) -> u8 {
        match self {
            RelayState::Active => CMD_ON,
            RelayState::Inactive => CMD_OFF,
        }
    }
}

impl From<bool> for RelayState {
    fn from(active: bool) -> Self {
        if active {
            RelayState::Active
        } else {
            RelayState::Inactive
        }
    }
}

/// Outgoing command switching one channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CommandReport {
    buf: [u8; REPORT_SIZE],
}

impl CommandReport {
    /// Build the command for the relay at zero-based `index`.
    ///
    /// The index is not checked against the board's relay count.
    pub fn new(index: u8, state: RelayState) -> Self {
        let mut buf = [0u8; REPORT_SIZE];
        buf[1] = state.command();
        buf[2] = index.wrapping_add(1);
        Self { buf }
    }

    pub fn as_bytes(&self) -> &[u8; REPORT_SIZE] {
        &self.buf
    }
}

/// Feature report describing the whole board.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StatusReport {
    buf: [u8; REPORT_SIZE],
}

impl StatusReport {
    /// Zeroed buffer to read into.
    pub fn empty() -> Self {
        Self {
            buf: [0u8; REPORT_SIZE],
        }
    }

    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut report = Self::empty();
        let len = bytes.len().min(REPORT_SIZE);
        report.buf[..len].copy_from_slice(&bytes[..len]);
        report
    }

    pub fn as_mut_bytes(&mut self) -> &mut [u8; REPORT_SIZE] {
        &mut self.buf
    }

    /// Board identifier, cut at the first NUL.
    pub fn identifier(&self) -> String {
        let raw = &self.buf[..IDENTIFIER_SIZE];
        let end = raw.iter().position(|&b| b == 0).unwrap_or(IDENTIFIER_SIZE);
        String::from_utf8_lossy(&raw[..end]).into_owned()
    }

    /// Channel bitfield in host order.
    pub fn states(&self) -> u16 {
        u16::from_le_bytes([self.buf[STATE_OFFSET], self.buf[STATE_OFFSET + 1]])
    }

    /// State of the relay at zero-based `index`. Out of range reads as inactive.
    pub fn state(&self, index: u8) -> RelayState {
        let bit = self
            .states()
            .checked_shr(index as u32)
            .map_or(0, |s| s & 1);
        RelayState::from(bit == 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_with(identifier: &[u8], states: u16) -> StatusReport {
        let mut bytes = [0u8; REPORT_SIZE];
        bytes[..identifier.len()].copy_from_slice(identifier);
        bytes[STATE_OFFSET..].copy_from_slice(&states.to_le_bytes());
        StatusReport::from_bytes(&bytes)
    }

    #[test]
    fn test_command_on() {
        let report = CommandReport::new(0, RelayState::Active);
        assert_eq!(
            report.as_bytes(),
            &[0x00, 0xFF, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00]
        );
    }

    #[test]
    fn test_command_off() {
        let report = CommandReport::new(1, RelayState::Inactive);
        assert_eq!(
            report.as_bytes(),
            &[0x00, 0xFD, 0x02, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00]
        );
    }

    #[test]
    fn test_command_channel_is_one_based() {
        for index in 0..16u8 {
            for state in [RelayState::Active, RelayState::Inactive] {
                let buf = CommandReport::new(index, state).as_bytes().to_owned();
                assert_eq!(buf[0], 0x00);
                assert_eq!(buf[1], state.command());
                assert_eq!(buf[2], index + 1);
                assert!(buf[3..].iter().all(|&b| b == 0));
            }
        }
    }

    #[test]
    fn test_command_index_not_checked() {
        let report = CommandReport::new(u8::MAX, RelayState::Active);
        assert_eq!(report.as_bytes()[2], 0x00);
    }

    #[test]
    fn test_status_identifier() {
        let status = status_with(b"QWERT", 0);
        assert_eq!(status.identifier(), "QWERT");

        let status = status_with(b"AB\0\0\0", 0);
        assert_eq!(status.identifier(), "AB");
    }

    #[test]
    fn test_status_wire_order() {
        // 0x0003 on the wire is [0x03, 0x00]
        let mut bytes = [0u8; REPORT_SIZE];
        bytes[7] = 0x03;
        let status = StatusReport::from_bytes(&bytes);
        assert_eq!(status.states(), 0x0003);
        assert_eq!(status.state(0), RelayState::Active);
        assert_eq!(status.state(1), RelayState::Active);
        assert_eq!(status.state(2), RelayState::Inactive);
    }

    #[test]
    fn test_status_high_channels() {
        let status = status_with(b"ABCDE", 0x8100);
        assert_eq!(status.state(8), RelayState::Active);
        assert_eq!(status.state(15), RelayState::Active);
        assert_eq!(status.state(7), RelayState::Inactive);
    }

    #[test]
    fn test_status_every_bit() {
        for i in 0..16u8 {
            let status = status_with(b"ABCDE", 1 << i);
            for j in 0..16u8 {
                let expected = RelayState::from(i == j);
                assert_eq!(status.state(j), expected, "bit {} index {}", i, j);
            }
        }
    }

    #[test]
    fn test_status_out_of_range_index() {
        let status = status_with(b"ABCDE", 0xFFFF);
        assert_eq!(status.state(16), RelayState::Inactive);
        assert_eq!(status.state(200), RelayState::Inactive);
    }

    #[test]
    fn test_status_short_read() {
        let status = StatusReport::from_bytes(b"XY");
        assert_eq!(status.identifier(), "XY");
        assert_eq!(status.states(), 0);
    }
}
