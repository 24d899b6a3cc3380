//! Relay board discovery and per-relay control
//!
//! Every operation opens its own device handle and closes it before
//! returning. No state is kept between calls.

use crate::board::Board;
use crate::hid::{
    CommandReport, DeviceHandle, DeviceInfo, HidTransport, RelayState, Result, StatusReport,
};
use crate::{PRODUCT_ID, VENDOR_ID};
use log::{debug, trace};

/// Relay board driver over a `HidTransport`.
pub struct RelayBoardAdapter<T: HidTransport> {
    transport: T,
}

impl<T: HidTransport> RelayBoardAdapter<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Enumerate all connected relay boards.
    ///
    /// The transport's `exit` hook runs once at the end, whatever the outcome.
    pub fn list_boards(&self) -> Result<Vec<Board>> {
        let result = self.discover();
        self.transport.exit();
        result
    }

    fn discover(&self) -> Result<Vec<Board>> {
        let devices = self.transport.enumerate(VENDOR_ID, PRODUCT_ID)?;
        debug!("Found {} relay board interface(s)", devices.len());

        let boards = devices
            .iter()
            .map(|info| self.describe(info))
            .collect::<Result<Vec<_>>>();

        self.transport.free_enumeration(devices);
        boards
    }

    fn describe(&self, info: &DeviceInfo) -> Result<Board> {
        let status = self.read_status(info)?;
        let board = Board::new(info, status.identifier());
        debug!(
            "Board {} at {}: {} relay(s)",
            board.identifier, board.path, board.relay_count
        );
        Ok(board)
    }

    fn read_status(&self, info: &DeviceInfo) -> Result<StatusReport> {
        let mut handle = DeviceHandle::open(&self.transport, &info.path)?;
        let mut status = StatusReport::empty();
        handle.get_feature_report(status.as_mut_bytes())?;
        Ok(status)
    }

    /// Read the current state of one relay from the board.
    ///
    /// `relay_index` is zero-based and not checked against the relay count.
    pub fn get_state(&self, board: &Board, relay_index: u8) -> Result<RelayState> {
        let mut handle = DeviceHandle::open(&self.transport, &board.path)?;
        let mut status = StatusReport::empty();
        handle.get_feature_report(status.as_mut_bytes())?;

        let state = status.state(relay_index);
        trace!("Board {} relay {}: {:?}", board.identifier, relay_index, state);
        Ok(state)
    }

    /// Switch one relay. The new state is not read back.
    pub fn set_state(&self, board: &Board, relay_index: u8, state: RelayState) -> Result<()> {
        let report = CommandReport::new(relay_index, state);

        trace!("Board {} relay {} -> {:?}", board.identifier, relay_index, state);
        let mut handle = DeviceHandle::open(&self.transport, &board.path)?;
        handle.write(report.as_bytes())?;
        Ok(())
    }
}
