//! In-memory relay board simulator for tests

use crate::hid::report::{IDENTIFIER_SIZE, REPORT_SIZE};
use crate::hid::{DeviceInfo, DevicePath, HidTransport, RelayError, Result};
use std::sync::{Mutex, MutexGuard};

/// A simulated board, answering like the relay firmware does.
#[derive(Clone, Debug)]
pub struct MockBoard {
    pub info: DeviceInfo,
    pub identifier: [u8; IDENTIFIER_SIZE],
    pub states: u16,
}

impl MockBoard {
    pub fn new(product_string: &str, identifier: &str, device_address: u8) -> Self {
        let mut id = [0u8; IDENTIFIER_SIZE];
        let raw = identifier.as_bytes();
        let len = raw.len().min(IDENTIFIER_SIZE);
        id[..len].copy_from_slice(&raw[..len]);

        Self {
            info: DeviceInfo {
                vendor_id: crate::VENDOR_ID,
                product_id: crate::PRODUCT_ID,
                path: DevicePath::new(1, device_address, 0),
                product_string: product_string.to_string(),
            },
            identifier: id,
            states: 0,
        }
    }

    pub fn with_states(mut self, states: u16) -> Self {
        self.states = states;
        self
    }

    fn status_bytes(&self) -> [u8; REPORT_SIZE] {
        let mut buf = [0u8; REPORT_SIZE];
        buf[..IDENTIFIER_SIZE].copy_from_slice(&self.identifier);
        buf[7..9].copy_from_slice(&self.states.to_le_bytes());
        buf
    }

    fn apply(&mut self, buf: &[u8]) {
        if buf.len() < 3 || buf[2] == 0 || buf[2] > 16 {
            return;
        }
        let mask = 1u16 << (buf[2] - 1);
        match buf[1] {
            0xFF => self.states |= mask,
            0xFD => self.states &= !mask,
            _ => {}
        }
    }
}

/// Bookkeeping of every call made against the mock.
#[derive(Clone, Debug, Default)]
pub struct MockCalls {
    pub enumerate: usize,
    pub free_enumeration: usize,
    pub open: usize,
    pub close: usize,
    pub feature_reads: usize,
    pub exit: usize,
    pub writes: Vec<Vec<u8>>,
}

#[derive(Debug, Default)]
struct MockState {
    boards: Vec<MockBoard>,
    calls: MockCalls,
    fail_enumerate: bool,
    fail_open: bool,
    fail_io: bool,
}

/// Fake `HidTransport` backed by a list of simulated boards.
#[derive(Debug, Default)]
pub struct MockTransport {
    state: Mutex<MockState>,
}

impl MockTransport {
    pub fn new(boards: Vec<MockBoard>) -> Self {
        Self {
            state: Mutex::new(MockState {
                boards,
                ..Default::default()
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        // Ignore poisoning from a failed test
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn calls(&self) -> MockCalls {
        self.lock().calls.clone()
    }

    pub fn states(&self, path: &DevicePath) -> Option<u16> {
        self.lock()
            .boards
            .iter()
            .find(|b| b.info.path == *path)
            .map(|b| b.states)
    }

    pub fn fail_enumerate(&self, fail: bool) {
        self.lock().fail_enumerate = fail;
    }

    pub fn fail_open(&self, fail: bool) {
        self.lock().fail_open = fail;
    }

    /// Make feature reads and writes fail after a successful open.
    pub fn fail_io(&self, fail: bool) {
        self.lock().fail_io = fail;
    }
}

impl HidTransport for MockTransport {
    type Handle = DevicePath;

    fn enumerate(&self, vendor_id: u16, product_id: u16) -> Result<Vec<DeviceInfo>> {
        let mut state = self.lock();
        state.calls.enumerate += 1;
        if state.fail_enumerate {
            return Err(RelayError::Disconnected);
        }
        Ok(state
            .boards
            .iter()
            .filter(|b| b.info.vendor_id == vendor_id && b.info.product_id == product_id)
            .map(|b| b.info.clone())
            .collect())
    }

    fn free_enumeration(&self, _devices: Vec<DeviceInfo>) {
        self.lock().calls.free_enumeration += 1;
    }

    fn open_path(&self, path: &DevicePath) -> Result<DevicePath> {
        let mut state = self.lock();
        if state.fail_open || !state.boards.iter().any(|b| b.info.path == *path) {
            return Err(RelayError::DeviceNotFound(path.to_string()));
        }
        state.calls.open += 1;
        Ok(*path)
    }

    fn get_feature_report(&self, handle: &mut DevicePath, buf: &mut [u8]) -> Result<usize> {
        let mut state = self.lock();
        state.calls.feature_reads += 1;
        if state.fail_io {
            return Err(RelayError::Disconnected);
        }
        let board = state
            .boards
            .iter()
            .find(|b| b.info.path == *handle)
            .ok_or(RelayError::Disconnected)?;

        let status = board.status_bytes();
        let len = buf.len().min(REPORT_SIZE);
        buf[..len].copy_from_slice(&status[..len]);
        Ok(len)
    }

    fn write(&self, handle: &mut DevicePath, buf: &[u8]) -> Result<usize> {
        let mut state = self.lock();
        state.calls.writes.push(buf.to_vec());
        if state.fail_io {
            return Err(RelayError::Disconnected);
        }
        let board = state
            .boards
            .iter_mut()
            .find(|b| b.info.path == *handle)
            .ok_or(RelayError::Disconnected)?;

        board.apply(buf);
        Ok(buf.len())
    }

    fn close(&self, _handle: DevicePath) {
        self.lock().calls.close += 1;
    }

    fn exit(&self) {
        self.lock().calls.exit += 1;
    }
}
