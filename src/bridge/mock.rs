//! Mock bridge implementation for unit testing.
//!
//! This module provides an in-memory switcher that honours the bridge
//! contract, records every call, and supports failure injection.
//!
//! # Example
//!
//! ```rust,ignore
//! use atem::bridge::mock::{BridgeCall, MockBridge, Operation};
//! use atem::switcher::Switcher;
//!
//! let mock = MockBridge::hd();
//! let mut switcher = Switcher::new(&mock, "192.168.10.240");
//! switcher.product_name().unwrap();
//! switcher.close();
//!
//! mock.assert_operations(&[
//!     Operation::Open { address: "192.168.10.240".to_string() },
//!     Operation::ProductName,
//!     Operation::Close { handle: 1 },
//! ]);
//! ```

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use tracing::{debug, trace};

use super::{Bridge, OpenFailure, ScratchBuffer, Status, StillInfo};

/// Bridge call kinds, used to target failure injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BridgeCall {
    Open,
    ProductName,
    VideoMode,
    VideoDimensions,
    /// First enumeration call of a listing (count only).
    StillsProbe,
    /// Enumeration call that follows a successful probe.
    StillsFetch,
    Upload,
}

/// Recorded call for assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Open {
        address: String,
    },
    Close {
        handle: u32,
    },
    ProductName,
    VideoMode,
    VideoDimensions,
    Stills {
        capacity: usize,
    },
    Upload {
        slot: i32,
        name: String,
        byte_len: usize,
        width: i32,
        height: i32,
    },
}

/// A failure queued for the next call of one kind.
#[derive(Debug, Clone)]
struct InjectedFailure {
    status: i32,
    message: Option<String>,
}

/// Mock switcher for testing without hardware or the native library.
pub struct MockBridge {
    product_name: String,
    video_mode: i32,
    dimensions: (i32, i32),
    stills: Mutex<Vec<StillInfo>>,
    fetch_pending: Mutex<bool>,
    operation_log: Mutex<Vec<Operation>>,
    failures: Mutex<HashMap<BridgeCall, InjectedFailure>>,
    null_handle_on_open: bool,
    next_handle: Mutex<u32>,
    open_handles: Mutex<HashSet<u32>>,
    last_upload: Mutex<Option<Vec<u8>>>,
}

impl MockBridge {
    /// Create a mock switcher with the given product name and resolution.
    #[must_use]
    pub fn new(product_name: &str, width: i32, height: i32) -> Self {
        debug!(product_name, width, height, "Creating mock bridge");
        Self {
            product_name: product_name.to_string(),
            video_mode: 0,
            dimensions: (width, height),
            stills: Mutex::new(Vec::new()),
            fetch_pending: Mutex::new(false),
            operation_log: Mutex::new(Vec::new()),
            failures: Mutex::new(HashMap::new()),
            null_handle_on_open: false,
            next_handle: Mutex::new(1),
            open_handles: Mutex::new(HashSet::new()),
            last_upload: Mutex::new(None),
        }
    }

    /// 1080p switcher, the most common test target.
    #[must_use]
    pub fn hd() -> Self {
        Self::new("ATEM Television Studio HD", 1920, 1080)
    }

    /// 720p switcher.
    #[must_use]
    pub fn hd720() -> Self {
        Self::new("ATEM Mini", 1280, 720)
    }

    // === Configuration ===

    /// Replace the stills held in the media pool.
    pub fn set_stills(&self, stills: Vec<StillInfo>) {
        *self.stills.lock().unwrap() = stills;
    }

    /// Fail the next call of kind `call` with `status`, writing `message`
    /// into the error buffer when given.
    pub fn fail_next(&self, call: BridgeCall, status: i32, message: Option<&str>) {
        self.failures.lock().unwrap().insert(
            call,
            InjectedFailure {
                status,
                message: message.map(str::to_string),
            },
        );
    }

    /// Clear all injected failures.
    pub fn clear_failures(&self) {
        self.failures.lock().unwrap().clear();
    }

    // === Assertions ===

    /// Get all recorded operations.
    #[must_use]
    pub fn operations(&self) -> Vec<Operation> {
        self.operation_log.lock().unwrap().clone()
    }

    /// Number of recorded operations matching `predicate`.
    #[must_use]
    pub fn count(&self, predicate: impl Fn(&Operation) -> bool) -> usize {
        self.operation_log
            .lock()
            .unwrap()
            .iter()
            .filter(|op| predicate(op))
            .count()
    }

    /// Number of `open` calls made.
    #[must_use]
    pub fn open_count(&self) -> usize {
        self.count(|op| matches!(op, Operation::Open { .. }))
    }

    /// Number of `close` calls made.
    #[must_use]
    pub fn close_count(&self) -> usize {
        self.count(|op| matches!(op, Operation::Close { .. }))
    }

    /// Number of `upload_still` calls made.
    #[must_use]
    pub fn upload_count(&self) -> usize {
        self.count(|op| matches!(op, Operation::Upload { .. }))
    }

    /// Connections opened and not yet closed.
    #[must_use]
    pub fn open_connections(&self) -> usize {
        self.open_handles.lock().unwrap().len()
    }

    /// Pixel bytes received by the most recent upload.
    #[must_use]
    pub fn last_upload(&self) -> Option<Vec<u8>> {
        self.last_upload.lock().unwrap().clone()
    }

    /// Assert specific operations were performed.
    ///
    /// # Panics
    ///
    /// Panics if the operations don't match.
    pub fn assert_operations(&self, expected: &[Operation]) {
        let actual = self.operations();
        assert_eq!(
            actual, expected,
            "Operation mismatch.\nExpected: {expected:#?}\nActual: {actual:#?}",
        );
    }

    /// Assert a specific operation was performed at least once.
    ///
    /// # Panics
    ///
    /// Panics if the operation was not found.
    pub fn assert_contains(&self, expected: &Operation) {
        let ops = self.operations();
        assert!(
            ops.contains(expected),
            "Expected operation {expected:?} not found in: {ops:#?}",
        );
    }

    /// Clear the operation log for fresh assertions.
    pub fn clear_operations(&self) {
        self.operation_log.lock().unwrap().clear();
    }

    // === Internal Helpers ===

    fn record_op(&self, op: Operation) {
        trace!(?op, "Recording bridge call");
        self.operation_log.lock().unwrap().push(op);
    }

    fn check_failure(&self, call: BridgeCall, err: &mut ScratchBuffer) -> Result<(), Status> {
        match self.failures.lock().unwrap().remove(&call) {
            Some(failure) => {
                if let Some(message) = &failure.message {
                    err.write_text(message);
                }
                Err(Status::failure(failure.status))
            }
            None => Ok(()),
        }
    }

    fn check_handle(&self, handle: u32, err: &mut ScratchBuffer) -> Result<(), Status> {
        if self.open_handles.lock().unwrap().contains(&handle) {
            Ok(())
        } else {
            err.write_text("invalid switcher connection");
            Err(Status::INTERNAL)
        }
    }
}

impl Bridge for MockBridge {
    type Handle = u32;

    fn open(&self, address: &str, err: &mut ScratchBuffer) -> Result<u32, OpenFailure> {
        self.record_op(Operation::Open {
            address: address.to_string(),
        });
        if let Err(status) = self.check_failure(BridgeCall::Open, err) {
            return Err(OpenFailure {
                status: status.code(),
                fail_reason: 1,
            });
        }
        if self.null_handle_on_open {
            return Err(OpenFailure {
                status: 0,
                fail_reason: 0,
            });
        }

        let mut next = self.next_handle.lock().unwrap();
        let handle = *next;
        *next += 1;
        self.open_handles.lock().unwrap().insert(handle);
        Ok(handle)
    }

    fn close(&self, handle: u32) {
        self.record_op(Operation::Close { handle });
        self.open_handles.lock().unwrap().remove(&handle);
    }

    fn product_name(
        &self,
        handle: u32,
        out: &mut ScratchBuffer,
        err: &mut ScratchBuffer,
    ) -> Result<(), Status> {
        self.record_op(Operation::ProductName);
        self.check_handle(handle, err)?;
        self.check_failure(BridgeCall::ProductName, err)?;
        out.write_text(&self.product_name);
        Ok(())
    }

    fn video_mode(&self, handle: u32, err: &mut ScratchBuffer) -> Result<i32, Status> {
        self.record_op(Operation::VideoMode);
        self.check_handle(handle, err)?;
        self.check_failure(BridgeCall::VideoMode, err)?;
        Ok(self.video_mode)
    }

    fn video_dimensions(&self, handle: u32, err: &mut ScratchBuffer) -> Result<(i32, i32), Status> {
        self.record_op(Operation::VideoDimensions);
        self.check_handle(handle, err)?;
        self.check_failure(BridgeCall::VideoDimensions, err)?;
        Ok(self.dimensions)
    }

    fn stills(
        &self,
        handle: u32,
        out: &mut [StillInfo],
        err: &mut ScratchBuffer,
    ) -> Result<i32, Status> {
        self.record_op(Operation::Stills {
            capacity: out.len(),
        });
        self.check_handle(handle, err)?;
        // Probe and fetch alternate; both have capacity 0 on an empty pool.
        let mut fetch_pending = self.fetch_pending.lock().unwrap();
        let call = if *fetch_pending {
            BridgeCall::StillsFetch
        } else {
            BridgeCall::StillsProbe
        };
        *fetch_pending = false;
        self.check_failure(call, err)?;
        *fetch_pending = call == BridgeCall::StillsProbe;
        drop(fetch_pending);

        let stills = self.stills.lock().unwrap();
        for (slot, still) in out.iter_mut().zip(stills.iter()) {
            *slot = *still;
        }
        Ok(i32::try_from(stills.len()).unwrap_or(i32::MAX))
    }

    fn upload_still(
        &self,
        handle: u32,
        slot: i32,
        name: &str,
        bgra: &[u8],
        width: i32,
        height: i32,
        err: &mut ScratchBuffer,
    ) -> Result<(), Status> {
        self.record_op(Operation::Upload {
            slot,
            name: name.to_string(),
            byte_len: bgra.len(),
            width,
            height,
        });
        self.check_handle(handle, err)?;
        self.check_failure(BridgeCall::Upload, err)?;
        if bgra.is_empty() || width <= 0 || height <= 0 {
            err.write_text("invalid pixel buffer");
            return Err(Status::INTERNAL);
        }

        *self.last_upload.lock().unwrap() = Some(bgra.to_vec());
        let slot_number = slot + 1;
        let mut stills = self.stills.lock().unwrap();
        stills.retain(|still| still.slot != slot_number);
        stills.push(StillInfo::new(slot_number, 0, name, ""));
        stills.sort_by_key(|still| still.slot);
        Ok(())
    }
}

/// Builder for creating `MockBridge` with common configurations.
pub struct MockBridgeBuilder {
    product_name: String,
    video_mode: i32,
    dimensions: (i32, i32),
    stills: Vec<StillInfo>,
    null_handle_on_open: bool,
}

impl MockBridgeBuilder {
    /// Create a builder for a 1080p switcher.
    #[must_use]
    pub fn new() -> Self {
        Self {
            product_name: "ATEM Television Studio HD".to_string(),
            video_mode: 0,
            dimensions: (1920, 1080),
            stills: Vec::new(),
            null_handle_on_open: false,
        }
    }

    #[must_use]
    pub fn product_name(mut self, name: &str) -> Self {
        self.product_name = name.to_string();
        self
    }

    #[must_use]
    pub fn video_mode(mut self, mode: i32) -> Self {
        self.video_mode = mode;
        self
    }

    #[must_use]
    pub fn dimensions(mut self, width: i32, height: i32) -> Self {
        self.dimensions = (width, height);
        self
    }

    /// Add a still to the media pool.
    #[must_use]
    pub fn still(mut self, slot: i32, media_player: i32, name: &str, hash: &str) -> Self {
        self.stills.push(StillInfo::new(slot, media_player, name, hash));
        self
    }

    /// Make `open` report success with a null connection.
    #[must_use]
    pub fn null_handle_on_open(mut self) -> Self {
        self.null_handle_on_open = true;
        self
    }

    /// Build the mock bridge.
    #[must_use]
    pub fn build(self) -> MockBridge {
        let (width, height) = self.dimensions;
        let mut bridge = MockBridge::new(&self.product_name, width, height);
        bridge.video_mode = self.video_mode;
        bridge.null_handle_on_open = self.null_handle_on_open;
        *bridge.stills.get_mut().unwrap() = self.stills;
        bridge
    }
}

impl Default for MockBridgeBuilder {
    fn default() -> Self {
        Self::new()
    }
}
