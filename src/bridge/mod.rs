//! Contract for the native switcher-control bridge.
//!
//! Every bridge operation reports success with status 0. On failure it
//! returns a non-zero status and writes a short diagnostic into a
//! caller-owned [`ScratchBuffer`]. The session layer allocates a fresh,
//! zero-filled buffer for each call, so text from an earlier call can never
//! leak into a later one.
//!
//! [`native::NativeBridge`] is the production adapter and the only place in
//! the crate that touches raw memory. [`mock::MockBridge`] implements the
//! same contract in memory for tests.

pub mod mock;
pub mod native;

use std::fmt;

/// Error buffer capacity for connect, enumeration and upload calls.
pub const ERROR_BUFFER_LEN: usize = 1024;

/// Error buffer capacity for the short product-name and video queries.
pub const SHORT_ERROR_BUFFER_LEN: usize = 512;

/// Output buffer capacity for the product name.
pub const NAME_BUFFER_LEN: usize = 512;

/// Width of the fixed still-name field, including the terminator slot.
pub const STILL_NAME_LEN: usize = 128;

/// Width of the fixed still-hash field (32 hex digits plus terminator).
pub const STILL_HASH_LEN: usize = 33;

/// Non-zero status code returned by a failed bridge call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Status(i32);

impl Status {
    /// Status used when an adapter rejects a call before reaching the library.
    pub const INTERNAL: Self = Self(-1);

    /// Convert a raw status code into a result.
    pub const fn check(code: i32) -> Result<(), Self> {
        if code == 0 { Ok(()) } else { Err(Self(code)) }
    }

    /// Build a failure status. A zero code is mapped to [`Status::INTERNAL`].
    pub const fn failure(code: i32) -> Self {
        if code == 0 { Self::INTERNAL } else { Self(code) }
    }

    pub const fn code(self) -> i32 {
        self.0
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "status {:#010x}", self.0)
    }
}

/// Failure reported by [`Bridge::open`].
///
/// `status` may be zero when the library reported success but handed back a
/// null connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenFailure {
    pub status: i32,
    pub fail_reason: i32,
}

/// Fixed-capacity byte region handed to the native library for one call.
///
/// Zero-filled on creation and released when dropped, which scopes its
/// lifetime to the call that allocated it.
pub struct ScratchBuffer {
    bytes: Box<[u8]>,
}

impl ScratchBuffer {
    /// Allocate a zero-filled buffer of `capacity` bytes.
    pub fn zeroed(capacity: usize) -> Self {
        Self {
            bytes: vec![0; capacity].into_boxed_slice(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.bytes.len()
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.bytes
    }

    /// Write `text` the way `snprintf` would: truncated to fit and always
    /// NUL-terminated when the buffer is non-empty.
    pub fn write_text(&mut self, text: &str) {
        write_fixed(&mut self.bytes, text);
    }

    /// Text up to the first NUL (or the whole buffer when none is present).
    ///
    /// Returns `None` when the buffer holds no text at all.
    pub fn text(&self) -> Option<String> {
        let text = decode_fixed(&self.bytes);
        if text.is_empty() { None } else { Some(text) }
    }
}

impl fmt::Debug for ScratchBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScratchBuffer")
            .field("capacity", &self.capacity())
            .field("text", &self.text())
            .finish()
    }
}

/// Fixed-layout still record exchanged with the native enumeration call.
///
/// Matches `atem_still_info` from `atem_bridge.h`.
#[repr(C)]
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct StillInfo {
    pub slot: i32,
    pub media_player: i32,
    pub name: [u8; STILL_NAME_LEN],
    pub hash: [u8; STILL_HASH_LEN],
}

impl StillInfo {
    /// Build a record the way the native side fills one in.
    pub fn new(slot: i32, media_player: i32, name: &str, hash: &str) -> Self {
        let mut name_field = [0; STILL_NAME_LEN];
        let mut hash_field = [0; STILL_HASH_LEN];
        write_fixed(&mut name_field, name);
        write_fixed(&mut hash_field, hash);
        Self {
            slot,
            media_player,
            name: name_field,
            hash: hash_field,
        }
    }

    pub fn name(&self) -> String {
        decode_fixed(&self.name)
    }

    pub fn hash(&self) -> String {
        decode_fixed(&self.hash)
    }
}

impl Default for StillInfo {
    fn default() -> Self {
        Self {
            slot: 0,
            media_player: 0,
            name: [0; STILL_NAME_LEN],
            hash: [0; STILL_HASH_LEN],
        }
    }
}

impl fmt::Debug for StillInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StillInfo")
            .field("slot", &self.slot)
            .field("media_player", &self.media_player)
            .field("name", &self.name())
            .field("hash", &self.hash())
            .finish()
    }
}

/// Decode a fixed-width text field.
///
/// The field is not guaranteed to be NUL-terminated when the text fills it
/// completely, so decoding stops at the first NUL or the end of the field.
pub fn decode_fixed(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}

fn write_fixed(dest: &mut [u8], text: &str) {
    dest.fill(0);
    let Some(max) = dest.len().checked_sub(1) else {
        return;
    };
    let len = text.len().min(max);
    dest[..len].copy_from_slice(&text.as_bytes()[..len]);
}

/// Operations exposed by the native switcher-control library.
///
/// Calls block until the library returns. Output text and diagnostics are
/// written into caller-supplied scratch buffers; implementations must not
/// retain them past the call.
pub trait Bridge {
    /// Opaque connection handle. Only valid between a successful `open` and
    /// the matching `close`.
    type Handle: Copy + fmt::Debug;

    /// Connect to the switcher at `address`.
    fn open(&self, address: &str, err: &mut ScratchBuffer) -> Result<Self::Handle, OpenFailure>;

    /// Release a connection. Called at most once per handle.
    fn close(&self, handle: Self::Handle);

    /// Write the product name into `out`.
    fn product_name(
        &self,
        handle: Self::Handle,
        out: &mut ScratchBuffer,
        err: &mut ScratchBuffer,
    ) -> Result<(), Status>;

    /// Raw switcher video mode code.
    fn video_mode(&self, handle: Self::Handle, err: &mut ScratchBuffer) -> Result<i32, Status>;

    /// Active video `(width, height)`.
    fn video_dimensions(
        &self,
        handle: Self::Handle,
        err: &mut ScratchBuffer,
    ) -> Result<(i32, i32), Status>;

    /// Fill up to `out.len()` records and return the number of stills the
    /// switcher holds. An empty `out` only probes the count.
    fn stills(
        &self,
        handle: Self::Handle,
        out: &mut [StillInfo],
        err: &mut ScratchBuffer,
    ) -> Result<i32, Status>;

    /// Upload interleaved BGRA pixels into the zero-based `slot`.
    #[allow(clippy::too_many_arguments)]
    fn upload_still(
        &self,
        handle: Self::Handle,
        slot: i32,
        name: &str,
        bgra: &[u8],
        width: i32,
        height: i32,
        err: &mut ScratchBuffer,
    ) -> Result<(), Status>;
}

impl<B: Bridge + ?Sized> Bridge for &B {
    type Handle = B::Handle;

    fn open(&self, address: &str, err: &mut ScratchBuffer) -> Result<Self::Handle, OpenFailure> {
        (**self).open(address, err)
    }

    fn close(&self, handle: Self::Handle) {
        (**self).close(handle);
    }

    fn product_name(
        &self,
        handle: Self::Handle,
        out: &mut ScratchBuffer,
        err: &mut ScratchBuffer,
    ) -> Result<(), Status> {
        (**self).product_name(handle, out, err)
    }

    fn video_mode(&self, handle: Self::Handle, err: &mut ScratchBuffer) -> Result<i32, Status> {
        (**self).video_mode(handle, err)
    }

    fn video_dimensions(
        &self,
        handle: Self::Handle,
        err: &mut ScratchBuffer,
    ) -> Result<(i32, i32), Status> {
        (**self).video_dimensions(handle, err)
    }

    fn stills(
        &self,
        handle: Self::Handle,
        out: &mut [StillInfo],
        err: &mut ScratchBuffer,
    ) -> Result<i32, Status> {
        (**self).stills(handle, out, err)
    }

    fn upload_still(
        &self,
        handle: Self::Handle,
        slot: i32,
        name: &str,
        bgra: &[u8],
        width: i32,
        height: i32,
        err: &mut ScratchBuffer,
    ) -> Result<(), Status> {
        (**self).upload_still(handle, slot, name, bgra, width, height, err)
    }
}
