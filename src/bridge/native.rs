//! Native `atem_bridge` adapter.
//!
//! Loads the bridge shared library at runtime and forwards every
//! [`Bridge`] call to the matching `extern "C"` symbol. All raw pointer
//! handling in the crate lives here.
#![allow(unsafe_code)]

use std::ffi::{CString, c_char};
use std::path::{Path, PathBuf};
use std::ptr::{self, NonNull};

use tracing::{debug, info, trace};

use super::{Bridge, OpenFailure, ScratchBuffer, Status, StillInfo};
use crate::error::{AtemError, Result};

/// Opaque `atem_connection` from `atem_bridge.h`.
#[repr(C)]
pub struct AtemConnection {
    _private: [u8; 0],
}

type ConnectFn = unsafe extern "C" fn(
    *const c_char,
    *mut *mut AtemConnection,
    *mut i32,
    *mut c_char,
    i32,
) -> i32;
type DisconnectFn = unsafe extern "C" fn(*mut AtemConnection);
type ProductNameFn =
    unsafe extern "C" fn(*mut AtemConnection, *mut c_char, i32, *mut c_char, i32) -> i32;
type VideoModeFn = unsafe extern "C" fn(*mut AtemConnection, *mut i32, *mut c_char, i32) -> i32;
type DimensionsFn =
    unsafe extern "C" fn(*mut AtemConnection, *mut i32, *mut i32, *mut c_char, i32) -> i32;
type StillsFn = unsafe extern "C" fn(
    *mut AtemConnection,
    *mut StillInfo,
    i32,
    *mut i32,
    *mut c_char,
    i32,
) -> i32;
type UploadFn = unsafe extern "C" fn(
    *mut AtemConnection,
    i32,
    *const c_char,
    *const u8,
    i32,
    i32,
    i32,
    *mut c_char,
    i32,
) -> i32;

/// Platform file name of the bridge library.
pub const fn default_library_name() -> &'static str {
    if cfg!(target_os = "windows") {
        "atem_bridge.dll"
    } else if cfg!(target_os = "macos") {
        "libatem_bridge.dylib"
    } else {
        "libatem_bridge.so"
    }
}

/// Bridge backed by the `atem_bridge` shared library.
pub struct NativeBridge {
    // Keeps the symbols below alive.
    _lib: libloading::Library,
    path: PathBuf,
    connect: ConnectFn,
    disconnect: DisconnectFn,
    get_product_name: ProductNameFn,
    get_video_mode: VideoModeFn,
    get_video_dimensions: DimensionsFn,
    get_stills: StillsFn,
    upload_still_bgra: UploadFn,
}

impl NativeBridge {
    /// Load the bridge library from `path`, or from the platform default
    /// library name when `path` is `None`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path.map_or_else(|| PathBuf::from(default_library_name()), Path::to_path_buf);
        let load_error = |reason: String| AtemError::LibraryLoad {
            library: path.display().to_string(),
            reason,
        };

        debug!(library = %path.display(), "Loading switcher bridge library");

        // SAFETY: loading runs the library's initialisers; atem_bridge has
        // none beyond static construction.
        let lib = unsafe { libloading::Library::new(&path) }.map_err(|e| load_error(e.to_string()))?;

        // SAFETY: each field's fn type matches the export's signature in
        // atem_bridge.h.
        let bridge = unsafe {
            Self {
                connect: symbol(&lib, b"atem_connect\0").map_err(load_error)?,
                disconnect: symbol(&lib, b"atem_disconnect\0").map_err(load_error)?,
                get_product_name: symbol(&lib, b"atem_get_product_name\0").map_err(load_error)?,
                get_video_mode: symbol(&lib, b"atem_get_video_mode\0").map_err(load_error)?,
                get_video_dimensions: symbol(&lib, b"atem_get_video_dimensions\0")
                    .map_err(load_error)?,
                get_stills: symbol(&lib, b"atem_get_stills\0").map_err(load_error)?,
                upload_still_bgra: symbol(&lib, b"atem_upload_still_bgra\0").map_err(load_error)?,
                _lib: lib,
                path: path.clone(),
            }
        };

        info!(library = %bridge.path.display(), "Switcher bridge library loaded");
        Ok(bridge)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Copy an exported function pointer out of `lib`.
///
/// # Safety
///
/// `T` must match the export's real type. The pointer stays valid only
/// while `lib` is loaded.
unsafe fn symbol<T: Copy>(
    lib: &libloading::Library,
    name: &[u8],
) -> std::result::Result<T, String> {
    // SAFETY: upheld by the caller.
    unsafe { lib.get::<T>(name) }
        .map(|sym| *sym)
        .map_err(|e| e.to_string())
}

/// Pointer and length arguments for a scratch buffer.
fn buffer_args(buf: &mut ScratchBuffer) -> (*mut c_char, i32) {
    let len = i32::try_from(buf.capacity()).unwrap_or(i32::MAX);
    (buf.as_mut_slice().as_mut_ptr().cast(), len)
}

fn to_cstring(text: &str, what: &str, err: &mut ScratchBuffer) -> std::result::Result<CString, ()> {
    CString::new(text).map_err(|_| err.write_text(&format!("{what} contains a NUL byte")))
}

impl Bridge for NativeBridge {
    type Handle = NonNull<AtemConnection>;

    fn open(&self, address: &str, err: &mut ScratchBuffer) -> std::result::Result<Self::Handle, OpenFailure> {
        let Ok(address) = to_cstring(address, "device address", err) else {
            return Err(OpenFailure {
                status: Status::INTERNAL.code(),
                fail_reason: 0,
            });
        };
        let mut connection: *mut AtemConnection = ptr::null_mut();
        let mut fail_reason = 0_i32;
        let (err_ptr, err_len) = buffer_args(err);

        trace!("atem_connect");
        // SAFETY: all pointers are valid for the duration of the call and
        // the error buffer length matches its allocation.
        let status = unsafe {
            (self.connect)(
                address.as_ptr(),
                &raw mut connection,
                &raw mut fail_reason,
                err_ptr,
                err_len,
            )
        };

        match NonNull::new(connection) {
            Some(handle) if status == 0 => Ok(handle),
            _ => Err(OpenFailure {
                status,
                fail_reason,
            }),
        }
    }

    fn close(&self, handle: Self::Handle) {
        trace!("atem_disconnect");
        // SAFETY: the session hands each handle from `open` back exactly once.
        unsafe { (self.disconnect)(handle.as_ptr()) };
    }

    fn product_name(
        &self,
        handle: Self::Handle,
        out: &mut ScratchBuffer,
        err: &mut ScratchBuffer,
    ) -> std::result::Result<(), Status> {
        let (out_ptr, out_len) = buffer_args(out);
        let (err_ptr, err_len) = buffer_args(err);
        trace!("atem_get_product_name");
        // SAFETY: both buffers are live and sized as passed.
        let status =
            unsafe { (self.get_product_name)(handle.as_ptr(), out_ptr, out_len, err_ptr, err_len) };
        Status::check(status)
    }

    fn video_mode(&self, handle: Self::Handle, err: &mut ScratchBuffer) -> std::result::Result<i32, Status> {
        let mut mode = 0_i32;
        let (err_ptr, err_len) = buffer_args(err);
        trace!("atem_get_video_mode");
        // SAFETY: `mode` outlives the call.
        let status = unsafe { (self.get_video_mode)(handle.as_ptr(), &raw mut mode, err_ptr, err_len) };
        Status::check(status).map(|()| mode)
    }

    fn video_dimensions(
        &self,
        handle: Self::Handle,
        err: &mut ScratchBuffer,
    ) -> std::result::Result<(i32, i32), Status> {
        let mut width = 0_i32;
        let mut height = 0_i32;
        let (err_ptr, err_len) = buffer_args(err);
        trace!("atem_get_video_dimensions");
        // SAFETY: `width` and `height` outlive the call.
        let status = unsafe {
            (self.get_video_dimensions)(
                handle.as_ptr(),
                &raw mut width,
                &raw mut height,
                err_ptr,
                err_len,
            )
        };
        Status::check(status).map(|()| (width, height))
    }

    fn stills(
        &self,
        handle: Self::Handle,
        out: &mut [StillInfo],
        err: &mut ScratchBuffer,
    ) -> std::result::Result<i32, Status> {
        let Ok(capacity) = i32::try_from(out.len()) else {
            err.write_text("still buffer is too large");
            return Err(Status::INTERNAL);
        };
        let items = if out.is_empty() {
            ptr::null_mut()
        } else {
            out.as_mut_ptr()
        };
        let mut count = 0_i32;
        let (err_ptr, err_len) = buffer_args(err);
        trace!(capacity, "atem_get_stills");
        // SAFETY: the library writes at most `capacity` records into `items`
        // and ignores `items` when `capacity` is zero.
        let status = unsafe {
            (self.get_stills)(
                handle.as_ptr(),
                items,
                capacity,
                &raw mut count,
                err_ptr,
                err_len,
            )
        };
        Status::check(status).map(|()| count)
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
    ) -> std::result::Result<(), Status> {
        let Ok(name) = to_cstring(name, "still name", err) else {
            return Err(Status::INTERNAL);
        };
        let Ok(byte_count) = i32::try_from(bgra.len()) else {
            err.write_text("pixel buffer is too large");
            return Err(Status::INTERNAL);
        };
        let (err_ptr, err_len) = buffer_args(err);
        trace!(slot, byte_count, width, height, "atem_upload_still_bgra");
        // SAFETY: the library copies exactly `byte_count` bytes out of
        // `bgra` before returning.
        let status = unsafe {
            (self.upload_still_bgra)(
                handle.as_ptr(),
                slot,
                name.as_ptr(),
                bgra.as_ptr(),
                byte_count,
                width,
                height,
                err_ptr,
                err_len,
            )
        };
        Status::check(status)
    }
}
