//! Switcher session over a [`Bridge`].
//!
//! A [`Switcher`] owns at most one native connection. It connects lazily on
//! the first query, allocates and releases a scratch buffer around every
//! bridge call, and turns non-zero statuses into [`AtemError`] values that
//! carry the bridge's diagnostic text.
//!
//! Release the connection with [`Switcher::close`] or run the session inside
//! [`Switcher::scoped`]. Dropping a still-connected session also releases
//! it, but logs a warning since that indicates a missed `close`.
//!
//! A session is not synchronised internally; callers sharing one across
//! threads must serialise access themselves.

use tracing::{debug, info, warn};

use crate::bridge::{
    Bridge, ERROR_BUFFER_LEN, NAME_BUFFER_LEN, SHORT_ERROR_BUFFER_LEN, ScratchBuffer, StillInfo,
};
use crate::error::{AtemError, Result};
use crate::still::MediaStill;

/// Diagnostic from the error buffer, or `fallback` when it is empty.
fn diagnostic(err: &ScratchBuffer, fallback: &str) -> String {
    err.text().unwrap_or_else(|| fallback.to_string())
}

/// A session with one switcher.
pub struct Switcher<B: Bridge> {
    bridge: B,
    address: String,
    connection: Option<B::Handle>,
}

impl<B: Bridge> Switcher<B> {
    /// Create a disconnected session for the switcher at `address`.
    pub fn new(bridge: B, address: impl Into<String>) -> Self {
        Self {
            bridge,
            address: address.into(),
            connection: None,
        }
    }

    /// Run `f` against a new session and close it afterwards, whether `f`
    /// succeeded or not.
    pub fn scoped<T>(
        bridge: B,
        address: impl Into<String>,
        f: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<T> {
        let mut switcher = Self::new(bridge, address);
        let result = f(&mut switcher);
        switcher.close();
        result
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn bridge(&self) -> &B {
        &self.bridge
    }

    pub const fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    /// Open the native connection if it is not open yet.
    pub fn connect(&mut self) -> Result<()> {
        self.connection().map(|_| ())
    }

    /// Connected handle, connecting first when needed.
    pub(crate) fn connection(&mut self) -> Result<B::Handle> {
        if let Some(handle) = self.connection {
            return Ok(handle);
        }

        debug!(address = %self.address, "Connecting to switcher");
        let mut err = ScratchBuffer::zeroed(ERROR_BUFFER_LEN);
        match self.bridge.open(&self.address, &mut err) {
            Ok(handle) => {
                info!(address = %self.address, "Connected to switcher");
                self.connection = Some(handle);
                Ok(handle)
            }
            Err(failure) => {
                let message = diagnostic(&err, "Unable to connect to switcher");
                warn!(
                    address = %self.address,
                    status = failure.status,
                    fail_reason = failure.fail_reason,
                    %message,
                    "Connection failed"
                );
                Err(AtemError::Connection {
                    message,
                    fail_reason: failure.fail_reason,
                })
            }
        }
    }

    /// Product name reported by the switcher.
    pub fn product_name(&mut self) -> Result<String> {
        let handle = self.connection()?;
        let mut name = ScratchBuffer::zeroed(NAME_BUFFER_LEN);
        let mut err = ScratchBuffer::zeroed(SHORT_ERROR_BUFFER_LEN);
        self.bridge
            .product_name(handle, &mut name, &mut err)
            .map_err(|status| {
                debug!(%status, "Product name query failed");
                AtemError::Query(diagnostic(&err, "Unable to get product name"))
            })?;
        Ok(name.text().unwrap_or_default())
    }

    /// Raw video mode code reported by the switcher.
    pub fn video_mode(&mut self) -> Result<i32> {
        let handle = self.connection()?;
        let mut err = ScratchBuffer::zeroed(SHORT_ERROR_BUFFER_LEN);
        self.bridge.video_mode(handle, &mut err).map_err(|status| {
            debug!(%status, "Video mode query failed");
            AtemError::Query(diagnostic(&err, "Unable to get video mode"))
        })
    }

    /// Active video resolution as `(width, height)`.
    pub fn video_dimensions(&mut self) -> Result<(u32, u32)> {
        let handle = self.connection()?;
        let mut err = ScratchBuffer::zeroed(SHORT_ERROR_BUFFER_LEN);
        let (width, height) = self
            .bridge
            .video_dimensions(handle, &mut err)
            .map_err(|status| {
                debug!(%status, "Video dimensions query failed");
                AtemError::Query(diagnostic(&err, "Unable to get video dimensions"))
            })?;

        match (u32::try_from(width), u32::try_from(height)) {
            (Ok(w), Ok(h)) => Ok((w, h)),
            _ => Err(AtemError::Query(format!(
                "Switcher reported invalid video dimensions {width}x{height}"
            ))),
        }
    }

    pub fn video_width(&mut self) -> Result<u32> {
        self.video_dimensions().map(|(width, _)| width)
    }

    pub fn video_height(&mut self) -> Result<u32> {
        self.video_dimensions().map(|(_, height)| height)
    }

    /// Every still in the media pool.
    ///
    /// Asks the bridge for the count first, then fetches exactly that many
    /// records. The fetch is issued even for an empty pool. Either call
    /// failing fails the whole listing.
    pub fn stills(&mut self) -> Result<Vec<MediaStill>> {
        let handle = self.connection()?;

        let count = {
            let mut err = ScratchBuffer::zeroed(ERROR_BUFFER_LEN);
            let count = self.bridge.stills(handle, &mut [], &mut err).map_err(|status| {
                debug!(%status, "Still count probe failed");
                AtemError::Query(diagnostic(&err, "Unable to get still count"))
            })?;
            usize::try_from(count).map_err(|_| {
                AtemError::Query(format!("Switcher reported an invalid still count {count}"))
            })?
        };
        debug!(count, "Probed still count");

        let mut records = vec![StillInfo::default(); count];
        let mut err = ScratchBuffer::zeroed(ERROR_BUFFER_LEN);
        let fetched = self
            .bridge
            .stills(handle, &mut records, &mut err)
            .map_err(|status| {
                debug!(%status, "Still fetch failed");
                AtemError::Query(diagnostic(&err, "Unable to enumerate stills"))
            })?;

        // The pool may have shrunk between the two calls.
        let fetched = usize::try_from(fetched).unwrap_or(0);
        records.truncate(fetched.min(count));

        records.iter().map(to_media_still).collect()
    }

    /// Release the native connection. Safe to call more than once.
    pub fn close(&mut self) {
        if let Some(handle) = self.connection.take() {
            debug!(address = %self.address, ?handle, "Disconnecting from switcher");
            self.bridge.close(handle);
            info!(address = %self.address, "Disconnected from switcher");
        }
    }
}

impl<B: Bridge> Drop for Switcher<B> {
    fn drop(&mut self) {
        if self.connection.is_some() {
            warn!(
                address = %self.address,
                "Switcher session dropped while connected; releasing connection"
            );
            self.close();
        }
    }
}

fn to_media_still(info: &StillInfo) -> Result<MediaStill> {
    match (u32::try_from(info.slot), u32::try_from(info.media_player)) {
        (Ok(slot), Ok(media_player)) => Ok(MediaStill::new(slot, media_player, info.name(), info.hash())),
        _ => Err(AtemError::Query(format!(
            "Switcher reported an invalid still record (slot {}, media player {})",
            info.slot, info.media_player
        ))),
    }
}
