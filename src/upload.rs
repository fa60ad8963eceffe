//! Single-use still upload pipeline.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info};

use crate::bridge::{Bridge, ERROR_BUFFER_LEN, ScratchBuffer};
use crate::error::{AtemError, Result};
use crate::image_ops::{decode_rgba, rgba_to_bgra};
use crate::switcher::Switcher;

/// Lifecycle of an [`Upload`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadStatus {
    NotStarted,
    Started,
    Completed,
}

/// One attempt to upload an image file into a media pool slot.
///
/// An upload runs at most once. Calling [`Upload::start`] again after the
/// first call returned does nothing, and an upload that failed part-way
/// stays in [`UploadStatus::Started`]; construct a new one to retry.
pub struct Upload<'s, B: Bridge> {
    switcher: &'s mut Switcher<B>,
    path: PathBuf,
    slot: u32,
    name: Option<String>,
    status: UploadStatus,
    progress: u8,
}

impl<'s, B: Bridge> Upload<'s, B> {
    /// Prepare an upload of `path` into the zero-based media pool `slot`.
    ///
    /// Fails if the file does not exist, or if the session cannot connect.
    pub fn new(switcher: &'s mut Switcher<B>, path: impl Into<PathBuf>, slot: u32) -> Result<Self> {
        let path = path.into();
        if !path.exists() {
            return Err(AtemError::Validation(format!("{} does not exist", path.display())));
        }

        switcher.connect()?;

        Ok(Self {
            switcher,
            path,
            slot,
            name: None,
            status: UploadStatus::NotStarted,
            progress: 0,
        })
    }

    /// Override the still name (defaults to the file stem).
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }

    /// Name the still will be stored under.
    pub fn name(&self) -> String {
        self.name.clone().unwrap_or_else(|| {
            self.path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_default()
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub const fn slot(&self) -> u32 {
        self.slot
    }

    pub const fn status(&self) -> UploadStatus {
        self.status
    }

    pub fn in_progress(&self) -> bool {
        self.status == UploadStatus::Started
    }

    /// 0 until the bridge accepts the upload, then 100.
    pub const fn progress(&self) -> u8 {
        self.progress
    }

    /// Decode, validate, convert and upload the image.
    ///
    /// No bridge mutation happens unless the decoded image matches the
    /// switcher's resolution exactly.
    pub fn start(&mut self) -> Result<()> {
        if self.status != UploadStatus::NotStarted {
            debug!(status = ?self.status, "Upload already started; ignoring");
            return Ok(());
        }

        self.status = UploadStatus::Started;
        self.progress = 0;
        info!(path = %self.path.display(), slot = self.slot, "Starting still upload");

        let image = decode_rgba(&self.path)?;
        let (width, height) = self.switcher.video_dimensions()?;
        if image.width() != width || image.height() != height {
            return Err(AtemError::Validation(format!(
                "Image is {}x{} it needs to be the same resolution as the switcher ({width}x{height})",
                image.width(),
                image.height()
            )));
        }

        let bgra = rgba_to_bgra(&image);
        let name = self.name();
        self.submit(&name, &bgra, width, height)?;

        self.progress = 100;
        self.status = UploadStatus::Completed;
        info!(slot = self.slot, %name, "Still upload complete");
        Ok(())
    }

    fn submit(&mut self, name: &str, bgra: &[u8], width: u32, height: u32) -> Result<()> {
        let (Ok(slot), Ok(width), Ok(height)) = (
            i32::try_from(self.slot),
            i32::try_from(width),
            i32::try_from(height),
        ) else {
            return Err(AtemError::Validation(format!(
                "Slot {} or resolution {width}x{height} is out of range",
                self.slot
            )));
        };

        let handle = self.switcher.connection()?;
        let mut err = ScratchBuffer::zeroed(ERROR_BUFFER_LEN);
        debug!(slot, bytes = bgra.len(), "Submitting still to bridge");
        self.switcher
            .bridge()
            .upload_still(handle, slot, name, bgra, width, height, &mut err)
            .map_err(|status| {
                debug!(%status, "Still upload rejected");
                AtemError::Upload(err.text().unwrap_or_else(|| "Upload failed".to_string()))
            })
    }
}
