//! Media pool still records.

use std::fmt;

use serde::Serialize;

/// Point-in-time snapshot of one still in the switcher's media pool.
///
/// Values are produced by enumeration and never updated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MediaStill {
    slot: u32,
    media_player: u32,
    name: String,
    hash: String,
}

impl MediaStill {
    pub fn new(slot: u32, media_player: u32, name: impl Into<String>, hash: impl Into<String>) -> Self {
        Self {
            slot,
            media_player,
            name: name.into(),
            hash: hash.into(),
        }
    }

    /// Media pool slot (1-based, as reported by the switcher).
    pub const fn slot(&self) -> u32 {
        self.slot
    }

    /// Media player showing this still, or 0 when none is.
    pub const fn media_player(&self) -> u32 {
        self.media_player
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Content fingerprint as 32 hex digits (empty when unavailable).
    pub fn hash(&self) -> &str {
        &self.hash
    }

    /// Render as `slot,"name","hash",mediaPlayer`.
    ///
    /// Name and hash are always quoted. Embedded quotes and commas are
    /// written as-is, not escaped.
    pub fn to_csv(&self) -> String {
        format!(
            "{},\"{}\",\"{}\",{}",
            self.slot, self.name, self.hash, self.media_player
        )
    }
}

impl fmt::Display for MediaStill {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_csv())
    }
}
