//! Error types for switcher session and upload operations.

use thiserror::Error;

/// Primary error type for switcher operations.
///
/// The four bridge-facing categories carry the native library's diagnostic
/// text verbatim (or a fixed fallback when the library left it empty).
#[derive(Error, Debug)]
pub enum AtemError {
    // Bridge errors
    #[error("{message}")]
    Connection { message: String, fail_reason: i32 },

    #[error("{0}")]
    Query(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Upload(String),

    #[error("Failed to load switcher bridge library '{library}': {reason}")]
    LibraryLoad { library: String, reason: String },

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

impl AtemError {
    /// Short category name used in machine-readable output.
    pub const fn category(&self) -> &'static str {
        match self {
            Self::Connection { .. } | Self::LibraryLoad { .. } => "connection",
            Self::Query(_) => "query",
            Self::Validation(_) => "validation",
            Self::Upload(_) => "upload",
            Self::Config(_) => "config",
        }
    }

    /// Returns true if the error is recoverable by the user.
    pub const fn is_user_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::LibraryLoad { .. } | Self::Config(_)
        )
    }

    /// Returns a suggestion for how to fix the error.
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::Connection { .. } => Some("Check the switcher address and that it is reachable"),
            Self::LibraryLoad { .. } => {
                Some("Set --library or ATEM_BRIDGE_LIB to the atem_bridge library path")
            }
            Self::Validation(_) => {
                Some("Stills must exist and match the switcher's video resolution exactly")
            }
            Self::Config(_) => Some("Check the config file or pass --address explicitly"),
            _ => None,
        }
    }
}

/// Convenience type alias for Results using AtemError.
pub type Result<T> = std::result::Result<T, AtemError>;
