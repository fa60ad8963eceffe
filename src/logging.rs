//! Structured logging for the atem CLI.
//!
//! All log output goes to stderr so stdout stays clean for CSV and JSON
//! results.

use std::io::{self, IsTerminal};

use tracing_subscriber::{
    EnvFilter, Layer, Registry, fmt, layer::SubscriberExt, util::SubscriberInitExt,
};

/// How log lines are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// One JSON object per line.
    Json,
    /// Colored multi-field lines for an interactive terminal.
    Pretty,
    /// Plain single-line output for pipes and log files.
    Compact,
}

impl LogFormat {
    /// JSON when requested, otherwise chosen by whether stderr is a TTY.
    pub fn detect(json: bool) -> Self {
        if json {
            Self::Json
        } else if io::stderr().is_terminal() {
            Self::Pretty
        } else {
            Self::Compact
        }
    }
}

/// Filter directive for the given verbosity flags.
///
/// `quiet` wins over `verbose`.
pub fn default_directive(verbose: u8, quiet: bool) -> &'static str {
    match (quiet, verbose) {
        (true, _) => "atem=error",
        (false, 0) => "atem=info",
        (false, 1) => "atem=debug",
        (false, _) => "atem=trace",
    }
}

fn format_layer(format: LogFormat) -> Box<dyn Layer<Registry> + Send + Sync> {
    let base = fmt::layer()
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_writer(io::stderr);

    match format {
        LogFormat::Json => base.json().with_target(true).boxed(),
        LogFormat::Pretty => base.with_target(false).boxed(),
        LogFormat::Compact => base.with_ansi(false).with_target(false).compact().boxed(),
    }
}

/// Install the global subscriber.
///
/// `RUST_LOG` replaces the verbosity-derived filter when set. Calling this
/// more than once keeps the first subscriber.
pub fn init_logging(json: bool, verbose: u8, quiet: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose, quiet)));

    let _ = tracing_subscriber::registry()
        .with(format_layer(LogFormat::detect(json)))
        .with(filter)
        .try_init();
}
