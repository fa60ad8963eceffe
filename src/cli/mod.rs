//! CLI argument definitions.

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// atem - Query ATEM switchers and upload stills to their media pool.
#[derive(Parser, Debug)]
#[command(name = "atem", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format (text for humans, json for scripts)
    #[arg(
        long,
        short = 'f',
        default_value = "text",
        global = true,
        env = "ATEM_FORMAT"
    )]
    pub format: OutputFormat,

    /// Shorthand for --format=json
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbose output (-v debug, -vv trace)
    #[arg(long, short = 'v', global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress non-essential output)
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Disable colored output (NO_COLOR set to any non-empty value)
    #[arg(
        long,
        global = true,
        env = "NO_COLOR",
        value_parser = clap::builder::FalseyValueParser::new()
    )]
    pub no_color: bool,

    /// Config file (default: <config dir>/atem/config.toml)
    #[arg(long, short = 'c', global = true, env = "ATEM_CONFIG")]
    pub config: Option<PathBuf>,

    /// Switcher IP address or hostname
    #[arg(long, short = 'a', global = true, env = "ATEM_ADDRESS")]
    pub address: Option<String>,

    /// Path to the atem_bridge native library
    #[arg(long, global = true, env = "ATEM_BRIDGE_LIB")]
    pub library: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Output format selection.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text with optional color
    #[default]
    Text,
    /// JSON output for scripts
    Json,
    /// Compact JSON (single line)
    JsonCompact,
}

impl Cli {
    /// Returns true if output should be JSON.
    pub const fn use_json(&self) -> bool {
        self.json || matches!(self.format, OutputFormat::Json | OutputFormat::JsonCompact)
    }

    /// Returns true if output should be compact JSON.
    pub const fn use_compact_json(&self) -> bool {
        matches!(self.format, OutputFormat::JsonCompact)
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show product name and video resolution
    Info,

    /// List stills in the media pool (CSV: slot,"name","hash",mediaPlayer)
    Stills,

    /// Upload an image into a media pool slot
    Upload(UploadArgs),

    /// Show version and build information
    Version,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Parser, Debug)]
pub struct UploadArgs {
    /// Image file; must match the switcher's video resolution exactly
    pub file: PathBuf,

    /// Media pool slot, 1-based as listed by `atem stills`
    #[arg(long, short = 's', value_parser = clap::value_parser!(u32).range(1..))]
    pub slot: u32,

    /// Still name (default: file name without extension)
    #[arg(long, short = 'n')]
    pub name: Option<String>,
}

#[derive(Parser, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
