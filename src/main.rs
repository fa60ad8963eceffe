//! atem CLI - Query ATEM switchers and upload stills to their media pool.
//!
//! Provides both human-friendly and script-friendly (JSON) interfaces.

use std::io::{self, IsTerminal};
use std::time::Duration;

use atem::bridge::native::NativeBridge;
use atem::cli::{self, Cli, Commands};
use atem::config::Config;
use atem::error::{AtemError, Result};
use atem::switcher::Switcher;
use atem::upload::Upload;
use clap::Parser;
use console::style;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use serde::Serialize;
use tracing::debug;

/// Build metadata embedded by build.rs.
#[derive(Serialize)]
struct BuildInfo {
    version: &'static str,
    git_sha: &'static str,
    git_dirty: bool,
    build_timestamp: &'static str,
    rustc_version: &'static str,
    target: &'static str,
}

impl BuildInfo {
    const VERSION: &'static str = env!("CARGO_PKG_VERSION");

    fn current() -> Self {
        Self {
            version: Self::VERSION,
            git_sha: option_env!("VERGEN_GIT_SHA").unwrap_or("unknown"),
            git_dirty: option_env!("VERGEN_GIT_DIRTY") == Some("true"),
            build_timestamp: option_env!("VERGEN_BUILD_TIMESTAMP").unwrap_or("unknown"),
            rustc_version: option_env!("VERGEN_RUSTC_SEMVER").unwrap_or("unknown"),
            target: option_env!("VERGEN_CARGO_TARGET_TRIPLE").unwrap_or("unknown"),
        }
    }
}

fn main() {
    let cli = Cli::parse();

    if cli.no_color || !io::stdout().is_terminal() {
        console::set_colors_enabled(false);
    }
    if cli.no_color || !io::stderr().is_terminal() {
        console::set_colors_enabled_stderr(false);
    }

    atem::logging::init_logging(cli.use_json(), cli.verbose, cli.quiet);

    if let Err(e) = run(&cli) {
        output_error(&cli, &e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    match &cli.command {
        None => print_quick_start(cli),
        Some(Commands::Info) => cmd_info(cli),
        Some(Commands::Stills) => cmd_stills(cli),
        Some(Commands::Upload(args)) => cmd_upload(cli, args),
        Some(Commands::Version) => cmd_version(cli),
        Some(Commands::Completions(args)) => cmd_completions(cli, args),
    }
}

// === Quick Start ===

#[allow(clippy::unnecessary_wraps)] // Consistent return type with other commands
fn print_quick_start(cli: &Cli) -> Result<()> {
    if cli.use_json() {
        let help = QuickStart {
            tool: "atem",
            version: BuildInfo::VERSION,
            description: "Query ATEM switchers and upload stills through atem_bridge",
            commands: QuickStartCommands {
                info: "atem --address <ADDR> info",
                stills: "atem --address <ADDR> stills",
                upload: "atem --address <ADDR> upload <IMAGE> --slot <N>",
            },
            slots: "Slots are 1-based, as listed by `atem stills`",
            environment: QuickStartEnvironment {
                address: "ATEM_ADDRESS",
                library: "ATEM_BRIDGE_LIB",
            },
        };
        output_json(cli, &help);
    } else {
        println!(
            "{} {} - ATEM switcher CLI\n",
            style("atem").bold().cyan(),
            BuildInfo::VERSION
        );

        println!("{}", style("QUICK START").bold().underlined());
        println!();
        println!("  {}  Switcher info", style("atem -a 192.168.10.240 info").green());
        println!("  {}  List stills", style("atem -a 192.168.10.240 stills").green());
        println!(
            "  {}  Upload a still",
            style("atem -a 192.168.10.240 upload logo.png --slot 1").green()
        );
        println!();

        println!("{}", style("ENVIRONMENT").bold().underlined());
        println!();
        println!("  {}     Default switcher address", style("ATEM_ADDRESS").cyan());
        println!("  {}  Path to the atem_bridge library", style("ATEM_BRIDGE_LIB").cyan());
        println!();

        println!("Run {} for full help", style("atem --help").yellow());
    }
    Ok(())
}

#[derive(Serialize)]
struct QuickStart {
    tool: &'static str,
    version: &'static str,
    description: &'static str,
    commands: QuickStartCommands,
    slots: &'static str,
    environment: QuickStartEnvironment,
}

#[derive(Serialize)]
struct QuickStartCommands {
    info: &'static str,
    stills: &'static str,
    upload: &'static str,
}

#[derive(Serialize)]
struct QuickStartEnvironment {
    address: &'static str,
    library: &'static str,
}

// === Command Implementations ===

/// Resolve the switcher address and load the bridge library.
///
/// The address is checked first so a missing address never needs a loadable
/// library to be reported.
fn open_bridge(cli: &Cli) -> Result<(String, NativeBridge)> {
    let config =
        Config::load(cli.config.as_deref())?.with_overrides(cli.address.clone(), cli.library.clone());
    let address = config.require_address()?.to_string();
    debug!(%address, "Resolved switcher address");
    let bridge = NativeBridge::load(config.library.as_deref())?;
    Ok((address, bridge))
}

#[derive(Serialize)]
struct SwitcherInfo {
    address: String,
    product_name: String,
    video_mode: i32,
    width: u32,
    height: u32,
}

fn cmd_info(cli: &Cli) -> Result<()> {
    let (address, bridge) = open_bridge(cli)?;
    let info = Switcher::scoped(bridge, address.clone(), |switcher| {
        let product_name = switcher.product_name()?;
        let video_mode = switcher.video_mode()?;
        let (width, height) = switcher.video_dimensions()?;
        Ok(SwitcherInfo {
            address,
            product_name,
            video_mode,
            width,
            height,
        })
    })?;

    if cli.use_json() {
        output_json(cli, &info);
    } else {
        println!("{}", style(&info.product_name).bold());
        println!("  Address:    {}", info.address);
        println!("  Video mode: {}", info.video_mode);
        println!("  Resolution: {}x{}", info.width, info.height);
    }
    Ok(())
}

fn cmd_stills(cli: &Cli) -> Result<()> {
    let (address, bridge) = open_bridge(cli)?;
    let stills = Switcher::scoped(bridge, address, Switcher::stills)?;

    if cli.use_json() {
        output_json(cli, &stills);
    } else {
        for still in &stills {
            println!("{}", still.to_csv());
        }
    }
    Ok(())
}

fn cmd_upload(cli: &Cli, args: &cli::UploadArgs) -> Result<()> {
    let Some(slot) = args.slot.checked_sub(1) else {
        return Err(AtemError::Validation("Slot numbers start at 1".to_string()));
    };
    let (address, bridge) = open_bridge(cli)?;

    let spinner = if cli.use_json() || cli.quiet {
        ProgressBar::hidden()
    } else {
        upload_spinner(&format!("Uploading {}", args.file.display()))
    };

    let result = Switcher::scoped(bridge, address, |switcher| {
        let mut upload = Upload::new(switcher, &args.file, slot)?;
        if let Some(name) = &args.name {
            upload.set_name(name.clone());
        }
        upload.start()?;
        Ok((upload.name(), upload.status()))
    });
    spinner.finish_and_clear();
    let (name, status) = result?;

    if cli.use_json() {
        output_json(
            cli,
            &serde_json::json!({
                "file": args.file.display().to_string(),
                "slot": args.slot,
                "name": name,
                "status": status,
                "ok": true,
            }),
        );
    } else if !cli.quiet {
        println!(
            "{} {} uploaded to slot {} as \"{}\"",
            style("✓").green(),
            args.file.display(),
            args.slot,
            name
        );
    }
    Ok(())
}

fn upload_spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::with_draw_target(None, ProgressDrawTarget::stderr());
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg}").unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

#[allow(clippy::unnecessary_wraps)] // Consistent return type with other commands
fn cmd_version(cli: &Cli) -> Result<()> {
    let info = BuildInfo::current();
    if cli.use_json() {
        output_json(cli, &info);
    } else {
        println!("atem {}", info.version);
        println!("git: {}{}", info.git_sha, if info.git_dirty { " (dirty)" } else { "" });
        println!("built: {}", info.build_timestamp);
        println!("rustc: {}", info.rustc_version);
        println!("target: {}", info.target);
    }
    Ok(())
}

#[allow(clippy::unnecessary_wraps)] // Consistent return type with other commands
fn cmd_completions(_cli: &Cli, args: &cli::CompletionsArgs) -> Result<()> {
    use clap::CommandFactory;
    clap_complete::generate(args.shell, &mut Cli::command(), "atem", &mut io::stdout());
    Ok(())
}

// === Utility Functions ===

fn output_json<T: Serialize>(cli: &Cli, data: &T) {
    let json = if cli.use_compact_json() {
        serde_json::to_string(data)
    } else {
        serde_json::to_string_pretty(data)
    };
    match json {
        Ok(json) => println!("{json}"),
        Err(e) => eprintln!("Failed to serialize output: {e}"),
    }
}

fn output_error(cli: &Cli, error: &AtemError) {
    if cli.use_json() {
        let json = serde_json::json!({
            "error": true,
            "category": error.category(),
            "message": error.to_string(),
            "suggestion": error.suggestion(),
            "recoverable": error.is_user_recoverable(),
        });
        eprintln!("{json:#}");
    } else {
        eprintln!("{}: {}", style("Error").red().bold(), error);
        if let Some(suggestion) = error.suggestion() {
            eprintln!("{}: {}", style("Hint").yellow(), suggestion);
        }
    }
}
