//! ovlmeta: prints the metadata views of an overlay design.
//!
//! Loads a JSON design description plus an optional `overlay.toml`, binds
//! drivers, and prints one view as text or JSON. Warnings raised while binding
//! or walking go to stderr.

#![warn(missing_docs)]

mod pipeline;
mod show;

use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

/// Overlay design metadata inspector.
#[derive(Parser, Debug)]
#[command(name = "ovlmeta", version, about = "Overlay design metadata views")]
pub struct Cli {
    /// Suppress diagnostics on stderr.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose (debug-level) logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Control colored output.
    #[arg(long, global = true, value_enum, default_value_t = ColorChoice::Auto)]
    pub color: ColorChoice,

    /// The view to print.
    #[command(subcommand)]
    pub command: Command,
}

/// Available views.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Register-addressable IP and the processing system.
    Ip(ViewArgs),
    /// Memories mapped by the processing system.
    Mem(ViewArgs),
    /// Processing-system GPIO lines.
    Gpio(ViewArgs),
    /// The hierarchy tree with hierarchy drivers.
    Hier(ViewArgs),
    /// Interrupt controllers.
    IrqControllers(ViewArgs),
    /// Interrupt pins.
    IrqPins(ViewArgs),
}

impl Command {
    /// The view selected by the command.
    pub fn view(&self) -> ViewKind {
        match self {
            Command::Ip(_) => ViewKind::Ip,
            Command::Mem(_) => ViewKind::Memory,
            Command::Gpio(_) => ViewKind::Gpio,
            Command::Hier(_) => ViewKind::Hierarchy,
            Command::IrqControllers(_) => ViewKind::InterruptControllers,
            Command::IrqPins(_) => ViewKind::InterruptPins,
        }
    }

    /// The arguments shared by every view.
    pub fn args(&self) -> &ViewArgs {
        match self {
            Command::Ip(args)
            | Command::Mem(args)
            | Command::Gpio(args)
            | Command::Hier(args)
            | Command::IrqControllers(args)
            | Command::IrqPins(args) => args,
        }
    }
}

/// Which view to materialize.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewKind {
    /// The IP view.
    Ip,
    /// The memory view.
    Memory,
    /// The GPIO view.
    Gpio,
    /// The hierarchy view.
    Hierarchy,
    /// The interrupt controllers view.
    InterruptControllers,
    /// The interrupt pins view.
    InterruptPins,
}

/// Arguments shared by every view command.
#[derive(Parser, Debug)]
pub struct ViewArgs {
    /// JSON design description.
    #[arg(short, long)]
    pub design: String,

    /// Path to `overlay.toml` (or a directory containing it).
    #[arg(short, long)]
    pub config: Option<String>,

    /// Output format.
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,

    /// Bind drivers registered for another version of an IP.
    #[arg(long)]
    pub ignore_version: bool,

    /// Override the overlay handle.
    #[arg(long)]
    pub overlay: Option<String>,

    /// Override the device handle.
    #[arg(long)]
    pub device: Option<String>,
}

/// Controls whether colored output is produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ColorChoice {
    /// Detect from the environment.
    Auto,
    /// Always produce colored output.
    Always,
    /// Never produce colored output.
    Never,
}

/// Output format for views and diagnostics.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Human-readable text.
    Text,
    /// Machine-readable JSON.
    Json,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress diagnostics.
    pub quiet: bool,
    /// Whether to use colored output.
    pub color: bool,
}

fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| level.into()),
        ))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let color = match cli.color {
        ColorChoice::Auto => std::env::var_os("NO_COLOR").is_none() && std::env::var("TERM").is_ok(),
        ColorChoice::Always => true,
        ColorChoice::Never => false,
    };
    let global = GlobalArgs {
        quiet: cli.quiet,
        color,
    };

    match show::run(cli.command.view(), cli.command.args(), &global) {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}
