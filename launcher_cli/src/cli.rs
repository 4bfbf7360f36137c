//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};

/// Flush handle of the file log sink; taken and dropped before exit.
pub static FILE_GUARD: OnceLock<Mutex<Option<tracing_appender::non_blocking::WorkerGuard>>> =
    OnceLock::new();
/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "launcher", version, about = "USB launcher motion controller")]
pub struct Cli {
    /// Path to config TOML (typed)
    #[arg(long, value_name = "FILE", default_value = "etc/launcher.toml")]
    pub config: PathBuf,

    /// Log as JSON lines instead of pretty
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace)
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "info")]
    pub log_level: String,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Interactive console: one key per action, `?` lists them
    Run,
    /// Measure both axes end to end and print the speeds
    Calibrate,
    /// Drive to the up/right corner
    Home,
    /// Calibrate (unless traversal times are configured), then move to absolute angles
    MoveAbs {
        #[arg(long, allow_hyphen_values = true)]
        theta: f64,
        #[arg(long, allow_hyphen_values = true)]
        phi: f64,
    },
    /// Home (and calibrate if needed), then move by the given angles
    MoveRel {
        #[arg(long, allow_hyphen_values = true)]
        dtheta: f64,
        #[arg(long, allow_hyphen_values = true)]
        dphi: f64,
    },
    /// Fire once
    Fire {
        /// Give up after this many seconds (default: [fire] timeout_s)
        #[arg(long, value_name = "SECS")]
        timeout: Option<f64>,
    },
    /// Read one status byte and print it
    Status,
    /// Quick health check (device presence / sim ok)
    SelfCheck,
}
