#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]

mod backend;
mod cli;
mod commands;
mod console;
mod error_fmt;
mod logging;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use clap::Parser;

use crate::cli::{Cli, Commands, JSON_MODE};
use crate::error_fmt::{exit_code_for_error, format_error_json, humanize};

fn main() {
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);
    if let Err(e) = color_eyre::install() {
        eprintln!("color-eyre install failed: {e}");
    }

    let code = match run(cli) {
        Ok(()) => 0,
        Err(e) => {
            tracing::error!(error = %e, "command failed");
            if JSON_MODE.get().copied().unwrap_or(false) {
                println!("{}", format_error_json(&e));
            } else {
                eprintln!("{}", humanize(&e));
            }
            exit_code_for_error(&e)
        }
    };
    logging::flush();
    std::process::exit(code);
}

fn run(cli: Cli) -> eyre::Result<()> {
    let cfg = launcher_config::load_file(&cli.config);
    logging::init_tracing(cli.json, &cli.log_level, cfg.as_ref().ok().map(|c| &c.logging))?;
    let cfg = cfg?;
    tracing::debug!(config = %cli.config.display(), "config loaded");

    let stop = Arc::new(AtomicBool::new(false));
    {
        let stop = Arc::clone(&stop);
        ctrlc::set_handler(move || {
            stop.store(true, Ordering::Relaxed);
        })
        .map_err(|e| eyre::eyre!("installing Ctrl-C handler: {e}"))?;
    }

    let fire_timeout = Duration::try_from_secs_f64(cfg.fire.timeout_s)
        .map_err(|e| eyre::eyre!("fire.timeout_s: {e}"))?;

    let mut launcher = backend::connect(&cfg, stop)?;
    let json = cli.json;
    let result = match cli.cmd {
        Commands::Run => match launcher_ui::LineConsole::stdio() {
            Ok(ui) => {
                let mut session = console::Session::new(launcher, ui, fire_timeout);
                let mut bindings = console::default_bindings(&cfg.presets);
                let result = console::run(&mut session, &mut bindings);
                launcher = session.into_launcher();
                result
            }
            Err(e) => Err(eyre::Report::new(e).wrap_err("starting console input")),
        },
        Commands::Calibrate => commands::calibrate(&mut launcher, json),
        Commands::Home => commands::home(&mut launcher, json),
        Commands::MoveAbs { theta, phi } => commands::move_abs(&mut launcher, theta, phi, json),
        Commands::MoveRel { dtheta, dphi } => {
            commands::move_rel(&mut launcher, dtheta, dphi, json)
        }
        Commands::Fire { timeout } => commands::fire(&mut launcher, timeout, json),
        Commands::Status => commands::status(&mut launcher, json),
        Commands::SelfCheck => commands::self_check(&mut launcher, json),
    };

    let closed = launcher.disconnect();
    result?;
    closed.map(|_| ())
}
