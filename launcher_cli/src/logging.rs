//! Tracing setup: console layer on stderr plus an optional JSON file sink.

use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, fmt};

use crate::cli::FILE_GUARD;

/// Console filter: `RUST_LOG` when set, else the `--log-level` flag.
fn console_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

fn file_appender(
    file: &str,
    rotation: Option<&str>,
) -> eyre::Result<tracing_appender::rolling::RollingFileAppender> {
    let path = Path::new(file);
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let name = path
        .file_name()
        .ok_or_else(|| eyre::eyre!("logging.file {file:?} has no file name"))?;
    Ok(match rotation.unwrap_or("never") {
        "never" => tracing_appender::rolling::never(dir, name),
        "daily" => tracing_appender::rolling::daily(dir, name),
        "hourly" => tracing_appender::rolling::hourly(dir, name),
        other => eyre::bail!("logging.rotation must be never|daily|hourly, got {other:?}"),
    })
}

/// Install the global subscriber. Logs never go to stdout.
pub fn init_tracing(
    json: bool,
    level: &str,
    logging: Option<&launcher_config::Logging>,
) -> eyre::Result<()> {
    let pretty = (!json).then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_filter(console_filter(level))
    });
    let json_console = json.then(|| {
        fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_filter(console_filter(level))
    });

    let file = match logging.and_then(|l| l.file.as_deref().map(|f| (l, f))) {
        Some((l, f)) => {
            let (writer, guard) = tracing_appender::non_blocking(file_appender(f, l.rotation.as_deref())?);
            let _ = FILE_GUARD.set(Mutex::new(Some(guard)));
            Some(
                fmt::layer()
                    .json()
                    .with_ansi(false)
                    .with_writer(writer)
                    .with_filter(EnvFilter::new(l.level.as_deref().unwrap_or("info"))),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(pretty)
        .with(json_console)
        .with(file)
        .try_init()
        .map_err(|e| eyre::eyre!("installing tracing subscriber: {e}"))
}

/// Flush the file sink; later events are dropped.
pub fn flush() {
    if let Some(slot) = FILE_GUARD.get()
        && let Ok(mut guard) = slot.lock()
    {
        drop(guard.take());
    }
}
