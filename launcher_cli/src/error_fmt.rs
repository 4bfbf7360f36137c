//! Human-readable error descriptions and structured JSON error formatting.

use launcher_core::error::{BuildError, LauncherError};

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    // Typed matches first
    if let Some(be) = err.downcast_ref::<BuildError>() {
        return match be {
            BuildError::MissingTransport => {
                "What happened: No device transport was provided to the controller.\nLikely causes: The backend failed to initialize or was not wired into the builder.\nHow to fix: Ensure the transport is created and passed via with_transport(...).".to_string()
            }
            BuildError::InvalidConfig(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: Missing or out-of-range values in the TOML.\nHow to fix: Edit the config file, then rerun. See etc/launcher.toml for a sample."
            ),
        };
    }

    if let Some(le) = err.downcast_ref::<LauncherError>() {
        return match le {
            LauncherError::TransportUnavailable(msg) => format!(
                "What happened: The launcher could not be opened ({msg}).\nLikely causes: Device unplugged, wrong vendor/product id, or no permission to access USB.\nHow to fix: Check the cable and [device] ids in the config; add a udev rule or run with sufficient privileges."
            ),
            LauncherError::ProtocolTimeout => {
                "What happened: A USB transfer timed out.\nLikely causes: Device stopped responding or transfer_timeout_ms is too low.\nHow to fix: Replug the launcher and consider raising device.transfer_timeout_ms in the config.".to_string()
            }
            LauncherError::Hardware(msg) => format!(
                "What happened: The device reported an error ({msg}).\nLikely causes: Unsupported firmware or a flaky connection.\nHow to fix: Replug the launcher and re-run with --log-level=debug."
            ),
            LauncherError::Uncalibrated => {
                "What happened: The move was refused because the launcher is not calibrated.\nLikely causes: Speeds were never measured or the position is unknown.\nHow to fix: Run `launcher calibrate` (key `c`), or configure [traversal] times and home first (key `h`).".to_string()
            }
            LauncherError::OutOfBounds { axis, target, min, max } => format!(
                "What happened: {axis} target {target:.2} is outside the axis limits [{min:.2}, {max:.2}].\nLikely causes: Typo in the target or limits configured too narrow.\nHow to fix: Pick a target within the limits or adjust [limits.{axis}]."
            ),
            LauncherError::Cancelled => {
                "What happened: Stop was requested; the launcher has been stopped.\nLikely causes: Ctrl-C was pressed.\nHow to fix: Start the operation again.".to_string()
            }
            LauncherError::MotionTimeout(limit) => format!(
                "What happened: Motion did not finish within {limit:?}; the launcher has been stopped.\nLikely causes: A limit switch did not trip, or the axis is jammed.\nHow to fix: Check the mechanics; raise timing.max_motion_ms if the axis is just slow."
            ),
            LauncherError::CalibrationFailed(msg) => format!(
                "What happened: Calibration failed ({msg}).\nLikely causes: The axis did not move, or started pinned at both limits.\nHow to fix: Check that both axes move freely, then calibrate again."
            ),
            LauncherError::InvalidArgument(msg) => format!(
                "What happened: Invalid argument ({msg}).\nLikely causes: Non-numeric or non-finite input.\nHow to fix: Pass finite numbers in degrees."
            ),
        };
    }

    // String-based heuristics for errors coming from init or config
    let msg = err.to_string();
    let lower = msg.to_ascii_lowercase();

    if lower.contains("read config") {
        return format!(
            "What happened: The config file could not be read ({msg}).\nLikely causes: Wrong --config path or missing permissions.\nHow to fix: Pass --config pointing at a readable TOML file."
        );
    }

    if lower.contains("parse config") || lower.contains(" must be ") {
        return format!(
            "What happened: Configuration is invalid or incomplete ({msg}).\nLikely causes: Missing [limits] or out-of-range values.\nHow to fix: Edit the TOML config and try again."
        );
    }

    // Generic fallback
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Error: {msg}"
    )
}

/// Stable name of the error kind for structured output.
pub fn reason_name(err: &eyre::Report) -> &'static str {
    if err.downcast_ref::<BuildError>().is_some() {
        return "InvalidConfig";
    }
    match err.downcast_ref::<LauncherError>() {
        Some(LauncherError::TransportUnavailable(_)) => "TransportUnavailable",
        Some(LauncherError::ProtocolTimeout) => "ProtocolTimeout",
        Some(LauncherError::Hardware(_)) => "Hardware",
        Some(LauncherError::Uncalibrated) => "Uncalibrated",
        Some(LauncherError::OutOfBounds { .. }) => "OutOfBounds",
        Some(LauncherError::Cancelled) => "Cancelled",
        Some(LauncherError::MotionTimeout(_)) => "MotionTimeout",
        Some(LauncherError::CalibrationFailed(_)) => "CalibrationFailed",
        Some(LauncherError::InvalidArgument(_)) => "InvalidArgument",
        None => "Error",
    }
}

/// Stable exit codes per error kind; anything unclassified returns 1.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    match err.downcast_ref::<LauncherError>() {
        Some(LauncherError::Cancelled) => 2,
        Some(LauncherError::MotionTimeout(_)) => 3,
        Some(LauncherError::Uncalibrated) => 4,
        Some(LauncherError::OutOfBounds { .. }) => 5,
        Some(
            LauncherError::TransportUnavailable(_)
            | LauncherError::ProtocolTimeout
            | LauncherError::Hardware(_),
        ) => 6,
        _ => 1,
    }
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    use serde_json::json;

    let msg = humanize(err);
    let details = match err.downcast_ref::<LauncherError>() {
        Some(LauncherError::OutOfBounds { axis, target, min, max }) => Some(json!({
            "axis": axis.name(), "target": target, "min": min, "max": max
        })),
        Some(LauncherError::MotionTimeout(limit)) => {
            Some(json!({ "max_motion_ms": u64::try_from(limit.as_millis()).unwrap_or(u64::MAX) }))
        }
        _ => None,
    };
    let reason = reason_name(err);
    match details {
        Some(d) => json!({ "reason": reason, "details": d, "message": msg }),
        None => json!({ "reason": reason, "message": msg }),
    }
    .to_string()
}
