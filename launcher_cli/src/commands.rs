//! One-shot subcommands.

use std::time::Duration;

use launcher_core::error::LauncherError;
use launcher_core::{Launcher, MoveOutcome, PositionEstimate, Result};
use launcher_traits::Transport;
use serde_json::json;
use tracing::info;

use crate::console::format_report;

/// Print `value` as JSON or `text` for humans.
fn emit(json: bool, value: serde_json::Value, text: &str) {
    if json {
        println!("{value}");
    } else {
        println!("{text}");
    }
}

fn position_json(p: Option<PositionEstimate>) -> serde_json::Value {
    match p {
        Some(p) => json!({ "theta": p.theta, "phi": p.phi }),
        None => json!(null),
    }
}

/// Home when speeds are known, else run a full calibration.
pub fn ensure_calibrated<T: Transport>(l: &mut Launcher<T>) -> Result<()> {
    if l.is_calibrated() {
        return Ok(());
    }
    let speeds_known = l.track(launcher_core::Axis::Theta).speed.is_some()
        && l.track(launcher_core::Axis::Phi).speed.is_some();
    if speeds_known {
        info!("speeds configured, homing");
        l.go_home()
    } else {
        info!("no speeds configured, calibrating");
        l.calibrate().map(|_| ())
    }
}

pub fn calibrate<T: Transport>(l: &mut Launcher<T>, json: bool) -> Result<()> {
    let r = l.calibrate()?;
    let value = json!({
        "theta": { "positive_s": r.theta.positive_s, "negative_s": r.theta.negative_s,
                   "speed_pos": r.theta.speed.positive, "speed_neg": r.theta.speed.negative },
        "phi": { "positive_s": r.phi.positive_s, "negative_s": r.phi.negative_s,
                 "speed_pos": r.phi.speed.positive, "speed_neg": r.phi.speed.negative },
    });
    emit(json, value, &format_report(&r));
    Ok(())
}

pub fn home<T: Transport>(l: &mut Launcher<T>, json: bool) -> Result<()> {
    l.go_home()?;
    emit(json, json!({ "position": position_json(l.position()) }), &l.describe_position());
    Ok(())
}

fn report_move<T: Transport>(l: &Launcher<T>, outcome: MoveOutcome, json: bool) {
    let limit = outcome == MoveOutcome::LimitReached;
    emit(
        json,
        json!({ "limit_reached": limit, "position": position_json(l.position()) }),
        &l.describe_position(),
    );
}

pub fn move_abs<T: Transport>(l: &mut Launcher<T>, theta: f64, phi: f64, json: bool) -> Result<()> {
    // Reject out-of-range targets before spending time on calibration.
    let limits = l.limits();
    for (axis, b, v) in [
        (launcher_core::Axis::Theta, limits.theta, theta),
        (launcher_core::Axis::Phi, limits.phi, phi),
    ] {
        if v.is_finite() && !b.contains(v) {
            return Err(eyre::Report::new(LauncherError::OutOfBounds {
                axis,
                target: v,
                min: b.min,
                max: b.max,
            }));
        }
    }
    ensure_calibrated(l)?;
    let outcome = l.move_abs(theta, phi)?;
    report_move(l, outcome, json);
    Ok(())
}

pub fn move_rel<T: Transport>(l: &mut Launcher<T>, dtheta: f64, dphi: f64, json: bool) -> Result<()> {
    ensure_calibrated(l)?;
    let outcome = l.move_rel(dtheta, dphi)?;
    report_move(l, outcome, json);
    Ok(())
}

pub fn fire<T: Transport>(l: &mut Launcher<T>, timeout: Option<f64>, json: bool) -> Result<()> {
    let outcome = match timeout {
        Some(secs) => {
            let t = Duration::try_from_secs_f64(secs).map_err(|e| {
                eyre::Report::new(LauncherError::InvalidArgument(format!("--timeout {secs}: {e}")))
            })?;
            l.fire_timeout(t)?
        }
        None => {
            l.fire()?;
            launcher_core::FireOutcome::Completed
        }
    };
    emit(json, json!({ "fire": format!("{outcome:?}") }), &format!("fire: {outcome:?}"));
    Ok(())
}

pub fn status<T: Transport>(l: &mut Launcher<T>, json: bool) -> Result<()> {
    let s = l.update_status()?;
    emit(
        json,
        json!({ "status": s.to_string(), "byte": s.bits().bits(), "idle": s.is_idle() }),
        &format!("status: {s}"),
    );
    Ok(())
}

pub fn self_check<T: Transport>(l: &mut Launcher<T>, json: bool) -> Result<()> {
    let s = l.update_status()?;
    info!(status = %s, "self-check");
    emit(json, json!({ "ok": true, "status": s.to_string() }), "OK");
    Ok(())
}
