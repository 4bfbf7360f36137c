//! The motion controller: status polling, dead reckoning and blocking moves.

use std::fmt::Write as _;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use eyre::WrapErr;
use launcher_traits::{Clock, Transport};
use tracing::{debug, info, trace, warn};

use crate::axis::{Axis, AxisSpeed, Direction, PositionEstimate};
use crate::config::{LimitsCfg, TimingCfg};
use crate::error::{LauncherError, Report, Result};
use crate::estimator::{AxisTrack, Estimator, Observation};
use crate::hw_error::map_hw_error;
use crate::protocol::{Command, DeviceStatus, Status};
use crate::status::{Activity, CalibrationState, FireOutcome, MoveOutcome, Snapshot};

/// Lift a transport error into a typed report.
fn lift(e: Box<dyn std::error::Error + Send + Sync>) -> Report {
    Report::new(map_hw_error(&*e))
}

/// A connected launcher.
///
/// Produced by [`crate::LauncherBuilder::connect`]; [`Launcher::disconnect`]
/// consumes it and closes the transport.
pub struct Launcher<T: Transport> {
    pub(crate) transport: T,
    pub(crate) clock: Arc<dyn Clock + Send + Sync>,
    pub(crate) stop: Arc<AtomicBool>,
    pub(crate) timing: TimingCfg,
    pub(crate) limits: LimitsCfg,
    pub(crate) estimator: Estimator,
    pub(crate) current: Command,
    pub(crate) last_status: Status,
    pub(crate) last_update: Instant,
    pub(crate) op_start: Instant,
    pub(crate) calibration: CalibrationState,
}

impl<T: Transport> core::fmt::Debug for Launcher<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Launcher")
            .field("current", &self.current)
            .field("last_status", &self.last_status)
            .field("calibration", &self.calibration)
            .field("estimator", &self.estimator)
            .finish_non_exhaustive()
    }
}

impl<T: Transport> Launcher<T> {
    pub(crate) fn from_parts(
        transport: T,
        clock: Arc<dyn Clock + Send + Sync>,
        stop: Arc<AtomicBool>,
        timing: TimingCfg,
        limits: LimitsCfg,
        estimator: Estimator,
    ) -> Self {
        let now = clock.now();
        Self {
            transport,
            clock,
            stop,
            timing,
            limits,
            estimator,
            current: Command::NONE,
            last_status: Status::IDLE,
            last_update: now,
            op_start: now,
            calibration: CalibrationState::Uncalibrated,
        }
    }

    // ── Non-blocking primitives ──────────────────────────────────────────────

    fn send(&mut self, cmd: Command) -> Result<()> {
        trace!(%cmd, "send");
        self.transport
            .send_command(cmd.to_byte())
            .map_err(lift)
            .wrap_err_with(|| format!("sending {cmd}"))
    }

    /// Request and read one status byte, then fold it into the estimate.
    pub fn update_status(&mut self) -> Result<Status> {
        self.send(Command::STATUS_REQUEST)?;
        let byte = self
            .transport
            .read_status()
            .map_err(lift)
            .wrap_err("reading status")?;
        let latest = Status::from_byte(byte);
        let now = self.clock.now();
        let elapsed = now.saturating_duration_since(self.last_update).as_secs_f64();
        match self
            .estimator
            .observe(self.current, self.last_status, latest, elapsed)
        {
            Observation::LimitReached(axis, dir) => {
                debug!(%axis, ?dir, position = ?self.estimator.track(axis).position, "limit reached");
            }
            Observation::Advanced(axis, _) => {
                trace!(%axis, position = ?self.estimator.track(axis).position, "advanced");
            }
            Observation::Idle => {}
        }
        self.last_status = latest;
        self.last_update = now;
        Ok(latest)
    }

    /// Dead-reckon the active motion up to now.
    fn settle(&mut self) {
        let Some((axis, dir)) = self.current.motion_parts() else {
            return;
        };
        if !self.last_status.contains(self.current.bits()) {
            return;
        }
        let now = self.clock.now();
        let elapsed = now.saturating_duration_since(self.last_update).as_secs_f64();
        self.estimator.advance(axis, dir, elapsed);
        self.last_update = now;
    }

    /// Send `cmd` and make it the command in force. `STOP` halts everything.
    pub fn move_cmd(&mut self, cmd: Command) -> Result<()> {
        self.settle();
        self.send(cmd)?;
        let now = self.clock.now();
        self.current = cmd;
        self.last_status = Status::expected_after(cmd);
        self.last_update = now;
        self.op_start = now;
        debug!(%cmd, "command in force");
        Ok(())
    }

    /// Send `STOP`, logging instead of failing.
    fn stop_best_effort(&mut self, why: &str) {
        if let Err(e) = self.move_cmd(Command::STOP) {
            warn!(error = %e, "stop failed on {why}");
        }
    }

    fn check_stop(&mut self) -> Result<()> {
        if self.stop.load(Ordering::Relaxed) {
            self.stop_best_effort("cancel");
            info!("operation cancelled");
            return Err(Report::new(LauncherError::Cancelled));
        }
        Ok(())
    }

    /// Poll once; a transport failure stops the device before propagating.
    fn poll_or_stop(&mut self) -> Result<Status> {
        match self.update_status() {
            Ok(s) => Ok(s),
            Err(e) => {
                self.stop_best_effort("transport error");
                Err(e)
            }
        }
    }

    // ── Blocking primitives ──────────────────────────────────────────────────

    /// Poll until `bit` is absent from the device status.
    pub fn wait(&mut self, bit: DeviceStatus) -> Result<()> {
        let started = self.clock.now();
        loop {
            self.check_stop()?;
            if !self.poll_or_stop()?.contains(bit) {
                return Ok(());
            }
            let waited = self.clock.now().saturating_duration_since(started);
            if waited >= self.timing.max_motion {
                self.stop_best_effort("motion timeout");
                warn!(%bit, ?waited, "wait exceeded max_motion");
                return Err(Report::new(LauncherError::MotionTimeout(self.timing.max_motion)));
            }
            self.clock.sleep(self.timing.poll);
        }
    }

    /// Drive towards a limit switch until it trips, then `STOP`.
    ///
    /// Returns the time from the command to the poll that saw the limit.
    pub fn move_home(&mut self, cmd: Command) -> Result<Duration> {
        if cmd.motion_parts().is_none() {
            return Err(Report::new(LauncherError::InvalidArgument(format!(
                "{cmd} is not a motion command"
            ))));
        }
        info!(%cmd, "move to limit");
        self.move_cmd(cmd)?;
        self.wait(cmd.bits())?;
        let took = self.last_update.saturating_duration_since(self.op_start);
        self.move_cmd(Command::STOP)?;
        Ok(took)
    }

    /// Run `cmd` for `duration`, or until its limit trips, then `STOP`.
    pub fn move_timed(&mut self, cmd: Command, duration: Duration) -> Result<MoveOutcome> {
        debug!(%cmd, ?duration, "timed move");
        self.move_cmd(cmd)?;
        let deadline = self.op_start + duration;
        let bit = cmd.bits() & DeviceStatus::MOTION;
        let outcome = loop {
            self.check_stop()?;
            let status = self.poll_or_stop()?;
            if !bit.is_empty() && !status.contains(bit) {
                warn!(%cmd, "limit reached before the timed move finished");
                break MoveOutcome::LimitReached;
            }
            let now = self.clock.now();
            if now >= deadline {
                break MoveOutcome::Elapsed;
            }
            self.clock.sleep(self.timing.poll.min(deadline - now));
        };
        self.move_cmd(Command::STOP)?;
        Ok(outcome)
    }

    /// Move by the given angles, theta first, then phi.
    pub fn move_rel(&mut self, dtheta: f64, dphi: f64) -> Result<MoveOutcome> {
        if !(dtheta.is_finite() && dphi.is_finite()) {
            return Err(Report::new(LauncherError::InvalidArgument(format!(
                "relative move ({dtheta}, {dphi}) must be finite"
            ))));
        }

        // Plan both axes before any I/O so a refusal sends nothing.
        let mut plan = Vec::with_capacity(2);
        for (axis, delta) in [(Axis::Theta, dtheta), (Axis::Phi, dphi)] {
            let Some(dir) = Direction::of(delta) else {
                continue;
            };
            let track = self.estimator.track(axis);
            let speed = match (track.speed, track.position) {
                (Some(s), Some(_)) if s.is_valid() => s.for_direction(dir),
                _ => {
                    warn!(%axis, "relative move refused: axis not calibrated");
                    return Err(Report::new(LauncherError::Uncalibrated));
                }
            };
            let secs = delta.abs() / speed;
            let duration = Duration::try_from_secs_f64(secs).map_err(|e| {
                Report::new(LauncherError::InvalidArgument(format!(
                    "{axis} move of {secs} s: {e}"
                )))
            })?;
            plan.push((Command::motion(axis, dir), duration));
        }

        info!(dtheta, dphi, "relative move");
        let mut outcome = MoveOutcome::Elapsed;
        for (cmd, duration) in plan {
            if self.move_timed(cmd, duration)? == MoveOutcome::LimitReached {
                outcome = MoveOutcome::LimitReached;
            }
        }
        Ok(outcome)
    }

    /// Move to absolute angles; needs a calibrated launcher.
    pub fn move_abs(&mut self, theta: f64, phi: f64) -> Result<MoveOutcome> {
        if !(theta.is_finite() && phi.is_finite()) {
            return Err(Report::new(LauncherError::InvalidArgument(format!(
                "target ({theta}, {phi}) must be finite"
            ))));
        }
        let Some(pos) = self.position().filter(|_| self.estimator.is_calibrated()) else {
            warn!("absolute move refused: not calibrated");
            return Err(Report::new(LauncherError::Uncalibrated));
        };
        for (axis, target) in [(Axis::Theta, theta), (Axis::Phi, phi)] {
            if let Some(b) = self.estimator.track(axis).bounds
                && !b.contains(target)
            {
                return Err(Report::new(LauncherError::OutOfBounds {
                    axis,
                    target,
                    min: b.min,
                    max: b.max,
                }));
            }
        }
        info!(theta, phi, "absolute move");
        self.move_rel(theta - pos.theta, phi - pos.phi)
    }

    /// Fire once and wait for the mechanism to finish its cycle.
    pub fn fire(&mut self) -> Result<()> {
        info!("fire");
        self.move_cmd(Command::FIRE)?;
        self.wait(DeviceStatus::FIRE)?;
        self.move_cmd(Command::STOP)
    }

    /// Fire, giving up after `timeout`. `STOP` is sent either way.
    pub fn fire_timeout(&mut self, timeout: Duration) -> Result<FireOutcome> {
        info!(?timeout, "fire with timeout");
        self.move_cmd(Command::FIRE)?;
        let deadline = self.op_start + timeout;
        let outcome = loop {
            self.check_stop()?;
            if !self.poll_or_stop()?.contains(DeviceStatus::FIRE) {
                break FireOutcome::Completed;
            }
            let now = self.clock.now();
            if now >= deadline {
                break FireOutcome::TimedOut;
            }
            self.clock.sleep(self.timing.poll.min(deadline - now));
        };
        self.move_cmd(Command::STOP)?;
        debug!(?outcome, "fire finished");
        Ok(outcome)
    }

    /// Drive to the up and right limits, establishing `(theta_min, phi_min)`.
    pub fn go_home(&mut self) -> Result<()> {
        info!("go home");
        for axis in Axis::ALL {
            self.estimator.set_bounds(axis, self.limits.get(axis));
        }
        self.move_home(Command::UP).wrap_err("homing theta")?;
        self.move_home(Command::RIGHT).wrap_err("homing phi")?;
        if self.estimator.is_calibrated() {
            self.calibration = CalibrationState::Calibrated;
        }
        Ok(())
    }

    // ── Stop flag ────────────────────────────────────────────────────────────

    pub fn request_stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    /// Re-arm after a cancellation.
    pub fn clear_stop(&self) {
        self.stop.store(false, Ordering::Relaxed);
    }

    pub fn stop_requested(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
    }

    /// Shared flag; setting it from anywhere cancels the blocking operation.
    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    // ── State ────────────────────────────────────────────────────────────────

    /// Supply speeds measured elsewhere. Positions still come from a limit.
    pub fn set_speeds(&mut self, theta: AxisSpeed, phi: AxisSpeed) -> Result<()> {
        for (axis, s) in [(Axis::Theta, theta), (Axis::Phi, phi)] {
            if !s.is_valid() {
                return Err(Report::new(LauncherError::InvalidArgument(format!(
                    "{axis} speeds must be finite and > 0"
                ))));
            }
        }
        self.estimator.set_speed(Axis::Theta, Some(theta));
        self.estimator.set_speed(Axis::Phi, Some(phi));
        if self.estimator.is_calibrated() {
            self.calibration = CalibrationState::Calibrated;
        }
        Ok(())
    }

    pub fn position(&self) -> Option<PositionEstimate> {
        self.estimator.position()
    }

    pub fn track(&self, axis: Axis) -> AxisTrack {
        *self.estimator.track(axis)
    }

    pub fn limits(&self) -> LimitsCfg {
        self.limits
    }

    pub fn current_command(&self) -> Command {
        self.current
    }

    pub fn last_status(&self) -> Status {
        self.last_status
    }

    pub fn activity(&self) -> Activity {
        if !self.last_status.contains(self.current.bits()) || self.current == Command::NONE {
            return Activity::Idle;
        }
        match self.current.motion_parts() {
            Some((axis, dir)) => Activity::Moving(axis, dir),
            None if self.current == Command::FIRE => Activity::Firing,
            None => Activity::Idle,
        }
    }

    pub fn calibration_state(&self) -> CalibrationState {
        self.calibration
    }

    pub fn is_calibrated(&self) -> bool {
        self.estimator.is_calibrated()
    }

    pub fn snapshot(&self) -> Snapshot {
        let theta = self.estimator.track(Axis::Theta);
        let phi = self.estimator.track(Axis::Phi);
        Snapshot {
            command: self.current,
            status: self.last_status,
            activity: self.activity(),
            calibration: self.calibration,
            theta: theta.position,
            phi: phi.position,
            theta_bounds: theta.bounds,
            phi_bounds: phi.bounds,
            theta_speed: theta.speed,
            phi_speed: phi.speed,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    // ── Reports ──────────────────────────────────────────────────────────────

    /// Position and bounds, one axis per line.
    pub fn describe_position(&self) -> String {
        let mut out = String::new();
        for axis in Axis::ALL {
            let t = self.estimator.track(axis);
            let pos = t
                .position
                .map_or_else(|| "unknown".to_string(), |p| format!("{p:7.2}"));
            let bounds = t
                .bounds
                .map_or_else(|| "unset".to_string(), |b| format!("[{:.2}, {:.2}]", b.min, b.max));
            let _ = writeln!(out, "{:<5} {pos} deg  bounds {bounds}", axis.name());
        }
        let _ = write!(out, "state {:?}, {:?}", self.calibration, self.activity());
        out
    }

    /// Speeds, traversal times and polling parameters.
    pub fn describe_motion(&self) -> String {
        let mut out = String::new();
        for axis in Axis::ALL {
            let t = self.estimator.track(axis);
            match (t.speed, t.bounds) {
                (Some(s), Some(b)) => {
                    let _ = writeln!(
                        out,
                        "{:<5} +{:.3} / -{:.3} deg/s  traversal +{:.3} / -{:.3} s",
                        axis.name(),
                        s.positive,
                        s.negative,
                        b.range() / s.positive,
                        b.range() / s.negative,
                    );
                }
                (Some(s), None) => {
                    let _ = writeln!(
                        out,
                        "{:<5} +{:.3} / -{:.3} deg/s",
                        axis.name(),
                        s.positive,
                        s.negative
                    );
                }
                (None, _) => {
                    let _ = writeln!(out, "{:<5} speed not measured", axis.name());
                }
            }
        }
        let _ = write!(
            out,
            "poll {} ms, max motion {} ms",
            self.timing.poll.as_millis(),
            self.timing.max_motion.as_millis()
        );
        out
    }

    /// Stop the device (best-effort) and close the transport.
    pub fn disconnect(mut self) -> Result<T> {
        self.stop_best_effort("disconnect");
        self.transport
            .close()
            .map_err(lift)
            .wrap_err("closing transport")?;
        info!("disconnected");
        Ok(self.transport)
    }
}
