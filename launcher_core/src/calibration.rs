//! End-to-end speed calibration.
//!
//! Axis limits are hardware constants; calibration measures how long each
//! axis takes to cross its full range in each direction and derives the
//! speed as `range / time`. The launcher finishes in the home corner.

use std::time::Duration;

use eyre::WrapErr;
use launcher_traits::Transport;
use tracing::{error, info};

use crate::axis::{Axis, AxisSpeed, Direction};
use crate::controller::Launcher;
use crate::error::{LauncherError, Report, Result};
use crate::protocol::Command;
use crate::status::CalibrationState;

/// Measured traversal of one axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisCalibration {
    pub axis: Axis,
    /// Seconds from min to max
    pub positive_s: f64,
    /// Seconds from max to min
    pub negative_s: f64,
    pub speed: AxisSpeed,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationReport {
    pub theta: AxisCalibration,
    pub phi: AxisCalibration,
}

fn traversal_secs(axis: Axis, dir: Direction, took: Duration) -> Result<f64> {
    let secs = took.as_secs_f64();
    if secs > 0.0 {
        Ok(secs)
    } else {
        Err(Report::new(LauncherError::CalibrationFailed(format!(
            "{axis} traversal towards {dir:?} took no time"
        ))))
    }
}

impl<T: Transport> Launcher<T> {
    /// Measure both axes, theta first. Ends at `(theta_min, phi_min)`.
    pub fn calibrate(&mut self) -> Result<CalibrationReport> {
        info!("calibration started");
        self.calibration = CalibrationState::Calibrating;
        let result = self
            .calibrate_axis(Axis::Theta)
            .and_then(|theta| Ok((theta, self.calibrate_axis(Axis::Phi)?)));
        match result {
            Ok((theta, phi)) => {
                self.calibration = CalibrationState::Calibrated;
                info!(
                    theta_pos = theta.speed.positive,
                    theta_neg = theta.speed.negative,
                    phi_pos = phi.speed.positive,
                    phi_neg = phi.speed.negative,
                    "calibration complete"
                );
                Ok(CalibrationReport { theta, phi })
            }
            Err(e) => {
                self.calibration = CalibrationState::Uncalibrated;
                error!(error = %e, "calibration aborted");
                Err(e)
            }
        }
    }

    fn calibrate_axis(&mut self, axis: Axis) -> Result<AxisCalibration> {
        let bounds = self.limits.get(axis);
        self.estimator.reset_axis(axis, bounds);
        let towards = |dir| Command::motion(axis, dir);

        self.move_home(towards(Direction::Negative))
            .wrap_err_with(|| format!("homing {axis}"))?;
        let positive_s = traversal_secs(
            axis,
            Direction::Positive,
            self.move_home(towards(Direction::Positive))
                .wrap_err_with(|| format!("{axis} positive traversal"))?,
        )?;
        let negative_s = traversal_secs(
            axis,
            Direction::Negative,
            self.move_home(towards(Direction::Negative))
                .wrap_err_with(|| format!("{axis} negative traversal"))?,
        )?;

        let speed = AxisSpeed::new(bounds.range() / positive_s, bounds.range() / negative_s)
            .map_err(|e| Report::new(LauncherError::CalibrationFailed(e.to_string())))?;
        self.estimator.set_speed(axis, Some(speed));
        info!(%axis, positive_s, negative_s, "axis calibrated");
        Ok(AxisCalibration {
            axis,
            positive_s,
            negative_s,
            speed,
        })
    }
}
