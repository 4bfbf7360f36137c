//! Outcomes and observable state of the controller.

use crate::axis::{Axis, AxisBounds, AxisSpeed, Direction, PositionEstimate};
use crate::protocol::{Command, Status};

/// How a timed move ended. Either way the device has been sent `STOP`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The requested duration ran out (or nothing needed to move).
    Elapsed,
    /// The limit switch cleared the motion bit first.
    LimitReached,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FireOutcome {
    /// The firing bit cleared on its own.
    Completed,
    /// The timeout elapsed first; `STOP` was sent.
    TimedOut,
}

/// What the controller is currently driving, derived from the current command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activity {
    Idle,
    Moving(Axis, Direction),
    Firing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CalibrationState {
    #[default]
    Uncalibrated,
    Calibrating,
    Calibrated,
}

/// Copy of the controller state for readers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Snapshot {
    pub command: Command,
    pub status: Status,
    pub activity: Activity,
    pub calibration: CalibrationState,
    pub theta: Option<f64>,
    pub phi: Option<f64>,
    pub theta_bounds: Option<AxisBounds>,
    pub phi_bounds: Option<AxisBounds>,
    pub theta_speed: Option<AxisSpeed>,
    pub phi_speed: Option<AxisSpeed>,
}

impl Snapshot {
    pub fn position(&self) -> Option<PositionEstimate> {
        Some(PositionEstimate {
            theta: self.theta?,
            phi: self.phi?,
        })
    }
}
