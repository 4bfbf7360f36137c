use std::time::Duration;

use thiserror::Error;

use crate::axis::Axis;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum LauncherError {
    #[error("transport unavailable: {0}")]
    TransportUnavailable(String),
    #[error("protocol timeout")]
    ProtocolTimeout,
    #[error("hardware error: {0}")]
    Hardware(String),
    #[error("launcher is not calibrated")]
    Uncalibrated,
    #[error("{axis} target {target:.2} outside [{min:.2}, {max:.2}]")]
    OutOfBounds {
        axis: Axis,
        target: f64,
        min: f64,
        max: f64,
    },
    #[error("cancelled by stop request")]
    Cancelled,
    #[error("motion did not finish within {0:?}")]
    MotionTimeout(Duration),
    #[error("calibration failed: {0}")]
    CalibrationFailed(String),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

#[derive(Debug, Error, Clone)]
pub enum BuildError {
    #[error("missing transport")]
    MissingTransport,
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
