#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Core launcher motion control (hardware-agnostic).
//!
//! All device I/O goes through `launcher_traits::Transport`; time goes
//! through `launcher_traits::Clock`.
//!
//! ## Architecture
//!
//! - **Protocol**: one byte, same bits for commands and status (`protocol`)
//! - **Estimator**: open-loop dead reckoning, snapped at limit switches (`estimator`)
//! - **Controller**: polling, blocking moves, firing (`controller`)
//! - **Calibration**: end-to-end traversal timing (`calibration`)
//! - **Dispatch**: key-triggered deferred actions (`dispatch`)
//!
//! The launcher has no position sensor. The only ground truth is a limit
//! switch clearing the active motion bit; between those events the estimate
//! is `elapsed * speed`, clamped to the axis bounds.

pub mod axis;
pub mod builder;
pub mod calibration;
pub mod config;
pub mod controller;
pub mod conversions;
pub mod dispatch;
pub mod error;
pub mod estimator;
pub mod hw_error;
pub mod protocol;
pub mod status;

pub use axis::{Axis, AxisBounds, AxisSpeed, Direction, PositionEstimate};
pub use builder::LauncherBuilder;
pub use calibration::{AxisCalibration, CalibrationReport};
pub use config::{LimitsCfg, TimingCfg};
pub use controller::Launcher;
pub use dispatch::{ActionOutcome, Binding, Dispatcher};
pub use error::{BuildError, LauncherError, Result};
pub use estimator::{AxisTrack, Estimator, Observation};
pub use protocol::{Command, DeviceStatus, Status};
pub use status::{Activity, CalibrationState, FireOutcome, MoveOutcome, Snapshot};
