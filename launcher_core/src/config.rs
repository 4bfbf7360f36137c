//! Controller-side configuration, independent of the TOML schema.

use std::time::Duration;

use crate::axis::{Axis, AxisBounds};

/// Polling cadence and watchdog of blocking operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimingCfg {
    /// Sleep between status polls
    pub poll: Duration,
    /// Upper bound on any single blocking wait
    pub max_motion: Duration,
}

impl Default for TimingCfg {
    fn default() -> Self {
        Self {
            poll: Duration::from_millis(10),
            max_motion: Duration::from_secs(60),
        }
    }
}

/// Hardware travel limits of both axes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LimitsCfg {
    pub theta: AxisBounds,
    pub phi: AxisBounds,
}

impl LimitsCfg {
    pub fn get(&self, axis: Axis) -> AxisBounds {
        match axis {
            Axis::Theta => self.theta,
            Axis::Phi => self.phi,
        }
    }
}

impl Default for LimitsCfg {
    fn default() -> Self {
        Self {
            theta: AxisBounds { min: 0.0, max: 135.0 },
            phi: AxisBounds { min: 0.0, max: 340.0 },
        }
    }
}
