//! Conversions from `launcher_config` types to `launcher_core` types.

use std::time::Duration;

use crate::axis::{AxisBounds, AxisSpeed};
use crate::config::{LimitsCfg, TimingCfg};
use crate::error::LauncherError;

// ── TimingCfg ────────────────────────────────────────────────────────────────

impl From<&launcher_config::Timing> for TimingCfg {
    fn from(c: &launcher_config::Timing) -> Self {
        Self {
            poll: Duration::from_millis(c.poll_ms),
            max_motion: Duration::from_millis(c.max_motion_ms),
        }
    }
}

// ── LimitsCfg ────────────────────────────────────────────────────────────────

impl TryFrom<&launcher_config::AxisLimits> for AxisBounds {
    type Error = LauncherError;

    fn try_from(c: &launcher_config::AxisLimits) -> Result<Self, Self::Error> {
        AxisBounds::new(c.min, c.max)
    }
}

impl TryFrom<&launcher_config::Limits> for LimitsCfg {
    type Error = LauncherError;

    fn try_from(c: &launcher_config::Limits) -> Result<Self, Self::Error> {
        Ok(Self {
            theta: AxisBounds::try_from(&c.theta)?,
            phi: AxisBounds::try_from(&c.phi)?,
        })
    }
}

// ── Traversal ────────────────────────────────────────────────────────────────

/// Per-axis speeds (theta, phi) from pre-measured end-to-end traversal times.
pub fn speeds_from_traversal(
    t: &launcher_config::Traversal,
    limits: &LimitsCfg,
) -> Result<(AxisSpeed, AxisSpeed), LauncherError> {
    Ok((
        AxisSpeed::from_traversal(limits.theta.range(), t.theta_pos_s, t.theta_neg_s)?,
        AxisSpeed::from_traversal(limits.phi.range(), t.phi_pos_s, t.phi_neg_s)?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timing_from_config() {
        let t = TimingCfg::from(&launcher_config::Timing {
            poll_ms: 5,
            max_motion_ms: 2000,
        });
        assert_eq!(t.poll, Duration::from_millis(5));
        assert_eq!(t.max_motion, Duration::from_secs(2));
    }

    #[test]
    fn traversal_to_speeds() {
        let limits = LimitsCfg {
            theta: AxisBounds::new(0.0, 120.0).unwrap(),
            phi: AxisBounds::new(0.0, 300.0).unwrap(),
        };
        let t = launcher_config::Traversal {
            theta_pos_s: 4.0,
            theta_neg_s: 3.0,
            phi_pos_s: 10.0,
            phi_neg_s: 20.0,
        };
        let (theta, phi) = speeds_from_traversal(&t, &limits).unwrap();
        assert_eq!(theta, AxisSpeed { positive: 30.0, negative: 40.0 });
        assert_eq!(phi, AxisSpeed { positive: 30.0, negative: 15.0 });
    }

    #[test]
    fn inverted_limits_rejected() {
        let l = launcher_config::Limits {
            theta: launcher_config::AxisLimits { min: 10.0, max: 0.0 },
            phi: launcher_config::AxisLimits { min: 0.0, max: 1.0 },
        };
        assert!(LimitsCfg::try_from(&l).is_err());
    }
}
