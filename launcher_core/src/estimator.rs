//! Open-loop position estimator.
//!
//! Positions are dead-reckoned from elapsed time and the calibrated speed of
//! the active direction, clamped to the axis bounds. When the active motion
//! bit clears, the limit switch was reached and the axis snaps exactly to the
//! corresponding bound. That snap is the only ground truth available, so drift
//! never survives a move that runs to a limit.

use crate::axis::{Axis, AxisBounds, AxisSpeed, Direction, PositionEstimate};
use crate::protocol::{Command, Status};

/// Everything known about one axis.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AxisTrack {
    pub bounds: Option<AxisBounds>,
    pub speed: Option<AxisSpeed>,
    pub position: Option<f64>,
}

impl AxisTrack {
    /// Bounds, speed and position are all known.
    pub fn is_calibrated(&self) -> bool {
        self.bounds.is_some() && self.speed.is_some_and(|s| s.is_valid()) && self.position.is_some()
    }

    fn advance(&mut self, dir: Direction, elapsed_s: f64) {
        let (Some(pos), Some(speed)) = (self.position, self.speed) else {
            return;
        };
        let moved = pos + dir.sign() * elapsed_s.max(0.0) * speed.for_direction(dir);
        self.position = Some(match self.bounds {
            Some(b) => b.clamp(moved),
            None => moved,
        });
    }

    fn snap(&mut self, dir: Direction) {
        if let Some(b) = self.bounds {
            self.position = Some(b.limit(dir));
        }
    }
}

/// What a status observation did to the estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Observation {
    /// No active motion was tracked.
    Idle,
    /// The active axis kept moving; its estimate was advanced.
    Advanced(Axis, Direction),
    /// The active motion bit cleared; the axis snapped to its bound.
    LimitReached(Axis, Direction),
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Estimator {
    tracks: [AxisTrack; 2],
}

impl Estimator {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn track(&self, axis: Axis) -> &AxisTrack {
        &self.tracks[axis.index()]
    }

    /// Set bounds and keep a known position inside them.
    pub fn set_bounds(&mut self, axis: Axis, bounds: AxisBounds) {
        let t = &mut self.tracks[axis.index()];
        t.bounds = Some(bounds);
        t.position = t.position.map(|p| bounds.clamp(p));
    }

    pub fn set_speed(&mut self, axis: Axis, speed: Option<AxisSpeed>) {
        self.tracks[axis.index()].speed = speed;
    }

    /// Place the axis at a known angle (clamped to bounds when set).
    pub fn set_position(&mut self, axis: Axis, position: f64) {
        let t = &mut self.tracks[axis.index()];
        t.position = Some(t.bounds.map_or(position, |b| b.clamp(position)));
    }

    /// Forget everything measured about the axis and adopt `bounds`.
    pub fn reset_axis(&mut self, axis: Axis, bounds: AxisBounds) {
        self.tracks[axis.index()] = AxisTrack {
            bounds: Some(bounds),
            speed: None,
            position: None,
        };
    }

    /// Dead-reckon `axis` for `elapsed_s` seconds of travel towards `dir`.
    pub fn advance(&mut self, axis: Axis, dir: Direction, elapsed_s: f64) {
        self.tracks[axis.index()].advance(dir, elapsed_s);
    }

    /// The limit switch for `dir` was hit: position becomes the bound exactly.
    pub fn snap_to_limit(&mut self, axis: Axis, dir: Direction) {
        self.tracks[axis.index()].snap(dir);
    }

    /// Apply one status reading.
    ///
    /// Only the motion bit of the command in force is tracked; bits the
    /// controller did not ask for never move the estimate.
    pub fn observe(
        &mut self,
        current: Command,
        previous: Status,
        latest: Status,
        elapsed_s: f64,
    ) -> Observation {
        let Some((axis, dir)) = current.motion_parts() else {
            return Observation::Idle;
        };
        let bit = current.bits();
        if !previous.contains(bit) {
            return Observation::Idle;
        }
        if latest.contains(bit) {
            self.advance(axis, dir, elapsed_s);
            Observation::Advanced(axis, dir)
        } else {
            self.snap_to_limit(axis, dir);
            Observation::LimitReached(axis, dir)
        }
    }

    /// Both axes have a known position.
    pub fn position(&self) -> Option<PositionEstimate> {
        Some(PositionEstimate {
            theta: self.tracks[0].position?,
            phi: self.tracks[1].position?,
        })
    }

    pub fn is_calibrated(&self) -> bool {
        self.tracks.iter().all(AxisTrack::is_calibrated)
    }
}
