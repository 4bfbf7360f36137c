//! Axis model: which way is which, travel bounds and angular speeds.

use std::fmt;

use crate::error::LauncherError;

/// Deltas smaller than this are treated as "no motion".
pub const MIN_DELTA_DEG: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Vertical; down is positive.
    Theta,
    /// Horizontal; left is positive.
    Phi,
}

impl Axis {
    /// Calibration and relative moves visit the axes in this order.
    pub const ALL: [Axis; 2] = [Axis::Theta, Axis::Phi];

    #[inline]
    pub fn index(self) -> usize {
        match self {
            Axis::Theta => 0,
            Axis::Phi => 1,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Axis::Theta => "theta",
            Axis::Phi => "phi",
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Positive,
    Negative,
}

impl Direction {
    #[inline]
    pub fn sign(self) -> f64 {
        match self {
            Direction::Positive => 1.0,
            Direction::Negative => -1.0,
        }
    }

    /// Direction a delta asks for; `None` for a (near) zero delta.
    pub fn of(delta: f64) -> Option<Direction> {
        if delta > MIN_DELTA_DEG {
            Some(Direction::Positive)
        } else if delta < -MIN_DELTA_DEG {
            Some(Direction::Negative)
        } else {
            None
        }
    }
}

/// Travel bounds of one axis in degrees, `min <= max`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisBounds {
    pub min: f64,
    pub max: f64,
}

impl AxisBounds {
    pub fn new(min: f64, max: f64) -> Result<Self, LauncherError> {
        if !(min.is_finite() && max.is_finite()) || min > max {
            return Err(LauncherError::InvalidArgument(format!(
                "bounds [{min}, {max}] must be finite with min <= max"
            )));
        }
        Ok(Self { min, max })
    }

    #[inline]
    pub fn range(&self) -> f64 {
        self.max - self.min
    }

    #[inline]
    pub fn contains(&self, v: f64) -> bool {
        (self.min..=self.max).contains(&v)
    }

    #[inline]
    pub fn clamp(&self, v: f64) -> f64 {
        v.clamp(self.min, self.max)
    }

    /// The bound reached when travelling in `dir` until the limit switch.
    #[inline]
    pub fn limit(&self, dir: Direction) -> f64 {
        match dir {
            Direction::Positive => self.max,
            Direction::Negative => self.min,
        }
    }
}

/// Angular speed of one axis in degrees per second, per direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisSpeed {
    pub positive: f64,
    pub negative: f64,
}

impl AxisSpeed {
    pub fn new(positive: f64, negative: f64) -> Result<Self, LauncherError> {
        let s = Self { positive, negative };
        if !s.is_valid() {
            return Err(LauncherError::InvalidArgument(format!(
                "speeds ({positive}, {negative}) deg/s must be finite and > 0"
            )));
        }
        Ok(s)
    }

    /// Speeds from end-to-end traversal times over `range` degrees.
    pub fn from_traversal(range: f64, positive_s: f64, negative_s: f64) -> Result<Self, LauncherError> {
        if !(positive_s > 0.0 && negative_s > 0.0) {
            return Err(LauncherError::InvalidArgument(format!(
                "traversal times ({positive_s}, {negative_s}) s must be > 0"
            )));
        }
        Self::new(range / positive_s, range / negative_s)
    }

    #[inline]
    pub fn for_direction(&self, dir: Direction) -> f64 {
        match dir {
            Direction::Positive => self.positive,
            Direction::Negative => self.negative,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.positive.is_finite() && self.positive > 0.0 && self.negative.is_finite() && self.negative > 0.0
    }
}

/// Snapshot of the estimated angles in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionEstimate {
    pub theta: f64,
    pub phi: f64,
}

impl PositionEstimate {
    pub fn get(&self, axis: Axis) -> f64 {
        match axis {
            Axis::Theta => self.theta,
            Axis::Phi => self.phi,
        }
    }
}
