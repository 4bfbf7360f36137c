//! Type-state builder for `Launcher`.
//!
//! `connect()` only exists once a transport is set; `try_connect()` is always
//! available and reports the missing piece as a `BuildError`.

use std::marker::PhantomData;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use eyre::WrapErr;
use launcher_traits::{Clock, MonotonicClock, Transport};
use tracing::info;

use crate::axis::{Axis, AxisSpeed};
use crate::config::{LimitsCfg, TimingCfg};
use crate::controller::Launcher;
use crate::conversions::speeds_from_traversal;
use crate::error::{BuildError, Report, Result};
use crate::estimator::Estimator;
use crate::hw_error::map_open_error;

pub struct Missing;
pub struct Set;

pub struct LauncherBuilder<T, S = Missing> {
    transport: Option<T>,
    clock: Option<Arc<dyn Clock + Send + Sync>>,
    stop: Option<Arc<AtomicBool>>,
    timing: Option<TimingCfg>,
    limits: Option<LimitsCfg>,
    speeds: Option<(AxisSpeed, AxisSpeed)>,
    _s: PhantomData<S>,
}

impl<T> Default for LauncherBuilder<T, Missing> {
    fn default() -> Self {
        Self {
            transport: None,
            clock: None,
            stop: None,
            timing: None,
            limits: None,
            speeds: None,
            _s: PhantomData,
        }
    }
}

impl<T> LauncherBuilder<T, Missing> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_transport(self, transport: T) -> LauncherBuilder<T, Set> {
        LauncherBuilder {
            transport: Some(transport),
            clock: self.clock,
            stop: self.stop,
            timing: self.timing,
            limits: self.limits,
            speeds: self.speeds,
            _s: PhantomData,
        }
    }
}

/// Chainable setters that do not affect type-state.
impl<T, S> LauncherBuilder<T, S> {
    /// Provide a custom clock; defaults to `MonotonicClock`.
    pub fn with_clock(mut self, clock: Arc<dyn Clock + Send + Sync>) -> Self {
        self.clock = Some(clock);
        self
    }
    /// Share a stop flag with a signal handler or another thread.
    pub fn with_stop_flag(mut self, stop: Arc<AtomicBool>) -> Self {
        self.stop = Some(stop);
        self
    }
    pub fn with_timing(mut self, timing: TimingCfg) -> Self {
        self.timing = Some(timing);
        self
    }
    pub fn with_limits(mut self, limits: LimitsCfg) -> Self {
        self.limits = Some(limits);
        self
    }
    /// Speeds measured elsewhere; positions still need `go_home` or a limit hit.
    pub fn with_speeds(mut self, theta: AxisSpeed, phi: AxisSpeed) -> Self {
        self.speeds = Some((theta, phi));
        self
    }

    /// Limits, timing and optional traversal times from a loaded config.
    pub fn with_config(mut self, cfg: &launcher_config::Config) -> Result<Self> {
        let limits = LimitsCfg::try_from(&cfg.limits)
            .map_err(Report::new)
            .wrap_err("config limits")?;
        if let Some(t) = &cfg.traversal {
            self.speeds = Some(
                speeds_from_traversal(t, &limits)
                    .map_err(Report::new)
                    .wrap_err("config traversal")?,
            );
        }
        self.limits = Some(limits);
        self.timing = Some(TimingCfg::from(&cfg.timing));
        Ok(self)
    }
}

impl<T: Transport, S> LauncherBuilder<T, S> {
    /// Fallible connect available in any type-state.
    pub fn try_connect(self) -> Result<Launcher<T>> {
        let mut transport = self
            .transport
            .ok_or_else(|| Report::new(BuildError::MissingTransport))?;
        let timing = self.timing.unwrap_or_default();
        if timing.poll.is_zero() {
            return Err(Report::new(BuildError::InvalidConfig("poll interval must be > 0")));
        }
        if timing.max_motion <= timing.poll {
            return Err(Report::new(BuildError::InvalidConfig(
                "max motion must exceed the poll interval",
            )));
        }
        if let Some((theta, phi)) = &self.speeds
            && !(theta.is_valid() && phi.is_valid())
        {
            return Err(Report::new(BuildError::InvalidConfig(
                "speeds must be finite and > 0",
            )));
        }
        let limits = self.limits.unwrap_or_default();

        transport
            .open()
            .map_err(|e| Report::new(map_open_error(&*e)))
            .wrap_err("opening transport")?;

        let mut estimator = Estimator::new();
        for axis in Axis::ALL {
            estimator.set_bounds(axis, limits.get(axis));
        }
        if let Some((theta, phi)) = self.speeds {
            estimator.set_speed(Axis::Theta, Some(theta));
            estimator.set_speed(Axis::Phi, Some(phi));
        }
        info!(speeds_known = self.speeds.is_some(), "launcher connected");

        Ok(Launcher::from_parts(
            transport,
            self.clock.unwrap_or_else(|| Arc::new(MonotonicClock::new())),
            self.stop.unwrap_or_default(),
            timing,
            limits,
            estimator,
        ))
    }
}

impl<T: Transport> LauncherBuilder<T, Set> {
    /// Open the transport and produce a connected launcher.
    pub fn connect(self) -> Result<Launcher<T>> {
        self.try_connect()
    }
}
