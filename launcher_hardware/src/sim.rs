//! Simulated launcher driven by a shared `Clock`.
//!
//! Models the true angle of both axes, per-direction traversal times, limit
//! switches that clear the active motion bit, and a firing cycle of fixed
//! length. Time only passes when the clock says so, which makes the
//! controller tests deterministic when a `ManualClock` is shared.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

use launcher_traits::{Clock, Transport, opcode};
use tracing::{debug, trace};

use crate::error::HwError;
use crate::{COMMAND_FRAME_LEN, command_frame};

/// Frames kept by the simulator's log; older ones are dropped.
pub const FRAME_LOG_CAP: usize = 4096;

/// Physical model parameters for the simulator.
#[derive(Debug, Clone)]
pub struct SimParams {
    /// (min, max) degrees of the vertical axis
    pub theta_limits: (f64, f64),
    /// (min, max) degrees of the horizontal axis
    pub phi_limits: (f64, f64),
    /// End-to-end seconds (positive direction, negative direction)
    pub theta_traversal_s: (f64, f64),
    pub phi_traversal_s: (f64, f64),
    /// Length of one firing cycle
    pub fire_duration: Duration,
    /// Initial true (theta, phi)
    pub start: (f64, f64),
}

impl Default for SimParams {
    fn default() -> Self {
        Self {
            theta_limits: (0.0, 135.0),
            phi_limits: (0.0, 340.0),
            theta_traversal_s: (2.95986, 2.76801),
            phi_traversal_s: (19.5367, 19.857),
            fire_duration: Duration::from_millis(5000),
            start: (67.5, 170.0),
        }
    }
}

pub struct SimulatedLauncher {
    params: SimParams,
    clock: Arc<dyn Clock + Send + Sync>,
    theta: f64,
    phi: f64,
    /// Motion bit currently driving an axis (0 when idle).
    active: u8,
    firing_until: Option<Instant>,
    last_tick: Instant,
    open: bool,
    status_requested: bool,
    fail_reads: bool,
    frames: VecDeque<[u8; COMMAND_FRAME_LEN]>,
}

impl SimulatedLauncher {
    pub fn new(params: SimParams, clock: Arc<dyn Clock + Send + Sync>) -> Self {
        let (theta, phi) = params.start;
        let theta = theta.clamp(params.theta_limits.0, params.theta_limits.1);
        let phi = phi.clamp(params.phi_limits.0, params.phi_limits.1);
        let last_tick = clock.now();
        Self {
            params,
            clock,
            theta,
            phi,
            active: opcode::NONE,
            firing_until: None,
            last_tick,
            open: false,
            status_requested: false,
            fail_reads: false,
            frames: VecDeque::new(),
        }
    }

    /// True (theta, phi) of the simulated hardware.
    pub fn true_position(&self) -> (f64, f64) {
        (self.theta, self.phi)
    }

    /// Make every subsequent status read fail with a timeout.
    pub fn set_fail_reads(&mut self, fail: bool) {
        self.fail_reads = fail;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// The last [`FRAME_LOG_CAP`] frames sent, status requests included.
    pub fn frames(&self) -> Vec<[u8; COMMAND_FRAME_LEN]> {
        self.frames.iter().copied().collect()
    }

    /// Opcodes sent, excluding status requests.
    pub fn commands(&self) -> Vec<u8> {
        self.frames
            .iter()
            .map(|f| f[0])
            .filter(|&b| b != opcode::STATUS_REQUEST)
            .collect()
    }

    /// Move the model forward to the clock's current time.
    fn tick(&mut self) {
        let now = self.clock.now();
        let dt = now.saturating_duration_since(self.last_tick).as_secs_f64();
        self.last_tick = now;

        if self.active != opcode::NONE {
            let (pos, limits, traversal) = match self.active {
                opcode::DOWN | opcode::UP => {
                    (&mut self.theta, self.params.theta_limits, self.params.theta_traversal_s)
                }
                _ => (&mut self.phi, self.params.phi_limits, self.params.phi_traversal_s),
            };
            let range = limits.1 - limits.0;
            let positive = matches!(self.active, opcode::DOWN | opcode::LEFT);
            if positive {
                *pos = (*pos + dt * range / traversal.0).min(limits.1);
                if *pos >= limits.1 {
                    debug!(bit = self.active, "sim limit reached");
                    self.active = opcode::NONE;
                }
            } else {
                *pos = (*pos - dt * range / traversal.1).max(limits.0);
                if *pos <= limits.0 {
                    debug!(bit = self.active, "sim limit reached");
                    self.active = opcode::NONE;
                }
            }
        }

        if let Some(until) = self.firing_until
            && now >= until
        {
            debug!("sim firing cycle complete");
            self.firing_until = None;
        }
    }

    fn at_limit(&self, bit: u8) -> bool {
        match bit {
            opcode::DOWN => self.theta >= self.params.theta_limits.1,
            opcode::UP => self.theta <= self.params.theta_limits.0,
            opcode::LEFT => self.phi >= self.params.phi_limits.1,
            opcode::RIGHT => self.phi <= self.params.phi_limits.0,
            _ => false,
        }
    }

    fn status_byte(&self) -> u8 {
        let mut s = self.active;
        if self.firing_until.is_some() {
            s |= opcode::FIRE;
        }
        s
    }
}

impl Transport for SimulatedLauncher {
    fn open(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.last_tick = self.clock.now();
        self.open = true;
        debug!("sim launcher opened");
        Ok(())
    }

    fn close(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.open = false;
        debug!("sim launcher closed");
        Ok(())
    }

    fn send_command(&mut self, byte: u8) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        if !self.open {
            return Err(Box::new(HwError::NotOpen));
        }
        self.tick();
        if self.frames.len() == FRAME_LOG_CAP {
            self.frames.pop_front();
        }
        self.frames.push_back(command_frame(byte));
        trace!(cmd = byte, "sim command");
        match byte {
            opcode::NONE => {}
            opcode::STATUS_REQUEST => self.status_requested = true,
            opcode::STOP => {
                self.active = opcode::NONE;
                self.firing_until = None;
            }
            opcode::FIRE => {
                if self.firing_until.is_none() {
                    self.firing_until = Some(self.clock.now() + self.params.fire_duration);
                }
            }
            opcode::DOWN | opcode::UP | opcode::LEFT | opcode::RIGHT => {
                self.active = if self.at_limit(byte) {
                    opcode::NONE
                } else {
                    byte
                };
            }
            other => {
                return Err(Box::new(HwError::Protocol(format!(
                    "unsupported command {other:#04x}"
                ))));
            }
        }
        Ok(())
    }

    fn read_status(&mut self) -> Result<u8, Box<dyn std::error::Error + Send + Sync>> {
        if !self.open {
            return Err(Box::new(HwError::NotOpen));
        }
        if self.fail_reads {
            return Err(Box::new(HwError::Timeout));
        }
        if !self.status_requested {
            return Err(Box::new(HwError::Protocol(
                "status read without a preceding request".into(),
            )));
        }
        self.status_requested = false;
        self.tick();
        Ok(self.status_byte())
    }
}
