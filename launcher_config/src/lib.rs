#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema for the launcher.
//!
//! - `Config` and sub-structs are deserialized from TOML and validated.
//! - Axis limits are hardware constants; calibration measures speeds only.
use serde::Deserialize;
use std::path::Path;

/// Keys taken by the built-in console bindings; presets may not reuse them.
pub const RESERVED_KEYS: &str = "adws fFEhcpmgz?q";

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Device {
    pub vendor_id: u16,
    pub product_id: u16,
    pub interface: u8,
    /// wValue of the command control transfer
    pub control_value: u16,
    /// Interrupt IN endpoint for status
    pub endpoint_in: u8,
    pub transfer_timeout_ms: u64,
}

impl Default for Device {
    fn default() -> Self {
        Self {
            vendor_id: 0x0a81,
            product_id: 0x0701,
            interface: 0,
            control_value: 0x0001,
            endpoint_in: 0x81,
            transfer_timeout_ms: 1000,
        }
    }
}

/// Travel limits of one axis in degrees.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct AxisLimits {
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Deserialize, Clone, Copy)]
pub struct Limits {
    /// Vertical axis (down is positive)
    pub theta: AxisLimits,
    /// Horizontal axis (left is positive)
    pub phi: AxisLimits,
}

/// Pre-measured end-to-end traversal times in seconds, skipping calibration.
#[derive(Debug, Deserialize, Clone, Copy)]
pub struct Traversal {
    pub theta_pos_s: f64,
    pub theta_neg_s: f64,
    pub phi_pos_s: f64,
    pub phi_neg_s: f64,
}

#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct Timing {
    /// Sleep between status polls inside blocking operations
    pub poll_ms: u64,
    /// Abort any single blocking wait after this long
    pub max_motion_ms: u64,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            poll_ms: 10,
            max_motion_ms: 60_000,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct FireCfg {
    /// Timeout used by the timed fire action
    pub timeout_s: f64,
}

impl Default for FireCfg {
    fn default() -> Self {
        Self { timeout_s: 5.5 }
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

/// Physical model used when running without hardware.
#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct Simulation {
    pub theta_pos_s: f64,
    pub theta_neg_s: f64,
    pub phi_pos_s: f64,
    pub phi_neg_s: f64,
    pub fire_ms: u64,
    pub start_theta: f64,
    pub start_phi: f64,
}

impl Default for Simulation {
    fn default() -> Self {
        Self {
            theta_pos_s: 2.95986,
            theta_neg_s: 2.76801,
            phi_pos_s: 19.5367,
            phi_neg_s: 19.857,
            fire_ms: 5000,
            start_theta: 60.0,
            start_phi: 170.0,
        }
    }
}

/// Absolute-move shortcut bound to a console key.
#[derive(Debug, Deserialize, Clone)]
pub struct Preset {
    pub key: char,
    pub label: String,
    pub theta: f64,
    pub phi: f64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub device: Device,
    pub limits: Limits,
    /// Optional externally supplied speeds
    #[serde(default)]
    pub traversal: Option<Traversal>,
    #[serde(default)]
    pub timing: Timing,
    #[serde(default)]
    pub fire: FireCfg,
    #[serde(default)]
    pub logging: Logging,
    #[serde(default)]
    pub simulation: Simulation,
    #[serde(default)]
    pub presets: Vec<Preset>,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

/// Read, parse and validate a config file.
pub fn load_file(path: &Path) -> eyre::Result<Config> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| eyre::eyre!("read config {}: {}", path.display(), e))?;
    let cfg = load_toml(&text).map_err(|e| eyre::eyre!("parse config {}: {}", path.display(), e))?;
    cfg.validate()?;
    Ok(cfg)
}

fn check_limits(name: &str, l: &AxisLimits) -> eyre::Result<()> {
    if !l.min.is_finite() || !l.max.is_finite() {
        eyre::bail!("limits.{name} must be finite");
    }
    if l.min >= l.max {
        eyre::bail!("limits.{name}.min must be < limits.{name}.max");
    }
    Ok(())
}

fn check_secs(name: &str, v: f64) -> eyre::Result<()> {
    if !(v.is_finite() && v > 0.0) {
        eyre::bail!("{name} must be > 0");
    }
    Ok(())
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Limits
        check_limits("theta", &self.limits.theta)?;
        check_limits("phi", &self.limits.phi)?;

        // Traversal
        if let Some(t) = &self.traversal {
            check_secs("traversal.theta_pos_s", t.theta_pos_s)?;
            check_secs("traversal.theta_neg_s", t.theta_neg_s)?;
            check_secs("traversal.phi_pos_s", t.phi_pos_s)?;
            check_secs("traversal.phi_neg_s", t.phi_neg_s)?;
        }

        // Timing
        if self.timing.poll_ms == 0 {
            eyre::bail!("timing.poll_ms must be >= 1");
        }
        if self.timing.max_motion_ms <= self.timing.poll_ms {
            eyre::bail!("timing.max_motion_ms must be > timing.poll_ms");
        }

        // Fire
        check_secs("fire.timeout_s", self.fire.timeout_s)?;

        // Device
        if self.device.transfer_timeout_ms == 0 {
            eyre::bail!("device.transfer_timeout_ms must be >= 1");
        }

        // Simulation
        check_secs("simulation.theta_pos_s", self.simulation.theta_pos_s)?;
        check_secs("simulation.theta_neg_s", self.simulation.theta_neg_s)?;
        check_secs("simulation.phi_pos_s", self.simulation.phi_pos_s)?;
        check_secs("simulation.phi_neg_s", self.simulation.phi_neg_s)?;
        if self.simulation.fire_ms == 0 {
            eyre::bail!("simulation.fire_ms must be >= 1");
        }

        // Presets
        let mut seen = Vec::with_capacity(self.presets.len());
        for p in &self.presets {
            if RESERVED_KEYS.contains(p.key) {
                eyre::bail!("preset key '{}' collides with a built-in binding", p.key);
            }
            if seen.contains(&p.key) {
                eyre::bail!("preset key '{}' is bound twice", p.key);
            }
            seen.push(p.key);
            let (t, ph) = (&self.limits.theta, &self.limits.phi);
            if !(t.min..=t.max).contains(&p.theta) || !(ph.min..=ph.max).contains(&p.phi) {
                eyre::bail!(
                    "preset '{}' target ({}, {}) lies outside the configured limits",
                    p.label,
                    p.theta,
                    p.phi
                );
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
[limits.theta]
min = 0.0
max = 135.0

[limits.phi]
min = 0.0
max = 340.0
"#;

    #[test]
    fn minimal_config_uses_defaults() {
        let cfg = load_toml(MINIMAL).expect("parse");
        cfg.validate().expect("valid");
        assert_eq!(cfg.device.vendor_id, 0x0a81);
        assert_eq!(cfg.device.control_value, 0x0001);
        assert_eq!(cfg.timing.poll_ms, 10);
        assert!(cfg.traversal.is_none());
        assert!(cfg.presets.is_empty());
    }

    #[test]
    fn hex_ids_parse() {
        let text = format!("[device]\nvendor_id = 0x1941\nproduct_id = 0x8021\n{MINIMAL}");
        let cfg = load_toml(&text).expect("parse");
        assert_eq!(cfg.device.vendor_id, 0x1941);
        assert_eq!(cfg.device.product_id, 0x8021);
    }

    #[test]
    fn missing_limits_is_a_parse_error() {
        assert!(load_toml("[timing]\npoll_ms = 5\n").is_err());
    }
}
