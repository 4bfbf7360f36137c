//! Device selection: USB with the `hardware` feature, the simulator otherwise.

use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use eyre::WrapErr;
use launcher_core::{Launcher, LauncherBuilder};
use launcher_traits::Transport;

pub type Device = Box<dyn Transport>;

#[cfg(feature = "hardware")]
fn open_device(cfg: &launcher_config::Config) -> Device {
    use launcher_hardware::{UsbLauncher, UsbSettings};
    let d = &cfg.device;
    tracing::info!(
        vendor = format_args!("{:#06x}", d.vendor_id),
        product = format_args!("{:#06x}", d.product_id),
        "using USB launcher"
    );
    Box::new(UsbLauncher::new(UsbSettings {
        vendor_id: d.vendor_id,
        product_id: d.product_id,
        interface: d.interface,
        control_value: d.control_value,
        endpoint_in: d.endpoint_in,
        timeout: std::time::Duration::from_millis(d.transfer_timeout_ms),
    }))
}

#[cfg(not(feature = "hardware"))]
fn open_device(cfg: &launcher_config::Config) -> Device {
    use launcher_hardware::{SimParams, SimulatedLauncher};
    use launcher_traits::MonotonicClock;

    let s = &cfg.simulation;
    let params = SimParams {
        theta_limits: (cfg.limits.theta.min, cfg.limits.theta.max),
        phi_limits: (cfg.limits.phi.min, cfg.limits.phi.max),
        theta_traversal_s: (s.theta_pos_s, s.theta_neg_s),
        phi_traversal_s: (s.phi_pos_s, s.phi_neg_s),
        fire_duration: std::time::Duration::from_millis(s.fire_ms),
        start: (s.start_theta, s.start_phi),
    };
    let mut sim = SimulatedLauncher::new(params, Arc::new(MonotonicClock::new()));
    // Test hook: make every status read time out.
    if std::env::var_os("LAUNCHER_TEST_SIM_TIMEOUT").is_some() {
        tracing::warn!("simulated status reads will time out");
        sim.set_fail_reads(true);
    }
    tracing::info!("using simulated launcher");
    Box::new(sim)
}

/// Open the configured device and build a controller around it.
pub fn connect(cfg: &launcher_config::Config, stop: Arc<AtomicBool>) -> eyre::Result<Launcher<Device>> {
    LauncherBuilder::new()
        .with_transport(open_device(cfg))
        .with_stop_flag(stop)
        .with_config(cfg)?
        .connect()
        .wrap_err("connecting to launcher")
}
