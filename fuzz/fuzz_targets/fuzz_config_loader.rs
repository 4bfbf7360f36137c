#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    // Parse and validation errors are fine; panics are not.
    if let Ok(cfg) = launcher_config::load_toml(data) {
        if cfg.validate().is_ok() {
            assert!(cfg.limits.theta.min < cfg.limits.theta.max);
            assert!(cfg.limits.phi.min < cfg.limits.phi.max);
            assert!(cfg.timing.poll_ms > 0);
        }
    }
});
