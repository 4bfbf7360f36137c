use std::fs;

use launcher_config::load_file;
use tempfile::tempdir;

#[test]
fn loads_and_validates_from_disk() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("launcher.toml");
    fs::write(
        &path,
        "[limits.theta]\nmin = 0.0\nmax = 90.0\n[limits.phi]\nmin = 0.0\nmax = 270.0\n",
    )
    .unwrap();
    let cfg = load_file(&path).expect("load");
    assert_eq!(cfg.limits.phi.max, 270.0);
}

#[test]
fn missing_file_names_the_path() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("absent.toml");
    let err = load_file(&path).expect_err("no such file");
    assert!(format!("{err}").contains("absent.toml"));
}

#[test]
fn invalid_values_fail_on_load() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.toml");
    fs::write(
        &path,
        "[limits.theta]\nmin = 0.0\nmax = 90.0\n[limits.phi]\nmin = 0.0\nmax = 270.0\n[timing]\npoll_ms = 0\n",
    )
    .unwrap();
    let err = load_file(&path).expect_err("poll_ms = 0");
    assert!(format!("{err}").contains("poll_ms"));
}

#[test]
fn shipped_sample_matches_device_defaults() {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../etc/launcher.toml");
    let cfg = launcher_config::load_file(&path).expect("sample config loads");
    let d = launcher_config::Device::default();
    assert_eq!(cfg.device.control_value, d.control_value);
    assert_eq!(cfg.device.control_value, 0x0001);
    assert_eq!((cfg.device.vendor_id, cfg.device.product_id), (d.vendor_id, d.product_id));
}
