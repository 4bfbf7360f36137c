use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

const CONFIG: &str = r#"
[limits.theta]
min = 0.0
max = 135.0

[limits.phi]
min = 0.0
max = 340.0

[timing]
poll_ms = 5
max_motion_ms = 5000

[simulation]
theta_pos_s = 0.3
theta_neg_s = 0.25
phi_pos_s = 0.5
phi_neg_s = 0.4
fire_ms = 200

[[presets]]
key = "2"
label = "couch"
theta = 90.0
phi = 170.0
"#;

fn run_keys(keys: &str) -> assert_cmd::assert::Assert {
    let dir = tempdir().unwrap();
    let cfg = dir.path().join("launcher.toml");
    fs::write(&cfg, CONFIG).unwrap();
    Command::cargo_bin("launcher")
        .unwrap()
        .arg("--config")
        .arg(&cfg)
        .arg("run")
        .env_remove("RUST_LOG")
        .write_stdin(keys)
        .assert()
}

#[test]
fn help_is_listed_on_start_and_q_quits() {
    run_keys("q\n")
        .success()
        .stdout(predicate::str::contains("space  stop").and(predicate::str::contains("2  couch")));
}

#[test]
fn preset_before_calibration_is_refused_but_not_fatal() {
    run_keys("2\np\nq\n")
        .success()
        .stdout(predicate::str::contains("not calibrated").and(predicate::str::contains("bounds")));
}

#[test]
fn calibrate_then_preset() {
    run_keys("c\n2\nq\n")
        .success()
        .stdout(predicate::str::contains("deg/s").and(predicate::str::contains("Elapsed")));
}

#[test]
fn end_of_input_ends_the_session() {
    run_keys("m\n").success().stdout(predicate::str::contains("speed not measured"));
}
