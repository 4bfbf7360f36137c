use launcher_config::load_toml;
use rstest::rstest;

const LIMITS: &str = r#"
[limits.theta]
min = 0.0
max = 135.0

[limits.phi]
min = 0.0
max = 340.0
"#;

fn with_limits(extra: &str) -> String {
    format!("{LIMITS}\n{extra}")
}

#[rstest]
#[case("[timing]\npoll_ms = 0", "timing.poll_ms must be >= 1")]
#[case("[timing]\npoll_ms = 50\nmax_motion_ms = 50", "max_motion_ms must be > timing.poll_ms")]
#[case("[fire]\ntimeout_s = 0.0", "fire.timeout_s must be > 0")]
#[case(
    "[traversal]\ntheta_pos_s = 3.0\ntheta_neg_s = -1.0\nphi_pos_s = 19.0\nphi_neg_s = 19.0",
    "traversal.theta_neg_s must be > 0"
)]
#[case(
    "[[presets]]\nkey = 'q'\nlabel = 'Quit clash'\ntheta = 10.0\nphi = 10.0",
    "collides with a built-in binding"
)]
#[case(
    "[[presets]]\nkey = '1'\nlabel = 'Far away'\ntheta = 10.0\nphi = 400.0",
    "outside the configured limits"
)]
#[case(
    "[[presets]]\nkey = '1'\nlabel = 'A'\ntheta = 1.0\nphi = 1.0\n[[presets]]\nkey = '1'\nlabel = 'B'\ntheta = 2.0\nphi = 2.0",
    "bound twice"
)]
fn rejects_invalid(#[case] extra: &str, #[case] needle: &str) {
    let cfg = load_toml(&with_limits(extra)).expect("parse TOML");
    let err = cfg.validate().expect_err("should be rejected");
    assert!(
        format!("{err}").contains(needle),
        "error '{err}' should mention '{needle}'"
    );
}

#[test]
fn rejects_inverted_limits() {
    let toml = r#"
[limits.theta]
min = 90.0
max = 10.0

[limits.phi]
min = 0.0
max = 340.0
"#;
    let cfg = load_toml(toml).expect("parse TOML");
    let err = cfg.validate().expect_err("inverted limits");
    assert!(format!("{err}").contains("limits.theta.min must be < limits.theta.max"));
}

#[test]
fn accepts_full_sample() {
    let toml = with_limits(
        r#"
[device]
vendor_id = 0x0a81
product_id = 0x0701
transfer_timeout_ms = 500

[traversal]
theta_pos_s = 2.95986
theta_neg_s = 2.76801
phi_pos_s = 19.5367
phi_neg_s = 19.857

[timing]
poll_ms = 10
max_motion_ms = 30000

[fire]
timeout_s = 5.5

[logging]
level = "debug"

[[presets]]
key = '1'
label = "Move to kitchen"
theta = 65.0
phi = 110.0
"#,
    );
    let cfg = load_toml(&toml).expect("parse TOML");
    cfg.validate().expect("valid config should pass");
    assert_eq!(cfg.presets[0].key, '1');
    assert_eq!(cfg.traversal.map(|t| t.phi_neg_s), Some(19.857));
}
