//! Controller scenarios against the simulated launcher on a shared manual clock.

use std::sync::Arc;
use std::time::Duration;

use launcher_core::{
    Activity, Axis, AxisBounds, AxisSpeed, CalibrationState, Command, FireOutcome, Launcher,
    LauncherBuilder, LauncherError, LimitsCfg, MoveOutcome, TimingCfg,
};
use launcher_hardware::{SimParams, SimulatedLauncher};
use launcher_traits::{ManualClock, opcode};
use rstest::rstest;

const EPS: f64 = 1e-6;

fn limits() -> LimitsCfg {
    LimitsCfg {
        theta: AxisBounds::new(0.0, 180.0).unwrap(),
        phi: AxisBounds::new(0.0, 300.0).unwrap(),
    }
}

/// theta 30 deg/s down, 45 deg/s up; phi 15 deg/s left, 30 deg/s right.
fn params() -> SimParams {
    SimParams {
        theta_limits: (0.0, 180.0),
        phi_limits: (0.0, 300.0),
        theta_traversal_s: (6.0, 4.0),
        phi_traversal_s: (20.0, 10.0),
        fire_duration: Duration::from_secs(5),
        start: (90.0, 150.0),
    }
}

fn rig_with(timing: TimingCfg) -> (Launcher<SimulatedLauncher>, ManualClock) {
    let clock = ManualClock::new();
    let sim = SimulatedLauncher::new(params(), Arc::new(clock.clone()));
    let launcher = LauncherBuilder::new()
        .with_transport(sim)
        .with_clock(Arc::new(clock.clone()))
        .with_limits(limits())
        .with_timing(timing)
        .connect()
        .expect("connect");
    (launcher, clock)
}

fn rig() -> (Launcher<SimulatedLauncher>, ManualClock) {
    rig_with(TimingCfg::default())
}

/// Speeds matching the simulator, homed.
fn homed() -> (Launcher<SimulatedLauncher>, ManualClock) {
    let (mut l, clock) = rig();
    l.set_speeds(
        AxisSpeed::new(30.0, 45.0).unwrap(),
        AxisSpeed::new(15.0, 30.0).unwrap(),
    )
    .unwrap();
    l.go_home().expect("home");
    (l, clock)
}

fn kind(err: &eyre::Report) -> Option<&LauncherError> {
    err.downcast_ref::<LauncherError>()
}

#[test]
fn connect_opens_transport_and_disconnect_closes_it() {
    let (l, _) = rig();
    assert!(l.transport().is_open());
    assert_eq!(l.calibration_state(), CalibrationState::Uncalibrated);
    let sim = l.disconnect().expect("disconnect");
    assert!(!sim.is_open());
    assert_eq!(sim.commands(), vec![opcode::STOP]);
}

#[test]
fn moves_are_refused_before_calibration_without_io() {
    let (mut l, _) = rig();
    let err = l.move_abs(10.0, 10.0).unwrap_err();
    assert_eq!(kind(&err), Some(&LauncherError::Uncalibrated));
    let err = l.move_rel(5.0, 0.0).unwrap_err();
    assert_eq!(kind(&err), Some(&LauncherError::Uncalibrated));
    assert!(l.transport().frames().is_empty());
}

#[test]
fn go_home_with_known_speeds_calibrates() {
    let (l, _) = homed();
    assert_eq!(l.calibration_state(), CalibrationState::Calibrated);
    let pos = l.position().unwrap();
    assert_eq!((pos.theta, pos.phi), (0.0, 0.0));
    assert_eq!(l.transport().true_position(), (0.0, 0.0));
    assert_eq!(l.activity(), Activity::Idle);
}

#[test]
fn calibration_measures_range_over_time() {
    let (mut l, _) = rig();
    let report = l.calibrate().expect("calibrate");

    // One poll (10 ms) of observation slack per traversal.
    assert!((report.theta.positive_s - 6.0).abs() <= 0.011, "{report:?}");
    assert!((report.theta.negative_s - 4.0).abs() <= 0.011, "{report:?}");
    assert!((report.phi.positive_s - 20.0).abs() <= 0.011, "{report:?}");
    assert!((report.phi.negative_s - 10.0).abs() <= 0.011, "{report:?}");
    assert!((report.theta.speed.positive - 180.0 / report.theta.positive_s).abs() < EPS);
    assert!((report.phi.speed.negative - 300.0 / report.phi.negative_s).abs() < EPS);

    assert_eq!(l.calibration_state(), CalibrationState::Calibrated);
    assert!(l.is_calibrated());
    let pos = l.position().unwrap();
    assert_eq!((pos.theta, pos.phi), (0.0, 0.0));
    assert_eq!(l.transport().true_position(), (0.0, 0.0));
}

#[test]
fn absolute_move_reaches_target() {
    let (mut l, _) = homed();
    let outcome = l.move_abs(90.0, 150.0).expect("move_abs");
    assert_eq!(outcome, MoveOutcome::Elapsed);
    let pos = l.position().unwrap();
    assert!((pos.theta - 90.0).abs() < 1e-3, "{pos:?}");
    assert!((pos.phi - 150.0).abs() < 1e-3, "{pos:?}");
    let (t, p) = l.transport().true_position();
    assert!((t - 90.0).abs() < 1e-3 && (p - 150.0).abs() < 1e-3);

    // Theta strictly before phi, each followed by STOP.
    let cmds = l.transport().commands();
    let tail = &cmds[cmds.len() - 4..];
    assert_eq!(tail, &[opcode::DOWN, opcode::STOP, opcode::LEFT, opcode::STOP]);
}

#[test]
fn relative_move_back_to_the_limit_snaps() {
    let (mut l, _) = homed();
    l.move_abs(90.0, 0.0).unwrap();
    l.move_rel(-90.0, 0.0).unwrap();
    let pos = l.position().unwrap();
    assert!(pos.theta.abs() < 1e-3, "{pos:?}");
    assert_eq!(l.track(Axis::Theta).bounds, Some(limits().theta));
}

#[test]
fn overshooting_relative_move_ends_at_limit() {
    let (mut l, _) = homed();
    let outcome = l.move_rel(0.0, 400.0).unwrap();
    assert_eq!(outcome, MoveOutcome::LimitReached);
    assert_eq!(l.position().unwrap().phi, 300.0);
}

#[test]
fn zero_delta_sends_nothing() {
    let (mut l, _) = homed();
    let before = l.transport().frames().len();
    assert_eq!(l.move_rel(0.0, 0.0).unwrap(), MoveOutcome::Elapsed);
    assert_eq!(l.transport().frames().len(), before);
}

#[rstest]
#[case(Axis::Theta, 181.0, 0.0)]
#[case(Axis::Theta, -1.0, 0.0)]
#[case(Axis::Phi, 10.0, 300.5)]
fn absolute_target_outside_bounds(#[case] axis: Axis, #[case] theta: f64, #[case] phi: f64) {
    let (mut l, _) = homed();
    let before = l.transport().frames().len();
    let err = l.move_abs(theta, phi).unwrap_err();
    match kind(&err) {
        Some(LauncherError::OutOfBounds { axis: a, .. }) => assert_eq!(*a, axis),
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(l.transport().frames().len(), before);
}

#[rstest]
#[case(f64::NAN, 0.0)]
#[case(0.0, f64::INFINITY)]
fn non_finite_moves_are_invalid(#[case] dt: f64, #[case] dp: f64) {
    let (mut l, _) = homed();
    assert!(matches!(
        kind(&l.move_rel(dt, dp).unwrap_err()),
        Some(LauncherError::InvalidArgument(_))
    ));
    assert!(matches!(
        kind(&l.move_abs(dt, dp).unwrap_err()),
        Some(LauncherError::InvalidArgument(_))
    ));
}

#[test]
fn estimate_is_monotone_while_moving_and_exact_at_limit() {
    let (mut l, clock) = homed();
    l.move_cmd(Command::DOWN).unwrap();
    let mut last = 0.0;
    loop {
        clock.advance(Duration::from_millis(70));
        let status = l.update_status().unwrap();
        let theta = l.position().unwrap().theta;
        assert!(theta >= last && theta <= 180.0, "{theta} after {last}");
        last = theta;
        if status.is_idle() {
            break;
        }
        assert_eq!(l.activity(), Activity::Moving(Axis::Theta, launcher_core::Direction::Positive));
    }
    assert_eq!(last, 180.0);
    assert_eq!(l.activity(), Activity::Idle);
}

#[test]
fn limit_snap_corrects_a_wrong_speed() {
    let (mut l, _) = homed();
    // Believe phi is twice as slow as it is.
    l.set_speeds(
        AxisSpeed::new(30.0, 45.0).unwrap(),
        AxisSpeed::new(7.5, 15.0).unwrap(),
    )
    .unwrap();
    l.move_home(Command::LEFT).unwrap();
    assert_eq!(l.position().unwrap().phi, 300.0);
}

#[test]
fn fire_waits_for_the_cycle_and_stops() {
    let (mut l, clock) = homed();
    let t0 = clock.elapsed();
    l.fire().unwrap();
    let took = clock.elapsed() - t0;
    assert!(took >= Duration::from_secs(5) && took <= Duration::from_millis(5010));
    let cmds = l.transport().commands();
    assert_eq!(&cmds[cmds.len() - 2..], &[opcode::FIRE, opcode::STOP]);
}

#[rstest]
#[case(Duration::from_millis(5500), FireOutcome::Completed)]
#[case(Duration::from_secs(2), FireOutcome::TimedOut)]
fn fire_timeout_outcomes(#[case] timeout: Duration, #[case] expected: FireOutcome) {
    let (mut l, clock) = homed();
    let t0 = clock.elapsed();
    assert_eq!(l.fire_timeout(timeout).unwrap(), expected);
    assert!(clock.elapsed() - t0 <= timeout);
    let cmds = l.transport().commands();
    assert_eq!(&cmds[cmds.len() - 2..], &[opcode::FIRE, opcode::STOP]);
    assert_eq!(l.activity(), Activity::Idle);
}

#[test]
fn stop_flag_cancels_and_leaves_device_stopped() {
    let (mut l, _) = homed();
    l.request_stop();
    let err = l.move_home(Command::DOWN).unwrap_err();
    assert_eq!(kind(&err), Some(&LauncherError::Cancelled));
    let cmds = l.transport().commands();
    assert_eq!(&cmds[cmds.len() - 2..], &[opcode::DOWN, opcode::STOP]);

    // Stays cancelled until re-armed.
    assert!(l.stop_requested());
    assert!(l.fire_timeout(Duration::from_secs(1)).is_err());
    l.clear_stop();
    l.move_home(Command::DOWN).expect("re-armed");
    assert_eq!(l.position().unwrap().theta, 180.0);
}

#[test]
fn shared_stop_flag_is_observed() {
    let (mut l, _) = homed();
    let flag = l.stop_flag();
    flag.store(true, std::sync::atomic::Ordering::Relaxed);
    let err = l.move_timed(Command::LEFT, Duration::from_secs(1)).unwrap_err();
    assert_eq!(kind(&err), Some(&LauncherError::Cancelled));
}

#[test]
fn wait_gives_up_after_max_motion() {
    let (mut l, _) = rig_with(TimingCfg {
        poll: Duration::from_millis(10),
        max_motion: Duration::from_secs(1),
    });
    let err = l.move_home(Command::LEFT).unwrap_err();
    assert_eq!(kind(&err), Some(&LauncherError::MotionTimeout(Duration::from_secs(1))));
    assert_eq!(l.transport().commands().last(), Some(&opcode::STOP));
}

#[test]
fn transport_timeout_surfaces_after_stop() {
    let (mut l, _) = homed();
    l.transport_mut().set_fail_reads(true);
    let err = l.move_home(Command::DOWN).unwrap_err();
    assert_eq!(kind(&err), Some(&LauncherError::ProtocolTimeout));
    assert_eq!(l.transport().commands().last(), Some(&opcode::STOP));
}

#[test]
fn move_home_rejects_non_motion_commands() {
    let (mut l, _) = homed();
    assert!(matches!(
        kind(&l.move_home(Command::FIRE).unwrap_err()),
        Some(LauncherError::InvalidArgument(_))
    ));
}

#[test]
fn reports_describe_state() {
    let (l, _) = homed();
    let pos = l.describe_position();
    assert!(pos.contains("theta"), "{pos}");
    assert!(pos.contains("[0.00, 300.00]"), "{pos}");
    let motion = l.describe_motion();
    assert!(motion.contains("+30.000 / -45.000 deg/s"), "{motion}");
    assert!(motion.contains("poll 10 ms"), "{motion}");
}

#[test]
fn snapshot_is_a_copy() {
    let (mut l, _) = homed();
    let snap = l.snapshot();
    l.move_rel(30.0, 0.0).unwrap();
    assert_eq!(snap.theta, Some(0.0));
    assert_ne!(l.snapshot().theta, snap.theta);
    assert_eq!(snap.calibration, CalibrationState::Calibrated);
}
