//! Bindings that drive a real controller.

use std::sync::Arc;
use std::time::Duration;

use launcher_core::{
    ActionOutcome, Command, Dispatcher, FireOutcome, Launcher, LauncherBuilder, MoveOutcome,
};
use launcher_hardware::{SimParams, SimulatedLauncher};
use launcher_traits::{ManualClock, opcode};

fn launcher() -> Launcher<SimulatedLauncher> {
    let clock = ManualClock::new();
    let params = SimParams {
        fire_duration: Duration::from_secs(1),
        ..SimParams::default()
    };
    let sim = SimulatedLauncher::new(params, Arc::new(clock.clone()));
    LauncherBuilder::new()
        .with_transport(sim)
        .with_clock(Arc::new(clock))
        .connect()
        .unwrap()
}

fn bindings() -> Dispatcher<Launcher<SimulatedLauncher>> {
    let mut d = Dispatcher::new();
    d.bind('s', "down", |l: &mut Launcher<SimulatedLauncher>| {
        l.move_cmd(Command::DOWN)?;
        Ok(ActionOutcome::Done)
    })
    .bind(' ', "stop", |l: &mut Launcher<SimulatedLauncher>| {
        l.move_cmd(Command::STOP)?;
        Ok(ActionOutcome::Done)
    })
    .bind('F', "fire (timeout)", move |l: &mut Launcher<SimulatedLauncher>| {
        Ok(ActionOutcome::Fired(l.fire_timeout(Duration::from_secs(2))?))
    })
    .bind('c', "calibrate", |l: &mut Launcher<SimulatedLauncher>| {
        Ok(ActionOutcome::Calibrated(l.calibrate()?))
    })
    .bind('1', "kitchen", |l: &mut Launcher<SimulatedLauncher>| {
        Ok(ActionOutcome::Moved(l.move_abs(65.0, 110.0)?))
    })
    .bind('p', "position", |l: &mut Launcher<SimulatedLauncher>| {
        Ok(ActionOutcome::Report(l.describe_position()))
    })
    .bind('q', "quit", |_| Ok(ActionOutcome::Quit));
    d
}

#[test]
fn keys_drive_the_controller() {
    let mut d = bindings();
    let mut l = launcher();

    d.invoke('s', &mut l).unwrap().unwrap();
    d.invoke(' ', &mut l).unwrap().unwrap();
    assert_eq!(l.transport().commands(), vec![opcode::DOWN, opcode::STOP]);

    assert!(d.invoke('x', &mut l).is_none());
    assert_eq!(l.transport().commands().len(), 2);

    assert_eq!(
        d.invoke('F', &mut l).unwrap().unwrap(),
        ActionOutcome::Fired(FireOutcome::Completed)
    );
    assert_eq!(d.invoke('q', &mut l).unwrap().unwrap(), ActionOutcome::Quit);
}

#[test]
fn preset_needs_calibration_first() {
    let mut d = bindings();
    let mut l = launcher();
    assert!(d.invoke('1', &mut l).unwrap().is_err());

    match d.invoke('c', &mut l).unwrap().unwrap() {
        ActionOutcome::Calibrated(report) => assert!(report.phi.speed.positive > 0.0),
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(
        d.invoke('1', &mut l).unwrap().unwrap(),
        ActionOutcome::Moved(MoveOutcome::Elapsed)
    );
    let pos = l.position().unwrap();
    assert!((pos.theta - 65.0).abs() < 0.5 && (pos.phi - 110.0).abs() < 0.5, "{pos:?}");
    match d.invoke('p', &mut l).unwrap().unwrap() {
        ActionOutcome::Report(text) => assert!(text.contains("theta")),
        other => panic!("unexpected {other:?}"),
    }
}
