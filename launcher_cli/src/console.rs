//! Interactive console: default key bindings and the input loop.

use std::time::Duration;

use launcher_core::error::LauncherError;
use launcher_core::{
    ActionOutcome, Activity, CalibrationReport, Command, Dispatcher, Launcher, Result,
};
use launcher_traits::Transport;
use launcher_ui::{Presentation, parse_pair};
use tracing::{debug, info, warn};

use crate::error_fmt::humanize;

/// Everything a binding may touch.
pub struct Session<T: Transport, P> {
    pub launcher: Launcher<T>,
    pub ui: P,
    pub fire_timeout: Duration,
    help: String,
}

impl<T: Transport, P: Presentation> Session<T, P> {
    pub fn new(launcher: Launcher<T>, ui: P, fire_timeout: Duration) -> Self {
        Self {
            launcher,
            ui,
            fire_timeout,
            help: String::new(),
        }
    }

    pub fn into_launcher(self) -> Launcher<T> {
        self.launcher
    }

    /// Prompt for two numbers; `None` when the answer is missing or malformed.
    fn ask_pair(&mut self, caption: &str) -> Result<Option<(f64, f64)>> {
        let answer = self.ui.prompt(caption)?;
        Ok(answer.as_deref().and_then(parse_pair))
    }
}

pub fn format_report(r: &CalibrationReport) -> String {
    let mut out = String::new();
    for a in [r.theta, r.phi] {
        out.push_str(&format!(
            "{:<5} +{:.3} s ({:.3} deg/s)  -{:.3} s ({:.3} deg/s)\n",
            a.axis.name(),
            a.positive_s,
            a.speed.positive,
            a.negative_s,
            a.speed.negative
        ));
    }
    out.pop();
    out
}

fn motion<T, P>(d: &mut Dispatcher<Session<T, P>>, key: char, label: &str, cmd: Command)
where
    T: Transport + 'static,
    P: Presentation + 'static,
{
    d.bind(key, label, move |s: &mut Session<T, P>| {
        s.launcher.move_cmd(cmd)?;
        Ok(ActionOutcome::Done)
    });
}

/// Built-in bindings plus the configured presets.
pub fn default_bindings<T, P>(presets: &[launcher_config::Preset]) -> Dispatcher<Session<T, P>>
where
    T: Transport + 'static,
    P: Presentation + 'static,
{
    let mut d = Dispatcher::new();
    motion(&mut d, 'a', "move left", Command::LEFT);
    motion(&mut d, 'd', "move right", Command::RIGHT);
    motion(&mut d, 'w', "move up", Command::UP);
    motion(&mut d, 's', "move down", Command::DOWN);
    motion(&mut d, ' ', "stop", Command::STOP);
    d.bind('f', "fire", |s: &mut Session<T, P>| {
        s.launcher.fire()?;
        Ok(ActionOutcome::Fired(launcher_core::FireOutcome::Completed))
    })
    .bind('F', "fire with timeout", |s: &mut Session<T, P>| {
        let t = s.fire_timeout;
        Ok(ActionOutcome::Fired(s.launcher.fire_timeout(t)?))
    })
    .bind('E', "send fire command", |s: &mut Session<T, P>| {
        s.launcher.move_cmd(Command::FIRE)?;
        Ok(ActionOutcome::Done)
    })
    .bind('h', "go home", |s: &mut Session<T, P>| {
        s.launcher.go_home()?;
        Ok(ActionOutcome::Report(s.launcher.describe_position()))
    })
    .bind('c', "calibrate", |s: &mut Session<T, P>| {
        Ok(ActionOutcome::Calibrated(s.launcher.calibrate()?))
    })
    .bind('p', "position report", |s: &mut Session<T, P>| {
        Ok(ActionOutcome::Report(s.launcher.describe_position()))
    })
    .bind('m', "motion report", |s: &mut Session<T, P>| {
        Ok(ActionOutcome::Report(s.launcher.describe_motion()))
    })
    .bind('g', "relative move (dtheta dphi)", |s: &mut Session<T, P>| {
        match s.ask_pair("dtheta dphi")? {
            Some((dt, dp)) => Ok(ActionOutcome::Moved(s.launcher.move_rel(dt, dp)?)),
            None => Ok(ActionOutcome::Report("expected two numbers".into())),
        }
    })
    .bind('z', "absolute move (theta phi)", |s: &mut Session<T, P>| {
        match s.ask_pair("theta phi")? {
            Some((t, p)) => Ok(ActionOutcome::Moved(s.launcher.move_abs(t, p)?)),
            None => Ok(ActionOutcome::Report("expected two numbers".into())),
        }
    })
    .bind('?', "help", |s: &mut Session<T, P>| {
        Ok(ActionOutcome::Report(s.help.clone()))
    })
    .bind('q', "quit", |_| Ok(ActionOutcome::Quit));

    for p in presets {
        let (theta, phi) = (p.theta, p.phi);
        d.bind(
            p.key,
            format!("{} ({theta}, {phi})", p.label),
            move |s: &mut Session<T, P>| Ok(ActionOutcome::Moved(s.launcher.move_abs(theta, phi)?)),
        );
    }
    d
}

/// Errors a console user can recover from by pressing another key.
///
/// A failed transfer fails only the action that hit it; the session ends on
/// a stop request or when the device is gone.
fn recoverable(e: &eyre::Report) -> bool {
    matches!(
        e.downcast_ref::<LauncherError>(),
        Some(
            LauncherError::Uncalibrated
                | LauncherError::OutOfBounds { .. }
                | LauncherError::InvalidArgument(_)
                | LauncherError::MotionTimeout(_)
                | LauncherError::CalibrationFailed(_)
                | LauncherError::ProtocolTimeout
                | LauncherError::Hardware(_)
        )
    )
}

/// Read keys until `q`, end of input, or a stop request.
pub fn run<T, P>(session: &mut Session<T, P>, dispatcher: &mut Dispatcher<Session<T, P>>) -> Result<()>
where
    T: Transport,
    P: Presentation,
{
    session.help = dispatcher.help_text();
    let listing: Vec<(char, &str)> = dispatcher.bindings().collect();
    session.ui.show_help(&listing)?;

    loop {
        if session.launcher.stop_requested() {
            info!("stop requested, leaving console");
            break;
        }
        if session.ui.is_closed() {
            break;
        }
        let Some(key) = session.ui.poll_once()? else {
            // Idle: keep the estimate fresh while something runs.
            if session.launcher.activity() != Activity::Idle
                && let Err(e) = session.launcher.update_status()
            {
                if !recoverable(&e) {
                    return Err(e);
                }
                // Halt what we can no longer track; reported once.
                warn!(error = %e, "status refresh failed");
                if let Err(stop) = session.launcher.move_cmd(Command::STOP) {
                    warn!(error = %stop, "stop after failed refresh");
                }
                session.ui.show_status(&humanize(&e))?;
            }
            continue;
        };
        debug!(?key, "key");
        let outcome = match dispatcher.invoke(key, session) {
            None => {
                session
                    .ui
                    .show_status(&format!("unbound key {key:?}, press ? for help"))?;
                continue;
            }
            Some(r) => r,
        };
        match outcome {
            Ok(ActionOutcome::Quit) => break,
            Ok(ActionOutcome::Done) => {}
            Ok(ActionOutcome::Moved(o)) => {
                let text = format!("{o:?}\n{}", session.launcher.describe_position());
                session.ui.show_status(&text)?;
            }
            Ok(ActionOutcome::Fired(o)) => session.ui.show_status(&format!("fire: {o:?}"))?,
            Ok(ActionOutcome::Calibrated(r)) => session.ui.show_status(&format_report(&r))?,
            Ok(ActionOutcome::Report(text)) => session.ui.show_status(&text)?,
            Err(e) if recoverable(&e) => {
                warn!(error = %e, "action failed");
                session.ui.show_status(&humanize(&e))?;
            }
            Err(e) => return Err(e),
        }
    }
    Ok(())
}
