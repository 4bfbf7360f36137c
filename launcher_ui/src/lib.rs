#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Line-oriented presentation for the interactive launcher console.
//!
//! The controller never talks to this crate; the CLI reads keys here and
//! hands them to a dispatcher.

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};
use std::time::Duration;

use crossbeam_channel as xch;

/// How long `poll_once` waits for a key before reporting none.
pub const DEFAULT_IDLE_WAIT: Duration = Duration::from_millis(100);

/// Input and output surface of an interactive session.
pub trait Presentation {
    fn show_status(&mut self, text: &str) -> io::Result<()>;
    /// Next pending key; `None` when nothing arrived in time.
    fn poll_once(&mut self) -> io::Result<Option<char>>;
    /// Ask for a line of text; `None` when the user gave nothing.
    fn prompt(&mut self, caption: &str) -> io::Result<Option<String>>;
    fn show_help(&mut self, bindings: &[(char, &str)]) -> io::Result<()>;
    /// Input is exhausted; no further keys will arrive.
    fn is_closed(&self) -> bool {
        false
    }
}

/// Result of waiting for one line of input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    Text(String),
    /// Nothing arrived within the wait.
    Idle,
    Eof,
}

/// Where typed lines come from.
pub trait LineSource {
    /// Next line, waiting at most `wait`; `None` waits until one arrives.
    fn next_line(&mut self, wait: Option<Duration>) -> io::Result<Line>;
}

/// Plain readers block until a line arrives and never report `Idle`.
impl<R: BufRead> LineSource for R {
    fn next_line(&mut self, _wait: Option<Duration>) -> io::Result<Line> {
        let mut line = String::new();
        if BufRead::read_line(self, &mut line)? == 0 {
            return Ok(Line::Eof);
        }
        while line.ends_with(['\n', '\r']) {
            line.pop();
        }
        Ok(Line::Text(line))
    }
}

/// Lines read on a background thread, so waiting for a key can time out.
pub struct ThreadedLines {
    rx: xch::Receiver<io::Result<String>>,
}

impl ThreadedLines {
    pub fn spawn<R: BufRead + Send + 'static>(reader: R) -> io::Result<Self> {
        let (tx, rx) = xch::unbounded();
        std::thread::Builder::new()
            .name("console-input".into())
            .spawn(move || {
                for line in reader.lines() {
                    let failed = line.is_err();
                    if tx.send(line).is_err() || failed {
                        break;
                    }
                }
            })?;
        Ok(Self { rx })
    }
}

impl LineSource for ThreadedLines {
    fn next_line(&mut self, wait: Option<Duration>) -> io::Result<Line> {
        let received = match wait {
            Some(w) => match self.rx.recv_timeout(w) {
                Ok(line) => Some(line),
                Err(xch::RecvTimeoutError::Timeout) => return Ok(Line::Idle),
                Err(xch::RecvTimeoutError::Disconnected) => None,
            },
            None => self.rx.recv().ok(),
        };
        match received {
            Some(line) => line.map(Line::Text),
            None => Ok(Line::Eof),
        }
    }
}

/// Keys typed as lines: every character of a line is one key press.
pub struct LineConsole<R, W> {
    input: R,
    output: W,
    pending: VecDeque<char>,
    closed: bool,
    idle_wait: Duration,
}

impl LineConsole<ThreadedLines, io::Stdout> {
    /// Stdin read on its own thread; `poll_once` returns every
    /// [`DEFAULT_IDLE_WAIT`] so the caller can notice a stop request.
    pub fn stdio() -> io::Result<Self> {
        let input = ThreadedLines::spawn(io::BufReader::new(io::stdin()))?;
        Ok(Self::new(input, io::stdout()))
    }
}

impl<R: LineSource, W: Write> LineConsole<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            pending: VecDeque::new(),
            closed: false,
            idle_wait: DEFAULT_IDLE_WAIT,
        }
    }

    pub fn with_idle_wait(mut self, wait: Duration) -> Self {
        self.idle_wait = wait;
        self
    }

    pub fn into_output(self) -> W {
        self.output
    }

    fn read_line(&mut self, wait: Option<Duration>) -> io::Result<Option<String>> {
        match self.input.next_line(wait)? {
            Line::Text(line) => Ok(Some(line)),
            Line::Idle => Ok(None),
            Line::Eof => {
                self.closed = true;
                Ok(None)
            }
        }
    }
}

impl<R: LineSource, W: Write> Presentation for LineConsole<R, W> {
    fn show_status(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.output, "{text}")?;
        self.output.flush()
    }

    fn poll_once(&mut self) -> io::Result<Option<char>> {
        if self.pending.is_empty() && !self.closed {
            let wait = self.idle_wait;
            if let Some(line) = self.read_line(Some(wait))? {
                self.pending.extend(line.chars());
            }
        }
        Ok(self.pending.pop_front())
    }

    fn prompt(&mut self, caption: &str) -> io::Result<Option<String>> {
        write!(self.output, "{caption}: ")?;
        self.output.flush()?;
        // Keys typed ahead on the same line answer the prompt.
        let answer = if self.pending.is_empty() {
            self.read_line(None)?.unwrap_or_default()
        } else {
            self.pending.drain(..).collect()
        };
        let answer = answer.trim();
        Ok((!answer.is_empty()).then(|| answer.to_string()))
    }

    fn show_help(&mut self, bindings: &[(char, &str)]) -> io::Result<()> {
        for (key, label) in bindings {
            let key = if *key == ' ' {
                "space".to_string()
            } else {
                key.to_string()
            };
            writeln!(self.output, "{key:>5}  {label}")?;
        }
        self.output.flush()
    }

    fn is_closed(&self) -> bool {
        self.closed && self.pending.is_empty()
    }
}

/// Parse two finite numbers separated by whitespace and/or a comma.
pub fn parse_pair(s: &str) -> Option<(f64, f64)> {
    let mut it = s
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|p| !p.is_empty())
        .map(str::parse::<f64>);
    let a = it.next()?.ok()?;
    let b = it.next()?.ok()?;
    if it.next().is_some() || !a.is_finite() || !b.is_finite() {
        return None;
    }
    Some((a, b))
}
