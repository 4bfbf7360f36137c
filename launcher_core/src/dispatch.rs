//! Deferred actions keyed by a trigger character.
//!
//! A binding owns its arguments; the receiver is handed in when the binding
//! fires, so nothing here holds on to the controller or the input source.

use std::fmt::Write as _;

use crate::calibration::CalibrationReport;
use crate::error::Result;
use crate::status::{FireOutcome, MoveOutcome};

/// What a bound action did.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionOutcome {
    Done,
    Moved(MoveOutcome),
    Fired(FireOutcome),
    Calibrated(CalibrationReport),
    /// Text for the presentation layer.
    Report(String),
    /// The input loop should end.
    Quit,
}

type Action<C> = Box<dyn FnMut(&mut C) -> Result<ActionOutcome>>;

/// A labelled operation on `C`.
pub struct Binding<C> {
    label: String,
    action: Action<C>,
}

impl<C> Binding<C> {
    pub fn label(&self) -> &str {
        &self.label
    }
}

impl<C> core::fmt::Debug for Binding<C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Binding").field("label", &self.label).finish_non_exhaustive()
    }
}

pub struct Dispatcher<C> {
    bindings: Vec<(char, Binding<C>)>,
}

impl<C> Default for Dispatcher<C> {
    fn default() -> Self {
        Self {
            bindings: Vec::new(),
        }
    }
}

impl<C> core::fmt::Debug for Dispatcher<C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_list().entries(self.bindings()).finish()
    }
}

impl<C> Dispatcher<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `op` to `trigger`. A previous binding for the trigger is replaced
    /// in place, keeping its position in the listing.
    pub fn bind<F>(&mut self, trigger: char, label: impl Into<String>, op: F) -> &mut Self
    where
        F: FnMut(&mut C) -> Result<ActionOutcome> + 'static,
    {
        let binding = Binding {
            label: label.into(),
            action: Box::new(op),
        };
        match self.bindings.iter_mut().find(|(t, _)| *t == trigger) {
            Some((_, slot)) => *slot = binding,
            None => self.bindings.push((trigger, binding)),
        }
        self
    }

    /// Run the binding for `trigger`; `None` when nothing is bound.
    pub fn invoke(&mut self, trigger: char, ctx: &mut C) -> Option<Result<ActionOutcome>> {
        let (_, binding) = self.bindings.iter_mut().find(|(t, _)| *t == trigger)?;
        tracing::debug!(%trigger, label = %binding.label, "invoke");
        Some((binding.action)(ctx))
    }

    pub fn contains(&self, trigger: char) -> bool {
        self.bindings.iter().any(|(t, _)| *t == trigger)
    }

    pub fn label(&self, trigger: char) -> Option<&str> {
        self.bindings
            .iter()
            .find(|(t, _)| *t == trigger)
            .map(|(_, b)| b.label())
    }

    /// `(trigger, label)` in insertion order.
    pub fn bindings(&self) -> impl Iterator<Item = (char, &str)> + '_ {
        self.bindings.iter().map(|(t, b)| (*t, b.label()))
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// One `key  label` line per binding.
    pub fn help_text(&self) -> String {
        let mut out = String::new();
        for (t, label) in self.bindings() {
            let key = if t == ' ' { "space".to_string() } else { t.to_string() };
            let _ = writeln!(out, "{key:>5}  {label}");
        }
        out
    }
}
