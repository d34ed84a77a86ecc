//! Cache hit / miss reporting.
//!
//! A memo that was built with a label reports every invocation to its sink. The sink is a plain
//! callback, so tests can record events and applications can route them wherever they like.
//! [`trace`] is the sink installed by [`Builder::debug`](crate::Builder::debug).

use std::{fmt, rc::Rc};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum EventKind {
    /// The dependencies changed (or there were none cached yet) and the value was recomputed.
    Computed,
    /// The dependencies were equal to the snapshot, the cached value was returned.
    Cached,
}

#[derive(Debug)]
pub struct Event<'a, T> {
    pub kind: EventKind,
    pub label: &'a str,
    pub value: &'a T,
}

pub type Sink<T> = Rc<dyn Fn(&Event<'_, T>)>;

/// Logs the event through `tracing` at debug level.
pub fn trace<T: fmt::Debug>(event: &Event<'_, T>) {
    match event.kind {
        EventKind::Computed => {
            tracing::debug!(label = event.label, value = ?event.value, "computed value")
        }
        EventKind::Cached => {
            tracing::debug!(label = event.label, value = ?event.value, "using cached value")
        }
    }
}

pub(crate) struct Diagnostics<T> {
    pub label: String,
    pub sink: Sink<T>,
}

impl<T> Diagnostics<T> {
    pub fn emit(&self, kind: EventKind, value: &T) {
        (self.sink)(&Event {
            kind,
            label: &self.label,
            value,
        })
    }
}
