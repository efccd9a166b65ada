//! Diagnostic events attached to decoded packages.
//!
//! Events are data, not failures: a package whose producer reported errors
//! still decodes successfully and carries those errors here.

use std::fmt;

use crate::model::Location;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Error,
    Warning,
    Info,
    Progress,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EventKind::Error => "ERROR",
            EventKind::Warning => "WARNING",
            EventKind::Info => "INFO",
            EventKind::Progress => "PROGRESS",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub kind: EventKind,
    pub location: Option<Location>,
    pub message: String,
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.location {
            Some(loc) => write!(f, "{}: {}: {}", self.kind, loc, self.message),
            None => write!(f, "{}: {}", self.kind, self.message),
        }
    }
}

/// Receiver of diagnostic events.
pub trait EventHandler {
    fn handle(&mut self, event: Event);

    fn error(&mut self, location: Option<Location>, message: impl Into<String>)
    where
        Self: Sized,
    {
        self.handle(Event {
            kind: EventKind::Error,
            location,
            message: message.into(),
        });
    }

    fn warn(&mut self, location: Option<Location>, message: impl Into<String>)
    where
        Self: Sized,
    {
        self.handle(Event {
            kind: EventKind::Warning,
            location,
            message: message.into(),
        });
    }

    fn info(&mut self, location: Option<Location>, message: impl Into<String>)
    where
        Self: Sized,
    {
        self.handle(Event {
            kind: EventKind::Info,
            location,
            message: message.into(),
        });
    }

    fn progress(&mut self, location: Option<Location>, message: impl Into<String>)
    where
        Self: Sized,
    {
        self.handle(Event {
            kind: EventKind::Progress,
            location,
            message: message.into(),
        });
    }
}

/// Append-only event store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventCollector {
    events: Vec<Event>,
}

impl EventCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// All events in the order they were recorded.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Events of one kind.
    pub fn of_kind(&self, kind: EventKind) -> impl Iterator<Item = &Event> {
        self.events.iter().filter(move |e| e.kind == kind)
    }

    /// True if any error event was recorded.
    pub fn has_errors(&self) -> bool {
        self.events.iter().any(|e| e.kind == EventKind::Error)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn into_events(self) -> Vec<Event> {
        self.events
    }
}

impl EventHandler for EventCollector {
    fn handle(&mut self, event: Event) {
        self.events.push(event);
    }
}
