//! Synthetic Events
//!
//! Event kinds, handlers, and the path-keyed handler repository written by
//! render targets during patch application.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::path::NodePath;
use crate::value::Props;

/// Supported event kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Click,
}

impl EventKind {
    /// Every supported kind
    pub const ALL: &'static [EventKind] = &[EventKind::Click];

    /// Native event name
    pub fn name(&self) -> &'static str {
        match self {
            EventKind::Click => "click",
        }
    }

    /// Element property carrying the handler
    pub fn property(&self) -> &'static str {
        match self {
            EventKind::Click => "onClick",
        }
    }

    /// Kind registered under an element property, if any
    pub fn from_property(property: &str) -> Option<EventKind> {
        Self::ALL.iter().copied().find(|kind| kind.property() == property)
    }

    pub fn from_name(name: &str) -> Option<EventKind> {
        Self::ALL.iter().copied().find(|kind| kind.name() == name)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Native event as seen by handlers
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub kind: EventKind,
    /// Path id of the node the event targets, if it carries one
    pub target: Option<NodePath>,
    /// Path of the node whose handler is running
    pub current_target: Option<NodePath>,
}

impl Event {
    pub fn new(kind: EventKind, target: Option<NodePath>) -> Self {
        Self {
            kind,
            target,
            current_target: None,
        }
    }

    /// Click targeting `path`
    pub fn click(path: NodePath) -> Self {
        Self::new(EventKind::Click, Some(path))
    }
}

/// Local propagation control for one bubble walk
#[derive(Debug, Default)]
pub struct Propagation {
    stopped: bool,
}

impl Propagation {
    /// Stop walking the bubble path after the current handler
    pub fn stop(&mut self) {
        self.stopped = true;
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }
}

type HandlerFn = dyn Fn(&Event, &mut Propagation) -> anyhow::Result<()>;

/// Shared event handler, compared by identity
#[derive(Clone)]
pub struct EventHandler(Rc<HandlerFn>);

impl EventHandler {
    pub fn new(f: impl Fn(&Event, &mut Propagation) -> anyhow::Result<()> + 'static) -> Self {
        Self(Rc::new(f))
    }

    pub fn call(&self, event: &Event, propagation: &mut Propagation) -> anyhow::Result<()> {
        (self.0)(event, propagation)
    }

    pub fn ptr_eq(&self, other: &EventHandler) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for EventHandler {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for EventHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EventHandler({:p})", Rc::as_ptr(&self.0))
    }
}

/// Handlers registered by render targets, keyed by node path
#[derive(Debug, Default)]
pub struct HandlerRepository {
    entries: HashMap<NodePath, Vec<(EventKind, EventHandler)>>,
}

impl HandlerRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the entry at `path` with the handlers found in `props`.
    /// Returns the number of handlers registered.
    pub fn register(&mut self, path: &NodePath, props: &Props) -> usize {
        let handlers: Vec<(EventKind, EventHandler)> = props
            .iter()
            .filter_map(|(key, value)| {
                Some((EventKind::from_property(key)?, value.as_handler()?.clone()))
            })
            .collect();

        let count = handlers.len();
        if handlers.is_empty() {
            self.entries.remove(path);
        } else {
            tracing::trace!("Registered {} handler(s) at {}", count, path);
            self.entries.insert(path.clone(), handlers);
        }
        count
    }

    /// Drop the entry at `path`
    pub fn unregister(&mut self, path: &NodePath) -> bool {
        self.entries.remove(path).is_some()
    }

    /// Drop every entry at `path` or below it
    pub fn unregister_subtree(&mut self, path: &NodePath) -> usize {
        let before = self.entries.len();
        self.entries.retain(|key, _| !path.is_prefix_of(key));
        before - self.entries.len()
    }

    /// Handler for `kind` at `path`
    pub fn get(&self, path: &NodePath, kind: EventKind) -> Option<&EventHandler> {
        self.entries
            .get(path)?
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, handler)| handler)
    }

    pub fn contains(&self, path: &NodePath) -> bool {
        self.entries.contains_key(path)
    }

    /// Number of paths with at least one handler
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
