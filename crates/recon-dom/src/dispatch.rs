//! Event Delegation
//!
//! One root listener per event kind. A native event is resolved to the path
//! id of its target; the dispatcher walks the bubble path (target first, root
//! last) and runs every handler registered for the kind along the way.

use std::cell::RefCell;
use std::rc::Rc;

use crate::events::{Event, HandlerRepository, Propagation};
use crate::path::NodePath;

/// Dispatch errors
#[derive(Debug, thiserror::Error)]
pub enum EventError {
    #[error("Handler for {event} at {path} failed")]
    Handler {
        event: &'static str,
        path: NodePath,
        #[source]
        source: anyhow::Error,
    },

    #[error("Handler repository is busy")]
    RepositoryBusy,
}

/// Result of one dispatch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Handlers invoked
    pub invoked: usize,
    /// A handler stopped propagation
    pub stopped: bool,
}

/// Root listener shared by every attached event kind
#[derive(Debug, Clone, Default)]
pub struct EventDispatcher {
    handlers: Rc<RefCell<HandlerRepository>>,
}

impl EventDispatcher {
    pub fn new(handlers: Rc<RefCell<HandlerRepository>>) -> Self {
        Self { handlers }
    }

    /// Repository this dispatcher reads
    pub fn handlers(&self) -> &Rc<RefCell<HandlerRepository>> {
        &self.handlers
    }

    /// Route `event` through the handlers along its bubble path.
    ///
    /// No-op when the event target carries no path id. The repository is
    /// not borrowed while a handler runs, so handlers may re-render.
    pub fn dispatch(&self, event: &Event) -> Result<DispatchReport, EventError> {
        let mut report = DispatchReport::default();
        let Some(target) = &event.target else {
            return Ok(report);
        };

        let mut propagation = Propagation::default();
        for path in target.bubble_path() {
            if propagation.is_stopped() {
                break;
            }

            let handler = {
                let handlers = self.handlers.try_borrow().map_err(|_| EventError::RepositoryBusy)?;
                handlers.get(&path, event.kind).cloned()
            };
            let Some(handler) = handler else {
                continue;
            };

            tracing::trace!("Dispatching {} to {}", event.kind, path);
            let mut local = event.clone();
            local.current_target = Some(path.clone());
            handler
                .call(&local, &mut propagation)
                .map_err(|source| EventError::Handler {
                    event: event.kind.name(),
                    path: path.clone(),
                    source,
                })?;
            report.invoked += 1;
        }

        report.stopped = propagation.is_stopped();
        tracing::debug!(
            "Dispatched {} at {}: {} handler(s), stopped: {}",
            event.kind,
            target,
            report.invoked,
            report.stopped
        );
        Ok(report)
    }
}
