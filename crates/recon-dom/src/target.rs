//! Render Target Protocol
//!
//! Patches are applied one by one, in differ order, to whatever holds the
//! live output. The protocol is fixed by the patch kinds; targets decide how
//! a node is realized.

use crate::dispatch::{EventDispatcher, EventError};
use crate::events::{EventKind, HandlerRepository};
use crate::patch::Patch;
use crate::path::NodePath;

/// Render target errors
#[derive(Debug, thiserror::Error)]
pub enum TargetError {
    #[error("Unhandled patch kind: {0}")]
    UnhandledPatchKind(String),

    #[error("No live node correlates with {0}")]
    MissingCorrelation(NodePath),

    #[error("Target is not mounted")]
    NotMounted,

    #[error("Target cannot hold more than {0} nodes")]
    CapacityExceeded(usize),

    #[error(transparent)]
    Dispatch(#[from] EventError),

    #[error("Target failed: {0}")]
    Other(#[source] anyhow::Error),
}

/// Destination of a patch stream
///
/// `apply` keeps `handlers` in sync with the nodes it creates, replaces and
/// removes: a node carrying `on*` properties is registered under its path id.
pub trait RenderTarget {
    /// Install one delegated listener per kind in `events`
    fn mount(
        &mut self,
        dispatcher: EventDispatcher,
        events: &[EventKind],
    ) -> Result<(), TargetError>;

    /// Apply one patch
    fn apply(
        &mut self,
        patch: &Patch,
        handlers: &mut HandlerRepository,
    ) -> Result<(), TargetError>;
}

impl<T: RenderTarget + ?Sized> RenderTarget for Box<T> {
    fn mount(
        &mut self,
        dispatcher: EventDispatcher,
        events: &[EventKind],
    ) -> Result<(), TargetError> {
        (**self).mount(dispatcher, events)
    }

    fn apply(
        &mut self,
        patch: &Patch,
        handlers: &mut HandlerRepository,
    ) -> Result<(), TargetError> {
        (**self).apply(patch, handlers)
    }
}
