//! Recon Render - In-memory render target
//!
//! Materializes patch streams into an arena DOM that can be serialized,
//! queried and used to fire delegated events.

mod dom;
mod target;

pub use dom::{
    DomData, DomId, DomNode, MemoryDom, MutationRecord, MutationType, DEFAULT_ID_ATTRIBUTE,
};
pub use target::MemoryTarget;
