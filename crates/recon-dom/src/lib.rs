//! Recon DOM - Element trees and reconciliation
//!
//! Element descriptors, component memoization, local state, the tree
//! builder, the differ and delegated event dispatch.
//!
//! # Example
//! ```rust,ignore
//! use recon_dom::{h, text, diff_trees, ComponentRegistry, Props, TreeBuilder};
//!
//! let mut registry = ComponentRegistry::new();
//! let element = h("p", Props::new(), vec![text("hi")]);
//! let tree = TreeBuilder::new(&mut registry).build(&element, None)?;
//! let patches = diff_trees(None, &tree);
//! ```

mod path;
mod value;
mod events;
mod component;
mod element;
mod node;
mod patch;
mod state;
mod registry;
mod build;
mod diff;
mod dispatch;
mod target;

pub use path::{NodePath, PathParseError, SEPARATOR};
pub use value::{Props, Value};
pub use events::{Event, EventHandler, EventKind, HandlerRepository, Propagation};
pub use component::{Component, ComponentId};
pub use element::{h, text, Element, ElementType, TEXT_ATTRIBUTE, TEXT_TAG};
pub use node::Node;
pub use patch::{Patch, PatchKind};
pub use state::{Hooks, SetState, StateError, StateHost, StateKey, StateRepository};
pub use registry::{ComponentRegistry, Invocation, MemoStats, MemoizedComponent};
pub use build::{BuildError, BuildStats, TreeBuilder, DEFAULT_MAX_DEPTH};
pub use diff::{diff, diff_trees};
pub use dispatch::{DispatchReport, EventDispatcher, EventError};
pub use target::{RenderTarget, TargetError};
