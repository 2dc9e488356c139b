//! Patch Protocol
//!
//! Atomic render-target mutations produced by the differ, in pre-order.
//! Patches reference nodes, not indices.

use std::fmt;
use std::rc::Rc;

use crate::node::Node;
use crate::path::NodePath;

/// Render-target mutation
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum Patch {
    /// Materialize `node` and its whole subtree under `parent` (the mount
    /// point when `None`)
    Create {
        parent: Option<Rc<Node>>,
        node: Rc<Node>,
    },
    /// Detach `node` and its subtree
    Remove { node: Rc<Node> },
    /// Swap the subtree of `replacing` for the subtree of `node`
    Replace {
        replacing: Rc<Node>,
        node: Rc<Node>,
    },
    /// Replace the whole attribute set of `replacing` with that of `node`
    ReplaceAttributes {
        parent: Option<Rc<Node>>,
        replacing: Rc<Node>,
        node: Rc<Node>,
    },
}

/// Patch discriminant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum PatchKind {
    Create,
    Remove,
    Replace,
    ReplaceAttributes,
}

impl PatchKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PatchKind::Create => "create",
            PatchKind::Remove => "remove",
            PatchKind::Replace => "replace",
            PatchKind::ReplaceAttributes => "replaceAttributes",
        }
    }
}

impl fmt::Display for PatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Patch {
    pub fn kind(&self) -> PatchKind {
        match self {
            Patch::Create { .. } => PatchKind::Create,
            Patch::Remove { .. } => PatchKind::Remove,
            Patch::Replace { .. } => PatchKind::Replace,
            Patch::ReplaceAttributes { .. } => PatchKind::ReplaceAttributes,
        }
    }

    /// The node the patch materializes or removes
    pub fn node(&self) -> &Rc<Node> {
        match self {
            Patch::Create { node, .. }
            | Patch::Remove { node }
            | Patch::Replace { node, .. }
            | Patch::ReplaceAttributes { node, .. } => node,
        }
    }

    /// Path id the patch is addressed to
    pub fn target(&self) -> &NodePath {
        self.node().id()
    }
}

impl fmt::Display for Patch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} <{}>", self.kind(), self.target(), self.node().tag())
    }
}
