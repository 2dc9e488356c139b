//! Materialized DOM (arena-based allocation)
//!
//! Live nodes produced by patch application. A removed subtree is detached
//! from its parent and dropped from the path correlation map. Its slots stay
//! readable until the mutation records naming them are taken, then they are
//! recycled by later allocations.

use std::collections::{BTreeMap, HashMap};
use std::fmt::Write as _;

use recon_dom::{EventKind, NodePath};

/// Default correlation attribute written on every element
pub const DEFAULT_ID_ATTRIBUTE: &str = "data-recon-id";

/// Live node identifier (index into arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DomId(pub(crate) u32);

impl DomId {
    /// Mount node, parent of the rendered root
    pub const ROOT: DomId = DomId(0);

    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

/// Live node payload
#[derive(Debug, Clone, PartialEq)]
pub enum DomData {
    /// Mount point
    Root,
    Element {
        tag: String,
        attributes: BTreeMap<String, String>,
    },
    Text(String),
}

/// Live node
#[derive(Debug, Clone)]
pub struct DomNode {
    pub data: DomData,
    pub parent: Option<DomId>,
    pub children: Vec<DomId>,
    /// Path id of the resolved node this was materialized from
    pub path: Option<NodePath>,
}

impl DomNode {
    fn new(data: DomData, path: Option<NodePath>) -> Self {
        Self {
            data,
            parent: None,
            children: Vec::new(),
            path,
        }
    }

    pub fn tag(&self) -> Option<&str> {
        match &self.data {
            DomData::Element { tag, .. } => Some(tag),
            _ => None,
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        match &self.data {
            DomData::Element { attributes, .. } => attributes.get(name).map(String::as_str),
            _ => None,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match &self.data {
            DomData::Text(content) => Some(content),
            _ => None,
        }
    }
}

/// Mutation record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationRecord {
    pub mutation_type: MutationType,
    pub target: DomId,
    pub added_nodes: Vec<DomId>,
    pub removed_nodes: Vec<DomId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationType {
    Attributes,
    CharacterData,
    ChildList,
}

/// Arena of live nodes plus the path correlation map
#[derive(Debug)]
pub struct MemoryDom {
    nodes: Vec<DomNode>,
    by_path: HashMap<NodePath, DomId>,
    records: Vec<MutationRecord>,
    /// Slots of removed nodes still named by pending records
    retired: Vec<DomId>,
    /// Slots ready for reuse
    free: Vec<DomId>,
    id_attribute: String,
    pub(crate) listeners: Vec<EventKind>,
}

impl Default for MemoryDom {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDom {
    /// Empty DOM holding only the mount node
    pub fn new() -> Self {
        Self {
            nodes: vec![DomNode::new(DomData::Root, None)],
            by_path: HashMap::new(),
            records: Vec::new(),
            retired: Vec::new(),
            free: Vec::new(),
            id_attribute: DEFAULT_ID_ATTRIBUTE.to_string(),
            listeners: Vec::new(),
        }
    }

    pub(crate) fn set_id_attribute(&mut self, name: &str) {
        self.id_attribute = name.to_string();
    }

    /// Correlation attribute name
    pub fn id_attribute(&self) -> &str {
        &self.id_attribute
    }

    pub fn get(&self, id: DomId) -> Option<&DomNode> {
        self.nodes.get(id.index())
    }

    /// Live node materialized for `path`
    pub fn find(&self, path: &NodePath) -> Option<DomId> {
        self.by_path.get(path).copied()
    }

    /// Children of `id`, empty when unknown
    pub fn children(&self, id: DomId) -> &[DomId] {
        self.get(id).map(|node| node.children.as_slice()).unwrap_or_default()
    }

    /// Event kinds with an attached root listener
    pub fn listeners(&self) -> &[EventKind] {
        &self.listeners
    }

    /// Nodes reachable from the mount node, mount node excluded
    pub fn live_count(&self) -> usize {
        self.by_path.len()
    }

    /// Allocated slots, mount node and not yet recycled nodes included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// Drain pending mutation records and release the slots they named
    pub fn take_records(&mut self) -> Vec<MutationRecord> {
        self.free.append(&mut self.retired);
        std::mem::take(&mut self.records)
    }

    pub(crate) fn push_record(
        &mut self,
        mutation_type: MutationType,
        target: DomId,
    ) -> &mut MutationRecord {
        self.records.push(MutationRecord {
            mutation_type,
            target,
            added_nodes: Vec::new(),
            removed_nodes: Vec::new(),
        });
        let last = self.records.len() - 1;
        &mut self.records[last]
    }

    /// Allocate a detached node, correlating it with its path.
    ///
    /// Recycles a released slot when one is available; `None` once the
    /// arena holds `u32::MAX` slots.
    pub(crate) fn alloc(&mut self, data: DomData, path: NodePath) -> Option<DomId> {
        let node = DomNode::new(data, Some(path.clone()));
        let id = match self.free.pop() {
            Some(id) => {
                *self.nodes.get_mut(id.index())? = node;
                id
            }
            None => {
                let id = DomId(u32::try_from(self.nodes.len()).ok()?);
                self.nodes.push(node);
                id
            }
        };
        self.by_path.insert(path, id);
        Some(id)
    }

    pub(crate) fn get_mut(&mut self, id: DomId) -> Option<&mut DomNode> {
        self.nodes.get_mut(id.index())
    }

    /// Attach `child` under `parent` at `index`, appending when `None`
    pub(crate) fn attach(&mut self, parent: DomId, child: DomId, index: Option<usize>) {
        if let Some(node) = self.nodes.get_mut(parent.index()) {
            match index {
                Some(index) if index <= node.children.len() => node.children.insert(index, child),
                _ => node.children.push(child),
            }
        }
        if let Some(node) = self.nodes.get_mut(child.index()) {
            node.parent = Some(parent);
        }
    }

    /// Detach `id` from its parent, returning the parent and former index
    pub(crate) fn detach(&mut self, id: DomId) -> Option<(DomId, usize)> {
        let parent = self.nodes.get_mut(id.index())?.parent.take()?;
        let siblings = &mut self.nodes.get_mut(parent.index())?.children;
        let index = siblings.iter().position(|&child| child == id)?;
        siblings.remove(index);
        Some((parent, index))
    }

    /// Drop the path correlation of every node in the subtree at `id` and
    /// retire its slots
    pub(crate) fn forget_subtree(&mut self, id: DomId) {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(node) = self.nodes.get(current.index()) else {
                continue;
            };
            if let Some(path) = &node.path {
                if self.by_path.get(path) == Some(&current) {
                    self.by_path.remove(path);
                }
            }
            stack.extend(node.children.iter().copied());
            if current != DomId::ROOT {
                self.retired.push(current);
            }
        }
    }

    /// Serialize the children of the mount node
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        for &child in self.children(DomId::ROOT) {
            self.write_html(child, &mut out);
        }
        out
    }

    fn write_html(&self, id: DomId, out: &mut String) {
        let Some(node) = self.get(id) else {
            return;
        };
        match &node.data {
            DomData::Root => {}
            DomData::Text(content) => out.push_str(&escape(content)),
            DomData::Element { tag, attributes } => {
                out.push('<');
                out.push_str(tag);
                for (name, value) in attributes {
                    let _ = write!(out, " {}=\"{}\"", name, escape(value));
                }
                out.push('>');
                for &child in &node.children {
                    self.write_html(child, out);
                }
                let _ = write!(out, "</{}>", tag);
            }
        }
    }
}

fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            c => out.push(c),
        }
    }
    out
}
