//! In-memory Render Target
//!
//! Applies patches to a [`MemoryDom`]. Every element carries its path id in
//! the correlation attribute; text nodes are correlated through the same
//! path map.

use std::cell::{Ref, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;

use recon_dom::{
    DispatchReport, Event, EventDispatcher, EventKind, HandlerRepository, Node, NodePath, Patch,
    RenderTarget, TargetError, Value, TEXT_ATTRIBUTE,
};

use crate::dom::{DomData, DomId, MemoryDom, MutationRecord, MutationType};

/// Map an element property to its DOM attribute name
fn dom_attribute(property: &str) -> &str {
    match property {
        "className" => "class",
        other => other,
    }
}

#[derive(Debug, Default)]
struct Mount {
    dispatcher: Option<EventDispatcher>,
}

/// Clonable handle over an in-memory DOM
///
/// Hand one clone to a renderer and keep another to inspect the output and
/// fire events.
#[derive(Debug, Clone, Default)]
pub struct MemoryTarget {
    dom: Rc<RefCell<MemoryDom>>,
    mount: Rc<RefCell<Mount>>,
}

impl MemoryTarget {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `name` instead of `data-recon-id` as the correlation attribute
    pub fn with_id_attribute(self, name: &str) -> Self {
        self.dom.borrow_mut().set_id_attribute(name);
        self
    }

    /// Read access to the live DOM
    pub fn dom(&self) -> Ref<'_, MemoryDom> {
        self.dom.borrow()
    }

    pub fn to_html(&self) -> String {
        self.dom.borrow().to_html()
    }

    /// Live node materialized for `path`
    pub fn find(&self, path: &NodePath) -> Option<DomId> {
        self.dom.borrow().find(path)
    }

    pub fn take_records(&self) -> Vec<MutationRecord> {
        self.dom.borrow_mut().take_records()
    }

    /// Fire a native event of `kind` at the live node `target`.
    ///
    /// Resolves the node's path id and hands the event to the root listener.
    /// No DOM borrow is held while handlers run.
    pub fn dispatch(
        &self,
        kind: EventKind,
        target: DomId,
    ) -> Result<DispatchReport, TargetError> {
        let (attached, path) = {
            let dom = self.dom.borrow();
            let path = dom.get(target).and_then(|node| node.path.clone());
            (dom.listeners().contains(&kind), path)
        };
        let dispatcher = self.mount.borrow().dispatcher.clone().ok_or(TargetError::NotMounted)?;

        if !attached {
            tracing::trace!("No {} listener attached, ignoring event", kind);
            return Ok(DispatchReport::default());
        }
        Ok(dispatcher.dispatch(&Event::new(kind, path))?)
    }

    /// Fire a click at the live node materialized for `path`
    pub fn click(&self, path: &NodePath) -> Result<DispatchReport, TargetError> {
        let target = self
            .find(path)
            .ok_or_else(|| TargetError::MissingCorrelation(path.clone()))?;
        self.dispatch(EventKind::Click, target)
    }

    fn correlate(dom: &MemoryDom, path: &NodePath) -> Result<DomId, TargetError> {
        dom.find(path).ok_or_else(|| TargetError::MissingCorrelation(path.clone()))
    }

    /// DOM attributes for an element node; event and opaque values are not written
    fn attributes(dom: &MemoryDom, node: &Node) -> BTreeMap<String, String> {
        let mut attributes: BTreeMap<String, String> = node
            .attributes()
            .iter()
            .filter(|(key, _)| EventKind::from_property(key).is_none())
            .filter_map(|(key, value)| {
                Some((dom_attribute(key).to_string(), value.to_attribute()?))
            })
            .collect();
        attributes.insert(dom.id_attribute().to_string(), node.id().to_string());
        attributes
    }

    /// Materialize the subtree at `node` under `parent`
    fn materialize(
        dom: &mut MemoryDom,
        node: &Node,
        parent: DomId,
        index: Option<usize>,
        handlers: &mut HandlerRepository,
    ) -> Result<DomId, TargetError> {
        let data = if node.is_text() {
            DomData::Text(Self::text_of(node))
        } else {
            DomData::Element {
                tag: node.tag().to_string(),
                attributes: Self::attributes(dom, node),
            }
        };
        let id = dom
            .alloc(data, node.id().clone())
            .ok_or(TargetError::CapacityExceeded(dom.len()))?;
        dom.attach(parent, id, index);
        handlers.register(node.id(), node.attributes());

        for child in node.children() {
            Self::materialize(dom, child, id, None, handlers)?;
        }
        Ok(id)
    }

    /// Literal content of a text leaf
    fn text_of(node: &Node) -> String {
        node.attributes()
            .get(TEXT_ATTRIBUTE)
            .and_then(Value::to_attribute)
            .unwrap_or_default()
    }

    /// Detach the subtree at `id` and drop its correlations and handlers
    fn discard(
        dom: &mut MemoryDom,
        id: DomId,
        path: &NodePath,
        handlers: &mut HandlerRepository,
    ) -> Option<(DomId, usize)> {
        let position = dom.detach(id);
        dom.forget_subtree(id);
        let dropped = handlers.unregister_subtree(path);
        if dropped > 0 {
            tracing::trace!("Unregistered {} handler(s) under {}", dropped, path);
        }
        position
    }
}

impl RenderTarget for MemoryTarget {
    fn mount(
        &mut self,
        dispatcher: EventDispatcher,
        events: &[EventKind],
    ) -> Result<(), TargetError> {
        let mut dom = self.dom.try_borrow_mut().map_err(|e| TargetError::Other(e.into()))?;
        dom.listeners = events.to_vec();
        self.mount.borrow_mut().dispatcher = Some(dispatcher);
        tracing::debug!("Mounted with {} root listener(s)", events.len());
        Ok(())
    }

    fn apply(
        &mut self,
        patch: &Patch,
        handlers: &mut HandlerRepository,
    ) -> Result<(), TargetError> {
        let mut dom = self.dom.try_borrow_mut().map_err(|e| TargetError::Other(e.into()))?;
        tracing::trace!("Applying {}", patch);

        match patch {
            Patch::Create { parent, node } => {
                let parent_id = match parent {
                    Some(parent) => Self::correlate(&dom, parent.id())?,
                    None => DomId::ROOT,
                };
                let id = Self::materialize(&mut dom, node, parent_id, None, handlers)?;
                dom.push_record(MutationType::ChildList, parent_id).added_nodes.push(id);
            }
            Patch::Remove { node } => {
                let id = Self::correlate(&dom, node.id())?;
                let parent_id =
                    Self::discard(&mut dom, id, node.id(), handlers).map(|(parent, _)| parent);
                dom.push_record(MutationType::ChildList, parent_id.unwrap_or(DomId::ROOT))
                    .removed_nodes
                    .push(id);
            }
            Patch::Replace { replacing, node } => {
                let old = Self::correlate(&dom, replacing.id())?;
                let (parent_id, index) = Self::discard(&mut dom, old, replacing.id(), handlers)
                    .ok_or_else(|| TargetError::MissingCorrelation(replacing.id().clone()))?;
                let id = Self::materialize(&mut dom, node, parent_id, Some(index), handlers)?;
                let record = dom.push_record(MutationType::ChildList, parent_id);
                record.removed_nodes.push(old);
                record.added_nodes.push(id);
            }
            Patch::ReplaceAttributes { replacing, node, .. } => {
                let id = Self::correlate(&dom, replacing.id())?;
                let attributes = if node.is_text() {
                    None
                } else {
                    Some(Self::attributes(&dom, node))
                };
                let live = dom
                    .get_mut(id)
                    .ok_or_else(|| TargetError::MissingCorrelation(replacing.id().clone()))?;

                let mutation_type = match (&mut live.data, attributes) {
                    (DomData::Text(content), None) => {
                        *content = Self::text_of(node);
                        MutationType::CharacterData
                    }
                    (DomData::Element { attributes: live, .. }, Some(attributes)) => {
                        *live = attributes;
                        MutationType::Attributes
                    }
                    _ => return Err(TargetError::MissingCorrelation(replacing.id().clone())),
                };
                handlers.register(node.id(), node.attributes());
                dom.push_record(mutation_type, id);
            }
            other => return Err(TargetError::UnhandledPatchKind(other.kind().to_string())),
        }
        Ok(())
    }
}
