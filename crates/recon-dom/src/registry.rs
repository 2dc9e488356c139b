//! Component Registry & Memoizer
//!
//! Every component gets one memoized wrapper per registry. The wrapper keeps
//! the last properties and last resolved result at each invocation path and
//! skips the render function when the properties are shallow-equal.

use std::collections::HashMap;
use std::rc::Rc;

use crate::component::{Component, ComponentId};
use crate::element::Element;
use crate::node::Node;
use crate::path::NodePath;
use crate::state::Hooks;
use crate::value::Props;

/// Outcome of invoking a memoized component
#[derive(Debug)]
pub enum Invocation {
    /// The render function ran; the element still needs resolving
    Fresh(Element),
    /// Cached result reused verbatim, flagged memoized
    Memoized(Rc<Node>),
}

#[derive(Debug)]
struct CacheEntry {
    props: Props,
    result: Rc<Node>,
}

/// Statistics for one memoized component
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemoStats {
    /// Render function invocations
    pub calls: u64,
    /// Cached results reused
    pub hits: u64,
}

/// Memoized wrapper around one component
#[derive(Debug)]
pub struct MemoizedComponent {
    component: Component,
    entries: HashMap<NodePath, CacheEntry>,
    stats: MemoStats,
}

impl MemoizedComponent {
    fn new(component: Component) -> Self {
        Self {
            component,
            entries: HashMap::new(),
            stats: MemoStats::default(),
        }
    }

    /// Invoke at `path` unless the cached result can be reused.
    ///
    /// The cache is reused only when `skip_check` is off, the properties are
    /// shallow-equal to the last ones at `path`, and the cached result is
    /// still the node `previous` rendered there.
    pub fn invoke(
        &mut self,
        path: &NodePath,
        props: &Props,
        skip_check: bool,
        previous: Option<&Rc<Node>>,
        hooks: &mut Hooks<'_>,
    ) -> anyhow::Result<Invocation> {
        if !skip_check {
            if let Some(entry) = self.entries.get(path) {
                let still_rendered = previous.is_some_and(|node| Rc::ptr_eq(node, &entry.result));
                if still_rendered && entry.props.shallow_eq(props) {
                    tracing::trace!("Memo hit for {} at {}", self.component.name(), path);
                    entry.result.set_memoized(true);
                    self.stats.hits += 1;
                    return Ok(Invocation::Memoized(Rc::clone(&entry.result)));
                }
            }
        }

        tracing::trace!("Rendering {} at {}", self.component.name(), path);
        self.stats.calls += 1;
        let element = self.component.call(props, hooks)?;
        Ok(Invocation::Fresh(element))
    }

    /// Record the resolved result of a fresh invocation
    pub fn store(&mut self, path: &NodePath, props: Props, result: Rc<Node>) {
        self.entries.insert(path.clone(), CacheEntry { props, result });
    }

    pub fn component(&self) -> &Component {
        &self.component
    }

    pub fn stats(&self) -> MemoStats {
        self.stats
    }

    /// Number of cached invocation paths
    pub fn cached_paths(&self) -> usize {
        self.entries.len()
    }
}

/// Memoized wrappers keyed by component identity; never evicts
#[derive(Debug, Default)]
pub struct ComponentRegistry {
    components: HashMap<ComponentId, MemoizedComponent>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrapper for `component`, created on first use
    pub fn get_or_create(&mut self, component: &Component) -> &mut MemoizedComponent {
        self.components
            .entry(component.id())
            .or_insert_with(|| MemoizedComponent::new(component.clone()))
    }

    pub fn get(&self, id: ComponentId) -> Option<&MemoizedComponent> {
        self.components.get(&id)
    }

    /// Statistics for `component`, zero if it never rendered
    pub fn stats(&self, component: &Component) -> MemoStats {
        self.get(component.id()).map(MemoizedComponent::stats).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}
