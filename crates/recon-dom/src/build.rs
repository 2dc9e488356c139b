//! Tree Builder
//!
//! Resolves an element tree into a node tree, executing components and
//! assigning positional path ids. Component execution does not consume a
//! path segment: a component's result is resolved at the component's path.

use std::rc::{Rc, Weak};

use crate::element::{Element, ElementType};
use crate::node::Node;
use crate::path::NodePath;
use crate::registry::{ComponentRegistry, Invocation};
use crate::state::{Hooks, StateHost, StateRepository};

/// Default bound on resolution depth
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Build errors; any of them aborts the pass
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Component {component} failed at {path}")]
    Component {
        component: String,
        path: NodePath,
        #[source]
        source: anyhow::Error,
    },

    #[error("Resolution depth exceeded {limit} at {path}")]
    DepthExceeded { path: NodePath, limit: usize },

    #[error("Too many children at {path}: {count}")]
    TooManyChildren { path: NodePath, count: usize },
}

/// Counters for one build
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildStats {
    /// Tag nodes created
    pub nodes: usize,
    /// Component render functions run
    pub renders: usize,
    /// Cached component results reused
    pub memo_hits: usize,
}

/// One build pass over an element tree
pub struct TreeBuilder<'a> {
    registry: &'a mut ComponentRegistry,
    states: Option<&'a mut StateRepository>,
    host: Option<Weak<dyn StateHost>>,
    skip_property_check: bool,
    max_depth: usize,
    stats: BuildStats,
}

impl<'a> TreeBuilder<'a> {
    /// Builder without local state; components calling hooks fail
    pub fn new(registry: &'a mut ComponentRegistry) -> Self {
        Self {
            registry,
            states: None,
            host: None,
            skip_property_check: false,
            max_depth: DEFAULT_MAX_DEPTH,
            stats: BuildStats::default(),
        }
    }

    /// Enable hooks backed by `states`; setters re-render through `host`.
    /// Picks up the repository's force flag.
    pub fn with_states(
        mut self,
        states: &'a mut StateRepository,
        host: Weak<dyn StateHost>,
    ) -> Self {
        self.skip_property_check = states.skip_property_check();
        self.states = Some(states);
        self.host = Some(host);
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Re-execute every component regardless of properties
    pub fn with_skip_property_check(mut self, skip: bool) -> Self {
        self.skip_property_check = skip;
        self
    }

    /// Resolve `element` at the root path. `previous` is the last committed
    /// tree, consulted to validate cached component results.
    pub fn build(
        &mut self,
        element: &Element,
        previous: Option<&Rc<Node>>,
    ) -> Result<Rc<Node>, BuildError> {
        self.resolve(element, &NodePath::root(), previous, 0)
    }

    pub fn stats(&self) -> BuildStats {
        self.stats
    }

    fn resolve(
        &mut self,
        element: &Element,
        path: &NodePath,
        previous: Option<&Rc<Node>>,
        depth: usize,
    ) -> Result<Rc<Node>, BuildError> {
        if depth > self.max_depth {
            return Err(BuildError::DepthExceeded {
                path: path.clone(),
                limit: self.max_depth,
            });
        }

        match element.kind() {
            ElementType::Tag(tag) => {
                let children = element
                    .children()
                    .iter()
                    .enumerate()
                    .map(|(index, child)| {
                        let ordinal =
                            u32::try_from(index).map_err(|_| BuildError::TooManyChildren {
                                path: path.clone(),
                                count: element.children().len(),
                            })?;
                        let previous_child = previous.and_then(|node| node.children().get(index));
                        self.resolve(child, &path.child(ordinal), previous_child, depth + 1)
                    })
                    .collect::<Result<Vec<_>, _>>()?;

                self.stats.nodes += 1;
                Ok(Rc::new(Node::new(
                    Rc::clone(tag),
                    element.props().clone(),
                    children,
                    path.clone(),
                )))
            }
            ElementType::Component(component) => {
                let invocation = {
                    let mut hooks = Hooks::new(
                        path,
                        component.id(),
                        element.children(),
                        self.states.as_deref_mut(),
                        self.host.clone(),
                    );
                    self.registry
                        .get_or_create(component)
                        .invoke(
                            path,
                            element.props(),
                            self.skip_property_check,
                            previous,
                            &mut hooks,
                        )
                        .map_err(|source| BuildError::Component {
                            component: component.name().to_string(),
                            path: path.clone(),
                            source,
                        })?
                };

                match invocation {
                    Invocation::Memoized(node) => {
                        self.stats.memo_hits += 1;
                        Ok(node)
                    }
                    Invocation::Fresh(rendered) => {
                        self.stats.renders += 1;
                        let node = self.resolve(&rendered, path, previous, depth + 1)?;
                        self.registry
                            .get_or_create(component)
                            .store(path, element.props().clone(), Rc::clone(&node));
                        Ok(node)
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::Component;
    use crate::element::{h, text};
    use crate::value::Props;

    #[test]
    fn test_paths_assigned_positionally() {
        let mut registry = ComponentRegistry::new();
        let tree = h(
            "div",
            Props::new(),
            vec![h("ul", Props::new(), vec![text("a"), text("b")]), text("c")],
        );

        let node = TreeBuilder::new(&mut registry).build(&tree, None).unwrap();
        let mut ids = Vec::new();
        node.walk(&mut |n| ids.push(n.id().to_string()));
        assert_eq!(ids, [".", ".0.", ".0.0.", ".0.1.", ".1."]);
    }

    #[test]
    fn test_component_shares_parent_path() {
        let label = Component::new("Label", |props, _| {
            Ok(h("span", Props::new(), vec![text(props.get_str("text").unwrap_or_default())]))
        });
        let mut registry = ComponentRegistry::new();
        let tree = h("div", Props::new(), vec![h(&label, Props::new().with("text", "hi"), vec![])]);

        let node = TreeBuilder::new(&mut registry).build(&tree, None).unwrap();
        let span = &node.children()[0];
        assert_eq!(span.tag(), "span");
        assert_eq!(span.id().to_string(), ".0.");
        assert_eq!(span.children()[0].id().to_string(), ".0.0.");
        assert_eq!(span.children()[0].text_content(), Some("hi"));
    }

    #[test]
    fn test_children_handed_to_component() {
        let frame = Component::new("Frame", |_, hooks| {
            Ok(h("section", Props::new(), hooks.children().to_vec()))
        });
        let mut registry = ComponentRegistry::new();
        let tree = h(&frame, Props::new(), vec![text("inside")]);

        let node = TreeBuilder::new(&mut registry).build(&tree, None).unwrap();
        assert_eq!(node.tag(), "section");
        assert_eq!(node.children()[0].text_content(), Some("inside"));
        assert_eq!(node.children()[0].id().to_string(), ".0.");
    }

    #[test]
    fn test_memoized_result_reused() {
        let view = Component::new("View", |_, _| Ok(h("p", Props::new(), vec![text("x")])));
        let mut registry = ComponentRegistry::new();
        let tree = h("div", Props::new(), vec![h(&view, Props::new(), vec![])]);

        let first = TreeBuilder::new(&mut registry).build(&tree, None).unwrap();
        let mut builder = TreeBuilder::new(&mut registry);
        let second = builder.build(&tree, Some(&first)).unwrap();

        assert!(Rc::ptr_eq(&first.children()[0], &second.children()[0]));
        assert!(second.children()[0].is_memoized());
        assert!(!second.is_memoized());
        assert_eq!(builder.stats(), BuildStats { nodes: 1, renders: 0, memo_hits: 1 });
    }

    #[test]
    fn test_skip_property_check_forces_render() {
        let view = Component::new("View", |_, _| Ok(text("x")));
        let mut registry = ComponentRegistry::new();
        let tree = h(&view, Props::new(), vec![]);

        let first = TreeBuilder::new(&mut registry).build(&tree, None).unwrap();
        let mut builder = TreeBuilder::new(&mut registry).with_skip_property_check(true);
        let second = builder.build(&tree, Some(&first)).unwrap();

        assert!(!Rc::ptr_eq(&first, &second));
        assert!(!second.is_memoized());
        assert_eq!(builder.stats().renders, 1);
    }

    #[test]
    fn test_component_error_carries_path() {
        let broken = Component::new("Broken", |_, _| anyhow::bail!("no data"));
        let mut registry = ComponentRegistry::new();
        let tree = h("div", Props::new(), vec![text("ok"), h(&broken, Props::new(), vec![])]);

        let err = TreeBuilder::new(&mut registry).build(&tree, None).unwrap_err();
        match err {
            BuildError::Component { component, path, source } => {
                assert_eq!(component, "Broken");
                assert_eq!(path.to_string(), ".1.");
                assert_eq!(source.to_string(), "no data");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_self_rendering_component_hits_depth_limit() {
        use std::cell::RefCell;

        let slot: Rc<RefCell<Option<Component>>> = Rc::new(RefCell::new(None));
        let inner = slot.clone();
        let looping = Component::new("Loop", move |_, _| {
            let me = inner.borrow().clone().ok_or_else(|| anyhow::anyhow!("unset"))?;
            Ok(h(&me, Props::new(), vec![]))
        });
        *slot.borrow_mut() = Some(looping.clone());

        let mut registry = ComponentRegistry::new();
        let err = TreeBuilder::new(&mut registry)
            .with_max_depth(16)
            .build(&h(&looping, Props::new(), vec![]), None)
            .unwrap_err();
        assert!(matches!(err, BuildError::DepthExceeded { limit: 16, .. }));
    }

    #[test]
    fn test_hooks_unavailable_without_states() {
        let stateful = Component::new("Counter", |_, hooks| {
            let (count, _set) = hooks.use_state(0i64)?;
            Ok(text(count))
        });
        let mut registry = ComponentRegistry::new();
        let err = TreeBuilder::new(&mut registry)
            .build(&h(&stateful, Props::new(), vec![]), None)
            .unwrap_err();

        let BuildError::Component { source, .. } = err else {
            panic!("expected a component error");
        };
        assert!(matches!(
            source.downcast_ref::<crate::state::StateError>(),
            Some(crate::state::StateError::HookUnavailable)
        ));
    }
}
