//! Components
//!
//! A component is a render function with a stable identity. Identity, not the
//! function pointer, keys the memoization cache and the state repository.

use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::element::Element;
use crate::state::Hooks;
use crate::value::Props;

static NEXT_COMPONENT_ID: AtomicU64 = AtomicU64::new(1);

/// Component identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId(u64);

impl ComponentId {
    fn next() -> Self {
        ComponentId(NEXT_COMPONENT_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}

type RenderFn = dyn Fn(&Props, &mut Hooks<'_>) -> anyhow::Result<Element>;

/// Component function with identity
///
/// Clones share identity. Create a component once and reuse it across
/// renders; two components built from the same closure are distinct.
#[derive(Clone)]
pub struct Component {
    id: ComponentId,
    name: Rc<str>,
    render: Rc<RenderFn>,
}

impl Component {
    pub fn new(
        name: &str,
        render: impl Fn(&Props, &mut Hooks<'_>) -> anyhow::Result<Element> + 'static,
    ) -> Self {
        Self {
            id: ComponentId::next(),
            name: Rc::from(name),
            render: Rc::new(render),
        }
    }

    pub fn id(&self) -> ComponentId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run the render function
    pub(crate) fn call(&self, props: &Props, hooks: &mut Hooks<'_>) -> anyhow::Result<Element> {
        (self.render)(props, hooks)
    }
}

impl PartialEq for Component {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Component {}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Component")
            .field("id", &self.id)
            .field("name", &self.name)
            .finish()
    }
}
