//! Render Loop
//!
//! One pass: build the element tree, diff it against the committed tree,
//! apply the patches in order, then commit. A failed pass commits nothing.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use recon_dom::{
    diff_trees, BuildStats, Component, ComponentRegistry, Element, EventDispatcher,
    HandlerRepository, MemoStats, Node, Patch, RenderTarget, StateError, StateHost,
    StateRepository, TreeBuilder,
};

use crate::config::Config;
use crate::error::RenderError;

/// Outcome of one committed pass
#[derive(Debug, Clone)]
pub struct RenderReport {
    /// Pass number, starting at 1
    pub pass: u64,
    /// Patches applied, in order
    pub patches: Vec<Patch>,
    pub stats: BuildStats,
}

pub(crate) struct RenderLoop {
    this: Weak<RenderLoop>,
    config: Config,
    hooks_enabled: bool,
    target: RefCell<Box<dyn RenderTarget>>,
    registry: RefCell<ComponentRegistry>,
    states: RefCell<StateRepository>,
    handlers: Rc<RefCell<HandlerRepository>>,
    previous: RefCell<Option<Rc<Node>>>,
    last_root: RefCell<Option<Element>>,
    passes: Cell<u64>,
}

impl RenderLoop {
    /// Create the loop and mount `target`
    pub(crate) fn mount(
        target: Box<dyn RenderTarget>,
        config: Config,
        hooks_enabled: bool,
    ) -> Result<Rc<Self>, RenderError> {
        config.validate()?;
        let render_loop = Rc::new_cyclic(|this| RenderLoop {
            this: this.clone(),
            config,
            hooks_enabled,
            target: RefCell::new(target),
            registry: RefCell::new(ComponentRegistry::new()),
            states: RefCell::new(StateRepository::new()),
            handlers: Rc::new(RefCell::new(HandlerRepository::new())),
            previous: RefCell::new(None),
            last_root: RefCell::new(None),
            passes: Cell::new(0),
        });

        render_loop
            .target
            .borrow_mut()
            .mount(render_loop.dispatcher(), &render_loop.config.events)?;
        tracing::info!(
            "Recon {} renderer mounted (stateful: {})",
            crate::VERSION,
            hooks_enabled
        );
        Ok(render_loop)
    }

    pub(crate) fn render(&self, element: &Element) -> Result<RenderReport, RenderError> {
        let mut registry =
            self.registry.try_borrow_mut().map_err(|_| RenderError::RenderInProgress)?;
        let mut target = self.target.try_borrow_mut().map_err(|_| RenderError::RenderInProgress)?;
        let previous = self.previous.borrow().clone();
        let pass = self.passes.get() + 1;

        let (tree, stats) = {
            let mut states = if self.hooks_enabled {
                Some(self.states.try_borrow_mut().map_err(|_| RenderError::RenderInProgress)?)
            } else {
                None
            };

            let mut builder = TreeBuilder::new(&mut registry).with_max_depth(self.config.max_depth);
            if let Some(states) = states.as_mut() {
                let host: Weak<dyn StateHost> = self.this.clone();
                builder = builder.with_states(states, host);
            }

            match builder.build(element, previous.as_ref()) {
                Ok(tree) => (tree, builder.stats()),
                Err(err) => {
                    tracing::warn!("Render pass {} aborted: {}", pass, err);
                    return Err(err.into());
                }
            }
        };

        let patches = diff_trees(previous.as_ref(), &tree);
        {
            let mut handlers =
                self.handlers.try_borrow_mut().map_err(|_| RenderError::RenderInProgress)?;
            for patch in &patches {
                if self.config.trace_patches {
                    tracing::debug!("Pass {}: {}", pass, patch);
                }
                if let Err(err) = target.apply(patch, &mut handlers) {
                    tracing::warn!("Render pass {} aborted applying {}: {}", pass, patch, err);
                    return Err(err.into());
                }
            }
        }

        *self.previous.borrow_mut() = Some(tree);
        *self.last_root.borrow_mut() = Some(element.clone());
        self.passes.set(pass);
        tracing::debug!(
            "Render pass {}: {} patch(es), {} render(s), {} memo hit(s)",
            pass,
            patches.len(),
            stats.renders,
            stats.memo_hits
        );

        Ok(RenderReport { pass, patches, stats })
    }

    pub(crate) fn dispatcher(&self) -> EventDispatcher {
        EventDispatcher::new(Rc::clone(&self.handlers))
    }

    pub(crate) fn previous_tree(&self) -> Option<Rc<Node>> {
        self.previous.borrow().clone()
    }

    pub(crate) fn passes(&self) -> u64 {
        self.passes.get()
    }

    pub(crate) fn config(&self) -> &Config {
        &self.config
    }

    pub(crate) fn memo_stats(&self, component: &Component) -> MemoStats {
        self.registry
            .try_borrow()
            .map(|registry| registry.stats(component))
            .unwrap_or_default()
    }
}

impl StateHost for RenderLoop {
    fn update_states(
        &self,
        update: &mut dyn FnMut(&mut StateRepository) -> Result<bool, StateError>,
    ) -> Result<bool, StateError> {
        let mut states = self.states.try_borrow_mut().map_err(|_| StateError::RenderInProgress)?;
        update(&mut *states)
    }

    fn rerender_forced(&self) -> Result<(), StateError> {
        let Some(root) = self.last_root.borrow().clone() else {
            return Ok(());
        };

        self.states
            .try_borrow_mut()
            .map_err(|_| StateError::RenderInProgress)?
            .set_skip_property_check(true);
        let result = self.render(&root);
        if let Ok(mut states) = self.states.try_borrow_mut() {
            states.set_skip_property_check(false);
        }

        result.map(|_| ()).map_err(|err| StateError::Rerender(err.into()))
    }
}
