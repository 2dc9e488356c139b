//! Renderers - Main entry points

use std::rc::Rc;

use recon_dom::{Component, Element, EventDispatcher, MemoStats, Node, RenderTarget};

use crate::config::Config;
use crate::error::RenderError;
use crate::render_loop::{RenderLoop, RenderReport};

/// Stateless renderer: components get no local state
///
/// Each call to [`Renderer::render`] diffs against the tree committed by the
/// previous call on the same instance.
pub struct Renderer {
    inner: Rc<RenderLoop>,
}

impl Renderer {
    /// Mount `target` with the default configuration
    pub fn new(target: impl RenderTarget + 'static) -> Result<Self, RenderError> {
        Self::with_config(target, Config::default())
    }

    pub fn with_config(
        target: impl RenderTarget + 'static,
        config: Config,
    ) -> Result<Self, RenderError> {
        let inner = RenderLoop::mount(Box::new(target), config, false)?;
        Ok(Self { inner })
    }

    /// Run one build, diff and apply pass
    pub fn render(&self, element: &Element) -> Result<RenderReport, RenderError> {
        self.inner.render(element)
    }

    /// Root listener handed to the target at mount
    pub fn dispatcher(&self) -> EventDispatcher {
        self.inner.dispatcher()
    }

    /// Last committed tree
    pub fn previous_tree(&self) -> Option<Rc<Node>> {
        self.inner.previous_tree()
    }

    /// Committed passes so far
    pub fn passes(&self) -> u64 {
        self.inner.passes()
    }

    pub fn config(&self) -> &Config {
        self.inner.config()
    }

    pub fn memo_stats(&self, component: &Component) -> MemoStats {
        self.inner.memo_stats(component)
    }
}

/// Renderer whose components may hold local state
///
/// A state setter that changes a value re-renders the last root element
/// synchronously, with every component forced to re-execute.
pub struct StatefulRenderer {
    inner: Rc<RenderLoop>,
}

impl StatefulRenderer {
    /// Mount `target` with the default configuration
    pub fn new(target: impl RenderTarget + 'static) -> Result<Self, RenderError> {
        Self::with_config(target, Config::default())
    }

    pub fn with_config(
        target: impl RenderTarget + 'static,
        config: Config,
    ) -> Result<Self, RenderError> {
        let inner = RenderLoop::mount(Box::new(target), config, true)?;
        Ok(Self { inner })
    }

    /// Run one build, diff and apply pass
    pub fn render(&self, element: &Element) -> Result<RenderReport, RenderError> {
        self.inner.render(element)
    }

    pub fn dispatcher(&self) -> EventDispatcher {
        self.inner.dispatcher()
    }

    pub fn previous_tree(&self) -> Option<Rc<Node>> {
        self.inner.previous_tree()
    }

    /// Committed passes so far, state-triggered ones included
    pub fn passes(&self) -> u64 {
        self.inner.passes()
    }

    pub fn config(&self) -> &Config {
        self.inner.config()
    }

    pub fn memo_stats(&self, component: &Component) -> MemoStats {
        self.inner.memo_stats(component)
    }
}
