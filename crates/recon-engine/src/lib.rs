//! Recon Engine
//!
//! A minimal reactive UI reconciliation engine.
//!
//! # Example
//! ```rust,ignore
//! use recon_engine::{h, text, Props, Renderer};
//! use recon_render::MemoryTarget;
//!
//! let target = MemoryTarget::new();
//! let renderer = Renderer::new(target.clone())?;
//! renderer.render(&h("button", Props::new(), vec![text("Say Hi!")]))?;
//! assert_eq!(target.to_html(), r#"<button data-recon-id=".">Say Hi!</button>"#);
//! ```

mod config;
mod error;
mod render_loop;
mod renderer;

pub use config::{Config, ConfigError};
pub use error::RenderError;
pub use render_loop::RenderReport;
pub use renderer::{Renderer, StatefulRenderer};

// Re-export the element model for component authors
pub use recon_dom::{h, text, Component, Element, EventHandler, Hooks, Props, SetState, Value};
pub use recon_dom as dom;

/// Engine version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
