//! Render errors

use recon_dom::{BuildError, TargetError};

use crate::config::ConfigError;

/// Render error
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Build failed: {0}")]
    Build(#[from] BuildError),

    #[error("Patch application failed: {0}")]
    Target(#[from] TargetError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("A render pass is already in progress")]
    RenderInProgress,
}
