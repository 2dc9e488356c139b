//! Node Paths
//!
//! Positional node identifiers. A path is the sequence of child ordinals from
//! the root; its string form joins them with dots, rooted at `.`:
//! `[]` is `.`, `[0]` is `.0.`, `[0, 1]` is `.0.1.`.

use std::fmt;
use std::str::FromStr;

/// Separator used by the string form of a path
pub const SEPARATOR: char = '.';

/// Positional node identifier
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodePath {
    indices: Vec<u32>,
}

impl NodePath {
    /// The root path (`.`)
    pub fn root() -> Self {
        Self::default()
    }

    /// Build a path from child ordinals
    pub fn from_indices(indices: impl Into<Vec<u32>>) -> Self {
        Self { indices: indices.into() }
    }

    /// Path of the child at `index`
    pub fn child(&self, index: u32) -> Self {
        let mut indices = Vec::with_capacity(self.indices.len() + 1);
        indices.extend_from_slice(&self.indices);
        indices.push(index);
        Self { indices }
    }

    /// Parent path, `None` for the root
    pub fn parent(&self) -> Option<Self> {
        let (_, init) = self.indices.split_last()?;
        Some(Self { indices: init.to_vec() })
    }

    /// Child ordinals from the root
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Number of segments (0 for the root)
    pub fn depth(&self) -> usize {
        self.indices.len()
    }

    pub fn is_root(&self) -> bool {
        self.indices.is_empty()
    }

    /// Check if `self` is `other` or one of its ancestors
    pub fn is_prefix_of(&self, other: &NodePath) -> bool {
        other.indices.starts_with(&self.indices)
    }

    /// All prefixes from the root down to this path, inclusive (capture order)
    pub fn capture_path(&self) -> Vec<NodePath> {
        (0..=self.indices.len())
            .map(|len| Self { indices: self.indices[..len].to_vec() })
            .collect()
    }

    /// Capture path reversed: this path first, the root last
    pub fn bubble_path(&self) -> Vec<NodePath> {
        let mut path = self.capture_path();
        path.reverse();
        path
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{SEPARATOR}")?;
        for index in &self.indices {
            write!(f, "{index}{SEPARATOR}")?;
        }
        Ok(())
    }
}

/// Malformed path string
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathParseError {
    #[error("Path must start and end with '{SEPARATOR}': {0:?}")]
    Unterminated(String),

    #[error("Invalid path segment {segment:?} in {path:?}")]
    InvalidSegment { path: String, segment: String },
}

impl FromStr for NodePath {
    type Err = PathParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rest = s
            .strip_prefix(SEPARATOR)
            .ok_or_else(|| PathParseError::Unterminated(s.to_string()))?;
        if rest.is_empty() {
            return Ok(Self::root());
        }
        let inner = rest
            .strip_suffix(SEPARATOR)
            .ok_or_else(|| PathParseError::Unterminated(s.to_string()))?;

        let indices = inner
            .split(SEPARATOR)
            .map(|segment| {
                segment.parse::<u32>().map_err(|_| PathParseError::InvalidSegment {
                    path: s.to_string(),
                    segment: segment.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { indices })
    }
}
