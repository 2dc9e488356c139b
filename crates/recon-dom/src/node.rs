//! Resolved Nodes
//!
//! Output of the tree builder, input of the differ. Nodes are shared so a
//! memoized subtree can be carried verbatim into the next tree.

use std::cell::Cell;
use std::rc::Rc;

use crate::element::{TEXT_ATTRIBUTE, TEXT_TAG};
use crate::path::NodePath;
use crate::value::Props;

/// Resolved node
#[derive(Debug)]
pub struct Node {
    tag: Rc<str>,
    attributes: Props,
    children: Vec<Rc<Node>>,
    id: NodePath,
    /// Set by the builder when a component result is reused from the cache
    memoized: Cell<bool>,
}

impl Node {
    pub fn new(
        tag: impl Into<Rc<str>>,
        attributes: Props,
        children: Vec<Rc<Node>>,
        id: NodePath,
    ) -> Self {
        Self {
            tag: tag.into(),
            attributes,
            children,
            id,
            memoized: Cell::new(false),
        }
    }

    /// Text leaf
    pub fn text(content: &str, id: NodePath) -> Self {
        Self::new(TEXT_TAG, Props::new().with(TEXT_ATTRIBUTE, content), Vec::new(), id)
    }

    /// Node type (tag name, `text` for text leaves)
    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn attributes(&self) -> &Props {
        &self.attributes
    }

    pub fn children(&self) -> &[Rc<Node>] {
        &self.children
    }

    pub fn id(&self) -> &NodePath {
        &self.id
    }

    pub fn is_memoized(&self) -> bool {
        self.memoized.get()
    }

    pub(crate) fn set_memoized(&self, memoized: bool) {
        self.memoized.set(memoized);
    }

    pub fn is_text(&self) -> bool {
        &*self.tag == TEXT_TAG
    }

    /// Content of a text leaf
    pub fn text_content(&self) -> Option<&str> {
        if self.is_text() {
            self.attributes.get_str(TEXT_ATTRIBUTE)
        } else {
            None
        }
    }

    /// Descendant at `path`, relative to this node
    pub fn find(&self, path: &[u32]) -> Option<&Node> {
        let mut node = self;
        for &index in path {
            node = node.children.get(index as usize)?;
        }
        Some(node)
    }

    /// Number of nodes in this subtree
    pub fn subtree_len(&self) -> usize {
        1 + self.children.iter().map(|child| child.subtree_len()).sum::<usize>()
    }

    /// Pre-order walk over this subtree
    pub fn walk(&self, visit: &mut impl FnMut(&Node)) {
        visit(self);
        for child in &self.children {
            child.walk(visit);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Rc<Node> {
        let root = NodePath::root();
        let list = root.child(0);
        Rc::new(Node::new(
            "div",
            Props::new(),
            vec![
                Rc::new(Node::new(
                    "ul",
                    Props::new(),
                    vec![
                        Rc::new(Node::text("a", list.child(0))),
                        Rc::new(Node::text("b", list.child(1))),
                    ],
                    list,
                )),
                Rc::new(Node::text("c", root.child(1))),
            ],
            root,
        ))
    }

    #[test]
    fn test_find() {
        let tree = sample();
        assert_eq!(tree.find(&[0, 1]).and_then(Node::text_content), Some("b"));
        assert_eq!(tree.find(&[1]).and_then(Node::text_content), Some("c"));
        assert!(tree.find(&[2]).is_none());
        assert_eq!(tree.find(&[]).map(Node::tag), Some("div"));
    }

    #[test]
    fn test_walk_pre_order() {
        let tree = sample();
        let mut ids = Vec::new();
        tree.walk(&mut |node| ids.push(node.id().to_string()));
        assert_eq!(ids, [".", ".0.", ".0.0.", ".0.1.", ".1."]);
        assert_eq!(tree.subtree_len(), 5);
    }

    #[test]
    fn test_text_content() {
        let tree = sample();
        assert!(tree.text_content().is_none());
        assert!(!tree.is_memoized());
    }
}
