//! Element Factory
//!
//! Immutable element descriptors: the input of the tree builder.

use std::rc::Rc;

use crate::component::Component;
use crate::value::{Props, Value};

/// Tag name reserved for text leaves
pub const TEXT_TAG: &str = "text";

/// Attribute carrying the content of a text leaf
pub const TEXT_ATTRIBUTE: &str = "text";

/// Element type, resolved when the element is created
#[derive(Debug, Clone, PartialEq)]
pub enum ElementType {
    Tag(Rc<str>),
    Component(Component),
}

impl From<&str> for ElementType {
    fn from(tag: &str) -> Self {
        ElementType::Tag(Rc::from(tag))
    }
}

impl From<String> for ElementType {
    fn from(tag: String) -> Self {
        ElementType::Tag(Rc::from(tag))
    }
}

impl From<&Component> for ElementType {
    fn from(component: &Component) -> Self {
        ElementType::Component(component.clone())
    }
}

impl From<Component> for ElementType {
    fn from(component: Component) -> Self {
        ElementType::Component(component)
    }
}

#[derive(Debug)]
struct ElementData {
    kind: ElementType,
    props: Props,
    children: Vec<Element>,
}

/// Immutable element descriptor; clones share the payload
#[derive(Debug, Clone)]
pub struct Element(Rc<ElementData>);

impl Element {
    pub fn new(kind: impl Into<ElementType>, props: Props, children: Vec<Element>) -> Self {
        Element(Rc::new(ElementData {
            kind: kind.into(),
            props,
            children,
        }))
    }

    pub fn kind(&self) -> &ElementType {
        &self.0.kind
    }

    pub fn props(&self) -> &Props {
        &self.0.props
    }

    pub fn children(&self) -> &[Element] {
        &self.0.children
    }

    /// Tag name for tag elements
    pub fn tag(&self) -> Option<&str> {
        match &self.0.kind {
            ElementType::Tag(tag) => Some(tag),
            ElementType::Component(_) => None,
        }
    }

    pub fn component(&self) -> Option<&Component> {
        match &self.0.kind {
            ElementType::Component(component) => Some(component),
            ElementType::Tag(_) => None,
        }
    }

    /// Check if both handles point at the same descriptor
    pub fn ptr_eq(&self, other: &Element) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

/// Create an element
pub fn h(kind: impl Into<ElementType>, props: Props, children: Vec<Element>) -> Element {
    Element::new(kind, props, children)
}

/// Create a text leaf
///
/// The content is stored in its literal string form, so `text(0)` renders
/// as `"0"`. Values with no literal form become empty text.
pub fn text(content: impl Into<Value>) -> Element {
    let content = content.into().to_attribute().unwrap_or_default();
    Element::new(TEXT_TAG, Props::new().with(TEXT_ATTRIBUTE, content), Vec::new())
}
